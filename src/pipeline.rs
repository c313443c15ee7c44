//! File-to-file stage drivers
//!
//! Each stage reads its input file, runs one transformation and writes its
//! output file in the next stage's text format:
//!
//! ```text
//! source ─lex→ tokens.txt ─parse→ ast.txt ─lower→ postfix.txt ─gen→ output.asm
//! ```
//!
//! [`Pipeline::run`] chains the four and halts at the first failure.

use crate::codegen::asm::{self, Assembly};
use crate::codegen::errors::{GenerateError, LowerError};
use crate::codegen::postfix::{self, Postfix};
use crate::config::PipelineConfig;
use crate::parser::ast::Expr;
use crate::parser::lexer::{Lexer, SymbolRegistry, Token, TokenKind};
use crate::parser::parse::{self, ParseError};
use crate::text::{self, TextError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Any failure of a pipeline stage
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("{source} in {}", .path.display())]
    Format { path: PathBuf, source: TextError },

    #[error("{count} invalid token(s); first is {first} at {}", .first.location)]
    LexErrors { count: usize, first: Token },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Lower(#[from] LowerError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Output of the lexing stage
#[derive(Debug, Clone)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub symbols: SymbolRegistry,
}

impl LexOutput {
    pub fn error_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.kind == TokenKind::Error)
    }
}

/// Results of every stage of a full run
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub symbols: SymbolRegistry,
    pub ast: Expr,
    pub postfix: Postfix,
    pub assembly: Assembly,
}

/// Run all four stages in memory, without touching the filesystem.
pub fn compile(source: &str) -> Result<Compilation, PipelineError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let symbols = lexer.symbols().clone();
    check_lex_errors(&tokens)?;

    let ast = parse::parse(tokens.clone())?;
    let postfix = postfix::lower(&ast)?;
    let assembly = asm::generate(&postfix.to_string())?;

    Ok(Compilation {
        tokens,
        symbols,
        ast,
        postfix,
        assembly,
    })
}

fn check_lex_errors(tokens: &[Token]) -> Result<(), PipelineError> {
    let mut errors = tokens.iter().filter(|t| t.kind == TokenKind::Error);
    match errors.next() {
        Some(first) => Err(PipelineError::LexErrors {
            count: 1 + errors.count(),
            first: first.clone(),
        }),
        None => Ok(()),
    }
}

/// Stage drivers bound to a file layout
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// source → token file. Error tokens are written like any other token.
    pub fn lex_file(&self, source: &Path, tokens_out: &Path) -> Result<LexOutput, PipelineError> {
        let source_text = read_file(source)?;
        let mut lexer = Lexer::new(&source_text);
        let tokens = lexer.tokenize();

        write_file(tokens_out, &text::tokens::encode(&tokens))?;
        info!(
            tokens = tokens.len(),
            arrays = lexer.symbols().len(),
            output = %tokens_out.display(),
            "lexed source"
        );

        Ok(LexOutput {
            symbols: lexer.symbols().clone(),
            tokens,
        })
    }

    /// token file → AST file
    pub fn parse_file(&self, tokens_in: &Path, ast_out: &Path) -> Result<Expr, PipelineError> {
        let tokens = text::tokens::decode(&read_file(tokens_in)?).map_err(|source| {
            PipelineError::Format {
                path: tokens_in.to_path_buf(),
                source,
            }
        })?;

        let ast = parse::parse(tokens)?;
        write_file(ast_out, &text::ast::write(&ast))?;
        info!(output = %ast_out.display(), "parsed tokens");
        Ok(ast)
    }

    /// AST file → postfix file
    pub fn lower_file(&self, ast_in: &Path, postfix_out: &Path) -> Result<Postfix, PipelineError> {
        let ast = text::ast::read(&read_file(ast_in)?)?;
        let postfix = postfix::lower(&ast)?;

        write_file(postfix_out, &format!("{}\n", postfix))?;
        info!(items = postfix.len(), output = %postfix_out.display(), "lowered to postfix");
        Ok(postfix)
    }

    /// postfix file → assembly file. Only the first line is read.
    pub fn generate_file(
        &self,
        postfix_in: &Path,
        asm_out: &Path,
    ) -> Result<Assembly, PipelineError> {
        let postfix_text = read_file(postfix_in)?;
        let line = postfix_text.lines().next().unwrap_or("");
        let assembly = asm::generate(line)?;

        write_file(asm_out, &assembly.to_string())?;
        info!(
            instructions = assembly.len(),
            output = %asm_out.display(),
            "generated assembly"
        );
        Ok(assembly)
    }

    /// Run every stage through the configured files.
    pub fn run(&self, source: &Path) -> Result<Assembly, PipelineError> {
        let result = self.run_stages(source);
        if let Err(err) = &result {
            error!(error = %err, source = %source.display(), "pipeline halted");
        }
        result
    }

    fn run_stages(&self, source: &Path) -> Result<Assembly, PipelineError> {
        let config = &self.config;

        let lexed = self.lex_file(source, &config.tokens_path())?;
        check_lex_errors(&lexed.tokens)?;

        self.parse_file(&config.tokens_path(), &config.ast_path())?;
        self.lower_file(&config.ast_path(), &config.postfix_path())?;
        self.generate_file(&config.postfix_path(), &config.asm_path())
    }
}

fn read_file(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

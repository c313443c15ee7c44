//! Pipeline configuration
//!
//! Fixed language constants plus the two runtime-configurable pieces:
//! - [`PipelineConfig`]: where each stage reads and writes its text file
//! - [`LogConfig`]: maximum log level and output format
//!
//! Runtime values are resolved from the environment with fallbacks:
//!
//! | Variable            | Meaning                          | Default  |
//! |---------------------|----------------------------------|----------|
//! | `STACKC_OUT_DIR`    | directory holding stage files    | `.`      |
//! | `STACKC_LOG`        | `trace`..`error`                 | `info`   |
//! | `STACKC_LOG_FORMAT` | `text` or `json`                 | `text`   |

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;

/// Words the lexer classifies as `Keyword` instead of `Identifier`.
pub const RESERVED_WORDS: &[&str] = &["if", "else"];

/// Single-character operators recognised by the lexer.
pub const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '=', '<', '>'];

/// Single-character delimiters recognised by the lexer.
pub const DELIMITER_CHARS: &[char] = &['(', ')', ';', '{', '}'];

/// Operand name the generator pushes for the value an arithmetic
/// instruction leaves behind.
pub const RESULT_OPERAND: &str = "result";

/// Deepest expression tree the parser will build. Nested assignments and
/// folded operators each add one level.
pub const MAX_NESTING_DEPTH: usize = 512;

pub const DEFAULT_TOKENS_FILE: &str = "tokens.txt";
pub const DEFAULT_AST_FILE: &str = "ast.txt";
pub const DEFAULT_POSTFIX_FILE: &str = "postfix.txt";
pub const DEFAULT_ASM_FILE: &str = "output.asm";

const OUT_DIR_ENV: &str = "STACKC_OUT_DIR";
const LOG_LEVEL_ENV: &str = "STACKC_LOG";
const LOG_FORMAT_ENV: &str = "STACKC_LOG_FORMAT";

/// File layout of the stage hand-off files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub out_dir: PathBuf,
    pub tokens_file: String,
    pub ast_file: String,
    pub postfix_file: String,
    pub asm_file: String,
}

impl PipelineConfig {
    /// Resolve the output directory from `STACKC_OUT_DIR`, falling back to
    /// the current directory.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var(OUT_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.out_dir = PathBuf::from(dir.trim());
            }
        }
        config
    }

    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.out_dir.join(&self.tokens_file)
    }

    pub fn ast_path(&self) -> PathBuf {
        self.out_dir.join(&self.ast_file)
    }

    pub fn postfix_path(&self) -> PathBuf {
        self.out_dir.join(&self.postfix_file)
    }

    pub fn asm_path(&self) -> PathBuf {
        self.out_dir.join(&self.asm_file)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            tokens_file: DEFAULT_TOKENS_FILE.to_string(),
            ast_file: DEFAULT_AST_FILE.to_string(),
            postfix_file: DEFAULT_POSTFIX_FILE.to_string(),
            asm_file: DEFAULT_ASM_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Logging settings for the command-line driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl LogConfig {
    /// Unknown or missing values fall back to `info` / text output.
    pub fn from_env() -> Self {
        Self::from_values(
            env::var(LOG_LEVEL_ENV).ok().as_deref(),
            env::var(LOG_FORMAT_ENV).ok().as_deref(),
        )
    }

    pub fn from_values(level: Option<&str>, format: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            level: level
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.level),
            format: format
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.format),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
        }
    }
}

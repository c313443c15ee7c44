// End-to-end tests for the compilation pipeline

use stackc::codegen::asm::{generate, Assembly};
use stackc::codegen::errors::GenerateError;
use stackc::codegen::postfix::lower;
use stackc::config::PipelineConfig;
use stackc::parser::ast::{BinOp, Expr};
use stackc::parser::lexer::{tokenize, TokenKind};
use stackc::parser::parse::parse;
use stackc::pipeline::{compile, Pipeline, PipelineError};
use stackc::text;
use std::fs;
use std::path::PathBuf;

/// Fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stackc-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    dir
}

#[test]
fn test_assignment_through_every_stage() {
    let tokens = tokenize("x = 2 + 3");
    let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
    assert_eq!(
        kinds,
        vec![
            (TokenKind::Identifier, "x"),
            (TokenKind::Operator, "="),
            (TokenKind::Integer, "2"),
            (TokenKind::Operator, "+"),
            (TokenKind::Integer, "3"),
        ]
    );

    let ast = parse(tokens).expect("Parsing failed");
    assert_eq!(
        ast,
        Expr::assign(
            "x",
            Expr::binary(BinOp::Add, Expr::IntLiteral(2), Expr::IntLiteral(3))
        )
    );

    let postfix = lower(&ast).expect("Lowering failed");
    assert_eq!(postfix.to_string(), "2 3 + x =");

    let assembly = generate(&postfix.to_string()).expect("Generation failed");
    let text = assembly.to_string();
    assert!(text.contains("push 2\n"));
    assert!(text.contains("push 3\n"));
    assert!(text.contains("add\n"));
    assert!(text.contains("mov x, result\n"));
}

#[test]
fn test_generator_on_chained_postfix() {
    let assembly = generate("1 2 + 3 * x =").expect("Generation failed");
    assert_eq!(
        assembly.to_string(),
        "push 1\npush 2\nadd\npush result\npush 3\nmul\nmov x, result\n"
    );
}

#[test]
fn test_unmatched_character_becomes_error_token() {
    let tokens = tokenize("a = 1 @ 2");
    let errors: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].text, "@");
    assert_eq!(tokens.last().map(|t| t.text.as_str()), Some("2"));
}

#[test]
fn test_missing_equals_fails_without_panicking() {
    let tokens = tokenize("x 2 + 3");
    let err = parse(tokens).expect_err("Parsing should fail");
    assert!(err.message.contains("Expected '='"));
}

#[test]
fn test_unknown_operator_fails_instead_of_truncating() {
    let err = compile("x = 1 < 2").expect_err("Compilation should fail");
    match err {
        PipelineError::Parse(err) => assert!(err.message.contains("'<'")),
        other => panic!("Expected parse error, got {:?}", other),
    }

    assert!(matches!(compile("x = 1 2 3"), Err(PipelineError::Parse(_))));
}

#[test]
fn test_deeply_nested_source_fails_cleanly() {
    let source = format!("{}1", "a = ".repeat(200_000));
    assert!(matches!(compile(&source), Err(PipelineError::Parse(_))));
}

#[test]
fn test_chained_assignment_underflows_in_generator() {
    let compiled_postfix = lower(&parse(tokenize("x = y = 3")).expect("Parsing failed"))
        .expect("Lowering failed");
    assert_eq!(compiled_postfix.to_string(), "3 y = x =");

    let err = compile("x = y = 3").expect_err("Generation should fail");
    assert!(matches!(
        err,
        PipelineError::Generate(GenerateError::StackUnderflow { instruction: "mov", .. })
    ));
    assert!(matches!(
        compile("1 + y = 2"),
        Err(PipelineError::Generate(GenerateError::StackUnderflow { .. }))
    ));
}

#[test]
fn test_compile_left_fold_program() {
    let compiled = compile("total = 10 - 4 / 2;").expect("Compilation failed");
    assert_eq!(compiled.postfix.to_string(), "10 4 - 2 / total =");
    assert_eq!(
        compiled.assembly.to_string(),
        "push 10\npush 4\nsub\npush result\npush 2\ndiv\nmov total, result\n"
    );
}

#[test]
fn test_file_pipeline_writes_every_stage() {
    let dir = scratch_dir("files");
    let source = dir.join("program.src");
    fs::write(&source, "x = 2 + 3\n").expect("Failed to write source");

    let config = PipelineConfig::default().with_out_dir(&dir);
    let pipeline = Pipeline::new(config.clone());
    let assembly = pipeline.run(&source).expect("Pipeline failed");

    let tokens_text = fs::read_to_string(config.tokens_path()).expect("Missing token file");
    assert_eq!(
        tokens_text.lines().next(),
        Some("TokenType::Identifier ,\"x\"")
    );
    assert_eq!(
        fs::read_to_string(config.ast_path()).expect("Missing AST file"),
        "x = 2 + 3"
    );
    assert_eq!(
        fs::read_to_string(config.postfix_path()).expect("Missing postfix file"),
        "2 3 + x =\n"
    );

    let asm_text = fs::read_to_string(config.asm_path()).expect("Missing assembly file");
    assert_eq!(asm_text, "push 2\npush 3\nadd\nmov x, result\n");
    assert_eq!(asm_text.parse::<Assembly>().expect("Unreadable assembly"), assembly);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_file_pipeline_halts_on_lex_errors() {
    let dir = scratch_dir("lexerr");
    let source = dir.join("program.src");
    fs::write(&source, "x = 2 ? 3").expect("Failed to write source");

    let config = PipelineConfig::default().with_out_dir(&dir);
    let err = Pipeline::new(config.clone())
        .run(&source)
        .expect_err("Pipeline should halt");

    assert!(matches!(err, PipelineError::LexErrors { count: 1, .. }));
    assert!(config.tokens_path().exists());
    assert!(!config.ast_path().exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_individual_stage_files() {
    let dir = scratch_dir("stages");
    let tokens_path = dir.join("in.tokens");
    let ast_path = dir.join("out.ast");
    let postfix_path = dir.join("out.rpn");
    let asm_path = dir.join("out.asm");

    let tokens = tokenize("y = 12 * 3");
    fs::write(&tokens_path, text::tokens::encode(&tokens)).expect("Failed to write tokens");

    let pipeline = Pipeline::default();
    pipeline.parse_file(&tokens_path, &ast_path).expect("Parse stage failed");
    let postfix = pipeline.lower_file(&ast_path, &postfix_path).expect("Lower stage failed");
    assert_eq!(postfix.to_string(), "12 3 * y =");

    let assembly = pipeline.generate_file(&postfix_path, &asm_path).expect("Gen stage failed");
    assert_eq!(
        assembly.to_string(),
        "push 12\npush 3\nmul\nmov y, result\n"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_input_file_is_read_error() {
    let dir = scratch_dir("missing");
    let err = Pipeline::default()
        .parse_file(&dir.join("nope.txt"), &dir.join("ast.txt"))
        .expect_err("Reading should fail");
    assert!(matches!(err, PipelineError::Read { .. }));
    assert!(err.to_string().contains("nope.txt"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_malformed_token_file_reports_line() {
    let dir = scratch_dir("badtokens");
    let tokens_path = dir.join("tokens.txt");
    fs::write(&tokens_path, "TokenType::Integer ,\"1\"\ngarbage\n")
        .expect("Failed to write tokens");

    let err = Pipeline::default()
        .parse_file(&tokens_path, &dir.join("ast.txt"))
        .expect_err("Decoding should fail");
    match err {
        PipelineError::Format { source, .. } => assert_eq!(source.line, 2),
        other => panic!("Expected format error, got {:?}", other),
    }

    let _ = fs::remove_dir_all(&dir);
}

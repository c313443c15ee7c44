// stackc: expression language → postfix → stack-machine assembly

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use tracing::warn;

use stackc::config::{LogConfig, LogFormat, PipelineConfig};
use stackc::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    init_tracing(LogConfig::from_env());

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("stackc");

    let Some(command) = args.get(1) else {
        eprintln!("Error: No command provided");
        eprintln!();
        print_usage(program_name);
        process::exit(2);
    };

    let config = PipelineConfig::from_env();
    let pipeline = Pipeline::new(config.clone());
    let path_arg = |index: usize, default: PathBuf| -> PathBuf {
        args.get(index).map(PathBuf::from).unwrap_or(default)
    };

    match command.as_str() {
        "run" => {
            let source = required_source(&args, program_name);
            let assembly = pipeline
                .run(&source)
                .with_context(|| format!("compiling {}", source.display()))?;
            print!("{}", assembly);
        }
        "lex" => {
            let source = required_source(&args, program_name);
            let tokens_out = path_arg(3, config.tokens_path());
            let lexed = pipeline
                .lex_file(&source, &tokens_out)
                .with_context(|| format!("lexing {}", source.display()))?;

            let invalid = lexed.error_tokens().count();
            if invalid > 0 {
                warn!(invalid, "token stream contains invalid characters");
            }

            if !lexed.symbols.is_empty() {
                println!("Symbol Table:");
                for (name, size) in lexed.symbols.iter() {
                    println!("{} {}", name, size);
                }
            }
        }
        "parse" => {
            let tokens_in = path_arg(2, config.tokens_path());
            let ast_out = path_arg(3, config.ast_path());
            let ast = pipeline
                .parse_file(&tokens_in, &ast_out)
                .with_context(|| format!("parsing {}", tokens_in.display()))?;
            println!("{}", ast);
        }
        "lower" => {
            let ast_in = path_arg(2, config.ast_path());
            let postfix_out = path_arg(3, config.postfix_path());
            let postfix = pipeline
                .lower_file(&ast_in, &postfix_out)
                .with_context(|| format!("lowering {}", ast_in.display()))?;
            println!("{}", postfix);
        }
        "gen" => {
            let postfix_in = path_arg(2, config.postfix_path());
            let asm_out = path_arg(3, config.asm_path());
            let assembly = pipeline
                .generate_file(&postfix_in, &asm_out)
                .with_context(|| format!("generating from {}", postfix_in.display()))?;
            print!("{}", assembly);
        }
        "help" | "-h" | "--help" => print_usage(program_name),
        other => {
            eprintln!("Error: Unknown command '{}'", other);
            eprintln!();
            print_usage(program_name);
            process::exit(2);
        }
    }

    Ok(())
}

fn required_source(args: &[String], program_name: &str) -> PathBuf {
    match args.get(2) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Error: No source file provided");
            eprintln!();
            print_usage(program_name);
            process::exit(2);
        }
    }
}

fn print_usage(program_name: &str) {
    eprintln!("Usage:");
    eprintln!("  {} run <source>               # all stages, prints assembly", program_name);
    eprintln!("  {} lex <source> [tokens]", program_name);
    eprintln!("  {} parse [tokens] [ast]", program_name);
    eprintln!("  {} lower [ast] [postfix]", program_name);
    eprintln!("  {} gen [postfix] [asm]", program_name);
    eprintln!();
    eprintln!("Omitted paths default to tokens.txt, ast.txt, postfix.txt and output.asm");
    eprintln!("in $STACKC_OUT_DIR (or the current directory).");
    eprintln!("Logging: STACKC_LOG=trace|debug|info|warn|error, STACKC_LOG_FORMAT=text|json");
}

fn init_tracing(config: LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(false)
        .with_writer(io::stderr);

    match config.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

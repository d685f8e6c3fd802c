//! MiniRuby CLI.
//!
//! Usage:
//!   miniruby <SCRIPT>         Run a script file
//!   miniruby -e <SOURCE>      Evaluate an inline expression
//!   miniruby --tokens ...     Print the token stream and exit
//!   miniruby --ast ...        Print the parse tree and exit
//!   miniruby --bytecode ...   Print the compiled bytecode and exit

mod output;

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use miniruby::error::MiniRubyError;
use miniruby::{disassemble, lex, parse, runner};

use output::OutputMode;

/// MiniRuby - a small, Ruby-flavored expression language
#[derive(Parser, Debug)]
#[command(name = "miniruby")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The script file to run
    script: Option<PathBuf>,

    /// Evaluate an inline expression instead of a file
    #[arg(short = 'e', long = "eval", value_name = "SOURCE")]
    eval: Option<String>,

    /// Print the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Print the parse tree and exit
    #[arg(long)]
    ast: bool,

    /// Print the compiled bytecode and exit
    #[arg(long)]
    bytecode: bool,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let source = match (&args.eval, &args.script) {
        (Some(source), _) => source.clone(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("error reading {}: {}", path.display(), error);
                return ExitCode::from(1);
            }
        },
        (None, None) => {
            eprintln!("error: expected a script file or -e <SOURCE>");
            return ExitCode::from(1);
        }
    };

    if args.tokens {
        for token in lex(&source) {
            println!("{token:?}");
        }
        return ExitCode::SUCCESS;
    }

    if args.ast {
        let parsed = parse(&source);
        println!("{:#?}", parsed.program);
        if !parsed.errors.is_empty() {
            output::report_errors(&parsed.errors, mode);
            return ExitCode::from(2);
        }
        return ExitCode::SUCCESS;
    }

    if args.bytecode {
        return match runner::compile(&source) {
            Ok(chunk) => {
                print!("{}", disassemble(&chunk));
                ExitCode::SUCCESS
            }
            Err(errors) => {
                output::report_errors(&errors, mode);
                ExitCode::from(2)
            }
        };
    }

    let stdout = io::stdout();
    let stdin = io::stdin();
    let mut out = stdout.lock();
    let mut input = stdin.lock();

    match runner::interpret(&source, &mut out, &mut input) {
        Ok(value) => {
            drop(out);
            output::report_result(&value, mode);
            ExitCode::SUCCESS
        }
        Err(errors) => {
            drop(out);
            output::report_errors(&errors, mode);
            if errors
                .iter()
                .any(|error| matches!(error, MiniRubyError::RuntimeError { .. }))
            {
                ExitCode::from(3)
            } else {
                ExitCode::from(2)
            }
        }
    }
}

//! Knight CLI: a single binary accepting either a source file or a literal
//! expression, plus a repeatable verbosity flag.
//!
//! Grounded on the teacher's `cli.rs` (`#[derive(Parser)]` + a `run_cli`
//! dispatcher), trimmed from a multi-subcommand build tool down to Knight's
//! single-mode launcher — there is no `Commands` enum because there is
//! nothing to choose between besides the input source.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use crate::error::KnightError;
use crate::eval;
use crate::host::SystemHost;
use crate::ident::Environment;
use crate::parser;
use crate::stream::Stream;

#[derive(Parser)]
#[command(name = "knight")]
#[command(about = "A tree-walking interpreter for the Knight programming language")]
#[command(version)]
pub struct Cli {
    /// Source file to run. Mutually exclusive with `--expression`.
    pub file: Option<PathBuf>,

    /// Treat the argument itself as Knight source text.
    #[arg(short = 'e', long = "expression", conflicts_with = "file")]
    pub expression: Option<String>,

    /// Raise tracing verbosity: warnings only, then info, then debug.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Resolves the program's exit code: 0 on normal completion, `QUIT n`'s `n`,
/// or 1 for any other fatal error. Takes an already-parsed `Cli` so `main`
/// can install tracing (sized by `cli.verbose`) before any library code runs.
pub fn run(cli: Cli) -> i32 {
    let source = match acquire_source(&cli) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("knight: {err}");
            return 1;
        }
    };

    let mut env = Environment::new();
    let mut host = SystemHost::new();
    let mut stream = Stream::new(&source);

    let parsed = match parser::parse(&mut stream, &mut env) {
        Ok(Some(value)) => value,
        Ok(None) => return 0,
        Err(err) => {
            eprintln!("{}", err.display_with_source(&source));
            return 1;
        }
    };
    info!(kind = parsed.type_name(), "parsed program");

    match eval::run(&parsed, &mut env, &mut host) {
        Ok(_) => 0,
        Err(KnightError::Quit(code)) => code,
        Err(err) => {
            eprintln!("{}", err.display_with_source(&source));
            1
        }
    }
}

fn acquire_source(cli: &Cli) -> Result<String, KnightError> {
    match (&cli.file, &cli.expression) {
        (Some(path), None) => {
            debug!(path = %path.display(), "reading source file");
            fs::read_to_string(path).map_err(|e| KnightError::Io(e.to_string()))
        }
        (None, Some(expr)) => {
            debug!("using literal expression as source");
            Ok(expr.clone())
        }
        (Some(_), Some(_)) => unreachable!("clap enforces conflicts_with"),
        (None, None) => Err(KnightError::Io(
            "no source given: pass a file path or -e <EXPRESSION>".to_string(),
        )),
    }
}

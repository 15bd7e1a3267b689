use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use clap::Parser;
use sbvm::Machine;
use simple::{Outcome, run_source};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Validates SIMPLE programs and runs the valid ones on the bytecode machine
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Source files, each run with a fresh parser and machine
    #[clap(value_parser)]
    inputs: Vec<String>,

    /// Number of memory slots available to the machine
    #[clap(short, long, value_parser, default_value_t = Machine::DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Print the token list, symbol table, bytecode and memory after each run
    #[clap(short, long)]
    dump: bool,

    /// Print each token before the program outcome
    #[clap(short, long)]
    tokens: bool,
}

/// Use `RUST_LOG` to override the default filter
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Reads a single line of source text from stdin
fn prompt_source() -> io::Result<String> {
    println!("You did not enter a valid file name in the run arguments.");
    println!("Please enter a string to be parsed:");

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_source(file: Option<&str>) -> io::Result<String> {
    if let Some(f) = file {
        match std::fs::read_to_string(f) {
            Ok(s) => return Ok(s),
            Err(e) => warn!("unable to read {f} - {e}"),
        }
    }

    prompt_source()
}

fn print_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> io::Result<()> {
    match outcome {
        Outcome::Invalid(e) => {
            writeln!(out, "{e}")?;
            writeln!(out, "Invalid Program")
        }
        Outcome::Completed => writeln!(out, "Valid Program"),
        Outcome::Halted(e) => {
            writeln!(out, "Valid Program")?;
            writeln!(out, "Error: {e}")
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let files = if args.inputs.is_empty() {
        vec![None]
    } else {
        args.inputs.iter().map(|f| Some(f.as_str())).collect()
    };
    let batch = files.len() > 1;

    let mut all_valid = true;

    for file in files {
        let source = match read_source(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Unable to read source text - {e}");
                return ExitCode::from(2);
            }
        };

        if batch {
            println!("{}", file.unwrap_or_default());
            println!("Parser Output: ");
        }

        let (parser, outcome) = run_source(&source, args.memory_size);
        debug!(?outcome, "program finished");

        if args.tokens {
            for t in parser.get_tokens() {
                println!("{t}");
            }
        }

        if let Err(e) = print_outcome(&mut io::stdout().lock(), &outcome) {
            eprintln!("Unable to write to stdout - {e}");
            return ExitCode::from(2);
        }

        if args.dump {
            println!("{parser}");
        }

        if batch {
            println!("{}", "-".repeat(89));
        }

        all_valid &= outcome.is_valid();
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

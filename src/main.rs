use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bytelox::{debug, error::InterpretError, interpreter, value::Value};

#[derive(Parser)]
#[command(
    name = "bytelox",
    about = "Compile Lox expressions to bytecode and evaluate them."
)]
struct Cli {
    /// Script to evaluate; starts a REPL when omitted.
    path: Option<PathBuf>,
    /// Print the compiled chunk before running it.
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.path {
        Some(path) => run_file(&path, cli.dump),
        None => repl(cli.dump),
    }
}

fn run_file(path: &PathBuf, dump: bool) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read {}: {}", path.display(), e);
            return ExitCode::from(74);
        }
    };

    match evaluate(&source, dump) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        // Compile diagnostics were already printed as they were reported.
        Err(InterpretError::Compile(_)) => ExitCode::from(65),
        Err(InterpretError::Runtime(e)) => {
            eprintln!("{}", e);
            ExitCode::from(70)
        }
    }
}

fn repl(dump: bool) -> ExitCode {
    let mut source = String::new();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return ExitCode::FAILURE;
        }

        match io::stdin().read_line(&mut source) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => match evaluate(source.trim_end(), dump) {
                Ok(value) => println!("{}", value),
                Err(InterpretError::Runtime(e)) => eprintln!("{}", e),
                Err(InterpretError::Compile(_)) => {}
            },
            Err(e) => {
                eprintln!("Error occured reading input. {:?}", e);
                return ExitCode::FAILURE;
            }
        }
        source.clear();
    }
}

fn evaluate(source: &str, dump: bool) -> Result<Value, InterpretError> {
    let chunk = interpreter::compile(source)?;
    if dump {
        print!("{}", debug::disassemble(&chunk, "expression"));
    }
    interpreter::run(&chunk)
}

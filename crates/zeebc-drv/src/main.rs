use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zeebc_drv::{compile, CompileError, Config};

/// Compiles ZeeBASIC source to C.
#[derive(Parser)]
#[command(name = "zeebc", version, about = "Compiles ZeeBASIC source to C")]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Path of the generated C file
    #[arg(short, long, default_value = "out.c")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config {
        input: cli.input,
        output: cli.output,
    };

    match compile(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CompileError::Diagnostic { rendered, .. }) => {
            eprint!("{rendered}");
            ExitCode::FAILURE
        }
        Err(error) => {
            // print the whole cause chain for I/O failures
            eprintln!("error: {:#}", anyhow::Error::new(error));
            ExitCode::FAILURE
        }
    }
}

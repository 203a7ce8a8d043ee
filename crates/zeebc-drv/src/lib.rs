//! zeebc-drv - Compiler driver.
//!
//! Orchestrates the pipeline: read the source file, lex and parse it (type
//! checking runs inside the parse), and emit the C translation unit. The
//! first diagnostic aborts the compile; there is no recovery and no
//! partial output worth keeping.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use zeebc_gen::EmitError;
use zeebc_lex::{Lexer, SourceReader};
use zeebc_par::{Parser, Program};
use zeebc_util::Diagnostic;

/// One compiler invocation's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Source file to compile.
    pub input: PathBuf,
    /// C file to write.
    pub output: PathBuf,
}

/// Everything that can end a compile unsuccessfully.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source file could not be read.
    #[error("Failed to open source file : {}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// A diagnostic from the lexer, parser or semantic rules. `rendered`
    /// carries the caret-underlined report for the terminal.
    #[error("{diagnostic}")]
    Diagnostic {
        diagnostic: Diagnostic,
        rendered: String,
    },
}

/// Compile `config.input` into `config.output`.
pub fn compile(config: &Config) -> Result<(), CompileError> {
    debug!(input = %config.input.display(), "reading source");
    let source = fs::read_to_string(&config.input).map_err(|source| CompileError::ReadSource {
        path: config.input.clone(),
        source,
    })?;

    let program = parse_program(&source)?;
    debug!(
        statements = program.statements.len(),
        locals = program.symbols.len(),
        output = %config.output.display(),
        "emitting C"
    );
    zeebc_gen::emit_to_path(&program, &config.output)?;
    Ok(())
}

/// Compile source text straight to C text. Used by tests and tooling that
/// have no file at hand.
pub fn compile_to_string(source: &str) -> Result<String, CompileError> {
    let program = parse_program(source)?;
    Ok(zeebc_gen::emit(&program))
}

fn parse_program(source: &str) -> Result<Program<'_>, CompileError> {
    debug!(bytes = source.len(), "parsing");
    let mut reader = SourceReader::new(source);
    let lexer = Lexer::new(&mut reader);
    Parser::new(lexer)
        .run()
        .map_err(|diagnostic| CompileError::Diagnostic {
            rendered: diagnostic.render(source),
            diagnostic,
        })
}

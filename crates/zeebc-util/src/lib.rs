//! zeebc-util - Shared infrastructure for the ZeeBASIC compiler.
//!
//! This crate holds the pieces every compiler phase needs: source ranges
//! for diagnostics, cheap lexeme views over the source buffer, and the
//! single diagnostic type that carries every compile-time failure.

pub mod diagnostic;
pub mod lexeme;
pub mod range;

pub use diagnostic::{Diagnostic, Result};
pub use lexeme::Lexeme;
pub use range::Range;

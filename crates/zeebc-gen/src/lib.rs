//! zeebc-gen - C code emission.
//!
//! The emitter turns a type-checked [`Program`](zeebc_par::Program) into a
//! C translation unit targeting the ZeeBASIC runtime ABI. Output is built
//! deterministically: statements in source order, locals declared in
//! first-mention order and destroyed in reverse, temporaries numbered from
//! 1 in order of first use.

pub mod c;
pub mod error;

pub use c::{emit, emit_to_path, CEmitter, ValueSlot};
pub use error::EmitError;

//! Script interpreter
//!
//! This module provides the sandboxed execution engine:
//! - [`engine`]: [`Interpreter`], budgets and the [`CheckpointHook`] seam
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! The interpreter walks the AST of a parsed program and calls one top-level
//! function with host-supplied arguments. Only the script's own functions and
//! the built-ins in `builtins` are reachable; there is no global object, no
//! `eval` and no I/O.
//!
//! Each statement and loop iteration is charged against [`Limits`], and call
//! depth is bounded, so a hostile or buggy script always terminates. Whenever a
//! `Checkpoint` statement runs, the hook receives the current frame.

mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod loops;
mod statements;

pub use engine::{CheckpointHook, Interpreter, Limits};
pub use errors::RuntimeError;

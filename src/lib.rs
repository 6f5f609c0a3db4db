//! # Introduction
//!
//! algoscope turns a run of a classic algorithm into a finite trace of
//! [`snapshot::Snapshot`]s that can be scrubbed forward and backward in a
//! terminal UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! (topic, pattern, problem) → registry → generator(inputs) → Trace → playback → renderer
//!                                         user code → instrument → Trace (override)
//! ```
//!
//! 1. [`registry`]: static Topic → Pattern → Problem catalog; resolves a triple
//!    to its generator and renderer.
//! 2. [`problems`]: built-in trace generators, one per problem.
//! 3. [`snapshot`]: the per-mode snapshot model and [`snapshot::Trace`].
//! 4. [`playback`]: owns the active trace and the scrub index.
//! 5. [`instrument`]: runs user-submitted solutions in a sandboxed
//!    interpreter ([`parser`], [`interpreter`], [`memory`]) and records one
//!    snapshot per checkpoint.
//! 6. [`ui`]: ratatui front-end; not part of the stable library API.
//!
//! ## Supported script subset
//!
//! `function` declarations, `let`/`const`/`var`, `if/else`, `while`, `for`,
//! `for...of`, `break`, `continue`, `return`, destructuring swaps, arrays,
//! `Map`, `Set`, string methods and the usual `Math` helpers.

pub mod config;
pub mod generator;
pub mod instrument;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod playback;
pub mod problems;
pub mod registry;
pub mod snapshot;
pub mod ui;

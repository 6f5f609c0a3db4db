//! Runtime memory model for the script sandbox
//!
//! - [`value`]: [`value::Value`] and the primitive [`value::MapKey`] used by
//!   `Map` and `Set`
//! - [`stack`]: call frames with block scopes and shadowing
//!
//! Arrays, maps and sets are reference-counted and interior-mutable, so the
//! interpreter needs no separate heap: aliasing falls out of cloning the handle.

pub mod stack;
pub mod value;

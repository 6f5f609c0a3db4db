//! Problem entries grouped by topic
//!
//! Each submodule declares its problems as `const` [`ProblemEntry`](crate::registry::ProblemEntry)
//! values (metadata, default inputs, default script, generator, renderer) and
//! exposes the typed `generate_*_steps` functions the entries wrap.

pub mod arrays;
pub mod hashing;
pub mod linked_lists;
pub mod strings;
pub mod trees;

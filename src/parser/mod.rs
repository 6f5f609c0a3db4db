//! Script parser
//!
//! This module transforms script source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: the [`Parser`] struct and entry point; statement, declaration
//!   and expression rules live in sibling `impl Parser` files
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! A small JavaScript-like language, enough to write the classic interview
//! solutions:
//! - Top level: `function` declarations only
//! - Statements: `let`/`const`/`var`, `if`/`else`, `while`, C-style `for`,
//!   `for (x of xs)`, `break`, `continue`, `return`
//! - Expressions: arithmetic, comparison (strict and loose), logical, ternary,
//!   assignment and compound assignment, `++`/`--`, array literals,
//!   destructuring assignment, indexing, member access, calls, `new Map()`/`new Set()`
//! - No closures, objects, classes, `this` or `eval`
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{parse, ParseError, Parser};

//! # Lunfardo
//!
//! Lunfardo is a small, tree-walking scripting language whose keywords are
//! drawn from Argentine _lunfardo_ slang (`laburo` for function, `cheto` for
//! class, `chau` to close a block). This crate is the language's lexer,
//! parser, AST, runtime value domain, and evaluator.
//!
//! # A Quick Example
//!
//! ```no_run
//! use lunfardo::Engine;
//!
//! fn main() -> Result<(), Box<lunfardo::LunfardoError>> {
//!     let engine = Engine::new();
//!     let result = engine.run("<memoria>", "poneleque x = 2 + 2\nx")?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! # Crate layout
//!
//! - [`token`] — `Position`, `Token`, `Lexer`.
//! - [`ast`] — the AST node taxonomy (`Node`/`NodeKind`).
//! - [`parse`] — the recursive-descent `Parser`.
//! - [`value`] — the runtime `Value` domain and its operators.
//! - [`dict`] — the bucketed hash table backing `Value::Dict`.
//! - [`scope`] — `Environment`, the parent-chained symbol table.
//! - [`context`] — `Context`, an execution frame.
//! - [`error`] — `LunfardoError`, the evaluator's sole signalling channel.
//! - [`engine`] — `Engine`, the AST-walking evaluator.
//! - [`module`] — the builtin-library registry consulted by `importar`.
//! - [`packages`] — the global symbol table (`matear`, `morfar`, `guardar`, ...).

pub mod ast;
pub mod context;
pub mod dict;
pub mod engine;
pub mod error;
pub mod module;
pub mod packages;
pub mod parse;
pub mod scope;
pub mod token;
pub mod value;

pub use ast::{Node, NodeKind};
pub use context::Context;
pub use dict::Dict;
pub use engine::{Engine, Limits};
pub use error::LunfardoError;
pub use module::{LibraryHandler, Registry};
pub use parse::parse;
pub use scope::Environment;
pub use token::{Position, Token};
pub use value::{Number, Value};

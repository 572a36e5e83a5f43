//! Query-string grammar and AST for kgs.
//!
//! This crate parses the boolean query mini-language accepted by the search box:
//!
//! - **Terms**: `brain` - bare words, may carry `*`/`?` wildcards
//! - **Phrases**: `"visual cortex"` - quoted sequences
//! - **Fields**: `title:brain`, `title:(a OR b)` - field-scoped expressions
//! - **Operators**: `AND`/`&&`, `OR`/`||`, `NOT`/`!` - uppercase only
//! - **Prefixes**: `+required`, `-prohibited`
//! - **Modifiers**: `brain^2` (boost), `brain~` / `brain~0.8` (similarity),
//!   `"a b"~3` (proximity)
//! - **Ranges**: `[1 TO 5]` inclusive, `{a TO b}` exclusive
//!
//! Binary expressions are right-nested in reading order with no operator
//! precedence, matching the engine's classic query parser.
//!
//! # Example
//!
//! ```
//! use kgs_query::{Expr, Operator, parse};
//!
//! let expr = parse("brain AND title:cortex").unwrap().unwrap();
//! match expr {
//!     Expr::Binary { operator, .. } => assert_eq!(operator, Operator::And),
//!     _ => panic!("expected a binary node"),
//! }
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Expr, Leaf, Operator, Prefix, Range};
pub use error::{QueryError, Span};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::parse;

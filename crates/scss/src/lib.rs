//! # scss - SCSS compiler core
//!
//! Parsing, unit-aware arithmetic and nested selector resolution for SCSS.
//! This crate turns SCSS source into flat statements whose selectors and
//! values are ready to print as CSS:
//!
//! - **Parsing**: [`parser::parse_stylesheet`] lowers source text into a
//!   [`StatementArena`] of selector trees and declarations
//! - **Arithmetic**: [`Reducer`] folds value expressions, converting between
//!   units with a [`UnitTable`]
//! - **Selectors**: [`resolve_all`] flattens nested selectors, `&` included
//!
//! ## Quick Start
//!
//! ```rust
//! use scss::{Reducer, ResolverOptions, parser::parse_stylesheet, resolve_all};
//!
//! let source = r#"
//!     .a, .b {
//!         &.c { width: 1in + 2.54cm; }
//!     }
//! "#;
//!
//! let reducer = Reducer::standard();
//! let mut arena = parse_stylesheet(source, &reducer).unwrap();
//! resolve_all(&mut arena, &ResolverOptions::default()).unwrap();
//!
//! let inner = arena.iter().last().unwrap();
//! assert_eq!(inner.selector(), Some(".a.c, .b.c"));
//! assert_eq!(reducer.reduce_value(&inner.body[0].value).unwrap(), "2in");
//! ```
//!
//! ## Units
//!
//! Lengths (`in`, `cm`, `mm`, `pc`, `px`, `pt`) convert into each other, as
//! do angles (`deg`, `grad`, `rad`, `turn`). The result of a binary
//! operation takes the left operand's unit; a unitless operand takes the
//! other side's unit.
//!
//! ## Modules
//!
//! - [`token`]: token kinds, classes and operator precedence
//! - [`scanner`]: value and selector tokenizers
//! - [`ast`]: expression trees and the statement arena
//! - [`parser`]: stylesheet parsing and lowering
//! - [`units`]: unit conversion table and quantities
//! - [`calc`]: expression folding
//! - [`selector`]: nested selector resolution
//! - [`source`]: offset to line/column mapping
//! - [`error`]: error types

pub mod ast;
pub mod calc;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod selector;
pub mod source;
pub mod token;
pub mod units;

pub use ast::{Declaration, Expr, Literal, SelectorStatement, StatementArena, StatementId, Value};
pub use calc::{FunctionResolver, NoFunctions, Reducer};
pub use error::{EvalError, Result, ScssError};
pub use selector::{ResolverOptions, resolve_all};
pub use source::{Pos, SourceMap};
pub use token::{Token, TokenKind};
pub use units::{Quantity, UnitKind, UnitTable};

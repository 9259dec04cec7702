//! # scss-rs
//!
//! Compiles nested SCSS stylesheets to flat CSS.
//!
//! ```rust
//! use scss_rs::{CompileOptions, compile_str};
//!
//! let css = compile_str(
//!     "nav { a { width: calc(2px * 3); &:hover { color: rgb(255, 0, 0); } } }",
//!     &CompileOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     css,
//!     "nav a {\n  width: 6px;\n}\n\nnav a:hover {\n  color: #ff0000;\n}\n"
//! );
//! ```
//!
//! Compilation parses the source with the [`scss`] core crate, resolves every
//! nested selector, renders each declaration value and prints the result.
//! Arithmetic is folded inside `#{...}` and `calc()` only, and the
//! [`Builtins`] functions are evaluated. Other operators stay as written, so
//! `font: 12px/1.5 serif` and `aspect-ratio: 16 / 9` pass through.
//!
//! A declaration whose value cannot be computed, such as `width: calc(1px / 0)`,
//! is dropped with a `warn!` log record carrying its line and column; the
//! rest of the stylesheet still compiles. Syntax errors and internal
//! errors abort with a [`CompileError`].

pub mod builtins;
pub mod color;
pub mod error;
pub mod options;
pub mod printer;

use std::path::Path;

use scss::parser::parse_stylesheet;
use scss::{Reducer, ScssError, SourceMap, UnitTable, resolve_all};

pub use builtins::Builtins;
pub use error::{CompileError, Result};
pub use options::{CompileOptions, OutputStyle};
pub use printer::CssRule;

/// Compiles SCSS source text to CSS.
pub fn compile_str(source: &str, options: &CompileOptions) -> Result<String> {
    let reducer = Reducer::new(UnitTable::standard(), Builtins::standard());
    let mut arena = parse_stylesheet(source, &reducer)?;
    resolve_all(&mut arena, &options.resolver)?;

    let map = SourceMap::new(source);
    let mut rules = Vec::with_capacity(arena.len());
    for (id, statement) in arena.ids().zip(arena.iter()) {
        let selector = statement.selector().ok_or_else(|| {
            ScssError::StructuralInvariantViolation(format!(
                "statement {} was never resolved",
                id.index()
            ))
        })?;

        let mut declarations = Vec::with_capacity(statement.body.len());
        for declaration in &statement.body {
            match reducer.render_value(&declaration.value) {
                Ok(value) => declarations.push((declaration.property.clone(), value)),
                Err(err) => {
                    let (line, col) = map.line_col(err.pos().unwrap_or(declaration.pos));
                    log::warn!("{line}:{col}: dropping `{}`: {err}", declaration.property);
                }
            }
        }

        log::debug!(
            "compiled `{selector}` with {} declaration(s)",
            declarations.len()
        );
        rules.push(CssRule {
            selector: selector.to_string(),
            declarations,
        });
    }

    Ok(printer::print(&rules, options.output_style))
}

/// Reads and compiles an SCSS file.
pub fn compile_file(path: impl AsRef<Path>, options: &CompileOptions) -> Result<String> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    compile_str(&source, options)
}

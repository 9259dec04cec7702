//! SCSS parsing: from source text to a [`StatementArena`].
//!
//! Parsing runs in three steps:
//!
//! 1. Comments are blanked out, keeping every byte offset intact
//! 2. [`stylesheet`] splits the text into nested rule blocks with nom
//! 3. Blocks are lowered into statements: selectors and values are
//!    interpolated, scanned and parsed into expression trees
//!
//! ## Submodules
//!
//! - [`expr`]: precedence-climbing expression parser
//! - [`interpolate`]: `#{...}` evaluation inside selectors and values
//! - [`stylesheet`]: rule and declaration structure
//!
//! ## Example
//!
//! ```rust
//! use scss::calc::Reducer;
//! use scss::parser::parse_stylesheet;
//!
//! let arena = parse_stylesheet("nav { a { color: red; } }", &Reducer::standard()).unwrap();
//! assert_eq!(arena.len(), 2);
//! ```

pub mod expr;
pub mod interpolate;
pub mod stylesheet;

mod lower;

pub use crate::parser::expr::{parse_expr, parse_value};
pub use crate::parser::interpolate::interpolate;
pub use crate::parser::stylesheet::{RawDeclaration, RuleBlock, RuleItem};

use crate::ast::StatementArena;
use crate::calc::Reducer;
use crate::error::{Result, ScssError};

/// Parses a full stylesheet into unresolved statements.
///
/// Declarations whose interpolations cannot be computed are dropped with a
/// warning; syntax errors abort.
pub fn parse_stylesheet(source: &str, reducer: &Reducer<'_>) -> Result<StatementArena> {
    let clean = strip_comments(source);

    let (remaining, blocks) =
        stylesheet::parse_rules(&clean).map_err(|e| ScssError::InvalidSyntax(e.to_string()))?;

    if !remaining.trim().is_empty() {
        return Err(ScssError::InvalidSyntax(format!(
            "Unexpected tokens at end of stylesheet: {}",
            remaining.trim()
        )));
    }

    lower::lower_rules(&clean, &blocks, reducer)
}

/// Replaces `/* ... */` and `// ...` comments with spaces.
///
/// The output has the same byte length as the input and keeps newlines, so
/// offsets and line numbers still point into the unstripped text. `//`
/// inside parentheses (`url(http://...)`) or strings is left alone.
pub fn strip_comments(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut parens = 0usize;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            output.push(c);
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                output.push_str("  ");
                let mut star = false;
                for inner in chars.by_ref() {
                    blank(&mut output, inner);
                    if star && inner == '/' {
                        break;
                    }
                    star = inner == '*';
                }
                continue;
            }
            '/' if parens == 0 && chars.peek() == Some(&'/') => {
                output.push(' ');
                while let Some(&inner) = chars.peek() {
                    if inner == '\n' {
                        break;
                    }
                    chars.next();
                    blank(&mut output, inner);
                }
                continue;
            }
            _ => {}
        }
        output.push(c);
    }

    output
}

fn blank(output: &mut String, c: char) {
    if c == '\n' {
        output.push('\n');
    } else {
        output.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Comment Stripping Tests
    // ==========================================================================

    #[test]
    fn test_strip_block_comment_keeps_length() {
        let source = "a { /* note */ color: red; }";
        let clean = strip_comments(source);
        assert_eq!(clean.len(), source.len());
        assert_eq!(clean, "a {            color: red; }");
    }

    #[test]
    fn test_strip_multiline_comment_keeps_newlines() {
        let clean = strip_comments("/* one\ntwo */a {}");
        assert_eq!(clean, "      \n      a {}");
    }

    #[test]
    fn test_strip_line_comment() {
        let clean = strip_comments("a { // trailing\n}");
        assert_eq!(clean, "a {            \n}");
    }

    #[test]
    fn test_url_and_strings_are_not_comments() {
        let source = "a { background: url(http://x.org/a.png); content: \"//\"; }";
        assert_eq!(strip_comments(source), source);
    }

    #[test]
    fn test_non_ascii_comment_keeps_byte_length() {
        let source = "/* é */a {}";
        assert_eq!(strip_comments(source).len(), source.len());
    }

    // ==========================================================================
    // Stylesheet Parsing Tests
    // ==========================================================================

    #[test]
    fn test_parse_stylesheet_builds_statements_outside_in() {
        let arena = parse_stylesheet(
            "a { b { c { x: 1; } } } d { y: 2; }",
            &Reducer::standard(),
        )
        .unwrap();
        assert_eq!(arena.len(), 4);

        let parents: Vec<_> = arena.iter().map(|s| s.parent.map(|p| p.index())).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1), None]);
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        let err = parse_stylesheet("a { x: 1; } }", &Reducer::standard()).unwrap_err();
        assert!(matches!(err, ScssError::InvalidSyntax(msg) if msg.contains("Unexpected tokens")));
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        assert!(parse_stylesheet("div { color: red;", &Reducer::standard()).is_err());
    }

    #[test]
    fn test_empty_stylesheet() {
        let arena = parse_stylesheet("  /* nothing */ ", &Reducer::standard()).unwrap();
        assert!(arena.is_empty());
    }
}

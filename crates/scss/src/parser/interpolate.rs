//! `#{...}` interpolation.
//!
//! Each interpolation's body is scanned, parsed and folded by the [`Reducer`],
//! and its text spliced back in place. Quoted string results lose their
//! quotes, so `"#{'a'}-b"` becomes `a-b`.

use crate::calc::Reducer;
use crate::error::{Result, ScssError};
use crate::parser::parse_value;
use crate::scanner::{balanced, scan_value};
use crate::source::Pos;

/// Replaces every `#{expr}` in `text` (located at `base`) with its value.
pub fn interpolate(text: &str, base: Pos, reducer: &Reducer<'_>) -> Result<String> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("#{") {
        output.push_str(&rest[..start]);
        let body_pos = base + (text.len() - rest.len()) + start + 2;

        let (after, braced) = balanced(&rest[start + 1..], '{', '}').map_err(|_| {
            ScssError::InvalidSyntax(format!("unterminated `#{{` at offset {}", body_pos - 2))
        })?;
        let body = &braced[1..braced.len() - 1];

        let tokens = scan_value(body, body_pos)?;
        if tokens.is_empty() {
            return Err(ScssError::InvalidSyntax(format!(
                "empty interpolation at offset {}",
                body_pos - 2
            )));
        }
        let value = parse_value(&tokens)?;

        let mut groups = Vec::with_capacity(value.groups.len());
        for group in &value.groups {
            let mut items = Vec::with_capacity(group.len());
            for expr in group {
                let literal = reducer.reduce(expr)?;
                items.push(literal.unquoted().to_string());
            }
            groups.push(items.join(" "));
        }
        output.push_str(&groups.join(", "));

        rest = after;
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;

    fn run(text: &str) -> Result<String> {
        interpolate(text, 0, &Reducer::standard())
    }

    #[test]
    fn test_text_without_interpolation_is_unchanged() {
        assert_eq!(run("div > p").unwrap(), "div > p");
    }

    #[test]
    fn test_arithmetic_is_folded() {
        assert_eq!(run(".col-#{1 + 2}").unwrap(), ".col-3");
        assert_eq!(run("#{2px * 3} #{1in + 2.54cm}").unwrap(), "6px 2in");
    }

    #[test]
    fn test_quotes_are_removed() {
        assert_eq!(run("#{'left'}-#{\"top\"}").unwrap(), "left-top");
    }

    #[test]
    fn test_eval_errors_propagate() {
        let err = run("#{5px / 0}").unwrap_err();
        assert!(matches!(err, ScssError::Eval(EvalError::DivisionByZero { .. })));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unterminated_interpolation() {
        assert!(matches!(run("a#{1 + 2").unwrap_err(), ScssError::InvalidSyntax(_)));
        assert!(run("#{}").is_err());
    }
}

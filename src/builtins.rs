//! Built-in SCSS functions.
//!
//! [`Builtins`] is a registry of named functions plugged into the value
//! reducer through [`FunctionResolver`]. The standard registry knows the
//! color constructors:
//!
//! - `rgb(r, g, b)` produces a `#rrggbb` color
//! - `rgba(r, g, b, a)` and `rgba(#hex, a)` produce `rgba(...)`, or `#rrggbb`
//!   when fully opaque
//!
//! Function names are matched case-insensitively. Unknown functions are not
//! errors: the reducer keeps them as plain CSS.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use scss::units::parse_quantity;
use scss::{EvalError, FunctionResolver, Literal, Pos, TokenKind};

use crate::color::{Rgba, channel_from_number, channel_from_percentage};

/// Signature of a built-in function.
pub type BuiltinFn = fn(&[Literal], Pos) -> Result<Literal, EvalError>;

static STANDARD: Lazy<Builtins> = Lazy::new(|| {
    let mut builtins = Builtins::new();
    builtins.register("rgb", rgb).register("rgba", rgba);
    builtins
});

/// Registry of built-in functions, keyed by lowercase name.
#[derive(Clone, Debug, Default)]
pub struct Builtins {
    functions: HashMap<String, BuiltinFn>,
}

impl Builtins {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry with every standard function.
    pub fn standard() -> &'static Builtins {
        &STANDARD
    }

    /// Registers `function` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, function: BuiltinFn) -> &mut Self {
        self.functions.insert(name.to_ascii_lowercase(), function);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }
}

impl FunctionResolver for Builtins {
    fn knows(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn call(&self, name: &str, args: &[Literal], pos: Pos) -> Option<Result<Literal, EvalError>> {
        let function = self.functions.get(&name.to_ascii_lowercase())?;
        log::trace!("calling built-in {name}() with {} argument(s)", args.len());
        Some(function(args, pos))
    }
}

fn rgb(args: &[Literal], pos: Pos) -> Result<Literal, EvalError> {
    let [r, g, b] = args else {
        return Err(invalid("rgb", format!("expected 3 arguments, got {}", args.len())));
    };
    let color = Rgba::rgb(channel("rgb", r)?, channel("rgb", g)?, channel("rgb", b)?);
    Ok(Literal::new(TokenKind::Color, color.to_hex(), pos))
}

fn rgba(args: &[Literal], pos: Pos) -> Result<Literal, EvalError> {
    let color = match args {
        [color, a] => {
            if color.kind != TokenKind::Color {
                return Err(invalid("rgba", format!("`{}` is not a color", color.value)));
            }
            let base = Rgba::parse_hex(&color.value).map_err(|e| invalid("rgba", e.message))?;
            base.with_alpha(alpha("rgba", a)?)
        }
        [r, g, b, a] => Rgba::rgba(
            channel("rgba", r)?,
            channel("rgba", g)?,
            channel("rgba", b)?,
            alpha("rgba", a)?,
        ),
        _ => {
            return Err(invalid(
                "rgba",
                format!("expected 2 or 4 arguments, got {}", args.len()),
            ));
        }
    };

    let kind = if color.is_opaque() {
        TokenKind::Color
    } else {
        TokenKind::String
    };
    Ok(Literal::new(kind, color.to_string(), pos))
}

/// A color channel: a plain number or a percentage.
fn channel(function: &str, arg: &Literal) -> Result<u8, EvalError> {
    if let Some(percent) = percentage(arg) {
        return Ok(channel_from_percentage(percent));
    }
    Ok(channel_from_number(number(function, arg)?))
}

/// An alpha value: `0`-`1` or a percentage.
fn alpha(function: &str, arg: &Literal) -> Result<f32, EvalError> {
    let value = match percentage(arg) {
        Some(percent) => percent / 100.0,
        None => number(function, arg)?,
    };
    Ok(value.clamp(0.0, 1.0) as f32)
}

fn number(function: &str, arg: &Literal) -> Result<f64, EvalError> {
    if !matches!(arg.kind, TokenKind::Int | TokenKind::Float) {
        return Err(invalid(function, format!("`{}` is not a number", arg.value)));
    }
    Ok(parse_quantity(arg)?.magnitude)
}

fn percentage(arg: &Literal) -> Option<f64> {
    if arg.kind != TokenKind::String {
        return None;
    }
    arg.value.strip_suffix('%')?.parse().ok()
}

fn invalid(function: &str, reason: impl Into<String>) -> EvalError {
    EvalError::InvalidArgument {
        function: function.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: &str) -> Literal {
        Literal::new(TokenKind::Int, value, 0)
    }

    fn call(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
        Builtins::standard()
            .call(name, args, 0)
            .expect("function should be registered")
    }

    #[test]
    fn test_rgb_builds_hex_color() {
        let lit = call("rgb", &[int("255"), int("128"), int("0")]).unwrap();
        assert_eq!(lit.kind, TokenKind::Color);
        assert_eq!(lit.value, "#ff8000");
    }

    #[test]
    fn test_rgb_accepts_percentages_and_clamps() {
        let lit = call(
            "RGB",
            &[Literal::string("100%", 0), int("300"), Literal::new(TokenKind::Float, "-2.5", 0)],
        )
        .unwrap();
        assert_eq!(lit.value, "#ffff00");
    }

    #[test]
    fn test_rgba_channels() {
        let lit = call(
            "rgba",
            &[int("0"), int("0"), int("0"), Literal::new(TokenKind::Float, "0.5", 0)],
        )
        .unwrap();
        assert_eq!(lit.kind, TokenKind::String);
        assert_eq!(lit.value, "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn test_rgba_from_hex() {
        let lit = call(
            "rgba",
            &[
                Literal::new(TokenKind::Color, "#f00", 0),
                Literal::new(TokenKind::Float, ".25", 0),
            ],
        )
        .unwrap();
        assert_eq!(lit.value, "rgba(255, 0, 0, 0.25)");
    }

    #[test]
    fn test_opaque_rgba_is_a_color() {
        let lit = call("rgba", &[Literal::new(TokenKind::Color, "#abc", 0), int("1")]).unwrap();
        assert_eq!(lit.kind, TokenKind::Color);
        assert_eq!(lit.value, "#aabbcc");
    }

    #[test]
    fn test_wrong_arity_is_invalid_argument() {
        let err = call("rgb", &[int("1")]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument { ref function, .. } if function == "rgb"));
        assert!(call("rgba", &[int("1"), int("2"), int("3")]).is_err());
    }

    #[test]
    fn test_non_numeric_channel_is_invalid_argument() {
        assert!(call("rgb", &[Literal::string("red", 0), int("0"), int("0")]).is_err());
        assert!(call("rgba", &[int("1"), int("0")]).is_err());
    }

    #[test]
    fn test_unknown_function_is_not_resolved() {
        assert!(Builtins::standard().call("translate", &[], 0).is_none());
        assert!(Builtins::standard().contains("RGBA"));
        assert!(!Builtins::new().contains("rgb"));
    }
}

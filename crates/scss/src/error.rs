//! Error types for SCSS compilation.
//!
//! Two classes of failure exist:
//!
//! - [`EvalError`]: a value could not be computed. These are recoverable: the
//!   caller drops the offending declaration and carries on.
//! - [`ScssError::StructuralInvariantViolation`]: the expression tree is
//!   malformed. This indicates a bug in tree construction and aborts
//!   compilation.

use thiserror::Error;

use crate::source::Pos;
use crate::token::TokenKind;

/// Errors raised while folding values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A numeric literal's text is not a valid number.
    #[error("malformed number `{value}`")]
    NumberFormat { value: String, pos: Pos },

    #[error("division by zero")]
    DivisionByZero { pos: Pos },

    /// No evaluation rule exists for this operand kind and operator.
    #[error("unsupported operation `{op}` on {kind}")]
    UnsupportedOperation { kind: TokenKind, op: TokenKind },

    /// A result left the 64-bit integer range or is not a finite number.
    #[error("arithmetic overflow")]
    Overflow { pos: Pos },

    /// A built-in function was called with arguments it cannot use.
    #[error("invalid argument to {function}(): {reason}")]
    InvalidArgument { function: String, reason: String },
}

impl EvalError {
    /// Source position the error is attached to, when known.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            EvalError::NumberFormat { pos, .. }
            | EvalError::DivisionByZero { pos }
            | EvalError::Overflow { pos } => Some(*pos),
            EvalError::UnsupportedOperation { .. } | EvalError::InvalidArgument { .. } => None,
        }
    }
}

/// Errors that can occur while parsing and lowering a stylesheet.
///
/// # Examples
///
/// ```rust
/// use scss::parser::parse_stylesheet;
/// use scss::calc::Reducer;
///
/// // Missing closing brace
/// let result = parse_stylesheet("div { color: red;", &Reducer::standard());
/// assert!(result.is_err());
/// ```
#[derive(Error, Debug)]
pub enum ScssError {
    /// Invalid syntax was encountered during scanning or parsing.
    #[error("syntax error: {0}")]
    InvalidSyntax(String),

    /// The expression tree broke an invariant the passes rely on.
    ///
    /// This is an internal error, never the stylesheet author's fault.
    #[error("internal compiler error: {0}")]
    StructuralInvariantViolation(String),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ScssError {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        ScssError::StructuralInvariantViolation(message.into())
    }

    /// Whether compilation may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScssError::Eval(_))
    }
}

pub type Result<T> = std::result::Result<T, ScssError>;

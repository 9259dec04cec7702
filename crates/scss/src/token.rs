//! Lexical kinds and the operator precedence model.
//!
//! Token kinds fall into three partitions:
//!
//! - **Literals**: `INT`, `FLOAT`, strings, `COLOR` and the unit-suffixed
//!   numbers (`UNIT_PX`, `DEG`, ...)
//! - **Operators**: `+ - * / , > ~ &` plus the implicit descendant `NEST`
//! - **Delimiters and markers**: parentheses, function calls, `ILLEGAL`, `EOF`
//!
//! Every binary operator maps to a precedence tier. The parser uses the tiers
//! for precedence climbing and the selector resolver uses them to decide in
//! which pass a node may be reduced:
//!
//! | Tier | Kinds |
//! |------|-------|
//! | 0 | non-operators |
//! | 3 | `,` |
//! | 4 | `+ - > ~` |
//! | 5 | `* /` and `NEST` |
//! | 6 | unary `&` |
//! | 7 | catch-all upper bound |

use std::fmt;

use bitflags::bitflags;

use crate::source::Pos;

/// Precedence of tokens that are not binary operators.
pub const LOWEST_PREC: u8 = 0;
/// Precedence of comma-separated groups.
pub const GROUP_PREC: u8 = 3;
/// Precedence of the unary nesting marker `&`.
pub const UNARY_PREC: u8 = 6;
/// Upper bound, above every operator.
pub const HIGHEST_PREC: u8 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Literals
    Int,
    Float,
    String,
    /// Double-quoted string.
    QString,
    /// Single-quoted string.
    QsString,
    Color,
    UnitIn,
    UnitCm,
    UnitMm,
    UnitPc,
    UnitPx,
    UnitPt,
    Deg,
    Grad,
    Rad,
    Turn,

    // Operators
    Add,
    Sub,
    Mul,
    Quo,
    Comma,
    Gtr,
    Til,
    And,
    Nest,

    // Delimiters
    LParen,
    RParen,
    /// A function call, text holds the whole `name(...)` source.
    Function,
}

bitflags! {
    /// Classification of a [`TokenKind`], used to pick an evaluation rule.
    ///
    /// ```
    /// use scss::token::{TokenClass, TokenKind};
    ///
    /// let class = TokenKind::UnitPx.class();
    /// assert!(class.contains(TokenClass::NUMERIC | TokenClass::UNIT));
    /// assert!(!class.contains(TokenClass::STRING));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TokenClass: u8 {
        const LITERAL  = 0b0000_0001;
        const OPERATOR = 0b0000_0010;
        /// Integers, floats and unit-bearing numbers.
        const NUMERIC  = 0b0000_0100;
        /// Numbers that carry a physical or angular unit.
        const UNIT     = 0b0000_1000;
        /// Bare and quoted strings.
        const STRING   = 0b0001_0000;
        const COLOR    = 0b0010_0000;
    }
}

impl TokenKind {
    /// Binary precedence tier, or [`LOWEST_PREC`] for non-operators.
    ///
    /// `&` is only ever a unary marker and has no binary precedence.
    pub fn precedence(self) -> u8 {
        match self {
            TokenKind::Comma => GROUP_PREC,
            TokenKind::Add | TokenKind::Sub | TokenKind::Gtr | TokenKind::Til => 4,
            TokenKind::Mul | TokenKind::Quo | TokenKind::Nest => 5,
            _ => LOWEST_PREC,
        }
    }

    pub fn class(self) -> TokenClass {
        match self {
            TokenKind::Int | TokenKind::Float => TokenClass::LITERAL | TokenClass::NUMERIC,
            TokenKind::UnitIn
            | TokenKind::UnitCm
            | TokenKind::UnitMm
            | TokenKind::UnitPc
            | TokenKind::UnitPx
            | TokenKind::UnitPt
            | TokenKind::Deg
            | TokenKind::Grad
            | TokenKind::Rad
            | TokenKind::Turn => TokenClass::LITERAL | TokenClass::NUMERIC | TokenClass::UNIT,
            TokenKind::String | TokenKind::QString | TokenKind::QsString => {
                TokenClass::LITERAL | TokenClass::STRING
            }
            TokenKind::Color => TokenClass::LITERAL | TokenClass::COLOR,
            TokenKind::Add
            | TokenKind::Sub
            | TokenKind::Mul
            | TokenKind::Quo
            | TokenKind::Comma
            | TokenKind::Gtr
            | TokenKind::Til
            | TokenKind::And
            | TokenKind::Nest => TokenClass::OPERATOR,
            TokenKind::Illegal
            | TokenKind::Eof
            | TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::Function => TokenClass::empty(),
        }
    }

    pub fn is_literal(self) -> bool {
        self.class().contains(TokenClass::LITERAL)
    }

    pub fn is_operator(self) -> bool {
        self.class().contains(TokenClass::OPERATOR)
    }

    /// Source text of an operator, or the kind's name for everything else.
    pub fn text(self) -> &'static str {
        match self {
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Quo => "/",
            TokenKind::Comma => ",",
            TokenKind::Gtr => ">",
            TokenKind::Til => "~",
            TokenKind::And => "&",
            TokenKind::Nest => " ",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::QString => "QSTRING",
            TokenKind::QsString => "QSSTRING",
            TokenKind::Color => "COLOR",
            TokenKind::UnitIn => "UNIT_IN",
            TokenKind::UnitCm => "UNIT_CM",
            TokenKind::UnitMm => "UNIT_MM",
            TokenKind::UnitPc => "UNIT_PC",
            TokenKind::UnitPx => "UNIT_PX",
            TokenKind::UnitPt => "UNIT_PT",
            TokenKind::Deg => "DEG",
            TokenKind::Grad => "GRAD",
            TokenKind::Rad => "RAD",
            TokenKind::Turn => "TURN",
            TokenKind::Function => "FUNCTION",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Nest => f.write_str("NEST"),
            kind => f.write_str(kind.text()),
        }
    }
}

/// A scanned token: its kind, source text and position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }
}

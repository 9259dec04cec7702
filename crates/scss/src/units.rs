//! Unit algebra: unit taxonomy, conversion table and quantity arithmetic.
//!
//! A [`Quantity`] is a magnitude paired with a [`UnitKind`]. Binary operations
//! pick a result unit, convert both operands into it, then combine the
//! converted magnitudes:
//!
//! - the left operand's unit wins when it has one
//! - otherwise the right operand's unit is used
//! - otherwise the result is unitless
//!
//! So `4 + 1px` is `5px` and `1in + 2.54cm` is `2in`.
//!
//! ## Conversion Table
//!
//! Lengths are seeded from `1in = 2.54cm = 25.4mm = 6pc = 72pt = 96px` and
//! angles from `1turn = 360deg = 400grad = 2π rad`. Every conversion is a plain
//! multiply. Converting between a length and an angle uses a factor of `1`,
//! matching the behavior stylesheets already depend on.

use std::f64::consts::PI;
use std::fmt;

use once_cell::sync::Lazy;

use crate::ast::Literal;
use crate::error::EvalError;
use crate::source::Pos;
use crate::token::TokenKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Invalid,
    In,
    Cm,
    Mm,
    Pc,
    Px,
    Pt,
    Deg,
    Grad,
    Rad,
    Turn,
    NoUnit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitFamily {
    Length,
    Angle,
    None,
}

/// Number of units covered by the conversion table.
const TABLE_SIZE: usize = 11;

impl UnitKind {
    /// Every length unit.
    pub const LENGTHS: [UnitKind; 6] = [
        UnitKind::In,
        UnitKind::Cm,
        UnitKind::Mm,
        UnitKind::Pc,
        UnitKind::Px,
        UnitKind::Pt,
    ];

    /// Every angle unit.
    pub const ANGLES: [UnitKind; 4] = [UnitKind::Deg, UnitKind::Grad, UnitKind::Rad, UnitKind::Turn];

    /// Maps a numeric literal kind to its unit.
    ///
    /// Unitless numbers map to [`UnitKind::NoUnit`], non-numeric kinds to
    /// [`UnitKind::Invalid`].
    pub fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Int | TokenKind::Float => UnitKind::NoUnit,
            TokenKind::UnitIn => UnitKind::In,
            TokenKind::UnitCm => UnitKind::Cm,
            TokenKind::UnitMm => UnitKind::Mm,
            TokenKind::UnitPc => UnitKind::Pc,
            TokenKind::UnitPx => UnitKind::Px,
            TokenKind::UnitPt => UnitKind::Pt,
            TokenKind::Deg => UnitKind::Deg,
            TokenKind::Grad => UnitKind::Grad,
            TokenKind::Rad => UnitKind::Rad,
            TokenKind::Turn => UnitKind::Turn,
            _ => UnitKind::Invalid,
        }
    }

    /// Literal kind for a quantity in this unit. Unitless quantities are
    /// `FLOAT`.
    pub fn token_kind(self) -> TokenKind {
        match self {
            UnitKind::In => TokenKind::UnitIn,
            UnitKind::Cm => TokenKind::UnitCm,
            UnitKind::Mm => TokenKind::UnitMm,
            UnitKind::Pc => TokenKind::UnitPc,
            UnitKind::Px => TokenKind::UnitPx,
            UnitKind::Pt => TokenKind::UnitPt,
            UnitKind::Deg => TokenKind::Deg,
            UnitKind::Grad => TokenKind::Grad,
            UnitKind::Rad => TokenKind::Rad,
            UnitKind::Turn => TokenKind::Turn,
            UnitKind::NoUnit => TokenKind::Float,
            UnitKind::Invalid => TokenKind::Illegal,
        }
    }

    /// Canonical suffix, empty for unitless and invalid quantities.
    pub fn suffix(self) -> &'static str {
        match self {
            UnitKind::In => "in",
            UnitKind::Cm => "cm",
            UnitKind::Mm => "mm",
            UnitKind::Pc => "pc",
            UnitKind::Px => "px",
            UnitKind::Pt => "pt",
            UnitKind::Deg => "deg",
            UnitKind::Grad => "grad",
            UnitKind::Rad => "rad",
            UnitKind::Turn => "turn",
            UnitKind::NoUnit | UnitKind::Invalid => "",
        }
    }

    pub fn family(self) -> UnitFamily {
        match self {
            UnitKind::In
            | UnitKind::Cm
            | UnitKind::Mm
            | UnitKind::Pc
            | UnitKind::Px
            | UnitKind::Pt => UnitFamily::Length,
            UnitKind::Deg | UnitKind::Grad | UnitKind::Rad | UnitKind::Turn => UnitFamily::Angle,
            UnitKind::NoUnit | UnitKind::Invalid => UnitFamily::None,
        }
    }

    fn index(self) -> Option<usize> {
        match self {
            UnitKind::Invalid => None,
            UnitKind::In => Some(0),
            UnitKind::Cm => Some(1),
            UnitKind::Mm => Some(2),
            UnitKind::Pc => Some(3),
            UnitKind::Px => Some(4),
            UnitKind::Pt => Some(5),
            UnitKind::Deg => Some(6),
            UnitKind::Grad => Some(7),
            UnitKind::Rad => Some(8),
            UnitKind::Turn => Some(9),
            UnitKind::NoUnit => Some(10),
        }
    }

    /// Size of one unit in its family's base (px for lengths, deg for angles).
    fn base_size(self) -> f64 {
        match self {
            UnitKind::In => 96.0,
            UnitKind::Cm => 96.0 / 2.54,
            UnitKind::Mm => 96.0 / 25.4,
            UnitKind::Pc => 16.0,
            UnitKind::Px => 1.0,
            UnitKind::Pt => 96.0 / 72.0,
            UnitKind::Deg => 1.0,
            UnitKind::Grad => 0.9,
            UnitKind::Rad => 180.0 / PI,
            UnitKind::Turn => 360.0,
            UnitKind::NoUnit | UnitKind::Invalid => 1.0,
        }
    }
}

/// The four arithmetic operators quantities support.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Quo,
}

impl ArithOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Add => Some(ArithOp::Add),
            TokenKind::Sub => Some(ArithOp::Sub),
            TokenKind::Mul => Some(ArithOp::Mul),
            TokenKind::Quo => Some(ArithOp::Quo),
            _ => None,
        }
    }
}

/// A magnitude with a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: UnitKind,
    pub pos: Pos,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: UnitKind, pos: Pos) -> Self {
        Self {
            magnitude,
            unit,
            pos,
        }
    }

    /// Converts back into a literal of the matching kind.
    pub fn to_literal(&self) -> Literal {
        Literal::new(self.unit.token_kind(), format_quantity(self), self.pos)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_quantity(self))
    }
}

/// Dense conversion matrix between every supported unit.
///
/// `factor(from, to)` is the number of `to` units in one `from` unit.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitTable {
    factors: [[f64; TABLE_SIZE]; TABLE_SIZE],
}

static STANDARD: Lazy<UnitTable> = Lazy::new(UnitTable::new);

impl Default for UnitTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTable {
    /// Builds the table from the physical and angular identities.
    pub fn new() -> Self {
        let units = [
            UnitKind::In,
            UnitKind::Cm,
            UnitKind::Mm,
            UnitKind::Pc,
            UnitKind::Px,
            UnitKind::Pt,
            UnitKind::Deg,
            UnitKind::Grad,
            UnitKind::Rad,
            UnitKind::Turn,
            UnitKind::NoUnit,
        ];
        let mut factors = [[1.0; TABLE_SIZE]; TABLE_SIZE];
        for (i, from) in units.iter().enumerate() {
            for (j, to) in units.iter().enumerate() {
                if from.family() == to.family() && from.family() != UnitFamily::None {
                    factors[i][j] = from.base_size() / to.base_size();
                }
            }
        }
        Self { factors }
    }

    /// Shared table, built on first use.
    pub fn standard() -> &'static UnitTable {
        &STANDARD
    }

    pub fn factor(&self, from: UnitKind, to: UnitKind) -> f64 {
        match (from.index(), to.index()) {
            (Some(i), Some(j)) => self.factors[i][j],
            _ => 1.0,
        }
    }

    /// Re-expresses `q` in `to` units.
    pub fn convert(&self, q: Quantity, to: UnitKind) -> Quantity {
        Quantity::new(q.magnitude * self.factor(q.unit, to), to, q.pos)
    }

    /// Applies `op` after converting both operands into the result unit.
    pub fn apply(&self, op: ArithOp, x: Quantity, y: Quantity) -> Result<Quantity, EvalError> {
        let unit = if x.unit != UnitKind::NoUnit {
            x.unit
        } else {
            y.unit
        };
        let a = self.convert(x, unit).magnitude;
        let b = self.convert(y, unit).magnitude;

        let magnitude = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Quo => {
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero { pos: y.pos });
                }
                a / b
            }
        };
        if !magnitude.is_finite() {
            return Err(EvalError::Overflow { pos: x.pos });
        }
        Ok(Quantity::new(magnitude, unit, x.pos))
    }
}

/// Parses a numeric literal into a quantity, stripping its unit suffix.
pub fn parse_quantity(literal: &Literal) -> Result<Quantity, EvalError> {
    let malformed = || EvalError::NumberFormat {
        value: literal.value.clone(),
        pos: literal.pos,
    };

    let unit = UnitKind::from_token(literal.kind);
    if unit == UnitKind::Invalid {
        return Err(malformed());
    }

    let suffix = unit.suffix();
    let text = literal.value.trim();
    let split = text.len().checked_sub(suffix.len()).ok_or_else(malformed)?;
    if !text.is_char_boundary(split) || !text[split..].eq_ignore_ascii_case(suffix) {
        return Err(malformed());
    }

    let magnitude: f64 = text[..split].parse().map_err(|_| malformed())?;
    if !magnitude.is_finite() {
        return Err(malformed());
    }
    Ok(Quantity::new(magnitude, unit, literal.pos))
}

/// Shortest round-trip decimal text of the magnitude plus the unit suffix.
pub fn format_quantity(q: &Quantity) -> String {
    // Normalise -0 so it prints as "0".
    let magnitude = if q.magnitude == 0.0 { 0.0 } else { q.magnitude };
    format!("{}{}", magnitude, q.unit.suffix())
}

//! Folding of literal arithmetic.
//!
//! [`Reducer::reduce`] folds an expression tree into a single [`Literal`]:
//!
//! - string operands concatenate with the operator text (`a-b`)
//! - two integers use exact integer arithmetic (`1 + 2` is `INT 3`)
//! - any other pair of numbers goes through the [`UnitTable`]
//! - colors have no arithmetic and report [`EvalError::UnsupportedOperation`]
//!
//! Function calls are handed to a [`FunctionResolver`]; calls it does not
//! know are kept as plain CSS text. `calc()` folds to a single number when
//! its body is pure arithmetic.
//!
//! Plain declaration values are not folded. [`Reducer::render_value`] keeps
//! their operators as written (`16 / 9`, `12px/1.5`) and only evaluates
//! known functions and `calc()`.

use crate::ast::{Expr, Literal, Value};
use crate::error::EvalError;
use crate::source::Pos;
use crate::token::{TokenClass, TokenKind};
use crate::units::{ArithOp, UnitTable, parse_quantity};

/// Dispatch point for function calls found in values.
pub trait FunctionResolver {
    /// Whether `name` is a function this resolver evaluates.
    fn knows(&self, name: &str) -> bool;

    /// Evaluates `name(args)`, or returns `None` if `name` is not a known
    /// function.
    fn call(&self, name: &str, args: &[Literal], pos: Pos) -> Option<Result<Literal, EvalError>>;
}

/// Resolver that knows no functions; every call stays plain CSS.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFunctions;

impl FunctionResolver for NoFunctions {
    fn knows(&self, _name: &str) -> bool {
        false
    }

    fn call(&self, _name: &str, _args: &[Literal], _pos: Pos) -> Option<Result<Literal, EvalError>> {
        None
    }
}

/// Folds expressions using a unit table and a function resolver.
#[derive(Clone, Copy)]
pub struct Reducer<'a> {
    units: &'a UnitTable,
    functions: &'a dyn FunctionResolver,
}

impl<'a> Reducer<'a> {
    pub fn new(units: &'a UnitTable, functions: &'a dyn FunctionResolver) -> Self {
        Self { units, functions }
    }

    /// Reducer over the standard unit table without any functions.
    pub fn standard() -> Reducer<'static> {
        Reducer::new(UnitTable::standard(), &NoFunctions)
    }

    pub fn units(&self) -> &'a UnitTable {
        self.units
    }

    pub fn reduce(&self, expr: &Expr) -> Result<Literal, EvalError> {
        match expr {
            Expr::Literal(lit) => Ok(lit.clone()),
            Expr::Unary {
                op: TokenKind::And,
                ..
            } => Err(EvalError::UnsupportedOperation {
                kind: TokenKind::String,
                op: TokenKind::And,
            }),
            Expr::Unary { operand, .. } => self.reduce(operand),
            Expr::Call {
                name,
                args,
                raw,
                pos,
            } => self.reduce_call(name, args.as_deref(), raw, *pos),
            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.reduce(left)?;
                let right = self.reduce(right)?;
                let result = self.combine(*op, left, right)?;
                log::trace!("reduced `{}` -> {} {}", op, result.kind, result.value);
                Ok(result)
            }
        }
    }

    /// Folds every item of a value and renders it as CSS text.
    pub fn reduce_value(&self, value: &Value) -> Result<String, EvalError> {
        let mut groups = Vec::with_capacity(value.groups.len());
        for group in &value.groups {
            let items = group
                .iter()
                .map(|expr| self.reduce(expr).map(|lit| lit.value))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(items.join(" "));
        }
        Ok(groups.join(", "))
    }

    /// Renders a declaration value as CSS text without folding its
    /// operators.
    pub fn render_value(&self, value: &Value) -> Result<String, EvalError> {
        let mut groups = Vec::with_capacity(value.groups.len());
        for group in &value.groups {
            let items = group
                .iter()
                .map(|expr| self.render(expr))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(items.join(" "));
        }
        Ok(groups.join(", "))
    }

    fn render(&self, expr: &Expr) -> Result<String, EvalError> {
        match expr {
            Expr::Literal(lit) => Ok(lit.value.clone()),
            Expr::Unary {
                op: TokenKind::LParen,
                operand,
                ..
            } => Ok(format!("({})", self.render(operand)?)),
            Expr::Unary { .. } => self.reduce(expr).map(|lit| lit.value),
            Expr::Binary {
                op, left, right, ..
            } => {
                let (l, r) = (self.render(left)?, self.render(right)?);
                // Keep the operator tight when it was written tight.
                if right.pos() == end_of(left) + op.text().len() {
                    Ok(format!("{l}{}{r}", op.text()))
                } else {
                    Ok(format!("{l} {} {r}", op.text()))
                }
            }
            Expr::Call { name, raw, .. } => {
                if is_calc(name) || self.functions.knows(name) {
                    self.reduce(expr).map(|lit| lit.value)
                } else {
                    Ok(raw.clone())
                }
            }
        }
    }

    fn reduce_call(
        &self,
        name: &str,
        args: Option<&[Expr]>,
        raw: &str,
        pos: Pos,
    ) -> Result<Literal, EvalError> {
        let Some(args) = args else {
            if self.functions.knows(name) {
                return Err(EvalError::InvalidArgument {
                    function: name.to_string(),
                    reason: "arguments are not a value list".to_string(),
                });
            }
            return Ok(Literal::string(raw, pos));
        };

        let reduced = args
            .iter()
            .map(|arg| self.reduce(arg))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(result) = self.functions.call(name, &reduced, pos) {
            return result;
        }

        // Text fallback drops operator spacing, which CSS needs in `calc()`.
        if args
            .iter()
            .zip(&reduced)
            .any(|(arg, lit)| folded_to_text(arg, lit))
        {
            return Ok(Literal::string(raw, pos));
        }

        if let [single] = reduced.as_slice() {
            if is_calc(name) && single.kind.class().contains(TokenClass::NUMERIC) {
                return Ok(Literal::new(single.kind, single.value.clone(), pos));
            }
        }

        let rendered: Vec<&str> = reduced.iter().map(|arg| arg.value.as_str()).collect();
        Ok(Literal::string(format!("{name}({})", rendered.join(", ")), pos))
    }

    fn combine(&self, op: TokenKind, left: Literal, right: Literal) -> Result<Literal, EvalError> {
        let (lc, rc) = (left.kind.class(), right.kind.class());

        if lc.contains(TokenClass::STRING) || rc.contains(TokenClass::STRING) {
            return Ok(concat(op, &left, &right));
        }

        let Some(arith) = ArithOp::from_token(op) else {
            return Err(EvalError::UnsupportedOperation {
                kind: left.kind,
                op,
            });
        };

        if left.kind == TokenKind::Int && right.kind == TokenKind::Int {
            return integer_arith(arith, &left, &right);
        }

        if lc.contains(TokenClass::NUMERIC) && rc.contains(TokenClass::NUMERIC) {
            let x = parse_quantity(&left)?;
            let y = parse_quantity(&right)?;
            return Ok(self.units.apply(arith, x, y)?.to_literal());
        }

        if lc.contains(TokenClass::COLOR) && rc.contains(TokenClass::COLOR) {
            return Err(EvalError::UnsupportedOperation {
                kind: TokenKind::Color,
                op,
            });
        }

        // Mixed kinds (a color next to a number) fall back to text.
        Ok(concat(op, &left, &right))
    }
}

/// Folds `expr` with the standard unit table and no functions.
pub fn reduce(expr: &Expr) -> Result<Literal, EvalError> {
    Reducer::standard().reduce(expr)
}

fn is_calc(name: &str) -> bool {
    name.eq_ignore_ascii_case("calc")
}

/// Whether an operator in `arg` fell back to string concatenation.
fn folded_to_text(arg: &Expr, lit: &Literal) -> bool {
    let mut arg = arg;
    while let Expr::Unary {
        op: TokenKind::LParen,
        operand,
        ..
    } = arg
    {
        arg = operand.as_ref();
    }
    matches!(arg, Expr::Binary { .. }) && lit.kind.class().contains(TokenClass::STRING)
}

/// Offset just past `expr` in the text it was scanned from.
fn end_of(expr: &Expr) -> Pos {
    match expr {
        Expr::Literal(lit) => lit.pos + lit.value.len(),
        Expr::Call { raw, pos, .. } => pos + raw.len(),
        Expr::Unary {
            op: TokenKind::LParen,
            operand,
            ..
        } => end_of(operand) + 1,
        Expr::Unary { operand, .. } => end_of(operand),
        Expr::Binary { right, .. } => end_of(right),
    }
}

fn concat(op: TokenKind, left: &Literal, right: &Literal) -> Literal {
    Literal::string(format!("{}{}{}", left.value, op.text(), right.value), left.pos)
}

fn integer_arith(op: ArithOp, left: &Literal, right: &Literal) -> Result<Literal, EvalError> {
    let parse = |lit: &Literal| {
        lit.value
            .trim()
            .parse::<i64>()
            .map_err(|_| EvalError::NumberFormat {
                value: lit.value.clone(),
                pos: lit.pos,
            })
    };
    let (a, b) = (parse(left)?, parse(right)?);

    let value = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Quo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero { pos: right.pos });
            }
            a.checked_div(b)
        }
    }
    .ok_or(EvalError::Overflow { pos: left.pos })?;

    Ok(Literal::new(TokenKind::Int, value.to_string(), left.pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(kind: TokenKind, value: &str) -> Expr {
        Expr::literal(kind, value, 0)
    }

    fn bin(op: TokenKind, left: Expr, right: Expr) -> Expr {
        Expr::binary(op, left, right)
    }

    #[test]
    fn test_integer_addition_stays_integer() {
        let result = reduce(&bin(TokenKind::Add, lit(TokenKind::Int, "1"), lit(TokenKind::Int, "2")))
            .unwrap();
        assert_eq!(result.kind, TokenKind::Int);
        assert_eq!(result.value, "3");
    }

    #[test]
    fn test_integer_division_truncates_toward_zero() {
        let result = reduce(&bin(TokenKind::Quo, lit(TokenKind::Int, "-7"), lit(TokenKind::Int, "2")))
            .unwrap();
        assert_eq!(result.value, "-3");
    }

    #[test]
    fn test_integer_division_by_zero() {
        let err = reduce(&bin(TokenKind::Quo, lit(TokenKind::Int, "1"), lit(TokenKind::Int, "0")))
            .unwrap_err();
        assert!(matches!(err, EvalError::DivisionByZero { .. }));
    }

    #[test]
    fn test_integer_overflow() {
        let err = reduce(&bin(
            TokenKind::Mul,
            lit(TokenKind::Int, &i64::MAX.to_string()),
            lit(TokenKind::Int, "2"),
        ))
        .unwrap_err();
        assert!(matches!(err, EvalError::Overflow { .. }));
    }

    #[test]
    fn test_unit_inheritance() {
        let result = reduce(&bin(TokenKind::Add, lit(TokenKind::Int, "4"), lit(TokenKind::UnitPx, "1px")))
            .unwrap();
        assert_eq!(result.kind, TokenKind::UnitPx);
        assert_eq!(result.value, "5px");
    }

    #[test]
    fn test_mixed_int_and_float() {
        let result = reduce(&bin(TokenKind::Add, lit(TokenKind::Int, "1"), lit(TokenKind::Float, "2.5")))
            .unwrap();
        assert_eq!(result.kind, TokenKind::Float);
        assert_eq!(result.value, "3.5");
    }

    #[test]
    fn test_strings_concatenate_with_operator_text() {
        let result = reduce(&bin(TokenKind::Sub, lit(TokenKind::String, "a"), lit(TokenKind::Int, "1")))
            .unwrap();
        assert_eq!(result.kind, TokenKind::String);
        assert_eq!(result.value, "a-1");
    }

    #[test]
    fn test_color_arithmetic_is_unsupported() {
        let err = reduce(&bin(TokenKind::Add, lit(TokenKind::Color, "#fff"), lit(TokenKind::Color, "#000")))
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::UnsupportedOperation {
                kind: TokenKind::Color,
                op: TokenKind::Add
            }
        );
    }

    #[test]
    fn test_color_next_to_number_concatenates() {
        let result = reduce(&bin(TokenKind::Add, lit(TokenKind::Color, "#fff"), lit(TokenKind::Int, "1")))
            .unwrap();
        assert_eq!(result.value, "#fff+1");
    }

    #[test]
    fn test_numbers_under_comma_are_unsupported() {
        let err = reduce(&bin(TokenKind::Comma, lit(TokenKind::Int, "1"), lit(TokenKind::Int, "2")))
            .unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedOperation { op: TokenKind::Comma, .. }));
    }

    #[test]
    fn test_parenthesised_value_passes_through() {
        let expr = Expr::unary(TokenKind::LParen, lit(TokenKind::UnitPt, "3pt"), 0);
        assert_eq!(reduce(&expr).unwrap().value, "3pt");
    }

    #[test]
    fn test_unknown_call_renders_arguments() {
        let expr = Expr::Call {
            name: "translate".into(),
            args: Some(vec![
                bin(TokenKind::Mul, lit(TokenKind::UnitPx, "2px"), lit(TokenKind::Int, "5")),
                lit(TokenKind::Int, "0"),
            ]),
            raw: "translate(2px * 5, 0)".into(),
            pos: 0,
        };
        assert_eq!(reduce(&expr).unwrap().value, "translate(10px, 0)");
    }

    #[test]
    fn test_unparsed_call_is_kept_raw() {
        let expr = Expr::Call {
            name: "url".into(),
            args: None,
            raw: "url(http://x/y.png)".into(),
            pos: 0,
        };
        assert_eq!(reduce(&expr).unwrap().value, "url(http://x/y.png)");
    }

    struct Double;

    impl FunctionResolver for Double {
        fn knows(&self, name: &str) -> bool {
            name == "double"
        }

        fn call(&self, name: &str, args: &[Literal], pos: Pos) -> Option<Result<Literal, EvalError>> {
            (name == "double").then(|| {
                let n: i64 = args[0].value.parse().unwrap();
                Ok(Literal::new(TokenKind::Int, (n * 2).to_string(), pos))
            })
        }
    }

    #[test]
    fn test_known_call_dispatches_to_resolver() {
        let reducer = Reducer::new(UnitTable::standard(), &Double);
        let expr = Expr::Call {
            name: "double".into(),
            args: Some(vec![lit(TokenKind::Int, "21")]),
            raw: "double(21)".into(),
            pos: 0,
        };
        assert_eq!(reducer.reduce(&expr).unwrap().value, "42");
    }

    #[test]
    fn test_reduce_value_joins_groups() {
        let value = Value {
            groups: vec![
                vec![lit(TokenKind::UnitPx, "1px"), lit(TokenKind::String, "solid")],
                vec![lit(TokenKind::String, "serif")],
            ],
        };
        assert_eq!(Reducer::standard().reduce_value(&value).unwrap(), "1px solid, serif");
    }

    fn call(name: &str, args: Vec<Expr>, raw: &str) -> Expr {
        Expr::Call {
            name: name.into(),
            args: Some(args),
            raw: raw.into(),
            pos: 0,
        }
    }

    #[test]
    fn test_unknown_call_with_text_fallback_is_kept_raw() {
        let expr = call(
            "calc",
            vec![bin(TokenKind::Sub, lit(TokenKind::String, "100%"), lit(TokenKind::UnitPx, "10px"))],
            "calc(100% - 10px)",
        );
        assert_eq!(reduce(&expr).unwrap().value, "calc(100% - 10px)");
    }

    #[test]
    fn test_calc_of_pure_arithmetic_folds() {
        let expr = call(
            "calc",
            vec![bin(TokenKind::Add, lit(TokenKind::UnitPx, "1px"), lit(TokenKind::UnitPx, "2px"))],
            "calc(1px + 2px)",
        );
        let result = reduce(&expr).unwrap();
        assert_eq!(result.kind, TokenKind::UnitPx);
        assert_eq!(result.value, "3px");
    }

    #[test]
    fn test_render_value_keeps_operators() {
        let value = Value {
            groups: vec![vec![Expr::binary(
                TokenKind::Quo,
                Expr::literal(TokenKind::Int, "16", 0),
                Expr::literal(TokenKind::Int, "9", 5),
            )]],
        };
        assert_eq!(Reducer::standard().render_value(&value).unwrap(), "16 / 9");
    }

    #[test]
    fn test_render_value_keeps_tight_operators_tight() {
        let value = Value {
            groups: vec![vec![Expr::binary(
                TokenKind::Quo,
                Expr::literal(TokenKind::UnitPx, "12px", 0),
                Expr::literal(TokenKind::Float, "1.5", 5),
            )]],
        };
        assert_eq!(Reducer::standard().render_value(&value).unwrap(), "12px/1.5");
    }

    #[test]
    fn test_render_value_evaluates_known_calls_only() {
        let reducer = Reducer::new(UnitTable::standard(), &Double);
        let value = Value {
            groups: vec![vec![
                call("double", vec![lit(TokenKind::Int, "4")], "double(4)"),
                call(
                    "translate",
                    vec![bin(TokenKind::Add, lit(TokenKind::UnitPx, "1px"), lit(TokenKind::UnitPx, "1px"))],
                    "translate(1px + 1px)",
                ),
            ]],
        };
        assert_eq!(reducer.render_value(&value).unwrap(), "8 translate(1px + 1px)");
    }
}

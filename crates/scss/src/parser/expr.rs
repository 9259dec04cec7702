//! Expression parsing by precedence climbing.
//!
//! Binary operators are folded according to [`TokenKind::precedence`], the
//! same tiers the selector resolver walks, so `a > b c` parses as
//! `a > (b c)` and `1 + 2 * 3` as `1 + (2 * 3)`. Operators of equal tier
//! associate to the left.

use crate::ast::{Expr, Literal, Value};
use crate::error::{Result, ScssError};
use crate::scanner::scan_value;
use crate::token::{GROUP_PREC, LOWEST_PREC, Token, TokenKind};

/// Parses a full token list as a single expression.
///
/// # Examples
///
/// ```
/// use scss::ast::Expr;
/// use scss::parser::parse_expr;
/// use scss::scanner::scan_selector;
/// use scss::token::TokenKind;
///
/// let tokens = scan_selector("nav > a:hover", 0).unwrap();
/// let expr = parse_expr(&tokens).unwrap();
/// assert!(matches!(expr, Expr::Binary { op: TokenKind::Gtr, .. }));
/// ```
pub fn parse_expr(tokens: &[Token]) -> Result<Expr> {
    let mut parser = ExprParser::new(tokens);
    let expr = parser.binary(LOWEST_PREC + 1)?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parses a declaration value into comma-separated groups of
/// space-separated expressions.
pub fn parse_value(tokens: &[Token]) -> Result<Value> {
    let mut parser = ExprParser::new(tokens);
    let mut value = Value::default();
    let mut group = Vec::new();

    while let Some(token) = parser.peek() {
        if token.kind == TokenKind::Comma {
            parser.advance();
            value.groups.push(std::mem::take(&mut group));
            continue;
        }
        group.push(parser.binary(GROUP_PREC + 1)?);
    }
    value.groups.push(group);

    if value.groups.iter().any(Vec::is_empty) {
        return Err(ScssError::InvalidSyntax(
            "empty item in comma-separated value".to_string(),
        ));
    }
    Ok(value)
}

struct ExprParser<'t> {
    tokens: &'t [Token],
    cursor: usize,
}

impl<'t> ExprParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, cursor: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(unexpected(token)),
        }
    }

    fn binary(&mut self, min_prec: u8) -> Result<Expr> {
        let mut left = self.unary()?;
        while let Some(token) = self.peek() {
            let prec = token.kind.precedence();
            if prec == LOWEST_PREC || prec < min_prec {
                break;
            }
            self.advance();
            let right = self.binary(prec + 1)?;
            left = Expr::binary(token.kind, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        let Some(token) = self.advance() else {
            return Err(ScssError::InvalidSyntax(
                "unexpected end of expression".to_string(),
            ));
        };

        match token.kind {
            TokenKind::And => {
                let suffix = Literal::string(&token.text[1..], token.pos + 1);
                Ok(Expr::unary(TokenKind::And, Expr::Literal(suffix), token.pos))
            }
            TokenKind::LParen => {
                let inner = self.binary(LOWEST_PREC + 1)?;
                match self.advance() {
                    Some(close) if close.kind == TokenKind::RParen => {
                        Ok(Expr::unary(TokenKind::LParen, inner, token.pos))
                    }
                    Some(other) => Err(unexpected(other)),
                    None => Err(ScssError::InvalidSyntax(format!(
                        "unclosed `(` at offset {}",
                        token.pos
                    ))),
                }
            }
            TokenKind::Function => Ok(parse_call(token)),
            kind if kind.is_literal() => Ok(Expr::literal(kind, token.text.clone(), token.pos)),
            _ => Err(unexpected(token)),
        }
    }
}

/// Splits a `name(args)` token into a call node.
///
/// Arguments that do not scan and parse as a comma-separated list of single
/// expressions leave `args` empty so the call passes through verbatim.
fn parse_call(token: &Token) -> Expr {
    let open = token.text.find('(').unwrap_or(token.text.len());
    let name = token.text[..open].to_string();
    let inner = token
        .text
        .get(open + 1..token.text.len().saturating_sub(1))
        .unwrap_or("");

    let args = scan_value(inner, token.pos + open + 1)
        .and_then(|tokens| {
            if tokens.is_empty() {
                return Ok(Value { groups: Vec::new() });
            }
            parse_value(&tokens)
        })
        .ok()
        .and_then(|value| {
            value
                .groups
                .into_iter()
                .map(|mut group| (group.len() == 1).then(|| group.remove(0)))
                .collect::<Option<Vec<_>>>()
        });

    Expr::Call {
        name,
        args,
        raw: token.text.clone(),
        pos: token.pos,
    }
}

fn unexpected(token: &Token) -> ScssError {
    ScssError::InvalidSyntax(format!(
        "unexpected `{}` at offset {}",
        token.text, token.pos
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{scan_selector, scan_value};

    fn value_expr(source: &str) -> Expr {
        parse_expr(&scan_value(source, 0).unwrap()).unwrap()
    }

    fn selector_expr(source: &str) -> Expr {
        parse_expr(&scan_selector(source, 0).unwrap()).unwrap()
    }

    fn op_of(expr: &Expr) -> TokenKind {
        match expr {
            Expr::Binary { op, .. } | Expr::Unary { op, .. } => *op,
            Expr::Literal(lit) => lit.kind,
            Expr::Call { .. } => TokenKind::Function,
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let Expr::Binary { op, right, .. } = value_expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(op, TokenKind::Add);
        assert_eq!(op_of(&right), TokenKind::Mul);
    }

    #[test]
    fn test_equal_tiers_associate_left() {
        let Expr::Binary { op, left, .. } = value_expr("15 / 3 / 5") else {
            panic!("expected binary");
        };
        assert_eq!(op, TokenKind::Quo);
        assert_eq!(op_of(&left), TokenKind::Quo);
    }

    #[test]
    fn test_parentheses_group() {
        let Expr::Binary { op, left, .. } = value_expr("(1 + 2) * 3") else {
            panic!("expected binary");
        };
        assert_eq!(op, TokenKind::Mul);
        assert_eq!(op_of(&left), TokenKind::LParen);
    }

    #[test]
    fn test_selector_nest_binds_tighter_than_combinator() {
        let Expr::Binary { op, right, .. } = selector_expr("a > b c") else {
            panic!("expected binary");
        };
        assert_eq!(op, TokenKind::Gtr);
        assert_eq!(op_of(&right), TokenKind::Nest);
    }

    #[test]
    fn test_selector_comma_is_loosest() {
        let Expr::Binary { op, left, right, .. } = selector_expr("& + &, &") else {
            panic!("expected binary");
        };
        assert_eq!(op, TokenKind::Comma);
        assert_eq!(op_of(&left), TokenKind::Add);
        assert_eq!(op_of(&right), TokenKind::And);
    }

    #[test]
    fn test_parent_reference_suffix_position() {
        let Expr::Unary { operand, pos, .. } = selector_expr("&.active") else {
            panic!("expected unary");
        };
        assert_eq!(pos, 0);
        assert_eq!(*operand, Expr::literal(TokenKind::String, ".active", 1));
    }

    #[test]
    fn test_parse_value_groups() {
        let value = parse_value(&scan_value("1px solid red, 2px dashed", 0).unwrap()).unwrap();
        assert_eq!(value.groups.len(), 2);
        assert_eq!(value.groups[0].len(), 3);
        assert_eq!(value.groups[1].len(), 2);
    }

    #[test]
    fn test_parse_value_rejects_empty_item() {
        assert!(parse_value(&scan_value("a,,b", 0).unwrap()).is_err());
        assert!(parse_value(&scan_value("a,", 0).unwrap()).is_err());
    }

    #[test]
    fn test_call_arguments() {
        let Expr::Call { name, args, .. } = value_expr("rgb(255, 0, 10 * 2)") else {
            panic!("expected call");
        };
        assert_eq!(name, "rgb");
        let args = args.unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(op_of(&args[2]), TokenKind::Mul);
    }

    #[test]
    fn test_call_with_unparsable_arguments_keeps_raw() {
        let Expr::Call { args, raw, .. } = value_expr("url(http://x.org/a.png)") else {
            panic!("expected call");
        };
        assert!(args.is_none());
        assert_eq!(raw, "url(http://x.org/a.png)");
    }

    #[test]
    fn test_trailing_operator_is_an_error() {
        assert!(parse_expr(&scan_value("1 +", 0).unwrap()).is_err());
        assert!(parse_expr(&scan_value("(1", 0).unwrap()).is_err());
        assert!(parse_expr(&scan_value("1 2", 0).unwrap()).is_err());
    }
}

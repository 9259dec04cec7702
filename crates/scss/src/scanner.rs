//! Token scanning for declaration values and selectors.
//!
//! Two entry points share the [`Token`] vocabulary:
//!
//! - [`scan_value`]: numbers with units, colors, strings, identifiers,
//!   function calls and arithmetic operators
//! - [`scan_selector`]: compound selectors, `&` references, combinators and
//!   the implicit descendant `NEST` between whitespace-separated compounds
//!
//! Positions are absolute: callers pass the offset of `source` inside the
//! stylesheet.

use nom::{
    IResult, Offset,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{opt, recognize},
    sequence::{pair, tuple},
};
use phf::phf_map;

use crate::error::{Result, ScssError};
use crate::source::Pos;
use crate::token::{Token, TokenKind};

/// Unit suffixes the unit algebra understands.
static UNIT_SUFFIXES: phf::Map<&'static str, TokenKind> = phf_map! {
    "in" => TokenKind::UnitIn,
    "cm" => TokenKind::UnitCm,
    "mm" => TokenKind::UnitMm,
    "pc" => TokenKind::UnitPc,
    "px" => TokenKind::UnitPx,
    "pt" => TokenKind::UnitPt,
    "deg" => TokenKind::Deg,
    "grad" => TokenKind::Grad,
    "rad" => TokenKind::Rad,
    "turn" => TokenKind::Turn,
};

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Characters that end a compound selector.
fn ends_compound(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '>' | '+' | '~' | '&' | '{' | '}')
}

/// Scans a declaration value (or interpolation body) into tokens.
pub fn scan_value(source: &str, base: Pos) -> Result<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut rest = source;
    let mut spaced = true;

    loop {
        let (after_ws, ws) = skip_whitespace(rest);
        spaced |= !ws.is_empty();
        rest = after_ws;
        if rest.is_empty() {
            break;
        }

        let pos = base + source.offset(rest);
        // A leading `-` is a sign after whitespace, an operator or `(`.
        let signed = spaced
            || tokens
                .last()
                .is_some_and(|t| t.kind.is_operator() || t.kind == TokenKind::LParen);
        let (next, (kind, text)) =
            value_token(rest, signed).map_err(|_| unexpected(rest, pos))?;
        tokens.push(Token::new(kind, text, pos));
        rest = next;
        spaced = false;
    }

    Ok(tokens)
}

/// Scans a selector into tokens, inserting `NEST` between compounds that are
/// separated only by whitespace.
pub fn scan_selector(source: &str, base: Pos) -> Result<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut rest = source;

    loop {
        let (after_ws, ws) = skip_whitespace(rest);
        rest = after_ws;
        let Some(c) = rest.chars().next() else {
            break;
        };
        let pos = base + source.offset(rest);

        let (next, kind, text) = match c {
            ',' => (&rest[1..], TokenKind::Comma, ","),
            '>' => (&rest[1..], TokenKind::Gtr, ">"),
            '+' => (&rest[1..], TokenKind::Add, "+"),
            '~' => (&rest[1..], TokenKind::Til, "~"),
            '&' => {
                let (next, suffix) = compound(&rest[1..]).map_err(|_| unexpected(rest, pos))?;
                (next, TokenKind::And, &rest[..1 + suffix.len()])
            }
            _ => {
                let (next, text) = compound(rest).map_err(|_| unexpected(rest, pos))?;
                if text.is_empty() {
                    return Err(unexpected(rest, pos));
                }
                (next, TokenKind::String, text)
            }
        };

        let operand = matches!(kind, TokenKind::String | TokenKind::And);
        if operand {
            match tokens.last() {
                Some(prev) if matches!(prev.kind, TokenKind::String | TokenKind::And) => {
                    if ws.is_empty() {
                        return Err(ScssError::InvalidSyntax(format!(
                            "`&` must start a compound selector (offset {pos})"
                        )));
                    }
                    tokens.push(Token::new(TokenKind::Nest, " ", pos - ws.len()));
                }
                _ => {}
            }
        }

        tokens.push(Token::new(kind, text, pos));
        rest = next;
    }

    Ok(tokens)
}

/// Inserts `&` before a combinator that opens a selector or follows a
/// comma, so nested `> li` reads as `& > li`.
pub fn imply_parent(tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len() + 1);
    for token in tokens {
        let opens = output
            .last()
            .is_none_or(|prev: &Token| prev.kind == TokenKind::Comma);
        if opens && matches!(token.kind, TokenKind::Gtr | TokenKind::Add | TokenKind::Til) {
            output.push(Token::new(TokenKind::And, "&", token.pos));
        }
        output.push(token);
    }
    output
}

fn skip_whitespace(input: &str) -> (&str, &str) {
    multispace0::<&str, nom::error::Error<&str>>(input).unwrap_or((input, ""))
}

fn unexpected(rest: &str, pos: Pos) -> ScssError {
    let found = rest.chars().next().map_or(String::from("end of input"), |c| format!("`{c}`"));
    ScssError::InvalidSyntax(format!("unexpected {found} at offset {pos}"))
}

fn value_token(input: &str, signed: bool) -> IResult<&str, (TokenKind, &str)> {
    if let Ok(found) = number(input, signed) {
        return Ok(found);
    }
    alt((color, quoted_string, function_call, ident, operator))(input)
}

/// Numbers, with an optional sign and unit suffix.
fn number(input: &str, signed: bool) -> IResult<&str, (TokenKind, &str)> {
    let sign = if signed { opt(char('-'))(input)?.0 } else { input };
    let (rest, _) = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        recognize(pair(char('.'), digit1)),
    ))(sign)?;
    let (rest, suffix) = alt((tag("%"), take_while(|c: char| c.is_ascii_alphabetic())))(rest)?;
    let text = &input[..input.offset(rest)];

    let kind = if suffix.is_empty() {
        if text.contains('.') {
            TokenKind::Float
        } else {
            TokenKind::Int
        }
    } else {
        UNIT_SUFFIXES
            .get(suffix.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(TokenKind::String)
    };
    Ok((rest, (kind, text)))
}

fn color(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, text) = recognize(pair(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())))(input)?;
    let digits = text.len() - 1;
    let terminated = !rest.starts_with(is_ident_char);
    if terminated && matches!(digits, 3 | 4 | 6 | 8) {
        Ok((rest, (TokenKind::Color, text)))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::HexDigit,
        )))
    }
}

fn quoted_string(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    };

    let mut escaped = false;
    for (i, c) in input.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            let kind = if quote == '"' {
                TokenKind::QString
            } else {
                TokenKind::QsString
            };
            return Ok((&input[i + 1..], (kind, &input[..i + 1])));
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Eof,
    )))
}

/// An identifier immediately followed by a balanced `( ... )`.
fn function_call(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (after_name, _) = ident(input)?;
    let (rest, _) = balanced(after_name, '(', ')')?;
    Ok((rest, (TokenKind::Function, &input[..input.offset(rest)])))
}

/// Identifiers, including vendor prefixes (`-webkit-box`), custom
/// properties (`--gap`) and `!important`.
fn ident(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, text) = recognize(tuple((
        opt(alt((char('-'), char('!')))),
        opt(char('-')),
        take_while1(is_name_start),
        take_while(is_ident_char),
    )))(input)?;
    Ok((rest, (TokenKind::String, text)))
}

fn operator(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, c) = nom::character::complete::one_of("+-*/,()")(input)?;
    let kind = match c {
        '+' => TokenKind::Add,
        '-' => TokenKind::Sub,
        '*' => TokenKind::Mul,
        '/' => TokenKind::Quo,
        ',' => TokenKind::Comma,
        '(' => TokenKind::LParen,
        _ => TokenKind::RParen,
    };
    Ok((rest, (kind, &input[..1])))
}

/// Matches `open ... close` with nesting and quoted strings.
pub(crate) fn balanced(input: &str, open: char, close: char) -> IResult<&str, &str> {
    if !input.starts_with(open) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = i + c.len_utf8();
                return Ok((&input[end..], &input[..end]));
            }
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Eof,
    )))
}

/// A compound selector: everything up to whitespace or a combinator, with
/// brackets, parentheses and quotes skipped as a whole.
fn compound(input: &str) -> IResult<&str, &str> {
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if ends_compound(c) {
            break;
        }
        rest = match c {
            '(' => balanced(rest, '(', ')')?.0,
            '[' => balanced(rest, '[', ']')?.0,
            '"' | '\'' => quoted_string(rest)?.0,
            '\\' => {
                let mut chars = rest.chars();
                chars.next();
                chars.next();
                chars.as_str()
            }
            _ => &rest[c.len_utf8()..],
        };
    }
    Ok((rest, &input[..input.offset(rest)]))
}

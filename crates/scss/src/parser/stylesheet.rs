//! Rule structure parsing.
//!
//! Splits a stylesheet into [`RuleBlock`]s: a selector prelude followed by a
//! `{ ... }` body holding declarations and nested rules. Selector and value
//! text is kept as borrowed slices of the source; scanning and expression
//! parsing happen later, when blocks are lowered into statements.

use nom::{
    IResult,
    branch::alt,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded, tuple},
};

/// A rule as written in the source, with nested rules still in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleBlock<'a> {
    /// Trimmed selector prelude.
    pub selector: &'a str,
    pub items: Vec<RuleItem<'a>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleItem<'a> {
    Declaration(RawDeclaration<'a>),
    NestedRule(RuleBlock<'a>),
}

/// `property: value`, both trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDeclaration<'a> {
    pub property: &'a str,
    pub value: &'a str,
}

/// Parses consecutive top-level rules.
pub fn parse_rules(input: &str) -> IResult<&str, Vec<RuleBlock<'_>>> {
    many0(parse_rule)(input)
}

/// Parses one rule, e.g. `nav a { color: red; &:hover { color: blue; } }`.
pub fn parse_rule(input: &str) -> IResult<&str, RuleBlock<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, selector) = selector_prelude(input)?;

    let (input, items) = delimited(
        char('{'),
        parse_rule_items,
        preceded(multispace0, char('}')),
    )(input)?;

    Ok((input, RuleBlock { selector, items }))
}

/// Parses either a declaration (color: red) or a nested rule (&:hover { ... })
fn parse_rule_items(input: &str) -> IResult<&str, Vec<RuleItem<'_>>> {
    many0(alt((
        map(parse_rule, RuleItem::NestedRule),
        map(parse_declaration, RuleItem::Declaration),
    )))(input)
}

fn parse_declaration(input: &str) -> IResult<&str, RawDeclaration<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, property) = property_name(input)?;
    let (input, _) = tuple((multispace0, char(':'), multispace0))(input)?;
    let (input, value) = value_text(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(char(';'))(input)?;

    Ok((input, RawDeclaration { property, value }))
}

fn property_name(input: &str) -> IResult<&str, &str> {
    let end = scan_until(input, |c| matches!(c, ':' | '{' | '}' | ';')).unwrap_or(input.len());
    let name = input[..end].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(failure(input));
    }
    Ok((&input[end..], name))
}

/// Everything before the rule's opening brace. `#{...}` interpolation,
/// brackets, parentheses and strings are skipped as a whole.
fn selector_prelude(input: &str) -> IResult<&str, &str> {
    let end = scan_until(input, |c| matches!(c, '{' | '}' | ';')).ok_or_else(|| failure(input))?;
    if !input[end..].starts_with('{') {
        return Err(failure(input));
    }
    let selector = input[..end].trim();
    if selector.is_empty() {
        return Err(failure(input));
    }
    Ok((&input[end..], selector))
}

/// A declaration value, ending at `;` or the closing `}` of the block.
fn value_text(input: &str) -> IResult<&str, &str> {
    let end = scan_until(input, |c| matches!(c, ';' | '{' | '}')).unwrap_or(input.len());
    let value = input[..end].trim();
    if value.is_empty() || input[end..].starts_with('{') {
        return Err(failure(input));
    }
    Ok((&input[end..], value))
}

/// Byte offset of the first top-level character matching `stop`.
fn scan_until(input: &str, stop: impl Fn(char) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
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
        match c {
            '"' | '\'' => quote = Some(c),
            '#' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                depth += 1;
            }
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 && stop(c) => return Some(i),
            _ => {}
        }
    }
    None
}

fn failure(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

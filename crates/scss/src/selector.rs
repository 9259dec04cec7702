//! Selector resolution: flattening nested rule selectors.
//!
//! A nested rule's selector tree is rewritten into the flat, comma-separated
//! selector text CSS expects:
//!
//! ```css
//! .a, .b {
//!     &.c, &.d { ... }
//! }
//! ```
//!
//! resolves the inner rule to `.a.c, .a.d, .b.c, .b.d`.
//!
//! ## Tiered Walk
//!
//! Operators bind at different levels (`&` tighter than descendant nesting,
//! nesting tighter than `>`/`+`/`~`, those tighter than `,`), so the tree is
//! walked once per precedence tier, from the unary tier down to 2. Each pass
//! replaces the nodes that become reducible at that tier with new literals:
//!
//! - **6**: `&` becomes the parent text plus its suffix
//! - **5**: `NEST` joins with a single space
//! - **4**: `+`, `>` and `~` join with the operator between delimiters
//! - **3**: each `,` branch is resolved on its own and the results joined
//! - **2**: the remaining bare selector gets the parent prefix, unless an
//!   explicit `&` or a comma group already placed it
//!
//! The walk runs once per comma-separated alternative of the parent, which
//! yields the cartesian expansion of nested groups in parent-major order.
//!
//! ## Parent References
//!
//! Every `&` in one walk stands for the same parent alternative, so
//! `a, b { & + & {} }` resolves to `a + a, b + b` and never mixes
//! alternatives (`a + b`). This is a deliberate departure from substituting
//! each `&` with the whole parent list independently; pairings across
//! alternatives are not produced.
//!
//! A node still present below its own tier means the tree was built wrong.
//! That is reported as [`ScssError::StructuralInvariantViolation`].

use std::collections::BTreeMap;

use crate::ast::{Expr, Literal, StatementArena, StatementId};
use crate::error::{Result, ScssError};
use crate::source::Pos;
use crate::token::{GROUP_PREC, TokenKind, UNARY_PREC};

/// Lowest tier, at which only bare selectors are reduced.
const BARE_PREC: u8 = 2;

/// Options for the selector resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Text placed on both sides of `+`, `>` and `~`.
    pub delimiter: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            delimiter: " ".to_string(),
        }
    }
}

impl ResolverOptions {
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }
}

/// Resolves every statement of the arena, outside-in.
pub fn resolve_all(arena: &mut StatementArena, options: &ResolverOptions) -> Result<()> {
    for id in arena.ids() {
        resolve_selector(arena, id, options)?;
    }
    Ok(())
}

/// Resolves one statement's selector and stores it in `resolved`.
///
/// The parent statement must already be resolved.
pub fn resolve_selector(
    arena: &mut StatementArena,
    id: StatementId,
    options: &ResolverOptions,
) -> Result<()> {
    let statement = arena.get(id);
    let parent = match statement.parent {
        None => None,
        Some(parent_id) => Some(arena.get(parent_id).selector().ok_or_else(|| {
            ScssError::structural(format!(
                "statement {} resolved before its parent {}",
                id.index(),
                parent_id.index()
            ))
        })?),
    };

    let resolved = resolve_against(&statement.raw_selector, parent, options)?;
    log::debug!("statement {} -> `{}`", id.index(), resolved.value);
    arena.get_mut(id).resolved = Some(resolved);
    Ok(())
}

/// Resolves a selector tree against the parent's flat selector text.
pub fn resolve_against(
    selector: &Expr,
    parent: Option<&str>,
    options: &ResolverOptions,
) -> Result<Literal> {
    let values = match parent {
        None => vec![Walk::new(None, options).run(selector)?],
        Some(text) => split_alternatives(text)
            .into_iter()
            .map(|alternative| Walk::new(Some(alternative), options).run(selector))
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(Literal::string(values.join(", "), selector.pos()))
}

/// Splits a selector list on top-level commas.
///
/// Commas inside parentheses or brackets (`:is(a, b)`) do not split.
pub fn split_alternatives(text: &str) -> Vec<&str> {
    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                alternatives.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    alternatives.push(text[start..].trim());
    alternatives.retain(|alternative| !alternative.is_empty());
    alternatives
}

/// Reduced literals keyed by source position.
///
/// Recording at a position discards every entry after it: a reduction covers
/// its whole subtree, which starts at the reduced node's position.
#[derive(Debug, Default)]
struct Parts(BTreeMap<Pos, Literal>);

impl Parts {
    fn record(&mut self, literal: Literal) {
        let _superseded = self.0.split_off(&(literal.pos + 1));
        self.0.insert(literal.pos, literal);
    }

    fn join(&self) -> String {
        let values: Vec<&str> = self.0.values().map(|lit| lit.value.as_str()).collect();
        values.join(" ")
    }
}

/// State of one resolution against a single parent alternative.
struct Walk<'a> {
    parent: Option<&'a str>,
    options: &'a ResolverOptions,
    parts: Parts,
    inject: bool,
}

impl<'a> Walk<'a> {
    fn new(parent: Option<&'a str>, options: &'a ResolverOptions) -> Self {
        Self {
            parent,
            options,
            parts: Parts::default(),
            inject: true,
        }
    }

    fn run(mut self, selector: &Expr) -> Result<String> {
        let mut tree = selector.clone();
        for tier in (GROUP_PREC..=UNARY_PREC).rev() {
            tree = self.pass(tree, tier)?;
            log::trace!("tier {tier}: {tree:?}");
        }

        let Expr::Literal(bare) = tree else {
            return Err(ScssError::structural(format!(
                "selector at offset {} did not reduce to a literal",
                tree.pos()
            )));
        };
        let bare = self.reduce_bare(bare);
        self.parts.record(bare);
        Ok(self.parts.join())
    }

    fn pass(&mut self, expr: Expr, tier: u8) -> Result<Expr> {
        match expr {
            Expr::Literal(_) => Ok(expr),
            Expr::Unary {
                op: TokenKind::And,
                operand,
                pos,
            } => {
                if tier != UNARY_PREC {
                    return Err(invalid_nest(TokenKind::And, tier));
                }
                let Expr::Literal(suffix) = *operand else {
                    return Err(ScssError::structural(format!(
                        "parent reference at offset {pos} has a non-literal suffix"
                    )));
                };
                let literal = self.reduce_parent_ref(&suffix, pos)?;
                Ok(Expr::Literal(literal))
            }
            Expr::Unary { op, pos, .. } => Err(ScssError::structural(format!(
                "unary `{op}` at offset {pos} is not valid in a selector"
            ))),
            Expr::Call { name, pos, .. } => Err(ScssError::structural(format!(
                "call to `{name}` at offset {pos} is not valid in a selector"
            ))),
            Expr::Binary {
                op,
                left,
                right,
                pos,
            } => {
                let prec = selector_precedence(op)?;
                if prec > tier {
                    return Err(invalid_nest(op, tier));
                }
                if prec < tier {
                    // Comma branches stay untouched until their own tier.
                    if op == TokenKind::Comma {
                        return Ok(Expr::Binary {
                            op,
                            left,
                            right,
                            pos,
                        });
                    }
                    let left = self.pass(*left, tier)?;
                    let right = self.pass(*right, tier)?;
                    return Ok(Expr::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                        pos,
                    });
                }

                let literal = if op == TokenKind::Comma {
                    self.reduce_group(Expr::Binary {
                        op,
                        left,
                        right,
                        pos,
                    })?
                } else {
                    let left = self.pass(*left, tier)?;
                    let right = self.pass(*right, tier)?;
                    let (Expr::Literal(left), Expr::Literal(right)) = (left, right) else {
                        return Err(invalid_nest(op, tier));
                    };
                    self.reduce_combinator(op, &left, &right, pos)
                };
                Ok(Expr::Literal(literal))
            }
        }
    }

    /// Tier 6: `&suffix` becomes the parent text followed by the suffix.
    fn reduce_parent_ref(&mut self, suffix: &Literal, pos: Pos) -> Result<Literal> {
        let parent = self.parent.ok_or_else(|| {
            ScssError::structural(format!(
                "parent reference at offset {pos} has no enclosing rule"
            ))
        })?;
        self.inject = false;
        let literal = Literal::string(format!("{parent}{}", suffix.value), pos);
        self.parts.record(literal.clone());
        Ok(literal)
    }

    /// Tiers 5 and 4: join two reduced operands.
    fn reduce_combinator(&mut self, op: TokenKind, left: &Literal, right: &Literal, pos: Pos) -> Literal {
        let value = match op {
            TokenKind::Nest => format!("{} {}", left.value, right.value),
            _ => {
                let delimiter = &self.options.delimiter;
                format!(
                    "{}{delimiter}{}{delimiter}{}",
                    left.value,
                    op.text(),
                    right.value
                )
            }
        };
        let literal = Literal::string(value, pos);
        self.parts.record(literal.clone());
        literal
    }

    /// Tier 3: resolve every branch of a comma group independently.
    fn reduce_group(&mut self, group: Expr) -> Result<Literal> {
        let pos = group.pos();
        let mut branches = Vec::new();
        flatten_group(group, &mut branches);

        let mut values = Vec::with_capacity(branches.len());
        for branch in &branches {
            values.push(Walk::new(self.parent, self.options).run(branch)?);
        }

        self.inject = false;
        let literal = Literal::string(values.join(", "), pos);
        self.parts.record(literal.clone());
        Ok(literal)
    }

    /// Tier 2: prefix the parent onto a bare selector.
    fn reduce_bare(&self, bare: Literal) -> Literal {
        match self.parent {
            Some(parent) if self.inject => {
                Literal::string(format!("{parent} {}", bare.value), bare.pos)
            }
            _ => bare,
        }
    }
}

/// Collects the branches of a (left-nested) comma group in source order.
fn flatten_group(expr: Expr, branches: &mut Vec<Expr>) {
    match expr {
        Expr::Binary {
            op: TokenKind::Comma,
            left,
            right,
            ..
        } => {
            flatten_group(*left, branches);
            flatten_group(*right, branches);
        }
        other => branches.push(other),
    }
}

/// Tier at which a binary selector operator is reduced.
fn selector_precedence(op: TokenKind) -> Result<u8> {
    match op {
        TokenKind::Comma | TokenKind::Nest | TokenKind::Add | TokenKind::Gtr | TokenKind::Til => {
            Ok(op.precedence())
        }
        _ => Err(ScssError::structural(format!(
            "operator `{op}` is not valid in a selector"
        ))),
    }
}

fn invalid_nest(op: TokenKind, tier: u8) -> ScssError {
    ScssError::structural(format!("invalid nest token `{op}` at tier {tier}"))
}

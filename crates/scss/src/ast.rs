//! Expression tree and statement arena.
//!
//! Both compiler passes work on the same node vocabulary:
//!
//! - [`Literal`]: a terminal (number, color, string, selector fragment)
//! - [`Expr::Unary`]: the parent reference `&` or a parenthesised value
//! - [`Expr::Binary`]: arithmetic and selector combination
//! - [`Expr::Call`]: a function call inside a declaration value
//!
//! Rules are stored as [`SelectorStatement`]s in a [`StatementArena`]. A
//! statement refers to its enclosing rule by [`StatementId`], and the arena
//! keeps statements in outside-in order so every parent precedes its children.

use crate::source::Pos;
use crate::token::TokenKind;

/// A terminal value.
///
/// Unit-bearing numbers keep their suffix in `value` (`"5px"`); the unit is
/// recorded by `kind`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub kind: TokenKind,
    pub value: String,
    pub pos: Pos,
}

impl Literal {
    pub fn new(kind: TokenKind, value: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            value: value.into(),
            pos,
        }
    }

    pub fn string(value: impl Into<String>, pos: Pos) -> Self {
        Self::new(TokenKind::String, value, pos)
    }

    /// Value with surrounding quotes removed for quoted strings.
    pub fn unquoted(&self) -> &str {
        match self.kind {
            TokenKind::QString | TokenKind::QsString if self.value.len() >= 2 => {
                &self.value[1..self.value.len() - 1]
            }
            _ => &self.value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Unary {
        op: TokenKind,
        operand: Box<Expr>,
        pos: Pos,
    },
    Binary {
        op: TokenKind,
        left: Box<Expr>,
        right: Box<Expr>,
        pos: Pos,
    },
    /// `args` is `None` when the argument text is not an expression list
    /// (e.g. `url(http://x)`); such calls are passed through as `raw`.
    Call {
        name: String,
        args: Option<Vec<Expr>>,
        raw: String,
        pos: Pos,
    },
}

impl Expr {
    pub fn literal(kind: TokenKind, value: impl Into<String>, pos: Pos) -> Self {
        Expr::Literal(Literal::new(kind, value, pos))
    }

    pub fn unary(op: TokenKind, operand: Expr, pos: Pos) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            pos,
        }
    }

    /// Builds a binary node positioned at its left operand.
    pub fn binary(op: TokenKind, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            pos: left.pos(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pos(&self) -> Pos {
        match self {
            Expr::Literal(lit) => lit.pos,
            Expr::Unary { pos, .. } | Expr::Binary { pos, .. } | Expr::Call { pos, .. } => *pos,
        }
    }
}

/// A declaration value: comma-separated groups of space-separated items.
///
/// `font: 12px Arial, sans-serif` is `[[12px, Arial], [sans-serif]]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Value {
    pub groups: Vec<Vec<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: Value,
    pub pos: Pos,
}

/// Index of a statement inside its [`StatementArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId(usize);

impl StatementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A rule block with its selector tree and enclosing rule.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorStatement {
    pub raw_selector: Expr,
    /// Flat selector text, set by the selector resolver.
    pub resolved: Option<Literal>,
    pub parent: Option<StatementId>,
    pub body: Vec<Declaration>,
}

impl SelectorStatement {
    pub fn new(raw_selector: Expr, parent: Option<StatementId>, body: Vec<Declaration>) -> Self {
        Self {
            raw_selector,
            resolved: None,
            parent,
            body,
        }
    }

    /// Resolved selector text, if resolution has run.
    pub fn selector(&self) -> Option<&str> {
        self.resolved.as_ref().map(|lit| lit.value.as_str())
    }
}

/// Owns every statement of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct StatementArena {
    statements: Vec<SelectorStatement>,
}

impl StatementArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement and returns its id.
    ///
    /// Parents must be pushed before their children.
    pub fn push(&mut self, statement: SelectorStatement) -> StatementId {
        debug_assert!(
            statement
                .parent
                .is_none_or(|parent| parent.0 < self.statements.len()),
            "parent statement must be pushed first"
        );
        self.statements.push(statement);
        StatementId(self.statements.len() - 1)
    }

    pub fn get(&self, id: StatementId) -> &SelectorStatement {
        &self.statements[id.0]
    }

    pub fn get_mut(&mut self, id: StatementId) -> &mut SelectorStatement {
        &mut self.statements[id.0]
    }

    /// Statement ids in outside-in order.
    pub fn ids(&self) -> impl Iterator<Item = StatementId> + use<> {
        (0..self.statements.len()).map(StatementId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectorStatement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_takes_left_position() {
        let expr = Expr::binary(
            TokenKind::Add,
            Expr::literal(TokenKind::Int, "1", 4),
            Expr::literal(TokenKind::Int, "2", 8),
        );
        assert_eq!(expr.pos(), 4);
    }

    #[test]
    fn test_unquoted_strips_quotes() {
        assert_eq!(Literal::new(TokenKind::QString, "\"a b\"", 0).unquoted(), "a b");
        assert_eq!(Literal::new(TokenKind::QsString, "'x'", 0).unquoted(), "x");
        assert_eq!(Literal::string("plain", 0).unquoted(), "plain");
    }

    #[test]
    fn test_arena_keeps_insertion_order() {
        let mut arena = StatementArena::new();
        let root = arena.push(SelectorStatement::new(
            Expr::literal(TokenKind::String, "div", 0),
            None,
            Vec::new(),
        ));
        let child = arena.push(SelectorStatement::new(
            Expr::literal(TokenKind::String, "p", 6),
            Some(root),
            Vec::new(),
        ));

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![root, child]);
        assert_eq!(arena.get(child).parent, Some(root));
        assert_eq!(arena.get(child).selector(), None);
    }
}

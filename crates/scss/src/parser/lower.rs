//! Lowering of parsed rule blocks into arena statements.

use nom::Offset;

use crate::ast::{Declaration, SelectorStatement, StatementArena, StatementId};
use crate::calc::Reducer;
use crate::error::Result;
use crate::parser::interpolate::interpolate;
use crate::parser::stylesheet::{RawDeclaration, RuleBlock, RuleItem};
use crate::parser::{parse_expr, parse_value};
use crate::scanner::{imply_parent, scan_selector, scan_value};
use crate::source::SourceMap;

/// Lowers blocks in pre-order, so every parent precedes its children.
pub(crate) fn lower_rules(
    source: &str,
    blocks: &[RuleBlock<'_>],
    reducer: &Reducer<'_>,
) -> Result<StatementArena> {
    let mut lowering = Lowering {
        source,
        map: SourceMap::new(source),
        reducer,
        arena: StatementArena::new(),
    };
    for block in blocks {
        lowering.block(block, None)?;
    }
    Ok(lowering.arena)
}

struct Lowering<'s, 'r> {
    source: &'s str,
    map: SourceMap<'s>,
    reducer: &'r Reducer<'r>,
    arena: StatementArena,
}

impl Lowering<'_, '_> {
    /// Lowers a rule and its nested rules. A selector whose interpolation
    /// fails drops the whole rule, descendants included.
    fn block(&mut self, block: &RuleBlock<'_>, parent: Option<StatementId>) -> Result<()> {
        let pos = self.source.offset(block.selector);
        let selector = match interpolate(block.selector, pos, self.reducer) {
            Ok(selector) => selector,
            Err(err) if err.is_recoverable() => {
                let (line, col) = self.map.line_col(pos);
                log::warn!("{line}:{col}: dropping rule `{}`: {err}", block.selector.trim());
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let mut tokens = scan_selector(&selector, pos)?;
        if parent.is_some() {
            tokens = imply_parent(tokens);
        }
        let raw_selector = parse_expr(&tokens)?;

        let mut body = Vec::new();
        for item in &block.items {
            if let RuleItem::Declaration(raw) = item {
                if let Some(declaration) = self.declaration(raw)? {
                    body.push(declaration);
                }
            }
        }

        let id = self
            .arena
            .push(SelectorStatement::new(raw_selector, parent, body));

        for item in &block.items {
            if let RuleItem::NestedRule(nested) = item {
                self.block(nested, Some(id))?;
            }
        }
        Ok(())
    }

    /// Lowers one declaration. Values that fail to evaluate are logged and
    /// dropped; anything else propagates.
    fn declaration(&self, raw: &RawDeclaration<'_>) -> Result<Option<Declaration>> {
        let pos = self.source.offset(raw.property);
        let value_pos = self.source.offset(raw.value);

        let lowered = interpolate(raw.property, pos, self.reducer).and_then(|property| {
            let text = interpolate(raw.value, value_pos, self.reducer)?;
            let value = parse_value(&scan_value(&text, value_pos)?)?;
            Ok(Declaration {
                property,
                value,
                pos,
            })
        });

        match lowered {
            Ok(declaration) => Ok(Some(declaration)),
            Err(err) if err.is_recoverable() => {
                let (line, col) = self.map.line_col(pos);
                log::warn!("{line}:{col}: dropping `{}`: {err}", raw.property);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

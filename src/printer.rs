//! CSS output.

use crate::options::OutputStyle;

/// A flat rule ready to print.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    /// `(property, value)` pairs in source order.
    pub declarations: Vec<(String, String)>,
}

/// Renders rules in the given style. Rules without declarations are skipped.
pub fn print(rules: &[CssRule], style: OutputStyle) -> String {
    let mut out = String::new();
    for rule in rules.iter().filter(|rule| !rule.declarations.is_empty()) {
        match style {
            OutputStyle::Expanded => write_expanded(&mut out, rule),
            OutputStyle::Compressed => write_compressed(&mut out, rule),
        }
    }
    if style == OutputStyle::Compressed && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn write_expanded(out: &mut String, rule: &CssRule) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&rule.selector);
    out.push_str(" {\n");
    for (property, value) in &rule.declarations {
        out.push_str("  ");
        out.push_str(property);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str("}\n");
}

fn write_compressed(out: &mut String, rule: &CssRule) {
    out.push_str(&rule.selector.replace(", ", ","));
    out.push('{');
    let body: Vec<String> = rule
        .declarations
        .iter()
        .map(|(property, value)| format!("{property}:{value}"))
        .collect();
    out.push_str(&body.join(";"));
    out.push('}');
}

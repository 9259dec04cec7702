//! Compilation settings.

use scss::ResolverOptions;

/// How the printer lays out rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// One declaration per line, blank line between rules.
    #[default]
    Expanded,
    /// Everything on one line, no optional whitespace.
    Compressed,
}

/// Options for [`compile_str`](crate::compile_str) and
/// [`compile_file`](crate::compile_file).
///
/// # Examples
///
/// ```
/// use scss_rs::{CompileOptions, OutputStyle};
///
/// let options = CompileOptions::default()
///     .with_output_style(OutputStyle::Compressed)
///     .with_delimiter("");
/// assert_eq!(options.resolver.delimiter, "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub output_style: OutputStyle,
    pub resolver: ResolverOptions,
}

impl CompileOptions {
    pub fn with_output_style(mut self, output_style: OutputStyle) -> Self {
        self.output_style = output_style;
        self
    }

    pub fn with_resolver(mut self, resolver: ResolverOptions) -> Self {
        self.resolver = resolver;
        self
    }

    /// Text placed around `>`, `+` and `~` in resolved selectors.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.resolver = self.resolver.with_delimiter(delimiter);
        self
    }
}

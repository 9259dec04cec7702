//! Source positions and line/column lookup for diagnostics.

/// Byte offset into a stylesheet's source text.
pub type Pos = usize;

/// Maps byte offsets back to 1-based `(line, column)` pairs.
///
/// # Examples
///
/// ```
/// use scss::source::SourceMap;
///
/// let map = SourceMap::new("a {\n  color: red;\n}");
/// assert_eq!(map.line_col(0), (1, 1));
/// assert_eq!(map.line_col(6), (2, 3));
/// ```
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<Pos>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Returns the 1-based line and column (in characters) of `pos`.
    ///
    /// Offsets past the end of the source clamp to the last position.
    pub fn line_col(&self, pos: Pos) -> (usize, usize) {
        let pos = pos.min(self.source.len());
        let line = match self.line_starts.binary_search(&pos) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..pos)
            .map_or(pos - start, |prefix| prefix.chars().count());
        (line + 1, column + 1)
    }
}

//! Configuration for the canonical printer.

/// Configuration for printing.
///
/// Controls indentation and the column budget lines are wrapped to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrintConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,

    /// Width of a line's content at depth 0.
    pub max_width: usize,

    /// Smallest content width at any depth.
    pub min_width: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            max_width: 80,
            min_width: 40,
        }
    }
}

impl PrintConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the indent width.
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Builder method to set the depth-0 width.
    #[must_use]
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Builder method to set the minimum width.
    #[must_use]
    pub fn with_min_width(mut self, width: usize) -> Self {
        self.min_width = width;
        self
    }

    /// Returns the content width available to a line at `depth`.
    ///
    /// Indentation is not counted against this width.
    #[must_use]
    pub fn budget(&self, depth: usize) -> usize {
        self.max_width
            .saturating_sub(self.indent_width.saturating_mul(depth))
            .max(self.min_width)
    }

    /// Returns the indentation for a line at `depth`.
    #[must_use]
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.indent_width.saturating_mul(depth))
    }
}

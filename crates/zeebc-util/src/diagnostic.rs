//! Compile-time diagnostics.
//!
//! Every failure a compile can hit is carried by the single [`Diagnostic`]
//! type: a message plus the source range it applies to. There is no
//! recovery and there are no warnings; the first diagnostic aborts the
//! compile and is reported to the user.

use thiserror::Error;

use crate::range::Range;

/// Result alias used by every compiler phase.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// A fatal compile-time error with its source location.
///
/// # Examples
///
/// ```
/// use zeebc_util::{Diagnostic, Range};
///
/// let diag = Diagnostic::new(Range::at(1, 7), "Unexpected character encountered");
/// assert_eq!(diag.to_string(), "Unexpected character encountered");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Diagnostic {
    /// Where in the source the problem was detected.
    pub range: Range,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for the given range.
    pub fn new(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }

    /// Render the diagnostic with a caret underline extracted from the
    /// source text.
    ///
    /// The output has the shape
    ///
    /// ```text
    /// error: Unable to implicitly cast type
    ///  --> line 1, column 4
    ///    1 | b? = 1
    ///      |    ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("error: {}\n --> {}\n", self.message, self.range);

        let line_index = self.range.start_line.saturating_sub(1) as usize;
        if let Some(line) = source.lines().nth(line_index) {
            let gutter = format!("{:>4}", self.range.start_line);
            out.push_str(&format!("{} | {}\n", gutter, line));

            let start = self.range.start_col.max(1) as usize;
            let end = if self.range.end_line == self.range.start_line {
                (self.range.end_col as usize).max(start)
            } else {
                // multi-line range: underline to the end of the first line
                line.chars().count().max(start)
            };
            out.push_str(&format!(
                "{} | {}{}\n",
                " ".repeat(gutter.len()),
                " ".repeat(start - 1),
                "^".repeat(end - start + 1)
            ));
        }

        out
    }
}

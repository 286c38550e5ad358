//! Text span region geometry.
//!
//! A text span marks a half-open character-offset range `[start, end)`
//! over the source text of an item, plus the text captured at annotation
//! time. Spans have no 2-D geometry: they report no bounding box and
//! never match a canvas hit test.

use serde::{Deserialize, Serialize};

/// A half-open character-offset range with its captured text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Offset of the first character in the span.
    pub start: u64,
    /// Offset one past the last character in the span.
    pub end: u64,
    /// The text covered by the span when it was created.
    pub text: String,
}

impl TextSpan {
    /// Creates a span, swapping the offsets if given in reverse.
    pub fn new(start: u64, end: u64, text: impl Into<String>) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            text: text.into(),
        }
    }

    /// Number of characters covered.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// True when the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether a character offset falls inside the span.
    pub fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Whether another span overlaps this one.
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

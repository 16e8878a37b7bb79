/*!
 * Content model for subtitle documents.
 *
 * A document is a list of scenes, each scene a list of batches, each batch a
 * list of lines. Scenes and batches are the units the translator works in;
 * lines carry the source text and, once translated, the translation.
 */

use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

/// A single subtitle line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Line {
    /// Sequence number from the source file
    pub number: usize,

    /// Start time in milliseconds
    pub start_ms: u64,

    /// End time in milliseconds
    pub end_ms: u64,

    /// Source text
    pub text: String,

    /// Translated text, once available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Line {
    /// Create a new untranslated line
    pub fn new(number: usize, start_ms: u64, end_ms: u64, text: String) -> Self {
        Self {
            number,
            start_ms,
            end_ms,
            text,
            translation: None,
        }
    }

    // @creates: Validated line
    // @validates: Time range and non-empty text
    pub fn new_validated(
        number: usize,
        start_ms: u64,
        end_ms: u64,
        text: String,
    ) -> Result<Self, SubtitleError> {
        if end_ms <= start_ms {
            return Err(SubtitleError::InvalidTimeRange {
                start_ms,
                end_ms,
            });
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SubtitleError::EmptyText(number));
        }

        Ok(Self::new(number, start_ms, end_ms, trimmed.to_string()))
    }

    /// Whether this line has a translation
    pub fn is_translated(&self) -> bool {
        self.translation.is_some()
    }
}

/// A contiguous group of lines translated in one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Batch {
    /// Batch number within its scene, starting at 1
    pub number: usize,

    /// Lines in the batch
    pub lines: Vec<Line>,

    /// Optional context summary for the batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Batch {
    /// Create an empty batch
    pub fn new(number: usize) -> Self {
        Self {
            number,
            lines: Vec::new(),
            summary: None,
        }
    }

    /// Number of lines in the batch
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether any line in the batch has a translation
    pub fn any_translated(&self) -> bool {
        self.lines.iter().any(Line::is_translated)
    }

    /// Whether every line in the batch has a translation
    pub fn all_translated(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(Line::is_translated)
    }
}

/// A group of batches separated from its neighbours by a gap in the timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scene {
    /// Scene number, starting at 1
    pub number: usize,

    /// Batches in the scene
    pub batches: Vec<Batch>,

    /// Optional context summary for the scene
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(number: usize) -> Self {
        Self {
            number,
            batches: Vec::new(),
            summary: None,
        }
    }

    /// Number of lines across all batches
    pub fn line_count(&self) -> usize {
        self.batches.iter().map(Batch::line_count).sum()
    }

    /// Iterate over every line in the scene
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.batches.iter().flat_map(|b| b.lines.iter())
    }

    /// Look up a batch by number
    pub fn batch(&self, number: usize) -> Option<&Batch> {
        self.batches.iter().find(|b| b.number == number)
    }

    /// Whether any line in the scene has a translation
    pub fn any_translated(&self) -> bool {
        self.batches.iter().any(Batch::any_translated)
    }

    /// Whether every line in the scene has a translation
    pub fn all_translated(&self) -> bool {
        !self.batches.is_empty() && self.batches.iter().all(Batch::all_translated)
    }
}

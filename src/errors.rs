/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Recoverable project-file conditions (missing file, undecodable file, decoded
 * file with no scenes) are deliberately not errors: they are represented by
 * `ProjectReadOutcome` in the project store and resolved internally by falling
 * back to a fresh source load.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during subtitle parsing and formatting
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Error parsing an SRT timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Error when a subtitle entry has an inverted or empty time range
    #[error("Invalid time range: end time {end_ms} <= start time {start_ms}")]
    InvalidTimeRange {
        /// Start time in milliseconds
        start_ms: u64,
        /// End time in milliseconds
        end_ms: u64,
    },

    /// Error when a subtitle entry has no text
    #[error("Empty subtitle text for entry {0}")]
    EmptyText(usize),

    /// Error reading or decoding a subtitle file
    #[error("Unable to read subtitle file {path}: {reason}")]
    UnreadableFile {
        /// Path of the offending file
        path: PathBuf,
        /// Cause of the failure
        reason: String,
    },
}

/// Errors raised by a translator collaborator
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The caller requested cancellation; propagated verbatim, never rescue-saved
    #[error("Translation aborted")]
    Aborted,

    /// The translator was invoked with no subtitles loaded
    #[error("No subtitles loaded")]
    NoSubtitles,

    /// The requested scene does not exist
    #[error("Scene {0} not found")]
    SceneNotFound(usize),

    /// Any other failure from the translation backend
    #[error("Translation provider failed: {0}")]
    Provider(String),
}

/// Main error type for project state and checkpoint operations
#[derive(Error, Debug)]
pub enum ProjectError {
    /// After all fallbacks, no translatable content exists
    #[error("No subtitles to translate in {path}")]
    NoContent {
        /// The input path the project was initialised from
        path: PathBuf,
    },

    /// Checkpoint write attempted with no subtitles loaded
    #[error("Cannot write project file: no subtitles loaded")]
    WriteWithoutSubtitles,

    /// Checkpoint write attempted with subtitles that have no scenes
    #[error("Cannot write project file: subtitles have no scenes")]
    WriteWithoutScenes,

    /// No project file path was provided or derivable
    #[error("No project file path provided")]
    MissingProjectPath,

    /// Translation output save attempted with nothing to write
    #[error("No translated subtitles to save")]
    NothingToSave,

    /// The requested scene does not exist
    #[error("Scene {0} not found")]
    SceneNotFound(usize),

    /// Error from the translator collaborator
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from subtitle parsing or formatting
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from a file operation
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Error encoding or decoding the project document
    #[error("Project document error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProjectError {
    /// True if this error is an explicit cancellation rather than a failure
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Translation(TranslationError::Aborted))
    }
}

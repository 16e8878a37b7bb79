/*!
 * # subtrans - resumable subtitle translation projects
 *
 * A Rust library for persisting and orchestrating the working state of a
 * long-running subtitle translation run across process restarts.
 *
 * ## Features
 *
 * - Mode-derived run semantics (fresh/read/write/resume/retranslate/reparse/preview)
 * - On-disk project files (`.subtrans`) with atomic writes and backup copies
 * - Background autosave with an interruptible, explicitly stopped loop
 * - Event-driven incremental saves: completed scenes are written immediately
 * - Rescue-saves of partial progress when a run fails
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Option handling and text encodings
 * - `project`: Project state, checkpoint store, mode resolution and autosave:
 *   - `project::mode`: Run-mode flag derivation
 *   - `project::state`: Shared state between foreground and autosave threads
 *   - `project::store`: Project file read/write/backup and output saves
 *   - `project::autosave`: The background checkpoint loop
 * - `subtitles`: Subtitle document model, SRT parsing and batching
 * - `translator`: The translator collaborator trait and a mock backend
 * - `events`: Subscription-token event channels with scoped guards
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod events;
pub mod file_utils;
pub mod language_utils;
pub mod project;
pub mod subtitles;
pub mod translator;

// Re-export main types for easier usage
pub use app_config::{ProjectOptions, TextEncoding};
pub use errors::{ProjectError, SubtitleError, TranslationError};
pub use events::{ScopedSubscription, SubscriptionToken, TranslationEvents};
pub use project::{
    AutosaveScheduler, ModeFlags, ProjectReadOutcome, ProjectState, ProjectStore, SubtitleProject,
};
pub use subtitles::{Batch, Batcher, Line, Scene, Subtitles};
pub use translator::{MockTranslator, SubtitleTranslator};

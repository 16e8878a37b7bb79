/*!
 * Translator collaborator interface.
 *
 * The project engine drives translation through this trait and observes it
 * through the three lifecycle event channels. Implementations mutate the
 * shared document through `ProjectState`'s accessors in short lock windows,
 * and must emit events *without* holding the content lock: event handlers
 * re-acquire it to checkpoint and save.
 */

pub mod mock;

use std::sync::Arc;

use crate::errors::TranslationError;
use crate::events::TranslationEvents;
use crate::project::state::ProjectState;

pub use mock::{MockBehavior, MockTranslator};

/// A translation backend the project orchestrator can drive
pub trait SubtitleTranslator {
    /// The translator's lifecycle event channels
    fn events(&self) -> Arc<TranslationEvents>;

    /// Whether a failure should stop the run (and trigger a rescue-save)
    /// rather than being skipped
    fn stop_on_error(&self) -> bool;

    /// Translate every scene in the document
    fn translate(&mut self, state: &ProjectState) -> Result<(), TranslationError>;

    /// Translate one scene, optionally restricted to specific batches or
    /// lines
    fn translate_scene(
        &mut self,
        state: &ProjectState,
        scene_number: usize,
        batch_numbers: Option<&[usize]>,
        line_numbers: Option<&[usize]>,
    ) -> Result<(), TranslationError>;
}

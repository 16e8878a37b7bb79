/*!
 * Mock translator for testing and demos.
 *
 * Behavior modes:
 * - `MockTranslator::working()` - translates every line
 * - `MockTranslator::failing()` - fails before translating anything
 * - `MockTranslator::fail_after_scenes(n)` - fails once n scenes are done
 * - `MockTranslator::abort_after_batches(n)` - signals an abort mid-run
 */

use std::sync::Arc;

use crate::errors::TranslationError;
use crate::events::{
    BatchTranslatedEvent, PreprocessedEvent, SceneTranslatedEvent, TranslationEvents,
};
use crate::project::state::ProjectState;
use crate::translator::SubtitleTranslator;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Translate every line
    Working,
    /// Fail before translating anything
    Failing,
    /// Translate n whole scenes, then fail
    FailAfterScenes(usize),
    /// Translate n batches, then fail
    FailAfterBatches(usize),
    /// Translate n batches, then signal an abort
    AbortAfterBatches(usize),
}

/// Scene/batch outline captured in one lock window so events can be emitted
/// without holding the content lock
type Outline = Vec<(usize, Vec<(usize, usize)>)>;

/// Mock translation backend
pub struct MockTranslator {
    events: Arc<TranslationEvents>,
    behavior: MockBehavior,
    stop_on_error: bool,
    batches_done: usize,
    scenes_done: usize,
}

impl MockTranslator {
    /// Create a mock with the given behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            events: Arc::new(TranslationEvents::new()),
            behavior,
            stop_on_error: true,
            batches_done: 0,
            scenes_done: 0,
        }
    }

    /// A translator that translates every line
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// A translator that fails before translating anything
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// A translator that completes n scenes and then fails
    pub fn fail_after_scenes(scenes: usize) -> Self {
        Self::new(MockBehavior::FailAfterScenes(scenes))
    }

    /// A translator that completes n batches and then fails
    pub fn fail_after_batches(batches: usize) -> Self {
        Self::new(MockBehavior::FailAfterBatches(batches))
    }

    /// A translator that completes n batches and then aborts
    pub fn abort_after_batches(batches: usize) -> Self {
        Self::new(MockBehavior::AbortAfterBatches(batches))
    }

    /// Override the stop-on-error flag
    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    /// Number of batches translated so far
    pub fn batches_done(&self) -> usize {
        self.batches_done
    }

    /// Capture scene numbers, batch numbers and line counts in one lock
    /// window
    fn outline(&self, state: &ProjectState) -> Result<Outline, TranslationError> {
        state
            .with_subtitles(|subtitles| {
                subtitles
                    .scenes
                    .iter()
                    .map(|scene| {
                        (
                            scene.number,
                            scene
                                .batches
                                .iter()
                                .map(|batch| (batch.number, batch.lines.len()))
                                .collect(),
                        )
                    })
                    .collect()
            })
            .ok_or(TranslationError::NoSubtitles)
    }

    /// Write mock translations into one batch under the content lock
    fn translate_batch(
        &self,
        state: &ProjectState,
        scene_number: usize,
        batch_number: usize,
        line_numbers: Option<&[usize]>,
    ) -> Result<(), TranslationError> {
        state
            .with_subtitles_mut(|subtitles| {
                let scene = subtitles
                    .scene_mut(scene_number)
                    .ok_or(TranslationError::SceneNotFound(scene_number))?;
                let batch = scene
                    .batches
                    .iter_mut()
                    .find(|b| b.number == batch_number)
                    .ok_or_else(|| {
                        TranslationError::Provider(format!(
                            "Batch {} not found in scene {}",
                            batch_number, scene_number
                        ))
                    })?;

                for line in &mut batch.lines {
                    if line_numbers.is_none_or(|numbers| numbers.contains(&line.number)) {
                        line.translation = Some(format!("[TRANSLATED] {}", line.text));
                    }
                }

                Ok(())
            })
            .ok_or(TranslationError::NoSubtitles)?
    }

    fn check_scene_gate(&self) -> Result<(), TranslationError> {
        match self.behavior {
            MockBehavior::Failing => {
                Err(TranslationError::Provider("Simulated provider failure".to_string()))
            }
            MockBehavior::FailAfterScenes(n) if self.scenes_done >= n => {
                Err(TranslationError::Provider("Simulated provider failure".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn check_batch_gate(&self) -> Result<(), TranslationError> {
        match self.behavior {
            MockBehavior::AbortAfterBatches(n) if self.batches_done >= n => {
                Err(TranslationError::Aborted)
            }
            MockBehavior::FailAfterBatches(n) if self.batches_done >= n => {
                Err(TranslationError::Provider("Simulated provider failure".to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl SubtitleTranslator for MockTranslator {
    fn events(&self) -> Arc<TranslationEvents> {
        Arc::clone(&self.events)
    }

    fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }

    fn translate(&mut self, state: &ProjectState) -> Result<(), TranslationError> {
        let outline = self.outline(state)?;

        let scene_count = outline.len();
        let line_count = outline
            .iter()
            .flat_map(|(_, batches)| batches.iter().map(|(_, lines)| lines))
            .sum();
        self.events.preprocessed.emit(&PreprocessedEvent {
            scene_count,
            line_count,
        });

        for (scene_number, batches) in outline {
            self.check_scene_gate()?;

            let mut scene_lines = 0;
            for (batch_number, line_count) in batches {
                self.check_batch_gate()?;

                self.translate_batch(state, scene_number, batch_number, None)?;
                self.batches_done += 1;
                scene_lines += line_count;

                self.events.batch_translated.emit(&BatchTranslatedEvent {
                    scene_number,
                    batch_number,
                    line_count,
                });
            }

            self.scenes_done += 1;
            self.events.scene_translated.emit(&SceneTranslatedEvent {
                scene_number,
                line_count: scene_lines,
            });
        }

        Ok(())
    }

    fn translate_scene(
        &mut self,
        state: &ProjectState,
        scene_number: usize,
        batch_numbers: Option<&[usize]>,
        line_numbers: Option<&[usize]>,
    ) -> Result<(), TranslationError> {
        let outline = self.outline(state)?;
        let (_, batches) = outline
            .into_iter()
            .find(|(number, _)| *number == scene_number)
            .ok_or(TranslationError::SceneNotFound(scene_number))?;

        let line_count = batches.iter().map(|(_, lines)| lines).sum();
        self.events.preprocessed.emit(&PreprocessedEvent {
            scene_count: 1,
            line_count,
        });

        self.check_scene_gate()?;

        for (batch_number, line_count) in batches {
            if batch_numbers.is_some_and(|numbers| !numbers.contains(&batch_number)) {
                continue;
            }

            self.check_batch_gate()?;

            self.translate_batch(state, scene_number, batch_number, line_numbers)?;
            self.batches_done += 1;

            self.events.batch_translated.emit(&BatchTranslatedEvent {
                scene_number,
                batch_number,
                line_count,
            });
        }

        Ok(())
    }
}

/*!
 * Project state and checkpoint orchestration.
 *
 * This module handles:
 * - Deriving run semantics from the project mode string (`mode`)
 * - Initialising a project from a source file or an existing project file
 * - Reading, writing and backing up the on-disk checkpoint (`store`)
 * - Periodic background checkpoints while a translation runs (`autosave`)
 * - Driving a translator and turning its lifecycle events into dirty-flag
 *   updates and selective immediate saves
 */

pub mod autosave;
pub mod mode;
pub mod state;
pub mod store;

use log::{debug, error, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::ProjectOptions;
use crate::errors::{ProjectError, TranslationError};
use crate::events::TranslationEvents;
use crate::subtitles::{Batcher, Scene, Subtitles};
use crate::translator::SubtitleTranslator;

pub use autosave::AutosaveScheduler;
pub use mode::ModeFlags;
pub use state::ProjectState;
pub use store::{PROJECT_FILE_EXTENSION, ProjectReadOutcome, ProjectStore};

/// A translation project: owns the shared state, the checkpoint store, the
/// mode flags and the autosave scheduler for one run.
///
/// Created once per run and discarded when the process exits; never shared
/// across runs.
pub struct SubtitleProject {
    state: Arc<ProjectState>,
    store: ProjectStore,
    flags: ModeFlags,
    options: ProjectOptions,
    events: Arc<TranslationEvents>,
    autosave: Option<AutosaveScheduler>,
}

impl SubtitleProject {
    /// Create a project from options; derives the mode flags once
    pub fn new(options: ProjectOptions) -> Self {
        let flags = ModeFlags::resolve(&options.project_mode);
        let store = ProjectStore::new(options.encoding);

        Self {
            state: Arc::new(ProjectState::new()),
            store,
            flags,
            options,
            events: Arc::new(TranslationEvents::new()),
            autosave: None,
        }
    }

    /// The resolved (and possibly initialiser-adjusted) mode flags
    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    /// Shared state handle
    pub fn state(&self) -> Arc<ProjectState> {
        Arc::clone(&self.state)
    }

    /// The project's own event bus; translator events are forwarded here
    pub fn events(&self) -> Arc<TranslationEvents> {
        Arc::clone(&self.events)
    }

    /// The project file path, once derived
    pub fn project_file(&self) -> Option<PathBuf> {
        self.state.project_file()
    }

    /// Target language of the loaded document, if any
    pub fn target_language(&self) -> Option<String> {
        self.state.target_language()
    }

    /// Whether any subtitles have been translated yet
    pub fn any_translated(&self) -> bool {
        self.state.with_subtitles(Subtitles::any_translated).unwrap_or(false)
    }

    /// Number of lines in the loaded document
    pub fn line_count(&self) -> usize {
        self.state.with_subtitles(Subtitles::line_count).unwrap_or(0)
    }

    // =========================================================================
    // Initialisation
    // =========================================================================

    /// Initialise the project by loading an existing project file or creating
    /// a new one from the source subtitles.
    ///
    /// `filepath` is the source subtitle file or a project file; the project
    /// file path is derived from it by extension substitution. A missing or
    /// unreadable project file downgrades to a fresh source load; only ending
    /// up with no translatable content is an error.
    pub fn initialise(
        &mut self,
        filepath: &Path,
        outputpath: Option<&Path>,
        write_backup: bool,
    ) -> Result<(), ProjectError> {
        let filepath = crate::file_utils::FileManager::normalize_path(filepath);
        let project_file = ProjectStore::project_file_path(&filepath);
        self.state.set_project_file(&project_file);

        let mut flags = self.flags;

        // The caller pointed directly at a project file
        if project_file == filepath && !flags.read_project {
            flags.read_project = true;
            flags.write_project = true;
        }

        // All-false flags mean the mode string was unrecognized; treat as
        // "no explicit mode" and load the source
        if flags == ModeFlags::default() {
            warn!("No project mode resolved, loading source subtitles");
            flags.load_subtitles = true;
        }

        if flags.read_project && !project_file.exists() {
            info!("Project file {:?} does not exist", project_file);
            flags.read_project = false;
            flags.load_subtitles = true;
        }

        if flags.read_project {
            match self.store.read(&self.state, Some(&project_file)) {
                ProjectReadOutcome::Loaded { scenes } if scenes > 0 => {
                    flags.load_subtitles = false;
                    if write_backup {
                        info!("Project file loaded, saving backup copy");
                        self.store.write_backup(&self.state)?;
                    } else {
                        info!("Project file loaded");
                    }
                }
                _ => {
                    error!("Unable to read project file, starting afresh");
                    flags.load_subtitles = true;
                }
            }
        }

        if flags.load_subtitles {
            let subtitles = Subtitles::load(&filepath, self.store.encoding(), &self.batcher())?;
            self.state.set_subtitles(subtitles);
        }

        if let Some(outputpath) = outputpath {
            self.state
                .with_subtitles_mut(|s| s.output_path = Some(outputpath.to_path_buf()));
        }

        let has_content = self
            .state
            .with_subtitles(Subtitles::has_subtitles)
            .unwrap_or(false);
        if !has_content {
            return Err(ProjectError::NoContent { path: filepath });
        }

        self.flags = flags;

        // Autosave begins once the flags are final
        if self.flags.update_project && self.options.autosave {
            self.start_autosave();
        }

        Ok(())
    }

    fn batcher(&self) -> Batcher {
        Batcher {
            scene_threshold_ms: (self.options.scene_threshold_secs * 1_000.0) as u64,
            max_batch_size: self.options.max_batch_size,
        }
    }

    // =========================================================================
    // Checkpointing
    // =========================================================================

    /// Write the project file, optionally to an explicit path
    pub fn write_project_file(&self, path: Option<&Path>) -> Result<PathBuf, ProjectError> {
        self.store.write(&self.state, path)
    }

    /// Write a backup copy of the project file
    pub fn write_backup_file(&self) -> Result<Option<PathBuf>, ProjectError> {
        self.store.write_backup(&self.state)
    }

    /// Mark the project as needing a checkpoint on the next autosave tick.
    /// A no-op unless update mode is active.
    pub fn mark_for_update(&self) -> Result<(), ProjectError> {
        if self.flags.update_project {
            if !self.state.has_subtitles() {
                return Err(ProjectError::WriteWithoutSubtitles);
            }
            self.state.mark_dirty();
        }
        Ok(())
    }

    /// Write the translated output file; failures are logged, never raised.
    /// A failed save must not mask or replace the run outcome.
    pub fn save_translation(&self, outputpath: Option<&Path>) {
        if let Err(e) = self
            .store
            .save_translation(&self.state, outputpath, self.options.include_original)
        {
            error!("Unable to save translation: {}", e);
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// The non-empty settings stored in the project
    pub fn project_settings(&self) -> BTreeMap<String, Value> {
        self.state
            .with_subtitles(|s| {
                s.settings
                    .iter()
                    .filter(|(_, v)| !is_empty_setting(v))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply settings changes to the project.
    ///
    /// A no-op when every supplied key already matches the stored value.
    /// Otherwise the changes are applied and, if the project has scenes, the
    /// output path is recomputed and the project file is written immediately:
    /// settings changes are checkpointed synchronously, not deferred to
    /// autosave.
    pub fn update_project_settings(
        &self,
        settings: &BTreeMap<String, Value>,
    ) -> Result<(), ProjectError> {
        let changed = self.state.with_subtitles_mut(|subtitles| {
            let unchanged = settings
                .iter()
                .all(|(key, value)| setting_matches(subtitles.settings.get(key), value));
            if unchanged {
                return false;
            }

            subtitles.update_settings(settings);
            true
        });

        // Silently ignored when no document is loaded
        let Some(changed) = changed else {
            return Ok(());
        };
        if !changed {
            return Ok(());
        }

        let has_scenes = self
            .state
            .with_subtitles(|s| !s.scenes.is_empty())
            .unwrap_or(false);
        if has_scenes {
            if let Some(project_file) = self.state.project_file() {
                self.state
                    .with_subtitles_mut(|s| s.update_output_path(&project_file));
            }
            self.write_project_file(None)?;
        }

        Ok(())
    }

    // =========================================================================
    // Autosave lifecycle
    // =========================================================================

    /// Start the background autosave loop if it is not already running
    pub fn start_autosave(&mut self) {
        if self.autosave.is_none() {
            let interval = Duration::from_secs(self.options.autosave_interval_secs);
            self.autosave = Some(AutosaveScheduler::start(
                Arc::clone(&self.state),
                self.store,
                interval,
            ));
        }
    }

    /// Stop the background autosave loop and wait for it to exit
    pub fn stop_autosave(&mut self) {
        if let Some(mut scheduler) = self.autosave.take() {
            scheduler.stop();
        }
    }

    /// Whether the autosave loop is active
    pub fn autosave_running(&self) -> bool {
        self.autosave.as_ref().is_some_and(AutosaveScheduler::is_running)
    }

    // =========================================================================
    // Translation orchestration
    // =========================================================================

    /// Translate the whole project with the given translator.
    ///
    /// Primes the project file in write mode, bridges the translator's
    /// lifecycle events into dirty-flag updates and immediate scene saves
    /// for the duration of the call, and performs a final output save on
    /// completion. An abort propagates unchanged with no rescue-save; any
    /// other failure triggers a best-effort rescue-save when the translator
    /// is configured to stop on error.
    pub fn translate_subtitles(
        &self,
        translator: &mut dyn SubtitleTranslator,
    ) -> Result<(), ProjectError> {
        if !self.state.has_subtitles() {
            return Err(ProjectError::NoContent {
                path: self.state.project_file().unwrap_or_default(),
            });
        }

        // Prime new project files before any translation work begins
        if self.flags.write_project {
            self.write_project_file(None)?;
        }

        let events = translator.events();
        let update = self.flags.update_project;

        let state = Arc::clone(&self.state);
        let forward = Arc::clone(&self.events);
        let _preprocessed = events.preprocessed.subscribe_scoped(move |ev| {
            debug!("Pre-processing finished");
            if update {
                state.mark_dirty();
            }
            forward.preprocessed.emit(ev);
        });

        let state = Arc::clone(&self.state);
        let forward = Arc::clone(&self.events);
        let _batch = events.batch_translated.subscribe_scoped(move |ev| {
            debug!("Batch {} of scene {} translated", ev.batch_number, ev.scene_number);
            if update {
                state.mark_dirty();
            }
            forward.batch_translated.emit(ev);
        });

        let state = Arc::clone(&self.state);
        let forward = Arc::clone(&self.events);
        let store = self.store;
        let include_original = self.options.include_original;
        let _scene = events.scene_translated.subscribe_scoped(move |ev| {
            debug!("Scene {} translated", ev.scene_number);
            // A completed scene is written out immediately: its translation
            // survives a crash regardless of the autosave schedule
            if let Err(e) = store.save_translation(&state, None, include_original) {
                error!("Unable to save translation: {}", e);
            }
            if update {
                state.mark_dirty();
            }
            forward.scene_translated.emit(ev);
        });

        match translator.translate(&self.state) {
            Ok(()) => {
                self.save_translation(None);
                Ok(())
            }
            Err(TranslationError::Aborted) => {
                warn!("Translation aborted");
                Err(TranslationError::Aborted.into())
            }
            Err(e) => {
                if translator.stop_on_error() {
                    self.save_translation(None);
                }
                error!("Failed to translate subtitles");
                Err(e.into())
            }
        }
    }

    /// Translate a single scene, returning the translated scene on success.
    ///
    /// Follows the same shape as the whole-run path, but subscribes only to
    /// the preprocessed and batch events; per-scene saves are performed
    /// directly on completion.
    pub fn translate_scene(
        &self,
        translator: &mut dyn SubtitleTranslator,
        scene_number: usize,
        batch_numbers: Option<&[usize]>,
        line_numbers: Option<&[usize]>,
    ) -> Result<Scene, ProjectError> {
        if !self.state.has_subtitles() {
            return Err(ProjectError::NoContent {
                path: self.state.project_file().unwrap_or_default(),
            });
        }

        if self.flags.write_project {
            self.write_project_file(None)?;
        }

        let events = translator.events();
        let update = self.flags.update_project;

        let state = Arc::clone(&self.state);
        let forward = Arc::clone(&self.events);
        let _preprocessed = events.preprocessed.subscribe_scoped(move |ev| {
            debug!("Pre-processing finished");
            if update {
                state.mark_dirty();
            }
            forward.preprocessed.emit(ev);
        });

        let state = Arc::clone(&self.state);
        let forward = Arc::clone(&self.events);
        let _batch = events.batch_translated.subscribe_scoped(move |ev| {
            debug!("Batch {} of scene {} translated", ev.batch_number, ev.scene_number);
            if update {
                state.mark_dirty();
            }
            forward.batch_translated.emit(ev);
        });

        match translator.translate_scene(&self.state, scene_number, batch_numbers, line_numbers) {
            Ok(()) => {
                self.save_translation(None);
                self.state
                    .with_subtitles(|s| s.scene(scene_number).cloned())
                    .flatten()
                    .ok_or(ProjectError::SceneNotFound(scene_number))
            }
            Err(TranslationError::Aborted) => {
                warn!("Translation aborted");
                Err(TranslationError::Aborted.into())
            }
            Err(e) => {
                if translator.stop_on_error() {
                    self.save_translation(None);
                }
                error!("Failed to translate scene {}", scene_number);
                Err(e.into())
            }
        }
    }
}

/// Compare a supplied setting against the stored value; a missing stored key
/// matches only a null supplied value
fn setting_matches(stored: Option<&Value>, supplied: &Value) -> bool {
    match stored {
        Some(value) => value == supplied,
        None => supplied.is_null(),
    }
}

/// Settings with no useful value are omitted from `project_settings`
fn is_empty_setting(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        _ => false,
    }
}

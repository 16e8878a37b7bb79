use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::subtitles::Subtitles;

/// Content and paths guarded by the state mutex
#[derive(Debug, Default)]
pub struct ProjectData {
    /// The owned subtitle document, once loaded
    pub subtitles: Option<Subtitles>,

    /// Normalized path of the project file, always ending in `.subtrans`
    pub project_file: Option<PathBuf>,
}

/// Shared project state.
///
/// One instance per run, shared between the foreground thread and at most one
/// background autosave thread. All content access that crosses that boundary
/// goes through the single mutex; the dirty flag is atomic so either side can
/// mark or take it without the content lock.
#[derive(Debug, Default)]
pub struct ProjectState {
    data: Mutex<ProjectData>,
    dirty: AtomicBool,
}

impl ProjectState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the content for the duration of the guard
    pub(crate) fn lock(&self) -> MutexGuard<'_, ProjectData> {
        self.data.lock()
    }

    /// Run a closure against the subtitles under the lock.
    /// Returns None if no subtitles are loaded.
    pub fn with_subtitles<R>(&self, f: impl FnOnce(&Subtitles) -> R) -> Option<R> {
        self.data.lock().subtitles.as_ref().map(f)
    }

    /// Run a closure against the subtitles mutably under the lock.
    /// Returns None if no subtitles are loaded.
    pub fn with_subtitles_mut<R>(&self, f: impl FnOnce(&mut Subtitles) -> R) -> Option<R> {
        self.data.lock().subtitles.as_mut().map(f)
    }

    /// Whether a document is loaded
    pub fn has_subtitles(&self) -> bool {
        self.data.lock().subtitles.is_some()
    }

    /// Replace the owned document
    pub fn set_subtitles(&self, subtitles: Subtitles) {
        self.data.lock().subtitles = Some(subtitles);
    }

    /// The project file path, if one has been derived or adopted
    pub fn project_file(&self) -> Option<PathBuf> {
        self.data.lock().project_file.clone()
    }

    /// Set the project file path
    pub fn set_project_file(&self, path: &Path) {
        self.data.lock().project_file = Some(path.to_path_buf());
    }

    /// Target language of the loaded document, if any
    pub fn target_language(&self) -> Option<String> {
        self.data.lock().subtitles.as_ref()?.target_language.clone()
    }

    /// Mark that the state has changed since the last checkpoint
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Whether the state has unpersisted changes
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Atomically read and clear the dirty flag.
    ///
    /// The flag is cleared before the caller performs the checkpoint write: a
    /// mutation landing during the write stays dirty for the next tick, and a
    /// mutation landing during this call may be picked up by the in-flight
    /// write. Scene-level synchronous saves carry the durability guarantee.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

use log::{error, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::app_config::TextEncoding;
use crate::errors::ProjectError;
use crate::file_utils::FileManager;
use crate::project::state::ProjectState;

/// Extension of the on-disk project file
pub const PROJECT_FILE_EXTENSION: &str = "subtrans";

/// Suffix appended to the project file path for backup copies
pub const BACKUP_SUFFIX: &str = "-backup";

/// Outcome of a project file read.
///
/// Missing and undecodable files are normal, recoverable conditions the
/// initializer resolves by falling back to a fresh source load; they are not
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectReadOutcome {
    /// The document was decoded and attached to the state
    Loaded {
        /// Number of scenes in the decoded document
        scenes: usize,
    },
    /// The file does not exist
    Missing,
    /// The file exists but could not be decoded
    Invalid,
}

/// Reads and writes the on-disk checkpoint of a project.
///
/// Constructed with an explicit text encoding; every read and write goes
/// through it. All operations take the state mutex for their duration, so
/// checkpoint writes are serialized with content mutation and with each
/// other, and each write replaces the file atomically.
#[derive(Debug, Clone, Copy)]
pub struct ProjectStore {
    encoding: TextEncoding,
}

impl ProjectStore {
    /// Create a store writing with the given encoding
    pub fn new(encoding: TextEncoding) -> Self {
        Self { encoding }
    }

    /// The encoding this store reads and writes with
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Derive the project file path for an input path by forcing the
    /// project-file extension
    pub fn project_file_path(path: &Path) -> PathBuf {
        let normalized = FileManager::normalize_path(path);
        match normalized.extension() {
            Some(ext) if ext == PROJECT_FILE_EXTENSION => normalized,
            _ => normalized.with_extension(PROJECT_FILE_EXTENSION),
        }
    }

    /// Derive the backup file path for a project path
    pub fn backup_file_path(path: &Path) -> PathBuf {
        let mut backup = Self::project_file_path(path).into_os_string();
        backup.push(BACKUP_SUFFIX);
        PathBuf::from(backup)
    }

    /// Write the full project document as a single complete file.
    ///
    /// Preconditions are fatal and checked before the target file is touched:
    /// a document must be loaded and must have at least one scene. When an
    /// explicit path is given and the state has no project path yet, the
    /// explicit path is adopted as canonical and the output path is
    /// recomputed from it. Clears the dirty flag on success.
    pub fn write(&self, state: &ProjectState, explicit: Option<&Path>) -> Result<PathBuf, ProjectError> {
        let mut data = state.lock();

        {
            let subtitles = data.subtitles.as_ref().ok_or(ProjectError::WriteWithoutSubtitles)?;
            if subtitles.scenes.is_empty() {
                return Err(ProjectError::WriteWithoutScenes);
            }
        }

        let target = match explicit {
            Some(path) => {
                let target = FileManager::normalize_path(path);
                if data.project_file.is_none() {
                    let canonical = Self::project_file_path(path);
                    if let Some(subtitles) = data.subtitles.as_mut() {
                        subtitles.update_output_path(&canonical);
                    }
                    data.project_file = Some(canonical);
                }
                target
            }
            None => data.project_file.clone().ok_or(ProjectError::MissingProjectPath)?,
        };

        info!("Writing project data to {:?}", target);

        let subtitles = data.subtitles.as_ref().ok_or(ProjectError::WriteWithoutSubtitles)?;
        let document = serde_json::to_string_pretty(subtitles)?;
        self.write_atomic(&target, &document)?;

        state.clear_dirty();
        Ok(target)
    }

    /// Write a backup copy of the project to `<projectfile>-backup`.
    ///
    /// Skipped silently when no document or project path exists yet.
    pub fn write_backup(&self, state: &ProjectState) -> Result<Option<PathBuf>, ProjectError> {
        let Some(project_file) = state.project_file() else {
            return Ok(None);
        };
        if !state.has_subtitles() {
            return Ok(None);
        }

        let backup = Self::backup_file_path(&project_file);
        self.write(state, Some(&backup)).map(Some)
    }

    /// Read a project file, sanitise the decoded document and attach it as
    /// the state's owned content.
    ///
    /// Returns a typed outcome rather than an error for missing or
    /// undecodable files; both are logged and handled by the caller's
    /// fresh-load fallback.
    pub fn read(&self, state: &ProjectState, explicit: Option<&Path>) -> ProjectReadOutcome {
        let mut data = state.lock();

        let path = match explicit.map(Path::to_path_buf).or_else(|| data.project_file.clone()) {
            Some(path) => path,
            None => {
                error!("No project file path to read from");
                return ProjectReadOutcome::Missing;
            }
        };

        info!("Reading project data from {:?}", path);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("Project file {:?} not found", path);
                return ProjectReadOutcome::Missing;
            }
            Err(e) => {
                error!("Unable to read project file {:?}: {}", path, e);
                return ProjectReadOutcome::Invalid;
            }
        };

        let text = match self.encoding.decode(&bytes) {
            Ok(text) => text,
            Err(e) => {
                error!("Error decoding project file: {}", e);
                return ProjectReadOutcome::Invalid;
            }
        };

        let mut subtitles: crate::subtitles::Subtitles = match serde_json::from_str(&text) {
            Ok(subtitles) => subtitles,
            Err(e) => {
                error!("Error decoding project file: {}", e);
                return ProjectReadOutcome::Invalid;
            }
        };

        subtitles.sanitise();
        let scenes = subtitles.scenes.len();
        data.subtitles = Some(subtitles);

        ProjectReadOutcome::Loaded { scenes }
    }

    /// Write the translated output file.
    ///
    /// The output path is the explicit override, the document's own output
    /// path, or a path derived from the project file (or source file) and
    /// the target language, in that order.
    pub fn save_translation(
        &self,
        state: &ProjectState,
        explicit: Option<&Path>,
        include_original: bool,
    ) -> Result<PathBuf, ProjectError> {
        let mut data = state.lock();
        let project_file = data.project_file.clone();

        let subtitles = data.subtitles.as_mut().ok_or(ProjectError::WriteWithoutSubtitles)?;

        if let Some(path) = explicit {
            subtitles.output_path = Some(path.to_path_buf());
        }

        if subtitles.output_path.is_none() {
            if let Some(project_file) = &project_file {
                subtitles.update_output_path(project_file);
            } else if let Some(source) = subtitles.source_path.clone() {
                subtitles.update_output_path(&source);
            }
        }

        let output_path = subtitles.output_path.clone().ok_or(ProjectError::MissingProjectPath)?;

        if !subtitles.any_translated() {
            return Err(ProjectError::NothingToSave);
        }

        let rendered = subtitles.render_translation(include_original);
        FileManager::write_string(&output_path, &rendered, self.encoding)
            .map_err(|e| std::io::Error::other(format!("{:#}", e)))?;

        info!(
            "Saved translation ({}/{} lines) to {:?}",
            subtitles.translated_count(),
            subtitles.line_count(),
            output_path
        );

        Ok(output_path)
    }

    /// Replace a file atomically: write to a temp file in the target
    /// directory, then rename over the destination.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<(), ProjectError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        FileManager::ensure_dir(&dir).map_err(|e| {
            std::io::Error::other(format!("{:#}", e))
        })?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&self.encoding.encode(content))?;
        tmp.persist(path).map_err(|e| ProjectError::Io(e.error))?;

        Ok(())
    }
}

/*!
 * Subtitle document handling.
 *
 * This module provides:
 * - `Subtitles`: the document a project owns — scenes, settings, languages
 *   and paths, serialised as a whole into the project file
 * - scene segmentation and batching of freshly loaded source files
 * - SRT parsing and rendering (`srt`)
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::app_config::TextEncoding;
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::language_utils;

pub mod model;
pub mod srt;

pub use model::{Batch, Line, Scene};

/// Fallback language tag for output paths when no target language is known
const DEFAULT_OUTPUT_TAG: &str = "translated";

/// Scene segmentation and batching thresholds
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    /// Gap between consecutive lines that starts a new scene, in milliseconds
    pub scene_threshold_ms: u64,

    /// Maximum number of lines per batch
    pub max_batch_size: usize,
}

impl Batcher {
    /// Group lines into scenes split on timeline gaps, then into batches of
    /// bounded size
    pub fn batch(&self, lines: Vec<Line>) -> Vec<Scene> {
        let mut scenes: Vec<Scene> = Vec::new();

        for line in lines {
            let start_new_scene = match scenes.last().and_then(|s| s.batches.last()) {
                Some(batch) => match batch.lines.last() {
                    Some(last) => line.start_ms.saturating_sub(last.end_ms) >= self.scene_threshold_ms,
                    None => false,
                },
                None => true,
            };

            if start_new_scene {
                let mut scene = Scene::new(scenes.len() + 1);
                scene.batches.push(Batch::new(1));
                scenes.push(scene);
            }

            let scene = scenes.last_mut().unwrap();
            let needs_new_batch = scene
                .batches
                .last()
                .is_some_and(|b| b.lines.len() >= self.max_batch_size.max(1));
            if needs_new_batch {
                let number = scene.batches.len() + 1;
                scene.batches.push(Batch::new(number));
            }

            scene.batches.last_mut().unwrap().lines.push(line);
        }

        scenes
    }
}

/// A subtitle document: the content a project owns and checkpoints.
///
/// Serialised in full (scenes, settings, languages, paths) as the project
/// file. Settings use a sorted map so the encoded document is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Subtitles {
    /// Path of the source subtitle file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,

    /// Path the translated output is written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Source language code, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,

    /// Target language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,

    /// Project settings stored alongside the content
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,

    /// The scenes making up the document
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Subtitles {
    /// Load a document from a source SRT file
    pub fn load(
        path: &Path,
        encoding: TextEncoding,
        batcher: &Batcher,
    ) -> Result<Self, SubtitleError> {
        let content = FileManager::read_to_string(path, encoding).map_err(|e| {
            SubtitleError::UnreadableFile {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            }
        })?;

        let lines = srt::parse(&content)?;
        debug!("Loaded {} lines from {:?}", lines.len(), path);

        let mut subtitles = Self::from_lines(lines, batcher);
        subtitles.source_path = Some(path.to_path_buf());
        Ok(subtitles)
    }

    /// Build a document from parsed lines
    pub fn from_lines(lines: Vec<Line>, batcher: &Batcher) -> Self {
        Self {
            scenes: batcher.batch(lines),
            ..Self::default()
        }
    }

    /// Whether the document has any translatable lines
    pub fn has_subtitles(&self) -> bool {
        self.line_count() > 0
    }

    /// Total number of lines
    pub fn line_count(&self) -> usize {
        self.scenes.iter().map(Scene::line_count).sum()
    }

    /// Number of translated lines
    pub fn translated_count(&self) -> usize {
        self.scenes
            .iter()
            .flat_map(Scene::lines)
            .filter(|l| l.is_translated())
            .count()
    }

    /// Whether any line has been translated
    pub fn any_translated(&self) -> bool {
        self.scenes.iter().any(Scene::any_translated)
    }

    /// Look up a scene by number
    pub fn scene(&self, number: usize) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.number == number)
    }

    /// Look up a scene by number, mutably
    pub fn scene_mut(&mut self, number: usize) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.number == number)
    }

    /// Iterate over every line in the document
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.scenes.iter().flat_map(Scene::lines)
    }

    /// Repair internal consistency after loading a project file.
    ///
    /// Drops empty batches and scenes, restores line order within each batch
    /// and renumbers scenes and batches sequentially.
    pub fn sanitise(&mut self) {
        for scene in &mut self.scenes {
            scene.batches.retain(|b| !b.lines.is_empty());
            for batch in &mut scene.batches {
                batch.lines.sort_by_key(|l| l.start_ms);
            }
        }

        self.scenes.retain(|s| !s.batches.is_empty());

        for (scene_index, scene) in self.scenes.iter_mut().enumerate() {
            scene.number = scene_index + 1;
            for (batch_index, batch) in scene.batches.iter_mut().enumerate() {
                batch.number = batch_index + 1;
            }
        }
    }

    /// Merge new settings into the document.
    ///
    /// Recognized keys are mirrored into their dedicated fields.
    pub fn update_settings(&mut self, settings: &BTreeMap<String, serde_json::Value>) {
        for (key, value) in settings {
            self.settings.insert(key.clone(), value.clone());
        }

        if let Some(lang) = self.settings.get("target_language").and_then(|v| v.as_str()) {
            if !lang.is_empty() {
                self.target_language = Some(lang.to_string());
            }
        }
    }

    /// Recompute the output path from the project file location and the
    /// target language
    pub fn update_output_path(&mut self, project_file: &Path) {
        self.output_path = Some(FileManager::generate_output_path(
            project_file,
            &self.output_language_tag(),
            "srt",
        ));
    }

    /// Language tag used in the output file name
    fn output_language_tag(&self) -> String {
        let Some(language) = self.target_language.as_deref() else {
            return DEFAULT_OUTPUT_TAG.to_string();
        };

        language_utils::normalize_to_part1_or_part2t(language)
            .unwrap_or_else(|_| language.trim().to_lowercase())
    }

    /// Render the translated document as SRT
    pub fn render_translation(&self, include_original: bool) -> String {
        srt::render(self.lines(), include_original)
    }
}

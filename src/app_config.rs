use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the options consumed by the project engine: run mode,
/// autosave policy, backup policy, text encoding and batching thresholds.
/// Options are serde-backed so they can be loaded from a JSON file and
/// overridden from the command line.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectOptions {
    /// Project mode string ("", "true", "write", "read", "reload", "resume",
    /// "retranslate", "reparse", "preview")
    #[serde(default)]
    pub project_mode: String,

    /// Whether the background autosave loop should run during a translation
    #[serde(default = "default_autosave")]
    pub autosave: bool,

    /// Autosave interval in seconds
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Include the original text in the translated output
    #[serde(default)]
    pub include_original: bool,

    /// Write a backup copy of the project file after loading it
    #[serde(default)]
    pub write_backup: bool,

    /// Text encoding used for all file reads and writes
    #[serde(default)]
    pub encoding: TextEncoding,

    /// Target language code (ISO 639-1 or 639-2)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Optional movie name to store in the project settings
    #[serde(default)]
    pub movie_name: Option<String>,

    /// Seconds of silence between lines that starts a new scene
    #[serde(default = "default_scene_threshold_secs")]
    pub scene_threshold_secs: f64,

    /// Maximum number of lines per batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            project_mode: String::new(),
            autosave: default_autosave(),
            autosave_interval_secs: default_autosave_interval_secs(),
            include_original: false,
            write_backup: false,
            encoding: TextEncoding::default(),
            target_language: default_target_language(),
            movie_name: None,
            scene_threshold_secs: default_scene_threshold_secs(),
            max_batch_size: default_max_batch_size(),
            log_level: LogLevel::default(),
        }
    }
}

impl ProjectOptions {
    /// Load options from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let options: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a file if it exists, otherwise return defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate option values
    pub fn validate(&self) -> Result<()> {
        if self.autosave_interval_secs == 0 {
            return Err(anyhow!("Autosave interval must be at least one second"));
        }

        if self.max_batch_size == 0 {
            return Err(anyhow!("Maximum batch size must be at least one line"));
        }

        if self.scene_threshold_secs <= 0.0 {
            return Err(anyhow!("Scene threshold must be positive"));
        }

        if self.target_language.is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }

        Ok(())
    }
}

/// Text encoding for file reads and writes.
///
/// Threaded explicitly into the project store at construction rather than
/// read from the process environment.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Plain UTF-8
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-8 with a byte order mark, written by some subtitle tools
    #[serde(rename = "utf-8-bom")]
    Utf8Bom,
}

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

impl TextEncoding {
    /// Encode a string into the bytes this encoding writes to disk
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf8Bom => {
                let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
                bytes.extend_from_slice(&UTF8_BOM);
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
        }
    }

    /// Decode file bytes into a string, stripping a leading BOM if present
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
        String::from_utf8(bytes.to_vec()).map_err(|e| anyhow!("Invalid UTF-8 content: {}", e))
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Utf8Bom => write!(f, "utf-8-bom"),
        }
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-8-bom" | "utf8-bom" => Ok(Self::Utf8Bom),
            _ => Err(anyhow!("Unsupported encoding: {}", s)),
        }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_autosave() -> bool {
    true
}

fn default_autosave_interval_secs() -> u64 {
    20
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_scene_threshold_secs() -> f64 {
    30.0
}

fn default_max_batch_size() -> usize {
    100
}

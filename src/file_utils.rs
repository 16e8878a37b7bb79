use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_config::TextEncoding;

// @module: File and path utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a translated subtitle next to the input file
    // @params: input_file, target_language, extension
    pub fn generate_output_path<P: AsRef<Path>>(
        input_file: P,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push('.');
        output_filename.push_str(extension);

        match input_file.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        }
    }

    /// Read a file to a string using the given encoding
    pub fn read_to_string<P: AsRef<Path>>(path: P, encoding: TextEncoding) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        encoding.decode(&bytes)
    }

    /// Write a string to a file using the given encoding
    pub fn write_string<P: AsRef<Path>>(path: P, content: &str, encoding: TextEncoding) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, encoding.encode(content))
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Normalize a path without touching the filesystem.
    ///
    /// Resolves `.` and `..` components lexically, the same way the project
    /// file path is derived from the input path.
    pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut normalized = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                std::path::Component::CurDir => {}
                std::path::Component::ParentDir => {
                    if !normalized.pop() {
                        normalized.push(component.as_os_str());
                    }
                }
                other => normalized.push(other.as_os_str()),
            }
        }
        normalized
    }
}

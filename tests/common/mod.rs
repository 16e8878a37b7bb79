/*!
 * Common test utilities for the subtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use subtrans::app_config::ProjectOptions;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing.
///
/// The 50 second gap before the last entry starts a second scene with the
/// default scene threshold.
pub fn create_test_subtitle(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.

4
00:01:04,000 --> 00:01:06,000
A new scene starts here.
"#;
    create_test_file(dir, filename, content)
}

/// Number of entries in the sample subtitle file
pub const TEST_SUBTITLE_LINES: usize = 4;

/// Number of scenes the sample subtitle file segments into
pub const TEST_SUBTITLE_SCENES: usize = 2;

/// Project options for tests: autosave off so no background thread runs
/// unless a test asks for one
pub fn test_options(project_mode: &str) -> ProjectOptions {
    ProjectOptions {
        project_mode: project_mode.to_string(),
        autosave: false,
        target_language: "fr".to_string(),
        ..ProjectOptions::default()
    }
}

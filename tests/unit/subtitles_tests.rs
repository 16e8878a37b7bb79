/*!
 * Tests for subtitle document loading, segmentation and rendering
 */

use anyhow::Result;

use subtrans::app_config::TextEncoding;
use subtrans::{Batcher, Subtitles};

use crate::common;

fn default_batcher() -> Batcher {
    Batcher {
        scene_threshold_ms: 30_000,
        max_batch_size: 100,
    }
}

#[test]
fn test_load_withSampleFile_shouldSegmentIntoScenes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    let subtitles = Subtitles::load(&source, TextEncoding::Utf8, &default_batcher())?;

    assert!(subtitles.has_subtitles());
    assert_eq!(subtitles.line_count(), common::TEST_SUBTITLE_LINES);
    assert_eq!(subtitles.scenes.len(), common::TEST_SUBTITLE_SCENES);
    assert_eq!(subtitles.source_path.as_deref(), Some(source.as_path()));

    Ok(())
}

#[test]
fn test_load_withSmallMaxBatchSize_shouldSplitBatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    let batcher = Batcher {
        scene_threshold_ms: 30_000,
        max_batch_size: 2,
    };
    let subtitles = Subtitles::load(&source, TextEncoding::Utf8, &batcher)?;

    // First scene has three lines: two batches of 2 and 1
    assert_eq!(subtitles.scenes[0].batches.len(), 2);
    assert_eq!(subtitles.scenes[0].batches[0].line_count(), 2);
    assert_eq!(subtitles.scenes[0].batches[1].line_count(), 1);

    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("absent.srt");

    let result = Subtitles::load(&missing, TextEncoding::Utf8, &default_batcher());
    assert!(result.is_err());

    Ok(())
}

#[test]
fn test_translatedCount_shouldTrackTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    let mut subtitles = Subtitles::load(&source, TextEncoding::Utf8, &default_batcher())?;
    assert_eq!(subtitles.translated_count(), 0);
    assert!(!subtitles.any_translated());

    subtitles.scenes[0].batches[0].lines[0].translation = Some("Bonjour".to_string());
    assert_eq!(subtitles.translated_count(), 1);
    assert!(subtitles.any_translated());

    Ok(())
}

#[test]
fn test_renderTranslation_withIncludeOriginal_shouldEmitBothTexts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    let mut subtitles = Subtitles::load(&source, TextEncoding::Utf8, &default_batcher())?;
    subtitles.scenes[0].batches[0].lines[0].translation = Some("Bonjour".to_string());

    let rendered = subtitles.render_translation(true);
    assert!(rendered.contains("Bonjour"));
    assert!(rendered.contains("<i>This is a test subtitle.</i>"));

    Ok(())
}

/*!
 * Integration tests for translation orchestration: priming, event-driven
 * saves, rescue-saves, aborts and autosave interleaving
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use subtrans::project::{ProjectReadOutcome, ProjectStore, SubtitleProject};
use subtrans::translator::{MockTranslator, SubtitleTranslator};
use subtrans::{ProjectError, TextEncoding};

use crate::common;

fn expected_output_path(temp_dir: &Path) -> PathBuf {
    temp_dir.join("movie.fr.srt")
}

/// Set up a project over the sample subtitle file with the target language
/// applied, as the CLI driver would
fn prepared_project(
    temp_dir: &PathBuf,
    mode: &str,
) -> Result<(SubtitleProject, PathBuf)> {
    let source = common::create_test_subtitle(temp_dir, "movie.srt")?;

    let mut project = SubtitleProject::new(common::test_options(mode));
    project.initialise(&source, None, false)?;
    project.state().with_subtitles_mut(|subtitles| {
        subtitles.target_language = Some("fr".to_string());
    });

    Ok((project, source))
}

#[test]
fn test_translateSubtitles_withWorkingTranslator_shouldTranslateAndSave() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "write")?;

    let mut translator = MockTranslator::working();
    project.translate_subtitles(&mut translator)?;

    // Every line translated
    let translated = project
        .state()
        .with_subtitles(|s| s.translated_count())
        .unwrap_or(0);
    assert_eq!(translated, common::TEST_SUBTITLE_LINES);

    // Project file and translated output both on disk
    assert!(temp_dir.path().join("movie.subtrans").exists());
    let output = expected_output_path(temp_dir.path());
    let content = fs::read_to_string(&output)?;
    assert!(content.contains("[TRANSLATED] This is a test subtitle."));

    Ok(())
}

#[test]
fn test_translateSubtitles_withNoContent_shouldFailFast() {
    let project = SubtitleProject::new(common::test_options("write"));
    let mut translator = MockTranslator::working();

    let result = project.translate_subtitles(&mut translator);
    assert!(matches!(result, Err(ProjectError::NoContent { .. })));
}

/// The project file is primed before any translation work begins, so even an
/// immediately failing run leaves a checkpoint behind
#[test]
fn test_translateSubtitles_withImmediateFailure_shouldStillPrimeProjectFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "write")?;

    let mut translator = MockTranslator::failing().with_stop_on_error(false);
    let result = project.translate_subtitles(&mut translator);

    assert!(result.is_err());
    assert!(temp_dir.path().join("movie.subtrans").exists());

    Ok(())
}

/// A completed scene is saved immediately, with autosave disabled, so its
/// translation survives whatever happens afterwards
#[test]
fn test_translateSubtitles_withFailureAfterFirstScene_shouldKeepSceneOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "")?;

    // No rescue-save: the only save comes from the scene-completed event
    let mut translator = MockTranslator::fail_after_scenes(1).with_stop_on_error(false);
    let result = project.translate_subtitles(&mut translator);
    assert!(result.is_err());
    assert!(!result.unwrap_err().is_aborted());

    let content = fs::read_to_string(expected_output_path(temp_dir.path()))?;
    // Scene 1 is translated, scene 2 falls back to source text
    assert!(content.contains("[TRANSLATED] This is a test subtitle."));
    assert!(content.contains("A new scene starts here."));
    assert!(!content.contains("[TRANSLATED] A new scene starts here."));

    Ok(())
}

/// An abort propagates unchanged and performs no rescue-save
#[test]
fn test_translateSubtitles_withAbort_shouldNotSaveAnything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "")?;

    let mut translator = MockTranslator::abort_after_batches(0);
    let result = project.translate_subtitles(&mut translator);

    assert!(matches!(&result, Err(e) if e.is_aborted()));
    assert!(!expected_output_path(temp_dir.path()).exists());

    Ok(())
}

/// A mid-scene failure with stop-on-error triggers a best-effort rescue-save
#[test]
fn test_translateSubtitles_withStopOnError_shouldRescueSavePartialProgress() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    // Two batches in the first scene so the failure lands mid-scene and no
    // scene-completed save happens
    let mut options = common::test_options("");
    options.max_batch_size = 2;
    let mut project = SubtitleProject::new(options);
    project.initialise(&source, None, false)?;
    project.state().with_subtitles_mut(|subtitles| {
        subtitles.target_language = Some("fr".to_string());
    });

    let mut translator = MockTranslator::fail_after_batches(1).with_stop_on_error(true);
    let result = project.translate_subtitles(&mut translator);
    assert!(result.is_err());

    let content = fs::read_to_string(expected_output_path(temp_dir.path()))?;
    assert!(content.contains("[TRANSLATED] This is a test subtitle."));

    Ok(())
}

/// The same mid-scene failure without stop-on-error saves nothing
#[test]
fn test_translateSubtitles_withoutStopOnError_shouldNotRescueSave() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    let mut options = common::test_options("");
    options.max_batch_size = 2;
    let mut project = SubtitleProject::new(options);
    project.initialise(&source, None, false)?;

    let mut translator = MockTranslator::fail_after_batches(1).with_stop_on_error(false);
    let result = project.translate_subtitles(&mut translator);
    assert!(result.is_err());

    assert!(!expected_output_path(temp_dir.path()).exists());

    Ok(())
}

/// Event handlers never leak across calls, whatever the exit path
#[test]
fn test_translateSubtitles_onEveryExitPath_shouldUnsubscribeHandlers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "")?;

    for mut translator in [
        MockTranslator::working(),
        MockTranslator::failing().with_stop_on_error(false),
        MockTranslator::abort_after_batches(0),
    ] {
        let _ = project.translate_subtitles(&mut translator);

        let events = translator.events();
        assert_eq!(events.preprocessed.handler_count(), 0);
        assert_eq!(events.batch_translated.handler_count(), 0);
        assert_eq!(events.scene_translated.handler_count(), 0);
    }

    Ok(())
}

/// Translator events are forwarded to the project's own bus
#[test]
fn test_translateSubtitles_shouldForwardEventsToProjectBus() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "")?;

    let batches = Arc::new(AtomicUsize::new(0));
    let scenes = Arc::new(AtomicUsize::new(0));

    let events = project.events();
    let batches_clone = Arc::clone(&batches);
    let _batch = events
        .batch_translated
        .subscribe_scoped(move |_| {
            batches_clone.fetch_add(1, Ordering::SeqCst);
        });
    let scenes_clone = Arc::clone(&scenes);
    let _scene = events
        .scene_translated
        .subscribe_scoped(move |_| {
            scenes_clone.fetch_add(1, Ordering::SeqCst);
        });

    let mut translator = MockTranslator::working();
    project.translate_subtitles(&mut translator)?;

    assert_eq!(batches.load(Ordering::SeqCst), common::TEST_SUBTITLE_SCENES);
    assert_eq!(scenes.load(Ordering::SeqCst), common::TEST_SUBTITLE_SCENES);

    Ok(())
}

/// Reparse mode writes explicitly but never marks the state dirty mid-run
#[test]
fn test_translateSubtitles_withReparseMode_shouldNotDirtyState() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;

    // Reparse needs an existing project file to read
    let mut first = SubtitleProject::new(common::test_options("write"));
    first.initialise(&source, None, false)?;
    first.write_project_file(None)?;

    let mut project = SubtitleProject::new(common::test_options("reparse"));
    project.initialise(&source, None, false)?;
    assert!(!project.flags().update_project);

    let mut translator = MockTranslator::working();
    project.translate_subtitles(&mut translator)?;

    // No dirty-triggered checkpoint can occur without update mode
    assert!(!project.state().is_dirty());

    // An explicit write still succeeds
    project.write_project_file(None)?;

    Ok(())
}

#[test]
fn test_translateScene_shouldTranslateOnlyThatScene() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "")?;

    let mut translator = MockTranslator::working();
    let scene = project.translate_scene(&mut translator, 2, None, None)?;

    assert_eq!(scene.number, 2);
    assert!(scene.all_translated());

    // Scene 1 is untouched
    let scene1_translated = project
        .state()
        .with_subtitles(|s| s.scene(1).is_some_and(|scene| scene.any_translated()))
        .unwrap_or(false);
    assert!(!scene1_translated);

    // The translation output was saved
    assert!(expected_output_path(temp_dir.path()).exists());

    Ok(())
}

#[test]
fn test_translateScene_withUnknownScene_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (project, _) = prepared_project(&temp_dir.path().to_path_buf(), "")?;

    let mut translator = MockTranslator::working();
    let result = project.translate_scene(&mut translator, 99, None, None);

    assert!(matches!(
        result,
        Err(ProjectError::Translation(
            subtrans::TranslationError::SceneNotFound(99)
        ))
    ));

    Ok(())
}

/// A dirty state is checkpointed by the background loop without any
/// foreground write
#[test]
fn test_autosave_withDirtyState_shouldCheckpointInBackground() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;
    let project_file = temp_dir.path().join("movie.subtrans");

    let mut options = common::test_options("write");
    options.autosave = true;
    options.autosave_interval_secs = 1;
    let mut project = SubtitleProject::new(options);
    project.initialise(&source, None, false)?;
    assert!(project.autosave_running());
    assert!(!project_file.exists());

    project.state().with_subtitles_mut(|subtitles| {
        subtitles.scenes[0].batches[0].lines[0].translation = Some("Bonjour".to_string());
    });
    project.mark_for_update()?;

    std::thread::sleep(Duration::from_millis(1_500));
    project.stop_autosave();

    assert!(project_file.exists());
    assert!(!project.state().is_dirty());

    let content = fs::read_to_string(&project_file)?;
    assert!(content.contains("Bonjour"));

    Ok(())
}

/// Concurrent autosave ticks and explicit writes never interleave: the file
/// on disk is always one complete, decodable document
#[test]
fn test_autosave_withConcurrentForegroundWrites_shouldKeepFileDecodable() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "movie.srt")?;
    let project_file = temp_dir.path().join("movie.subtrans");

    let mut options = common::test_options("write");
    options.autosave = true;
    options.autosave_interval_secs = 1;
    let mut project = SubtitleProject::new(options);
    project.initialise(&source, None, false)?;

    for i in 0..60 {
        project.state().with_subtitles_mut(|subtitles| {
            subtitles.scenes[0].batches[0].lines[0].translation = Some(format!("Version {}", i));
        });
        project.mark_for_update()?;
        project.write_project_file(None)?;
        std::thread::sleep(Duration::from_millis(20));
    }

    project.stop_autosave();

    let store = ProjectStore::new(TextEncoding::Utf8);
    let state = subtrans::ProjectState::new();
    assert_eq!(
        store.read(&state, Some(&project_file)),
        ProjectReadOutcome::Loaded {
            scenes: common::TEST_SUBTITLE_SCENES
        }
    );

    Ok(())
}

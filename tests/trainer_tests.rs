//! Tests of the trainer options and of free play.

use anyhow::Result;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::{fs, sync::Arc};
use tempfile::tempdir;
use ustr::Ustr;

use rawl_piano::{
    Trainer,
    data::{ColorMode, NoteEvent, TaskStatus, TrainerOptions},
    options_manager::{LocalOptionsManager, OPTIONS_FILE_NAME, OptionsManager},
    testutil::{PlayerEvent, RecordingPlayer},
};

/// Verifies that the trainer reads its options from a file.
#[test]
fn options_from_file() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join(OPTIONS_FILE_NAME);
    let mut manager = LocalOptionsManager { path: path.clone() };
    manager.set_options(&TrainerOptions {
        auto_advance: false,
        first_lesson: 3,
        ..Default::default()
    })?;

    let player = Arc::new(Mutex::new(RecordingPlayer::default()));
    let trainer = Trainer::from_options_file(&path, player)?;
    assert!(!trainer.options().auto_advance);
    assert_eq!(
        trainer.active_task_id(),
        Some(Ustr::from("play-chromatic-ascending"))
    );
    assert_eq!(trainer.active_color_mode(), ColorMode::FlatChromatic);

    // Without auto-advance the next task is reached but not activated.
    assert_eq!(
        trainer.skip_task("play-chromatic-ascending"),
        Some(Ustr::from("play-chromatic-descending"))
    );
    assert_eq!(
        trainer.active_task_id(),
        Some(Ustr::from("play-chromatic-ascending"))
    );
    assert_eq!(
        trainer
            .get_progress("play-chromatic-descending")
            .map(|progress| progress.status),
        Some(TaskStatus::Active)
    );
    Ok(())
}

/// Verifies that missing fields and missing files fall back to the defaults.
#[test]
fn partial_and_missing_options() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join(OPTIONS_FILE_NAME);
    let player = Arc::new(Mutex::new(RecordingPlayer::default()));

    let trainer = Trainer::from_options_file(&path, player.clone())?;
    assert_eq!(trainer.options(), &TrainerOptions::default());

    fs::write(&path, r#"{ "first_lesson": 2 }"#)?;
    let trainer = Trainer::from_options_file(&path, player)?;
    assert!(trainer.options().auto_advance);
    assert_eq!(trainer.options().first_lesson, 2);
    assert_eq!(trainer.active_task_id(), Some(Ustr::from("play-c-sharp")));
    Ok(())
}

/// Verifies that an options file with a note outside the octave is rejected.
#[test]
fn invalid_free_play_note() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join(OPTIONS_FILE_NAME);
    fs::write(&path, r#"{ "free_play_start": { "note": 15, "octave": 3 } }"#)?;

    let player = Arc::new(Mutex::new(RecordingPlayer::default()));
    assert!(Trainer::from_options_file(&path, player).is_err());
    Ok(())
}

/// Verifies that a trainer cannot open a lesson that does not exist.
#[test]
fn unknown_first_lesson() {
    let options = TrainerOptions {
        first_lesson: 42,
        ..Default::default()
    };
    assert!(Trainer::new_silent(options).is_err());
}

/// Verifies the chromatic layout used in the free-play lesson.
#[test]
fn free_play() -> Result<()> {
    let player = Arc::new(Mutex::new(RecordingPlayer::default()));
    let options = TrainerOptions {
        free_play_start: NoteEvent::new(9, 2),
        free_play_color_mode: ColorMode::Traditional,
        first_lesson: 10,
        ..Default::default()
    };
    let trainer = Trainer::new(options, player.clone())?;
    assert_eq!(trainer.active_task_id(), None);
    assert!(trainer.is_lesson_complete());
    assert_eq!(trainer.active_color_mode(), ColorMode::Traditional);

    let mapping = trainer.active_keyboard_mapping();
    assert_eq!(mapping.len(), 45);
    assert_eq!(mapping.get(&Ustr::from("KeyZ")), Some(NoteEvent::new(9, 2)));

    let outcome = trainer.on_key_down("KeyX");
    assert_eq!(outcome.played_note, Some(NoteEvent::new(10, 2)));
    assert_eq!(outcome.progress, None);
    let outcome = trainer.on_key_up("KeyX");
    assert_eq!(outcome.released_note, Some(NoteEvent::new(10, 2)));
    assert!(outcome.completed_tasks.is_empty());

    assert_eq!(
        player.lock().events,
        vec![
            PlayerEvent::Played(NoteEvent::new(10, 2)),
            PlayerEvent::Released(NoteEvent::new(10, 2)),
        ]
    );
    assert!(trainer.get_task_progress().is_empty());
    Ok(())
}

/// Verifies that the mapping of a task can be inspected before it is active.
#[test]
fn inspect_task_mapping() -> Result<()> {
    let trainer = Trainer::new_silent(TrainerOptions::default())?;
    let mapping = trainer
        .get_active_keyboard_mapping("play-d-across-octaves")
        .unwrap_or_default();
    assert_eq!(mapping.len(), 8);
    assert_eq!(mapping.get(&Ustr::from("KeyX")), Some(NoteEvent::new(2, 2)));
    assert_eq!(trainer.get_active_keyboard_mapping("missing"), None);
    Ok(())
}

//! Rawl Piano turns a computer keyboard into a piano and walks a learner through a series of
//! lessons. Each lesson is a chain of tasks, such as playing every B across four octaves or playing
//! a scale from its tonic to the octave above. A task defines the notes the learner must play, the
//! order in which they must be played if any, and the mapping from the physical keys to the notes
//! while the task is in focus.
//!
//! The crate contains the core of the trainer: the note model, the generators of chromatic runs,
//! interval ladders, scales and chords, a small text format to lay out notes over the rows of the
//! keyboard, the registry of lessons and tasks, and the session that turns key presses into notes
//! and progress. Sound and rendering live outside the crate. The session notifies an injected
//! [`NotePlayer`](player::NotePlayer) of every note and leaves the drawing to the host.

pub mod catalog;
pub mod checker;
pub mod data;
pub mod error;
pub mod keyboard;
pub mod options_manager;
pub mod player;
pub mod registry;
pub mod sequence_generator;
pub mod session;
pub mod testutil;

use anyhow::{Context, Result, anyhow};
use parking_lot::{Mutex, RwLock};
use std::{path::Path, sync::Arc};
use tracing::info;
use ustr::Ustr;

use data::{
    ColorMode, KeyboardMapping, Lesson, LessonDefinition, LessonId, TaskConfig, TaskId,
    TaskProgress, TrainerOptions,
};
use error::{RegistryError, SessionError};
use options_manager::LocalOptionsManager;
use player::{NotePlayer, SilentPlayer};
use registry::{InMemoryTaskRegistry, TaskRegistry};
use session::{KeyDownOutcome, KeyUpOutcome, PracticeSession};

/// The trainer ties the registry of lessons to a practice session. It is the entry point for hosts
/// that forward key events and render the state of the session.
pub struct Trainer {
    /// The options the trainer was created with.
    options: TrainerOptions,

    /// The lessons and tasks.
    registry: Arc<dyn TaskRegistry + Send + Sync>,

    /// The session that tracks the progress of the learner.
    session: Arc<RwLock<PracticeSession>>,
}

impl Trainer {
    /// Creates a trainer over the given lessons and starts the lesson named in the options.
    pub fn with_lessons(
        lessons: Vec<LessonDefinition>,
        options: TrainerOptions,
        player: Arc<Mutex<dyn NotePlayer + Send>>,
    ) -> Result<Trainer> {
        let registry: Arc<dyn TaskRegistry + Send + Sync> =
            Arc::new(InMemoryTaskRegistry::new(lessons).context("invalid lessons")?);
        if registry.get_lesson(options.first_lesson).is_none() {
            return Err(anyhow!(
                "the first lesson {} does not exist",
                options.first_lesson
            ));
        }

        let mut session = PracticeSession::new(registry.clone(), player, options.clone())
            .context("cannot build the free-play mapping")?;
        let first_task = session.start_lesson(options.first_lesson)?;
        info!(
            lesson_id = options.first_lesson,
            task_id = ?first_task,
            "created trainer"
        );

        Ok(Trainer {
            options,
            registry,
            session: Arc::new(RwLock::new(session)),
        })
    }

    /// Creates a trainer over the built-in lessons.
    pub fn new(
        options: TrainerOptions,
        player: Arc<Mutex<dyn NotePlayer + Send>>,
    ) -> Result<Trainer> {
        Self::with_lessons(catalog::lessons()?, options, player)
    }

    /// Creates a trainer over the built-in lessons that makes no sound.
    pub fn new_silent(options: TrainerOptions) -> Result<Trainer> {
        Self::new(options, Arc::new(Mutex::new(SilentPlayer)))
    }

    /// Creates a trainer over the built-in lessons with the options stored in the given file. The
    /// default options are used if the file does not exist.
    pub fn from_options_file(
        path: &Path,
        player: Arc<Mutex<dyn NotePlayer + Send>>,
    ) -> Result<Trainer> {
        let manager = LocalOptionsManager {
            path: path.to_path_buf(),
        };
        let options = manager.get_or_default()?;
        Self::new(options, player)
    }

    /// Returns the options the trainer was created with.
    #[must_use]
    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    /// Returns a handle to the practice session.
    #[must_use]
    pub fn session(&self) -> Arc<RwLock<PracticeSession>> {
        self.session.clone()
    }

    /// Handles a key being pressed.
    pub fn on_key_down(&self, key_id: &str) -> KeyDownOutcome {
        self.session.write().on_key_down(key_id)
    }

    /// Handles a key being released.
    pub fn on_key_up(&self, key_id: &str) -> KeyUpOutcome {
        self.session.write().on_key_up(key_id)
    }

    /// Makes the lesson the current one and activates its first task that is not completed.
    pub fn start_lesson(&self, lesson_id: LessonId) -> Result<Option<TaskId>, SessionError> {
        self.session.write().start_lesson(lesson_id)
    }

    /// Makes the given task the active one.
    pub fn activate_task(&self, task_id: &str) -> Result<(), SessionError> {
        self.session.write().activate_task(task_id)
    }

    /// Completes the task without playing it and returns the next task.
    pub fn skip_task(&self, task_id: &str) -> Option<TaskId> {
        self.session.write().skip_task(task_id)
    }

    /// Returns the task that receives the notes.
    #[must_use]
    pub fn active_task_id(&self) -> Option<TaskId> {
        self.session.read().active_task_id()
    }

    /// Returns the mapping currently resolving the keys.
    #[must_use]
    pub fn active_keyboard_mapping(&self) -> KeyboardMapping {
        self.session.read().active_keyboard_mapping()
    }

    /// Returns the mapping that resolves the keys while the given task is active.
    #[must_use]
    pub fn get_active_keyboard_mapping(&self, task_id: &str) -> Option<KeyboardMapping> {
        self.session.read().get_active_keyboard_mapping(task_id)
    }

    /// Returns the color scheme for the current mapping.
    #[must_use]
    pub fn active_color_mode(&self) -> ColorMode {
        self.session.read().active_color_mode()
    }

    /// Returns the progress of every task reached so far.
    #[must_use]
    pub fn get_task_progress(&self) -> Vec<TaskProgress> {
        self.session.read().get_task_progress()
    }

    /// Returns the progress of a single task.
    #[must_use]
    pub fn get_progress(&self, task_id: &str) -> Option<TaskProgress> {
        self.session.read().get_progress(task_id)
    }

    /// Returns the lesson the learner is working on.
    #[must_use]
    pub fn current_lesson(&self) -> Option<Lesson> {
        self.session.read().current_lesson()
    }

    /// Returns whether every task of the current lesson is completed.
    #[must_use]
    pub fn is_lesson_complete(&self) -> bool {
        self.session.read().is_lesson_complete()
    }
}

impl TaskRegistry for Trainer {
    fn get_task(&self, task_id: &Ustr) -> Option<Arc<TaskConfig>> {
        self.registry.get_task(task_id)
    }

    fn get_task_ids(&self) -> Vec<TaskId> {
        self.registry.get_task_ids()
    }

    fn get_keyboard_mapping(&self, task_id: &Ustr) -> Option<KeyboardMapping> {
        self.registry.get_keyboard_mapping(task_id)
    }

    fn get_next_task_id(&self, task_id: &Ustr) -> Option<TaskId> {
        self.registry.get_next_task_id(task_id)
    }

    fn get_previous_task_id(&self, task_id: &Ustr) -> Option<TaskId> {
        self.registry.get_previous_task_id(task_id)
    }

    fn get_lesson(&self, lesson_id: LessonId) -> Option<Lesson> {
        self.registry.get_lesson(lesson_id)
    }

    fn get_lesson_ids(&self) -> Vec<LessonId> {
        self.registry.get_lesson_ids()
    }

    fn get_task_lesson(&self, task_id: &Ustr) -> Option<LessonId> {
        self.registry.get_task_lesson(task_id)
    }

    fn check_cycles(&self) -> Result<(), RegistryError> {
        self.registry.check_cycles()
    }
}

//! Drives a practice session from the key events sent by the host.
//!
//! The session resolves each key through the keyboard mapping of the active task, sends the note
//! to the player, and offers it to the checker of the active task. A task that receives all its
//! required notes becomes `completing`. It only becomes `completed` once every key is released, so
//! that releasing the keys of the last chord is never attributed to the next task. Completing the
//! active task moves the focus to the next task of its lesson.
//!
//! Only the active task receives notes. Keys held while the focus changes are never released by
//! the session. Their release is handled normally when the host reports it.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};
use ustr::{Ustr, UstrMap};

use crate::{
    checker::NoteHistory,
    data::{
        ColorMode, KeyId, KeyboardMapping, Lesson, LessonId, NoteEvent, TaskId, TaskProgress,
        TaskStatus, TrainerOptions,
    },
    error::{GeneratorError, SessionError},
    keyboard::flat_chromatic_mapping,
    player::NotePlayer,
    registry::TaskRegistry,
};

/// The result of pressing a key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyDownOutcome {
    /// The note sent to the player, if the key is bound.
    pub played_note: Option<NoteEvent>,

    /// The progress of the active task, if the note counted towards it.
    pub progress: Option<TaskProgress>,
}

/// The result of releasing a key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyUpOutcome {
    /// The note released in the player, if the key played one.
    pub released_note: Option<NoteEvent>,

    /// The tasks that became completed because no key is held anymore.
    pub completed_tasks: Vec<TaskId>,

    /// The task reached after the active task was completed.
    pub next_task_id: Option<TaskId>,

    /// Whether the completed task was the last one of its lesson.
    pub lesson_finished: bool,
}

/// The mutable state of a practice session.
#[derive(Debug, Default)]
pub struct SessionState {
    /// The lesson the learner is working on.
    current_lesson: Option<LessonId>,

    /// The task that receives the notes.
    active_task: Option<TaskId>,

    /// The progress of every task reached so far.
    progress: UstrMap<TaskProgress>,

    /// The IDs of the tasks in the order they were reached.
    tracking_order: Vec<TaskId>,

    /// The notes counted towards the active task.
    history: NoteHistory,

    /// The keys currently held, with the note each one played when pressed.
    held_keys: UstrMap<Option<NoteEvent>>,
}

/// A practice session over the lessons of a task registry.
pub struct PracticeSession {
    /// The lessons and tasks.
    registry: Arc<dyn TaskRegistry + Send + Sync>,

    /// The output for the notes played by the learner.
    player: Arc<Mutex<dyn NotePlayer + Send>>,

    /// The options of the session.
    options: TrainerOptions,

    /// The mapping used while no task is active.
    free_play_mapping: KeyboardMapping,

    /// The state of the session.
    state: SessionState,
}

impl PracticeSession {
    /// Creates a session with no active task.
    pub fn new(
        registry: Arc<dyn TaskRegistry + Send + Sync>,
        player: Arc<Mutex<dyn NotePlayer + Send>>,
        options: TrainerOptions,
    ) -> Result<Self, GeneratorError> {
        let free_play_mapping = flat_chromatic_mapping(options.free_play_start)?;
        Ok(Self {
            registry,
            player,
            options,
            free_play_mapping,
            state: SessionState::default(),
        })
    }

    /// Starts tracking the progress of the task if it was not reached before.
    fn track(&mut self, task_id: TaskId) {
        if !self.state.progress.contains_key(&task_id) {
            self.state.progress.insert(task_id, TaskProgress::new(task_id));
            self.state.tracking_order.push(task_id);
        }
    }

    /// Makes the task the active one. A task that is still active starts over. Tasks that are
    /// completing or completed keep their status.
    fn focus(&mut self, task_id: TaskId) {
        self.track(task_id);
        if let Some(progress) = self.state.progress.get_mut(&task_id) {
            if progress.status == TaskStatus::Active {
                progress.progress = 0;
            }
        }
        self.state.history.reset();
        self.state.active_task = Some(task_id);
        if let Some(lesson_id) = self.registry.get_task_lesson(&task_id) {
            self.state.current_lesson = Some(lesson_id);
        }
        debug!(task_id = %task_id, "activated task");
    }

    /// Moves on from a completed task. The next task in its lesson is tracked and, if the options
    /// allow it, activated. Returns the next task.
    fn advance_from(&mut self, task_id: TaskId) -> Option<TaskId> {
        match self.registry.get_next_task_id(&task_id) {
            Some(next_task_id) => {
                self.track(next_task_id);
                if self.options.auto_advance {
                    self.focus(next_task_id);
                }
                info!(from = %task_id, to = %next_task_id, "advanced to next task");
                Some(next_task_id)
            }
            None => {
                self.state.active_task = None;
                self.state.history.reset();
                info!(
                    task_id = %task_id,
                    lesson_id = ?self.state.current_lesson,
                    "finished lesson"
                );
                None
            }
        }
    }

    /// Returns the note bound to the key in the active mapping.
    fn resolve_key(&self, key_id: &KeyId) -> Option<NoteEvent> {
        match &self.state.active_task {
            Some(task_id) => self
                .registry
                .get_task(task_id)
                .and_then(|task| task.keyboard_mapping.get(key_id)),
            None => self.free_play_mapping.get(key_id),
        }
    }

    /// Offers the note to the active task and returns its progress if the note counted.
    fn check_active_task(&mut self, note: &NoteEvent) -> Option<TaskProgress> {
        let task_id = self.state.active_task?;
        let task = self.registry.get_task(&task_id)?;
        let progress = self.state.progress.get_mut(&task_id)?;
        if progress.status != TaskStatus::Active
            || !task.checker.check_note(note, &self.state.history)
        {
            return None;
        }

        self.state.history.record(note);
        progress.progress = task.checker.progress(&self.state.history);
        if progress.progress >= task.total {
            progress.status = TaskStatus::Completing;
            debug!(task_id = %task_id, "task is completing");
        }
        Some(progress.clone())
    }

    /// Handles a key being pressed.
    pub fn on_key_down(&mut self, key_id: &str) -> KeyDownOutcome {
        let key_id = Ustr::from(key_id);
        if self.state.held_keys.contains_key(&key_id) {
            debug!(key = %key_id, "ignoring repeated key");
            return KeyDownOutcome::default();
        }

        let note = self.resolve_key(&key_id);
        self.state.held_keys.insert(key_id, note);
        let Some(note) = note else {
            debug!(key = %key_id, "ignoring unbound key");
            return KeyDownOutcome::default();
        };

        self.player.lock().play_note(note);
        KeyDownOutcome {
            played_note: Some(note),
            progress: self.check_active_task(&note),
        }
    }

    /// Handles a key being released.
    pub fn on_key_up(&mut self, key_id: &str) -> KeyUpOutcome {
        let key_id = Ustr::from(key_id);
        let Some(note) = self.state.held_keys.remove(&key_id) else {
            debug!(key = %key_id, "ignoring release of a key that is not held");
            return KeyUpOutcome::default();
        };
        if let Some(note) = note {
            self.player.lock().release_note(note);
        }

        let mut outcome = KeyUpOutcome {
            released_note: note,
            ..Default::default()
        };
        if !self.state.held_keys.is_empty() {
            return outcome;
        }

        for task_id in &self.state.tracking_order {
            if let Some(progress) = self.state.progress.get_mut(task_id) {
                if progress.status == TaskStatus::Completing {
                    progress.status = TaskStatus::Completed;
                    outcome.completed_tasks.push(*task_id);
                    info!(task_id = %task_id, "completed task");
                }
            }
        }

        // Only completing the task in focus moves the focus.
        if let Some(active_task) = self.state.active_task {
            if outcome.completed_tasks.contains(&active_task) {
                outcome.next_task_id = self.advance_from(active_task);
                outcome.lesson_finished = outcome.next_task_id.is_none();
            }
        }
        outcome
    }

    /// Makes the lesson the current one and activates its first task that is not completed.
    /// Returns the activated task, or `None` if every task in the lesson is completed.
    pub fn start_lesson(&mut self, lesson_id: LessonId) -> Result<Option<TaskId>, SessionError> {
        let lesson = self
            .registry
            .get_lesson(lesson_id)
            .ok_or(SessionError::UnknownLesson(lesson_id))?;
        self.state.current_lesson = Some(lesson_id);

        let first_open = lesson.task_ids.iter().copied().find(|task_id| {
            self.state
                .progress
                .get(task_id)
                .is_none_or(|progress| progress.status != TaskStatus::Completed)
        });
        match first_open {
            Some(task_id) => self.focus(task_id),
            None => {
                self.state.active_task = None;
                self.state.history.reset();
            }
        }
        info!(lesson_id, title = %lesson.title, "started lesson");
        Ok(first_open)
    }

    /// Makes the given task the active one, regardless of its position in the lessons.
    pub fn activate_task(&mut self, task_id: &str) -> Result<(), SessionError> {
        let task_id = Ustr::from(task_id);
        if self.registry.get_task(&task_id).is_none() {
            warn!(task_id = %task_id, "cannot activate unknown task");
            return Err(SessionError::UnknownTask(task_id));
        }
        self.focus(task_id);
        Ok(())
    }

    /// Marks the task as completed with all its required notes, even if keys are still held, and
    /// moves on as if the learner had completed it. Returns the next task. Unknown tasks are
    /// ignored.
    pub fn skip_task(&mut self, task_id: &str) -> Option<TaskId> {
        let task_id = Ustr::from(task_id);
        let Some(task) = self.registry.get_task(&task_id) else {
            warn!(task_id = %task_id, "cannot skip unknown task");
            return None;
        };

        self.track(task_id);
        if let Some(progress) = self.state.progress.get_mut(&task_id) {
            progress.progress = task.total;
            progress.status = TaskStatus::Completed;
        }
        if let Some(lesson_id) = self.registry.get_task_lesson(&task_id) {
            self.state.current_lesson = Some(lesson_id);
        }
        info!(task_id = %task_id, "skipped task");
        self.advance_from(task_id)
    }

    /// Returns the task that receives the notes.
    #[must_use]
    pub fn active_task_id(&self) -> Option<TaskId> {
        self.state.active_task
    }

    /// Returns the mapping currently resolving the keys. Without an active task this is a
    /// chromatic layout starting at the free-play note.
    #[must_use]
    pub fn active_keyboard_mapping(&self) -> KeyboardMapping {
        self.state
            .active_task
            .and_then(|task_id| self.registry.get_keyboard_mapping(&task_id))
            .unwrap_or_else(|| self.free_play_mapping.clone())
    }

    /// Returns the mapping that resolves the keys while the given task is active.
    #[must_use]
    pub fn get_active_keyboard_mapping(&self, task_id: &str) -> Option<KeyboardMapping> {
        self.registry.get_keyboard_mapping(&Ustr::from(task_id))
    }

    /// Returns the color scheme for the current mapping.
    #[must_use]
    pub fn active_color_mode(&self) -> ColorMode {
        self.state
            .active_task
            .and_then(|task_id| self.registry.get_task(&task_id))
            .map_or(self.options.free_play_color_mode, |task| task.color_mode)
    }

    /// Returns the progress of every task reached so far, in the order they were reached.
    #[must_use]
    pub fn get_task_progress(&self) -> Vec<TaskProgress> {
        self.state
            .tracking_order
            .iter()
            .filter_map(|task_id| self.state.progress.get(task_id).cloned())
            .collect()
    }

    /// Returns the progress of a single task, if it was reached.
    #[must_use]
    pub fn get_progress(&self, task_id: &str) -> Option<TaskProgress> {
        self.state.progress.get(&Ustr::from(task_id)).cloned()
    }

    /// Returns the task after the given one in its lesson.
    #[must_use]
    pub fn get_next_task_id(&self, task_id: &str) -> Option<TaskId> {
        self.registry.get_next_task_id(&Ustr::from(task_id))
    }

    /// Returns the prerequisite of the given task.
    #[must_use]
    pub fn get_previous_task_id(&self, task_id: &str) -> Option<TaskId> {
        self.registry.get_previous_task_id(&Ustr::from(task_id))
    }

    /// Returns the number of keys currently held.
    #[must_use]
    pub fn held_key_count(&self) -> usize {
        self.state.held_keys.len()
    }

    /// Returns the lesson the learner is working on.
    #[must_use]
    pub fn current_lesson_id(&self) -> Option<LessonId> {
        self.state.current_lesson
    }

    /// Returns the lesson the learner is working on.
    #[must_use]
    pub fn current_lesson(&self) -> Option<Lesson> {
        self.registry.get_lesson(self.state.current_lesson?)
    }

    /// Returns whether every task of the current lesson is completed. A lesson without tasks is
    /// always complete.
    #[must_use]
    pub fn is_lesson_complete(&self) -> bool {
        self.current_lesson().is_some_and(|lesson| {
            lesson.task_ids.iter().all(|task_id| {
                self.state
                    .progress
                    .get(task_id)
                    .is_some_and(|progress| progress.status == TaskStatus::Completed)
            })
        })
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        checker::Checker,
        data::{LessonDefinition, TaskDefinitionBuilder},
        keyboard::bind_sequence,
        registry::InMemoryTaskRegistry,
        testutil::{PlayerEvent, RecordingPlayer},
    };

    fn note(value: u8, octave: u8) -> NoteEvent {
        NoteEvent::new(value, octave)
    }

    /// Builds a session over a single lesson with a chord task followed by a scale task.
    fn session(auto_advance: bool) -> Result<(PracticeSession, Arc<Mutex<RecordingPlayer>>)> {
        let chord = [note(0, 3), note(4, 3), note(7, 3)];
        let scale = [note(0, 3), note(2, 3), note(4, 3)];
        let lesson = LessonDefinition {
            id: 1,
            title: "Test".to_string(),
            content: vec![],
            final_text: None,
            tasks: vec![
                TaskDefinitionBuilder::default()
                    .id("chord")
                    .checker(Checker::set_of(&chord))
                    .keyboard_mapping(bind_sequence(&chord, ["KeyZ", "KeyX", "KeyC"]))
                    .build()?,
                TaskDefinitionBuilder::default()
                    .id("scale")
                    .previous_task_id("chord")
                    .checker(Checker::Sequence(scale.to_vec()))
                    .keyboard_mapping(bind_sequence(&scale, ["KeyA", "KeyS", "KeyD"]))
                    .build()?,
            ],
        };
        let registry = Arc::new(InMemoryTaskRegistry::new(vec![lesson])?);
        let player = Arc::new(Mutex::new(RecordingPlayer::default()));
        let options = TrainerOptions {
            auto_advance,
            ..Default::default()
        };
        let session = PracticeSession::new(registry, player.clone(), options)?;
        Ok((session, player))
    }

    /// Verifies that the chord completes only after every key is released.
    #[test]
    fn completes_after_release() -> Result<()> {
        let (mut session, player) = session(true)?;
        assert_eq!(session.start_lesson(1)?, Some(Ustr::from("chord")));

        session.on_key_down("KeyZ");
        session.on_key_down("KeyX");
        let outcome = session.on_key_down("KeyC");
        assert_eq!(outcome.played_note, Some(note(7, 3)));
        assert_eq!(
            outcome.progress.map(|progress| progress.status),
            Some(TaskStatus::Completing)
        );

        let outcome = session.on_key_up("KeyZ");
        assert!(outcome.completed_tasks.is_empty());
        session.on_key_up("KeyX");
        let outcome = session.on_key_up("KeyC");
        assert_eq!(outcome.completed_tasks, vec![Ustr::from("chord")]);
        assert_eq!(outcome.next_task_id, Some(Ustr::from("scale")));
        assert!(!outcome.lesson_finished);
        assert_eq!(session.active_task_id(), Some(Ustr::from("scale")));

        let events = player.lock().events.clone();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], PlayerEvent::Played(note(0, 3)));
        assert_eq!(events[5], PlayerEvent::Released(note(7, 3)));
        Ok(())
    }

    /// Verifies that repeated key-downs and duplicate key-ups are ignored.
    #[test]
    fn repeats_are_ignored() -> Result<()> {
        let (mut session, player) = session(true)?;
        session.start_lesson(1)?;

        session.on_key_down("KeyZ");
        assert_eq!(session.on_key_down("KeyZ"), KeyDownOutcome::default());
        assert_eq!(session.held_key_count(), 1);
        assert_eq!(session.on_key_up("KeyZ").released_note, Some(note(0, 3)));
        assert_eq!(session.on_key_up("KeyZ"), KeyUpOutcome::default());
        assert_eq!(player.lock().events.len(), 2);
        Ok(())
    }

    /// Verifies that unbound keys are held without playing anything.
    #[test]
    fn unbound_keys_are_held() -> Result<()> {
        let (mut session, player) = session(true)?;
        session.start_lesson(1)?;

        session.on_key_down("KeyZ");
        session.on_key_down("KeyX");
        session.on_key_down("KeyQ");
        session.on_key_down("KeyC");
        assert_eq!(session.held_key_count(), 4);

        session.on_key_up("KeyZ");
        session.on_key_up("KeyX");
        session.on_key_up("KeyC");
        assert_eq!(
            session.get_progress("chord").map(|progress| progress.status),
            Some(TaskStatus::Completing)
        );

        let outcome = session.on_key_up("KeyQ");
        assert_eq!(outcome.released_note, None);
        assert_eq!(outcome.completed_tasks, vec![Ustr::from("chord")]);
        assert_eq!(player.lock().events.len(), 6);
        Ok(())
    }

    /// Verifies that a key releases the note it played even if the mapping changed.
    #[test]
    fn release_uses_pressed_note() -> Result<()> {
        let (mut session, player) = session(true)?;
        session.start_lesson(1)?;

        // KeyA is unbound in the chord task and bound in the scale task.
        session.on_key_down("KeyA");
        session.activate_task("scale")?;
        assert_eq!(session.on_key_up("KeyA").released_note, None);

        session.on_key_down("KeyA");
        session.activate_task("chord")?;
        assert_eq!(session.on_key_up("KeyA").released_note, Some(note(0, 3)));
        assert_eq!(
            player.lock().events.clone(),
            vec![
                PlayerEvent::Played(note(0, 3)),
                PlayerEvent::Released(note(0, 3))
            ]
        );
        Ok(())
    }

    /// Verifies that a sequence task ignores notes out of order.
    #[test]
    fn sequence_order() -> Result<()> {
        let (mut session, _) = session(true)?;
        session.activate_task("scale")?;

        let outcome = session.on_key_down("KeyS");
        assert_eq!(outcome.played_note, Some(note(2, 3)));
        assert_eq!(outcome.progress, None);
        session.on_key_up("KeyS");

        for key in ["KeyA", "KeyS"] {
            session.on_key_down(key);
            session.on_key_up(key);
        }
        assert_eq!(session.get_progress("scale").map(|p| p.progress), Some(2));

        session.on_key_down("KeyD");
        let outcome = session.on_key_up("KeyD");
        assert_eq!(outcome.next_task_id, None);
        assert!(outcome.lesson_finished);
        assert_eq!(session.active_task_id(), None);
        assert!(!session.is_lesson_complete());
        Ok(())
    }

    /// Verifies that skipping completes the task even with keys held and moves on.
    #[test]
    fn skip_task() -> Result<()> {
        let (mut session, _) = session(true)?;
        session.start_lesson(1)?;
        session.on_key_down("KeyZ");

        assert_eq!(session.skip_task("chord"), Some(Ustr::from("scale")));
        assert_eq!(
            session.get_progress("chord"),
            Some(TaskProgress {
                task_id: Ustr::from("chord"),
                progress: 3,
                status: TaskStatus::Completed,
            })
        );
        assert_eq!(session.active_task_id(), Some(Ustr::from("scale")));

        // Releasing the held key does not complete anything else.
        let outcome = session.on_key_up("KeyZ");
        assert!(outcome.completed_tasks.is_empty());

        assert_eq!(session.skip_task("scale"), None);
        assert!(session.is_lesson_complete());
        assert_eq!(session.skip_task("unknown"), None);
        Ok(())
    }

    /// Verifies that the next task is tracked but not activated without auto-advance.
    #[test]
    fn manual_advance() -> Result<()> {
        let (mut session, _) = session(false)?;
        session.start_lesson(1)?;

        assert_eq!(session.skip_task("chord"), Some(Ustr::from("scale")));
        assert_eq!(session.active_task_id(), Some(Ustr::from("chord")));
        assert_eq!(
            session.get_progress("scale").map(|progress| progress.status),
            Some(TaskStatus::Active)
        );

        // The completed task no longer counts notes.
        let outcome = session.on_key_down("KeyZ");
        assert_eq!(outcome.played_note, Some(note(0, 3)));
        assert_eq!(outcome.progress, None);
        Ok(())
    }

    /// Verifies that starting a lesson resumes at the first task that is not completed.
    #[test]
    fn start_lesson_resumes() -> Result<()> {
        let (mut session, _) = session(true)?;
        assert_eq!(session.current_lesson_id(), None);
        session.skip_task("chord");
        assert_eq!(session.start_lesson(1)?, Some(Ustr::from("scale")));
        assert_eq!(session.current_lesson_id(), Some(1));
        assert_eq!(
            session.start_lesson(7),
            Err(SessionError::UnknownLesson(7))
        );
        assert_eq!(
            session.activate_task("missing"),
            Err(SessionError::UnknownTask(Ustr::from("missing")))
        );
        Ok(())
    }

    /// Verifies the free-play mapping used when no task is active.
    #[test]
    fn free_play() -> Result<()> {
        let (mut session, _) = session(true)?;
        assert_eq!(session.active_color_mode(), ColorMode::Chromatic);
        assert_eq!(session.active_keyboard_mapping().len(), 45);

        let outcome = session.on_key_down("KeyX");
        assert_eq!(outcome.played_note, Some(note(1, 3)));
        assert_eq!(outcome.progress, None);
        assert!(session.get_task_progress().is_empty());
        Ok(())
    }

    /// Verifies that the progress is reported in the order the tasks were reached.
    #[test]
    fn progress_order() -> Result<()> {
        let (mut session, _) = session(true)?;
        session.activate_task("scale")?;
        session.activate_task("chord")?;
        let ids: Vec<TaskId> = session
            .get_task_progress()
            .into_iter()
            .map(|progress| progress.task_id)
            .collect();
        assert_eq!(ids, vec![Ustr::from("scale"), Ustr::from("chord")]);
        Ok(())
    }
}

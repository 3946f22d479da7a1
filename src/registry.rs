//! Defines the registry of lessons and tasks, and the chain of prerequisites that links the tasks
//! together.
//!
//! Tasks are grouped into lessons. Inside a lesson, tasks form a strict linear chain: every task
//! after the first lists the task right before it as its prerequisite. The first task of a lesson
//! may list a task from an earlier lesson, which lets the learner continue from one lesson into the
//! next. Lessons without tasks are allowed and are used for free play.
//!
//! A task can be declared cumulative, in which case the keyboard mapping of its prerequisite is
//! kept underneath its own. This is how lessons grow a layout one chord or one note at a time. The
//! registry folds the mappings once when the lesson is added, so lookups return the final mapping.
//!
//! All the validation happens when a lesson is added. A lesson that fails validation leaves the
//! registry untouched.

#[cfg(test)]
mod tests;

use std::{collections::BTreeMap, sync::Arc};

use tracing::debug;
use ustr::{Ustr, UstrMap, UstrSet};

use crate::{
    data::{KeyboardMapping, Lesson, LessonDefinition, LessonId, TaskConfig, TaskId},
    error::RegistryError,
};

/// Stores the lessons and their tasks and answers the lookups made by the practice session. None
/// of the lookups fail. Unknown IDs return `None`.
pub trait TaskRegistry {
    /// Returns the task with the given ID.
    fn get_task(&self, task_id: &Ustr) -> Option<Arc<TaskConfig>>;

    /// Returns the IDs of all the tasks in the order of their lessons.
    fn get_task_ids(&self) -> Vec<TaskId>;

    /// Returns the keyboard mapping active while the given task is the focus.
    fn get_keyboard_mapping(&self, task_id: &Ustr) -> Option<KeyboardMapping>;

    /// Returns the task that follows the given one in its lesson. Returns `None` for the last task
    /// of a lesson.
    fn get_next_task_id(&self, task_id: &Ustr) -> Option<TaskId>;

    /// Returns the prerequisite of the given task.
    fn get_previous_task_id(&self, task_id: &Ustr) -> Option<TaskId>;

    /// Returns the lesson with the given ID.
    fn get_lesson(&self, lesson_id: LessonId) -> Option<Lesson>;

    /// Returns the IDs of all the lessons in ascending order.
    fn get_lesson_ids(&self) -> Vec<LessonId>;

    /// Returns the lesson to which the given task belongs.
    fn get_task_lesson(&self, task_id: &Ustr) -> Option<LessonId>;

    /// Verifies that following the prerequisites of any task never leads back to it.
    fn check_cycles(&self) -> Result<(), RegistryError>;
}

/// An implementation of [`TaskRegistry`] that keeps everything in hash maps.
#[derive(Debug, Default)]
pub struct InMemoryTaskRegistry {
    /// The mapping of a task ID to its configuration.
    tasks: UstrMap<Arc<TaskConfig>>,

    /// The IDs of the tasks in the order they were added.
    task_order: Vec<TaskId>,

    /// The lessons indexed by their ID.
    lessons: BTreeMap<LessonId, Lesson>,

    /// The mapping of a task to the lesson that contains it.
    task_lesson_map: UstrMap<LessonId>,

    /// The mapping of a task to the one that follows it in its lesson.
    next_task_map: UstrMap<TaskId>,
}

impl InMemoryTaskRegistry {
    /// Creates a registry containing the given lessons, which are added in order.
    pub fn new(lessons: Vec<LessonDefinition>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for lesson in lessons {
            registry.add_lesson(lesson)?;
        }
        registry.check_cycles()?;
        Ok(registry)
    }

    /// Returns the cumulative mapping of a task, looking first at the tasks staged for the lesson
    /// being added and then at the registered ones.
    fn staged_mapping(&self, staged: &[TaskConfig], task_id: &Ustr) -> Option<KeyboardMapping> {
        staged
            .iter()
            .find(|task| task.id == *task_id)
            .map(|task| task.keyboard_mapping.clone())
            .or_else(|| self.get_keyboard_mapping(task_id))
    }

    /// Validates the lesson and turns its definitions into task configurations without modifying
    /// the registry.
    fn stage_lesson(&self, lesson: &LessonDefinition) -> Result<Vec<TaskConfig>, RegistryError> {
        if self.lessons.contains_key(&lesson.id) {
            return Err(RegistryError::DuplicateLesson(lesson.id));
        }

        let mut staged: Vec<TaskConfig> = Vec::with_capacity(lesson.tasks.len());
        let mut seen = UstrSet::default();
        for (index, definition) in lesson.tasks.iter().enumerate() {
            let task_id = definition.id;
            if self.tasks.contains_key(&task_id) || !seen.insert(task_id) {
                return Err(RegistryError::DuplicateTask(task_id));
            }

            // Every task after the first must follow the one right before it.
            if index > 0 {
                let expected = Some(lesson.tasks[index - 1].id);
                if definition.previous_task_id != expected {
                    return Err(RegistryError::BrokenChain {
                        lesson_id: lesson.id,
                        task_id,
                        expected,
                        found: definition.previous_task_id,
                    });
                }
            }

            let previous_mapping = match &definition.previous_task_id {
                None => None,
                Some(previous_task_id) => Some(
                    self.staged_mapping(&staged, previous_task_id)
                        .ok_or(RegistryError::UnknownPreviousTask {
                            task_id,
                            previous_task_id: *previous_task_id,
                        })?,
                ),
            };

            let keyboard_mapping = match previous_mapping {
                Some(mut mapping) if definition.cumulative => {
                    mapping.layer(&definition.keyboard_mapping);
                    mapping
                }
                _ => definition.keyboard_mapping.clone(),
            };

            let targets = definition.checker.target_size();
            let total = definition.total.unwrap_or(targets);
            if targets == 0 || total == 0 {
                return Err(RegistryError::EmptyTask(task_id));
            }
            if total > targets {
                return Err(RegistryError::UnreachableTotal {
                    task_id,
                    total,
                    targets,
                });
            }
            if let Some(note) = definition
                .checker
                .targets()
                .into_iter()
                .find(|note| !keyboard_mapping.contains_note(note))
            {
                return Err(RegistryError::UnboundTarget { task_id, note });
            }

            staged.push(TaskConfig {
                id: task_id,
                description: definition.description.clone(),
                checker: definition.checker.clone(),
                total,
                keyboard_mapping,
                color_mode: definition.color_mode,
                previous_task_id: definition.previous_task_id,
            });
        }
        Ok(staged)
    }

    /// Adds a lesson and its tasks to the registry. The prerequisites of the tasks must already be
    /// registered or belong to the same lesson.
    pub fn add_lesson(&mut self, lesson: LessonDefinition) -> Result<(), RegistryError> {
        let staged = self.stage_lesson(&lesson)?;
        let task_ids: Vec<TaskId> = staged.iter().map(|task| task.id).collect();

        for pair in task_ids.windows(2) {
            self.next_task_map.insert(pair[0], pair[1]);
        }
        for task in staged {
            self.task_lesson_map.insert(task.id, lesson.id);
            self.task_order.push(task.id);
            self.tasks.insert(task.id, Arc::new(task));
        }

        debug!(
            lesson_id = lesson.id,
            tasks = task_ids.len(),
            "registered lesson {}",
            lesson.title
        );
        self.lessons.insert(
            lesson.id,
            Lesson {
                id: lesson.id,
                title: lesson.title,
                content: lesson.content,
                final_text: lesson.final_text,
                task_ids,
            },
        );
        Ok(())
    }
}

impl TaskRegistry for InMemoryTaskRegistry {
    fn get_task(&self, task_id: &Ustr) -> Option<Arc<TaskConfig>> {
        self.tasks.get(task_id).cloned()
    }

    fn get_task_ids(&self) -> Vec<TaskId> {
        self.task_order.clone()
    }

    fn get_keyboard_mapping(&self, task_id: &Ustr) -> Option<KeyboardMapping> {
        self.tasks
            .get(task_id)
            .map(|task| task.keyboard_mapping.clone())
    }

    fn get_next_task_id(&self, task_id: &Ustr) -> Option<TaskId> {
        self.next_task_map.get(task_id).copied()
    }

    fn get_previous_task_id(&self, task_id: &Ustr) -> Option<TaskId> {
        self.tasks.get(task_id)?.previous_task_id
    }

    fn get_lesson(&self, lesson_id: LessonId) -> Option<Lesson> {
        self.lessons.get(&lesson_id).cloned()
    }

    fn get_lesson_ids(&self) -> Vec<LessonId> {
        self.lessons.keys().copied().collect()
    }

    fn get_task_lesson(&self, task_id: &Ustr) -> Option<LessonId> {
        self.task_lesson_map.get(task_id).copied()
    }

    fn check_cycles(&self) -> Result<(), RegistryError> {
        // Walk the prerequisites from each task. Walks stop at a task already proven to lead to the
        // start of the chain.
        let mut verified = UstrSet::default();
        for task_id in &self.task_order {
            let mut path = UstrSet::default();
            let mut current = Some(*task_id);
            while let Some(current_id) = current {
                if verified.contains(&current_id) {
                    break;
                }
                if !path.insert(current_id) {
                    return Err(RegistryError::Cycle(current_id));
                }
                current = self.get_previous_task_id(&current_id);
            }
            verified.extend(path);
        }
        Ok(())
    }
}

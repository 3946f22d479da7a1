use anyhow::Result;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use ustr::Ustr;

use crate::{
    checker::Checker,
    data::{
        ColorMode, LessonDefinition, NoteEvent, TaskConfig, TaskDefinition, TaskDefinitionBuilder,
    },
    error::RegistryError,
    keyboard::bind_sequence,
};

use super::{InMemoryTaskRegistry, TaskRegistry};

/// Returns a task that must play the given notes in any order, each bound to the matching key.
fn set_task(id: &str, notes: &[NoteEvent], keys: &[&'static str]) -> TaskDefinitionBuilder {
    let mut builder = TaskDefinitionBuilder::default();
    builder
        .id(id)
        .checker(Checker::set_of(notes))
        .keyboard_mapping(bind_sequence(notes, keys.iter().copied()));
    builder
}

fn lesson(id: u32, tasks: Vec<TaskDefinition>) -> LessonDefinition {
    LessonDefinition {
        id,
        title: format!("Lesson {id}"),
        content: vec![],
        final_text: None,
        tasks,
    }
}

fn c3() -> NoteEvent {
    NoteEvent::new(0, 3)
}

fn e3() -> NoteEvent {
    NoteEvent::new(4, 3)
}

fn g3() -> NoteEvent {
    NoteEvent::new(7, 3)
}

/// Returns two lessons where the first task of the second lesson continues from the first.
fn two_lessons() -> Result<Vec<LessonDefinition>> {
    Ok(vec![
        lesson(
            1,
            vec![
                set_task("task-1", &[c3()], &["KeyZ"]).build()?,
                set_task("task-2", &[e3()], &["KeyX"])
                    .previous_task_id("task-1")
                    .cumulative(true)
                    .build()?,
            ],
        ),
        lesson(
            2,
            vec![
                set_task("task-3", &[g3()], &["KeyC"])
                    .previous_task_id("task-2")
                    .color_mode(ColorMode::FlatChromatic)
                    .build()?,
            ],
        ),
        lesson(3, vec![]),
    ])
}

#[test]
fn lookups() -> Result<()> {
    let registry = InMemoryTaskRegistry::new(two_lessons()?)?;
    let task_1 = Ustr::from("task-1");
    let task_2 = Ustr::from("task-2");
    let task_3 = Ustr::from("task-3");

    assert_eq!(registry.get_task_ids(), vec![task_1, task_2, task_3]);
    assert_eq!(registry.get_lesson_ids(), vec![1, 2, 3]);
    assert_eq!(registry.get_next_task_id(&task_1), Some(task_2));
    assert_eq!(registry.get_next_task_id(&task_2), None);
    assert_eq!(registry.get_next_task_id(&task_3), None);
    assert_eq!(registry.get_next_task_id(&Ustr::from("unknown")), None);
    assert_eq!(registry.get_previous_task_id(&task_1), None);
    assert_eq!(registry.get_previous_task_id(&task_3), Some(task_2));
    assert_eq!(registry.get_task_lesson(&task_3), Some(2));
    assert_eq!(registry.get_task_lesson(&Ustr::from("unknown")), None);

    let lesson = registry.get_lesson(1).unwrap();
    assert_eq!(lesson.task_ids, vec![task_1, task_2]);
    assert_eq!(lesson.title, "Lesson 1");
    assert!(registry.get_lesson(3).unwrap().task_ids.is_empty());
    assert_eq!(registry.get_lesson(4), None);

    let task = registry.get_task(&task_3).unwrap();
    assert_eq!(task.total, 1);
    assert_eq!(task.color_mode, ColorMode::FlatChromatic);
    assert!(registry.get_task(&Ustr::from("unknown")).is_none());
    Ok(())
}

#[test]
fn cumulative_mappings() -> Result<()> {
    let registry = InMemoryTaskRegistry::new(two_lessons()?)?;

    // The second task keeps the binding of the first.
    let mapping = registry.get_keyboard_mapping(&Ustr::from("task-2")).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.get(&Ustr::from("KeyZ")), Some(c3()));

    // The third task is not cumulative.
    let mapping = registry.get_keyboard_mapping(&Ustr::from("task-3")).unwrap();
    assert_eq!(mapping.len(), 1);
    Ok(())
}

#[test]
fn own_bindings_win() -> Result<()> {
    let registry = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![
            set_task("task-1", &[c3()], &["KeyZ"]).build()?,
            set_task("task-2", &[e3()], &["KeyZ"])
                .previous_task_id("task-1")
                .cumulative(true)
                .build()?,
        ],
    )])?;
    let mapping = registry.get_keyboard_mapping(&Ustr::from("task-2")).unwrap();
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get(&Ustr::from("KeyZ")), Some(e3()));
    Ok(())
}

#[test]
fn duplicate_ids() -> Result<()> {
    let mut registry = InMemoryTaskRegistry::new(two_lessons()?)?;
    assert_eq!(
        registry.add_lesson(lesson(1, vec![])),
        Err(RegistryError::DuplicateLesson(1))
    );
    assert_eq!(
        registry.add_lesson(lesson(4, vec![set_task("task-1", &[c3()], &["KeyZ"]).build()?])),
        Err(RegistryError::DuplicateTask(Ustr::from("task-1")))
    );

    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![
            set_task("task-1", &[c3()], &["KeyZ"]).build()?,
            set_task("task-1", &[c3()], &["KeyZ"])
                .previous_task_id("task-1")
                .build()?,
        ],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::DuplicateTask(Ustr::from("task-1"))
    );
    Ok(())
}

#[test]
fn unknown_previous_task() -> Result<()> {
    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![
            set_task("task-1", &[c3()], &["KeyZ"])
                .previous_task_id("missing")
                .build()?,
        ],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::UnknownPreviousTask {
            task_id: Ustr::from("task-1"),
            previous_task_id: Ustr::from("missing"),
        }
    );
    Ok(())
}

#[test]
fn broken_chain() -> Result<()> {
    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![
            set_task("task-1", &[c3()], &["KeyZ"]).build()?,
            set_task("task-2", &[e3()], &["KeyX"]).build()?,
        ],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::BrokenChain {
            lesson_id: 1,
            task_id: Ustr::from("task-2"),
            expected: Some(Ustr::from("task-1")),
            found: None,
        }
    );
    Ok(())
}

#[test]
fn invalid_totals() -> Result<()> {
    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![set_task("task-1", &[], &[]).build()?],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::EmptyTask(Ustr::from("task-1"))
    );

    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![set_task("task-1", &[c3()], &["KeyZ"]).total(0usize).build()?],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::EmptyTask(Ustr::from("task-1"))
    );

    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![set_task("task-1", &[c3(), e3()], &["KeyZ", "KeyX"]).total(3usize).build()?],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::UnreachableTotal {
            task_id: Ustr::from("task-1"),
            total: 3,
            targets: 2,
        }
    );
    Ok(())
}

#[test]
fn unbound_target() -> Result<()> {
    let result = InMemoryTaskRegistry::new(vec![lesson(
        1,
        vec![set_task("task-1", &[c3(), e3()], &["KeyZ"]).build()?],
    )]);
    assert_eq!(
        result.unwrap_err(),
        RegistryError::UnboundTarget {
            task_id: Ustr::from("task-1"),
            note: e3(),
        }
    );
    Ok(())
}

#[test]
fn failed_lesson_leaves_registry_untouched() -> Result<()> {
    let mut registry = InMemoryTaskRegistry::new(two_lessons()?)?;
    let result = registry.add_lesson(lesson(
        4,
        vec![
            set_task("task-4", &[c3()], &["KeyZ"])
                .previous_task_id("task-3")
                .build()?,
            set_task("task-5", &[e3()], &["KeyX"]).build()?,
        ],
    ));
    assert!(result.is_err());
    assert_eq!(registry.get_lesson_ids(), vec![1, 2, 3]);
    assert!(registry.get_task(&Ustr::from("task-4")).is_none());
    assert_eq!(registry.get_next_task_id(&Ustr::from("task-4")), None);
    Ok(())
}

#[test]
fn detects_cycles() -> Result<()> {
    let mut registry = InMemoryTaskRegistry::new(two_lessons()?)?;
    registry.check_cycles()?;

    // Lessons cannot introduce a cycle, so one is written into the registry directly.
    let task_1 = Ustr::from("task-1");
    let mut looped: TaskConfig = registry.get_task(&task_1).unwrap().as_ref().clone();
    looped.previous_task_id = Some(Ustr::from("task-3"));
    registry.tasks.insert(task_1, Arc::new(looped));
    assert!(matches!(
        registry.check_cycles(),
        Err(RegistryError::Cycle(_))
    ));
    Ok(())
}

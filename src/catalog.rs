//! Defines the built-in lessons of the trainer. The lessons start with the white keys, move on to
//! the black keys, chromatic runs, intervals and scale modes, then go through every major and
//! minor chord, and finish with the relationship between the C major and C minor keys. The last
//! lesson has no tasks and leaves the learner to play freely.
//!
//! Each lesson after the first continues from the last task of the lesson before it.

use anyhow::{Context, Result};
use indoc::indoc;
use ustr::Ustr;

use crate::{
    checker::Checker,
    data::{
        ChromaticNote, ColorMode, KeyboardMapping, LessonDefinition, NoteEvent, NoteSequence,
        TaskDefinition, TaskDefinitionBuilder, TaskId,
        music::{
            chords::{ChordQuality, Triad, chords},
            intervals::Interval,
            scales::{ScaleMode, scale_sequence},
        },
    },
    keyboard::{BOTTOM_ROW, HOME_ROW, NUMBER_ROW, TOP_ROW, bind_sequence, flat_mapping, parse_grid},
    registry::InMemoryTaskRegistry,
    sequence_generator::{
        Direction, HIGHEST_NOTE, LOWEST_NOTE, chromatic_range, chromatic_run, interval_ladder_by,
    },
};

/// The white keys of four octaves, one octave per row with the highest on the number row.
const WHITE_KEYS_GRID: &str = indoc! {"
    C5 D5 E5 F5 G5 A5 B5
    C4 D4 E4 F4 G4 A4 B4
    C3 D3 E3 F3 G3 A3 B3
    C2 D2 E2 F2 G2 A2 B2
"};

/// The black keys placed to the right of the white keys, as far as each row allows.
const BLACK_KEYS_GRID: &str = indoc! {"
    . . . . . . . C#5 D#5 F#5 G#5 A#5
    . . . . . . . C#4 D#4 F#4 G#4 A#4
    . . . . . . . C#3 D#3 F#3 G#3
    . . . . . . . C#2 D#2 F#2
"};

/// The white notes in the order they are introduced, with the name used in their task IDs.
const WHITE_NOTES: [(&str, ChromaticNote); 7] = [
    ("c", ChromaticNote::C),
    ("d", ChromaticNote::D),
    ("e", ChromaticNote::E),
    ("f", ChromaticNote::F),
    ("g", ChromaticNote::G),
    ("a", ChromaticNote::A),
    ("b", ChromaticNote::B),
];

/// The black notes in the order they are introduced.
const BLACK_NOTES: [(&str, ChromaticNote); 5] = [
    ("c-sharp", ChromaticNote::C_SHARP),
    ("d-sharp", ChromaticNote::D_SHARP),
    ("g-sharp", ChromaticNote::G_SHARP),
    ("a-sharp", ChromaticNote::A_SHARP),
    ("f-sharp", ChromaticNote::F_SHARP),
];

/// The number of chromatic notes that fit on the keyboard.
const CHROMATIC_TASK_LENGTH: usize = 45;

/// Sets the prerequisite of each task to the task before it. The first task follows `previous`.
fn link(previous: Option<TaskId>, mut tasks: Vec<TaskDefinition>) -> Vec<TaskDefinition> {
    let mut previous = previous;
    for task in &mut tasks {
        task.previous_task_id = previous;
        previous = Some(task.id);
    }
    tasks
}

/// Returns the ID of the last task in the lessons built so far.
fn last_task(lessons: &[LessonDefinition]) -> Option<TaskId> {
    lessons
        .iter()
        .rev()
        .find_map(|lesson| lesson.tasks.last().map(|task| task.id))
}

fn set_task(
    id: &str,
    description: String,
    notes: &[NoteEvent],
    keyboard_mapping: KeyboardMapping,
    color_mode: ColorMode,
) -> Result<TaskDefinition> {
    TaskDefinitionBuilder::default()
        .id(id)
        .description(description)
        .checker(Checker::set_of(notes))
        .keyboard_mapping(keyboard_mapping)
        .color_mode(color_mode)
        .cumulative(true)
        .build()
        .with_context(|| format!("cannot build task {id}"))
}

fn sequence_task(
    id: &str,
    description: String,
    notes: NoteSequence,
    keyboard_mapping: KeyboardMapping,
    color_mode: ColorMode,
) -> Result<TaskDefinition> {
    TaskDefinitionBuilder::default()
        .id(id)
        .description(description)
        .checker(Checker::Sequence(notes))
        .keyboard_mapping(keyboard_mapping)
        .color_mode(color_mode)
        .build()
        .with_context(|| format!("cannot build task {id}"))
}

fn white_keys() -> Result<Vec<TaskDefinition>> {
    let layout = parse_grid(WHITE_KEYS_GRID).context("invalid white keys grid")?;
    let mut tasks = Vec::new();
    for (name, pitch_class) in WHITE_NOTES {
        tasks.push(set_task(
            &format!("play-{name}-across-octaves"),
            format!("Play every {pitch_class} from octave 2 to octave 5"),
            &layout.notes_of_pitch_class(pitch_class),
            layout.filter_pitch_class(pitch_class),
            ColorMode::Chromatic,
        )?);
    }

    let all_notes: Vec<NoteEvent> = layout.iter().map(|(_, note)| *note).collect();
    tasks.push(set_task(
        "play-all-white-keys",
        "Play all the white keys".to_string(),
        &all_notes,
        KeyboardMapping::default(),
        ColorMode::Chromatic,
    )?);
    Ok(tasks)
}

fn black_keys() -> Result<Vec<TaskDefinition>> {
    let layout = parse_grid(BLACK_KEYS_GRID).context("invalid black keys grid")?;
    BLACK_NOTES
        .iter()
        .map(|(name, pitch_class)| {
            set_task(
                &format!("play-{name}"),
                format!("Play every {pitch_class}"),
                &layout.notes_of_pitch_class(*pitch_class),
                layout.filter_pitch_class(*pitch_class),
                ColorMode::Chromatic,
            )
        })
        .collect()
}

fn chromatic_sequences() -> Result<Vec<TaskDefinition>> {
    let mut ascending = chromatic_run(LOWEST_NOTE, Direction::Ascending)?;
    ascending.truncate(CHROMATIC_TASK_LENGTH);

    // The descending run is laid out from low to high like the others and played backwards.
    let mut descending = chromatic_run(HIGHEST_NOTE, Direction::Descending)?;
    descending.truncate(CHROMATIC_TASK_LENGTH);
    let descending_layout: Vec<NoteEvent> = descending.iter().rev().copied().collect();

    let flat = chromatic_range(NoteEvent::new(0, 2), NoteEvent::new(0, 5))?;

    Ok(vec![
        sequence_task(
            "play-chromatic-ascending",
            "Play every note in order, ascending from A0".to_string(),
            ascending.clone(),
            flat_mapping(&ascending),
            ColorMode::FlatChromatic,
        )?,
        sequence_task(
            "play-chromatic-descending",
            "Play every note in order, descending from C8".to_string(),
            descending,
            flat_mapping(&descending_layout),
            ColorMode::FlatChromatic,
        )?,
        sequence_task(
            "play-chromatic-ascending-flat",
            "Play every note from C2 to C5 on the flat layout".to_string(),
            flat.clone(),
            flat_mapping(&flat),
            ColorMode::FlatChromatic,
        )?,
    ])
}

fn major_seconds() -> Result<Vec<TaskDefinition>> {
    [("a0", LOWEST_NOTE), ("asharp0", NoteEvent::new(10, 0))]
        .into_iter()
        .map(|(name, start)| {
            let ladder = interval_ladder_by(start, Interval::MajorSecond)?;
            sequence_task(
                &format!("play-major-seconds-from-{name}"),
                format!("Play every major second starting from {start}"),
                ladder.clone(),
                flat_mapping(&ladder),
                ColorMode::FlatChromatic,
            )
        })
        .collect()
}

/// Returns one task per scale, each played on its own row starting from the given tonic. All the
/// tasks after the first keep the rows of the tasks before them.
fn scale_modes(
    scales: [(&str, ScaleMode, NoteEvent, &[&'static str]); 4],
) -> Result<Vec<TaskDefinition>> {
    let mut tasks = Vec::new();
    for (index, (id, mode, tonic, row)) in scales.into_iter().enumerate() {
        let notes = scale_sequence(mode, tonic)?;
        let mut task = sequence_task(
            id,
            format!("Play the {mode} scale from {tonic}"),
            notes.clone(),
            bind_sequence(&notes, row.iter().copied()),
            ColorMode::Chromatic,
        )?;
        task.cumulative = index > 0;
        tasks.push(task);
    }
    Ok(tasks)
}

fn chord_tasks(quality: ChordQuality) -> Result<Vec<TaskDefinition>> {
    let mut tasks = Vec::new();
    for entry in chords(quality) {
        let name = entry.name();
        let color_mode = if quality == ChordQuality::Minor || entry.index > 2 {
            ColorMode::FlatChromatic
        } else {
            ColorMode::Chromatic
        };
        let mut task = set_task(
            &format!("play-{}-chord", name.to_lowercase()),
            format!("Play the {} chord", name.replace('-', " ")),
            &entry.triad.notes,
            entry.mapping(),
            color_mode,
        )?;
        task.cumulative = entry.index > 0;
        tasks.push(task);
    }
    Ok(tasks)
}

/// Returns the tasks comparing a scale with its primary chords, all played on the bottom row.
fn primary_chords(
    key_name: &str,
    mode: ScaleMode,
    scale_keys: [&'static str; 8],
    quality: ChordQuality,
) -> Result<Vec<TaskDefinition>> {
    let tonic = NoteEvent::new(0, 3);
    let scale = scale_sequence(mode, tonic)?;
    let mut tasks = vec![sequence_task(
        &format!("play-c-{key_name}-scale-sequence"),
        format!("Play C {key_name} scale from C3 to C4"),
        scale.clone(),
        bind_sequence(&scale, scale_keys),
        ColorMode::Chromatic,
    )?];

    let degrees = [
        ("i", 0, ["KeyZ", "KeyX", "KeyC"]),
        ("iv", 5, ["KeyV", "KeyB", "KeyN"]),
        ("v", 7, ["KeyM", "Comma", "Period"]),
    ];
    for (numeral, offset, keys) in degrees {
        let root = tonic
            .transpose(offset)
            .context("primary chord root out of range")?;
        let triad = Triad::voiced(root, quality).context("primary chord out of range")?;
        let numeral = match quality {
            ChordQuality::Major => numeral.to_uppercase(),
            ChordQuality::Minor => numeral.to_string(),
        };
        tasks.push(set_task(
            &format!("play-c-{key_name}-primary-{}", numeral.to_lowercase()),
            format!("Play {} {quality} chord ({numeral})", root.note),
            &triad.notes,
            bind_sequence(&triad.notes, keys),
            ColorMode::Chromatic,
        )?);
    }

    // Every task introduces its own keys.
    for task in &mut tasks {
        task.cumulative = false;
    }
    Ok(tasks)
}

/// The paragraphs introducing each lesson, in lesson order.
const LESSON_CONTENT: [&[&str]; 10] = [
    &[
        "Welcome to Rawl Piano, the companion book to rawl.rocks. I'm gonna cover Western music \
         theory using my colorful music notation.",
        "We have seven different types of white keys. Why seven? There are seven vibes, in a way.",
    ],
    &["Now let's learn about the black keys!"],
    &[
        "Now let's play all notes in sequence! First ascending from A0, then descending from C8.",
        "Follow the arrows - they show which note to play next. Previous notes will show \
         checkmarks.",
        "Finally, try playing the ascending sequence again using the flat keyboard layout - where \
         each key is arranged in chromatic order from left to right.",
    ],
    &[
        "Let's explore intervals! We'll start with major seconds - the interval of two semitones.",
        "First, play all notes separated by major seconds starting from A0. Then we'll play the \
         complementary sequence starting from A#0.",
    ],
    &[
        "Let's explore different scale modes! Each row of keys maps to a different mode:",
        "Middle row (A-J): Major scale (Ionian mode) - the familiar do-re-mi pattern",
        "Bottom row (Z-M): Lydian mode - like major scale but with a raised 4th",
        "Top row (Q-U): Mixolydian mode - major scale with a lowered 7th",
        "Number row (1-8): Dorian mode - minor scale with a raised 6th",
    ],
    &[
        "Let's explore the remaining scale modes! Each row maps to a different mode, continuing \
         our pattern:",
        "Bottom row (Z-A): Dorian mode again - but in a lower octave for comparison",
        "Middle row (A-J): Natural Minor (Aeolian) - the familiar sad scale",
        "Top row (Q-U): Phrygian mode - minor scale with a lowered 2nd",
        "Number row (1-8): Locrian mode - the darkest mode, with lowered 2nd and 5th",
    ],
    &[
        "Now let's learn all twelve major chords! We'll start with C major in the second octave, \
         using three keys for the three notes of each chord.",
        "The bottom row (Z-.) covers C, C#, and D major chords. The home row (A-L) covers Eb, E, \
         and F major chords. The top row (Q-O) covers F#, G, and G# major chords. And finally \
         the number row is grouped in threes: 1-2-3 for A major, 4-5-6 for Bb major, and 7-8-9 \
         for B major.",
        "Each new chord builds on the previous ones, so you can always go back and practice \
         earlier chords!",
    ],
    &[
        "Now let's learn all twelve minor chords! Like major chords, each minor chord has three \
         notes, but the middle note (the third) is lowered by one semitone, giving that \
         characteristic melancholic sound.",
        "We'll use the same keyboard layout pattern as major chords: Bottom row (Z-.) for C \
         minor, C# minor, and D minor; Home row (A-L) for Eb minor, E minor, and F minor; Top \
         row (Q-O) for F# minor, G minor, and G# minor; Number row grouped in threes: 1-2-3 for \
         A minor, 4-5-6 for Bb minor, and 7-8-9 for B minor.",
        "Each minor chord follows this pattern: root note, minor third (3 semitones up), and \
         perfect fifth (7 semitones up). For example, C minor is C (root), Eb (minor third), and \
         G (perfect fifth).",
    ],
    &[
        "Let's explore the relationship between C major and C minor scales and their primary \
         chords. We'll start with the C major scale and its primary chords (I, IV, V), then \
         compare them with their minor counterparts.",
        "First, play the C major scale ascending from C3 to C4. Then we'll explore the three \
         primary chords in C major: C major (I), F major (IV), and G major (V).",
        "Next, we'll play the C minor scale, which differs from C major by having a lowered third \
         (Eb), sixth (Ab), and seventh (Bb). Finally, we'll play the primary chords in C minor: C \
         minor (i), F minor (iv), and G minor (v).",
        "Notice how the chord qualities change between major and minor keys, while the root notes \
         remain the same!",
    ],
    &[
        "Congratulations! You've completed the lessons. Now you can freely play around with the \
         piano. Try different tonics, voicings, and color modes!",
    ],
];

/// Returns the definitions of the built-in lessons, numbered from one.
pub fn lessons() -> Result<Vec<LessonDefinition>> {
    let specs: Vec<(&str, Option<&str>, Vec<TaskDefinition>)> = vec![
        (
            "White Keys",
            Some("Play around with all seven keys. Then, as you're ready, go to the next lesson"),
            white_keys()?,
        ),
        ("Black Keys", Some("Play the last black key"), black_keys()?),
        (
            "Chromatic Sequences",
            Some("Play the last note in the chromatic sequence"),
            chromatic_sequences()?,
        ),
        (
            "Major Second Intervals",
            Some("Play the last note in the major second sequence"),
            major_seconds()?,
        ),
        (
            "Scale Modes",
            Some("Play the last note in the scale mode sequence"),
            scale_modes([
                (
                    "play-lydian-scale",
                    ScaleMode::Lydian,
                    NoteEvent::new(0, 2),
                    &BOTTOM_ROW[..],
                ),
                (
                    "play-major-scale",
                    ScaleMode::MAJOR,
                    NoteEvent::new(0, 3),
                    &HOME_ROW[..],
                ),
                (
                    "play-mixolydian-scale",
                    ScaleMode::Mixolydian,
                    NoteEvent::new(0, 4),
                    &TOP_ROW[..],
                ),
                (
                    "play-dorian-scale",
                    ScaleMode::Dorian,
                    NoteEvent::new(0, 5),
                    &NUMBER_ROW[..],
                ),
            ])?,
        ),
        (
            "More Scale Modes",
            Some("Play the last note in the more scale modes sequence"),
            scale_modes([
                (
                    "play-dorian-low-scale",
                    ScaleMode::Dorian,
                    NoteEvent::new(0, 2),
                    &BOTTOM_ROW[..],
                ),
                (
                    "play-minor-scale",
                    ScaleMode::MINOR,
                    NoteEvent::new(0, 3),
                    &HOME_ROW[..],
                ),
                (
                    "play-phrygian-scale",
                    ScaleMode::Phrygian,
                    NoteEvent::new(0, 4),
                    &TOP_ROW[..],
                ),
                (
                    "play-locrian-scale",
                    ScaleMode::Locrian,
                    NoteEvent::new(0, 5),
                    &NUMBER_ROW[..],
                ),
            ])?,
        ),
        (
            "Major Chords",
            Some("Play the last major chord"),
            chord_tasks(ChordQuality::Major)?,
        ),
        (
            "Minor Chords",
            Some("Play the last minor chord"),
            chord_tasks(ChordQuality::Minor)?,
        ),
        (
            "C Major and C Minor Relations",
            Some("Play the last primary chord in C minor"),
            [
                primary_chords(
                    "major",
                    ScaleMode::MAJOR,
                    ["KeyZ", "KeyX", "KeyC", "KeyV", "KeyB", "KeyN", "KeyM", "Comma"],
                    ChordQuality::Major,
                )?,
                primary_chords(
                    "minor",
                    ScaleMode::MINOR,
                    ["KeyZ", "KeyX", "KeyD", "KeyV", "KeyB", "KeyH", "KeyJ", "Comma"],
                    ChordQuality::Minor,
                )?,
            ]
            .concat(),
        ),
        ("Free Play", None, vec![]),
    ];

    let mut lessons: Vec<LessonDefinition> = Vec::with_capacity(specs.len());
    for (index, ((title, final_text, tasks), content)) in
        specs.into_iter().zip(LESSON_CONTENT).enumerate()
    {
        let tasks = link(last_task(&lessons), tasks);
        lessons.push(LessonDefinition {
            id: index as u32 + 1,
            title: title.to_string(),
            content: content
                .iter()
                .map(|paragraph| paragraph.to_string())
                .collect(),
            final_text: final_text.map(str::to_string),
            tasks,
        });
    }
    Ok(lessons)
}

/// Returns a registry containing the built-in lessons.
pub fn build_registry() -> Result<InMemoryTaskRegistry> {
    InMemoryTaskRegistry::new(lessons()?).context("invalid built-in lessons")
}

/// Returns the ID of the first built-in task.
#[must_use]
pub fn first_task_id() -> TaskId {
    Ustr::from("play-c-across-octaves")
}

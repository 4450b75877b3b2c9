//! Beat-ordered event timeline and its resolution into absolute time.
//!
//! # Order of Processing
//!
//! Events are ordered by beat. Events whose beats are closer than [`COINCIDENCE_WINDOW`] are
//! coincident and processed in the order below:
//!
//! - [`TempoEvent::Tempo`],
//! - [`NoteDirective`],
//! - [`TempoEvent::Pause`].
//!
//! So a note on the beat of a tempo change is already timed with the new tempo, while a note on
//! the beat of a pause is hit before the pause starts.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::sm::{step_type::SelectedChart, symbol::NoteSymbol};

/// Beats closer than this are treated as the same beat.
pub const COINCIDENCE_WINDOW: f64 = 1.0 / 192.0;
/// Tempo assumed before the first tempo change.
pub const INITIAL_BPM: f64 = 60.0;
/// Number of beats in one measure of the note grid.
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// A point on the timeline which affects how beats map to time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TempoEvent {
    /// Changes the tempo for all following beats. `#BPMS`
    Tempo {
        /// Position of the change.
        beat: f64,
        /// New tempo in beats per minute.
        bpm: f64,
    },
    /// Holds the chart still for a while. `#STOPS`
    Pause {
        /// Position of the pause.
        beat: f64,
        /// Length of the pause in milliseconds.
        duration_ms: f64,
    },
}

impl TempoEvent {
    /// Position of the event in beats.
    #[must_use]
    pub const fn beat(&self) -> f64 {
        match *self {
            Self::Tempo { beat, .. } | Self::Pause { beat, .. } => beat,
        }
    }
}

/// A non-empty cell of the note grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteDirective {
    /// Position of the row in beats.
    pub beat: f64,
    /// Column of the cell in its row, starting from 0.
    pub lane: usize,
    /// The character in the cell.
    pub symbol: NoteSymbol,
}

/// Either a tempo directive or a note directive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimelineEvent {
    /// Tempo change or pause.
    Tempo(TempoEvent),
    /// Grid cell.
    Note(NoteDirective),
}

/// Precedence of coincident events, earlier variants first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventClass {
    /// Tempo changes.
    Tempo,
    /// Note directives.
    Note,
    /// Pauses.
    Pause,
}

impl TimelineEvent {
    /// Position of the event in beats.
    #[must_use]
    pub const fn beat(&self) -> f64 {
        match self {
            Self::Tempo(tempo) => tempo.beat(),
            Self::Note(note) => note.beat,
        }
    }

    /// Class deciding the order among coincident events.
    #[must_use]
    pub const fn class(&self) -> EventClass {
        match self {
            Self::Tempo(TempoEvent::Tempo { .. }) => EventClass::Tempo,
            Self::Note(_) => EventClass::Note,
            Self::Tempo(TempoEvent::Pause { .. }) => EventClass::Pause,
        }
    }
}

impl From<TempoEvent> for TimelineEvent {
    fn from(value: TempoEvent) -> Self {
        Self::Tempo(value)
    }
}

impl From<NoteDirective> for TimelineEvent {
    fn from(value: NoteDirective) -> Self {
        Self::Note(value)
    }
}

/// An event with its absolute time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedEvent {
    /// The event.
    pub event: TimelineEvent,
    /// Milliseconds from the start of the music.
    pub time_ms: f64,
}

/// Maps every non-empty cell of the measures onto beats.
///
/// Row `r` of `n` rows in measure `m` lies on beat `(m + r / n) * 4`.
pub fn grid_directives<M, R>(measures: M) -> Vec<NoteDirective>
where
    M: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut directives = vec![];
    for (measure_idx, rows) in measures.into_iter().enumerate() {
        let rows = rows.as_ref();
        let num_rows = rows.len() as f64;
        for (row_idx, row) in rows.iter().enumerate() {
            let beat = (measure_idx as f64 + row_idx as f64 / num_rows) * BEATS_PER_MEASURE;
            directives.extend(
                row.chars()
                    .map(NoteSymbol::from)
                    .enumerate()
                    .filter(|(_, symbol)| !symbol.is_empty())
                    .map(|(lane, symbol)| NoteDirective { beat, lane, symbol }),
            );
        }
    }
    directives
}

/// Compares two events by the coincidence rule alone.
///
/// Coincident events compare by [`EventClass`], others by beat. The relation is not transitive
/// across chains of coincident events, so it is applied by adjacent swaps in [`Timeline::new`].
#[must_use]
pub fn compare_events(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    if (a.beat() - b.beat()).abs() < COINCIDENCE_WINDOW {
        a.class().cmp(&b.class())
    } else {
        a.beat().total_cmp(&b.beat())
    }
}

/// Tempo, pause and note events of one chart, in processing order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Sorts the events into processing order.
    ///
    /// A stable sort by beat comes first. Then each event moves back past its neighbors while
    /// [`compare_events`] puts it before them, so every adjacent pair ends up in rule order.
    pub fn new(events: impl IntoIterator<Item = TimelineEvent>) -> Self {
        let mut events: Vec<_> = events
            .into_iter()
            .sorted_by(|a, b| a.beat().total_cmp(&b.beat()))
            .collect();
        for i in 1..events.len() {
            let mut j = i;
            while let Some([prev, cur]) = j.checked_sub(1).and_then(|k| events.get(k..=j)) {
                if compare_events(prev, cur) != Ordering::Greater {
                    break;
                }
                events.swap(j - 1, j);
                j -= 1;
            }
        }
        Self { events }
    }

    /// Merges the tempo directives and the note grid of the chart.
    #[must_use]
    pub fn from_chart(chart: &SelectedChart) -> Self {
        let notes = grid_directives(chart.measures.iter().map(|measure| &measure.rows));
        Self::new(
            chart
                .tempo_events
                .iter()
                .copied()
                .map(TimelineEvent::from)
                .chain(notes.into_iter().map(TimelineEvent::from)),
        )
    }

    /// Events in processing order.
    #[must_use]
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Simulates the tempo through the events and stamps each one with its absolute time.
    ///
    /// Time starts at `-1000 * offset_seconds` with [`INITIAL_BPM`]. The span since the previous
    /// event is measured with the tempo in effect before this event, then a pause adds its length.
    /// So a tempo change never affects its own time, and a pause is included in its own time.
    #[must_use]
    pub fn resolve(self, offset_seconds: f64) -> Vec<TimedEvent> {
        let zero_ms = -1000.0 * offset_seconds;
        let mut bpm = INITIAL_BPM;
        let mut elapsed_ms = 0.0;
        let mut last_beat = 0.0;

        let mut timed = Vec::with_capacity(self.events.len());
        for event in self.events {
            let beat = event.beat();
            elapsed_ms += (beat - last_beat) * 60_000.0 / bpm;
            match event {
                TimelineEvent::Tempo(TempoEvent::Tempo { bpm: next, .. }) => bpm = next,
                TimelineEvent::Tempo(TempoEvent::Pause { duration_ms, .. }) => {
                    elapsed_ms += duration_ms;
                }
                TimelineEvent::Note(_) => {}
            }
            timed.push(TimedEvent {
                event,
                time_ms: zero_ms + elapsed_ms,
            });
            last_beat = beat;
        }
        timed
    }
}

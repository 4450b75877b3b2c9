//! Generating tap notes from the timed note directives.
//!
//! Tempo and pause events only matter for timing, so they are skipped here. A hold note is
//! emitted at its head and gets its length when the tail on the same lane arrives.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    config::SymbolPolicy,
    sm::symbol::NoteSymbol,
    timeline::{NoteDirective, TimedEvent, TimelineEvent},
};

/// Bit of [`TapNote::flags`] marking a hold note.
pub const HOLD_FLAG: u32 = 0x10;

/// A note of the target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapNote {
    /// Milliseconds from the start of the music, floored.
    pub time_ms: i64,
    /// Length of the hold in milliseconds, 0 for a plain tap.
    pub hold_duration_ms: i64,
    /// Lane of the note.
    pub lane: usize,
    /// The lane number, with [`HOLD_FLAG`] set on a completed hold.
    pub flags: u32,
}

impl TapNote {
    /// Creates a plain tap.
    #[must_use]
    pub const fn new(time_ms: i64, lane: usize) -> Self {
        Self {
            time_ms,
            hold_duration_ms: 0,
            lane,
            flags: lane as u32,
        }
    }

    /// Whether the note is a completed hold.
    #[must_use]
    pub const fn is_hold(&self) -> bool {
        self.flags & HOLD_FLAG != 0
    }

    fn close_hold(&mut self, end_ms: i64) {
        self.hold_duration_ms = end_ms - self.time_ms;
        self.flags |= HOLD_FLAG;
    }
}

/// A note directive which did not become a note.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TapWarning {
    /// The symbol has no tap note counterpart and was dropped.
    #[error("unsupported symbol `{symbol}` on lane {lane} at beat {beat} dropped")]
    UnsupportedSymbol {
        /// The symbol.
        symbol: NoteSymbol,
        /// Lane of the cell.
        lane: usize,
        /// Beat of the cell.
        beat: f64,
    },
    /// A hold tail without an open hold head on its lane was dropped.
    #[error("hold end on lane {lane} at beat {beat} has no hold start")]
    UnmatchedHoldEnd {
        /// Lane of the tail.
        lane: usize,
        /// Beat of the tail.
        beat: f64,
    },
    /// A hold head was never closed, so it stays a plain tap.
    #[error("hold start on lane {lane} at {time_ms}ms is never closed")]
    UnclosedHold {
        /// Lane of the head.
        lane: usize,
        /// Time of the head.
        time_ms: i64,
    },
}

/// An error occurred on generating tap notes.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TapError {
    /// The symbol has no tap note counterpart, under [`SymbolPolicy::Reject`].
    #[error("unsupported symbol `{symbol}` on lane {lane} at beat {beat}")]
    UnsupportedSymbol {
        /// The symbol.
        symbol: NoteSymbol,
        /// Lane of the cell.
        lane: usize,
        /// Beat of the cell.
        beat: f64,
    },
}

/// Generated notes, with warnings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct TapOutput {
    /// Notes sorted by time.
    pub notes: Vec<TapNote>,
    /// Warnings that occurred during generation.
    pub tap_warnings: Vec<TapWarning>,
}

/// Generates tap notes from timed events.
///
/// Open holds are tracked as indices into the emitted notes, keyed by lane. The result is sorted
/// by time, keeping the emission order of notes on the same millisecond.
///
/// # Errors
///
/// [`TapError::UnsupportedSymbol`] on a symbol other than tap, hold-start and hold-end, only under
/// [`SymbolPolicy::Reject`].
pub fn generate<'a>(
    events: impl IntoIterator<Item = &'a TimedEvent>,
    policy: SymbolPolicy,
) -> Result<TapOutput, TapError> {
    let mut notes: Vec<TapNote> = vec![];
    let mut open_holds: BTreeMap<usize, usize> = BTreeMap::new();
    let mut tap_warnings = vec![];

    for timed in events {
        let TimelineEvent::Note(NoteDirective { beat, lane, symbol }) = timed.event else {
            continue;
        };
        let time_ms = timed.time_ms.floor() as i64;
        match symbol {
            NoteSymbol::Tap => notes.push(TapNote::new(time_ms, lane)),
            NoteSymbol::HoldStart => {
                open_holds.insert(lane, notes.len());
                notes.push(TapNote::new(time_ms, lane));
            }
            NoteSymbol::HoldEnd => match open_holds
                .remove(&lane)
                .and_then(|index| notes.get_mut(index))
            {
                Some(head) => head.close_hold(time_ms),
                None => tap_warnings.push(TapWarning::UnmatchedHoldEnd { lane, beat }),
            },
            NoteSymbol::Empty => {}
            unsupported => match policy {
                SymbolPolicy::Ignore => tap_warnings.push(TapWarning::UnsupportedSymbol {
                    symbol: unsupported,
                    lane,
                    beat,
                }),
                SymbolPolicy::Reject => {
                    return Err(TapError::UnsupportedSymbol {
                        symbol: unsupported,
                        lane,
                        beat,
                    });
                }
            },
        }
    }

    tap_warnings.extend(open_holds.into_values().filter_map(|index| {
        notes.get(index).map(|head| TapWarning::UnclosedHold {
            lane: head.lane,
            time_ms: head.time_ms,
        })
    }));

    notes.sort_by_key(|note| note.time_ms);
    Ok(TapOutput {
        notes,
        tap_warnings,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(time_ms: f64, lane: usize, symbol: char) -> TimedEvent {
        TimedEvent {
            event: TimelineEvent::Note(NoteDirective {
                beat: time_ms / 1000.0,
                lane,
                symbol: symbol.into(),
            }),
            time_ms,
        }
    }

    #[test]
    fn taps_are_floored() {
        let events = [at(499.9, 0, '1'), at(1000.0, 3, '1'), at(-0.5, 1, '1')];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        assert_eq!(
            output.notes,
            vec![TapNote::new(-1, 1), TapNote::new(499, 0), TapNote::new(1000, 3)]
        );
        assert_eq!(output.tap_warnings, vec![]);
    }

    #[test]
    fn hold_gets_length_and_flag() {
        let events = [at(100.0, 2, '2'), at(200.0, 0, '1'), at(350.5, 2, '3')];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        assert_eq!(
            output.notes,
            vec![
                TapNote {
                    time_ms: 100,
                    hold_duration_ms: 250,
                    lane: 2,
                    flags: 2 | HOLD_FLAG,
                },
                TapNote::new(200, 0),
            ]
        );
        assert!(output.notes[0].is_hold());
        assert!(!output.notes[1].is_hold());
    }

    #[test]
    fn unmatched_hold_end_is_dropped() {
        let events = [
            at(100.0, 1, '2'),
            at(150.0, 0, '3'),
            at(300.0, 1, '3'),
            at(400.0, 1, '3'),
        ];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        assert_eq!(
            output.notes,
            vec![TapNote {
                time_ms: 100,
                hold_duration_ms: 200,
                lane: 1,
                flags: 1 | HOLD_FLAG,
            }]
        );
        assert_eq!(
            output.tap_warnings,
            vec![
                TapWarning::UnmatchedHoldEnd {
                    lane: 0,
                    beat: 0.15
                },
                TapWarning::UnmatchedHoldEnd { lane: 1, beat: 0.4 },
            ]
        );
    }

    #[test]
    fn reopened_hold_replaces_previous_head() {
        let events = [at(0.0, 0, '2'), at(100.0, 0, '2'), at(300.0, 0, '3')];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        assert_eq!(
            output.notes,
            vec![
                TapNote::new(0, 0),
                TapNote {
                    time_ms: 100,
                    hold_duration_ms: 200,
                    lane: 0,
                    flags: HOLD_FLAG,
                },
            ]
        );
    }

    #[test]
    fn unclosed_hold_stays_tap() {
        let events = [at(10.0, 3, '2')];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        assert_eq!(output.notes, vec![TapNote::new(10, 3)]);
        assert_eq!(
            output.tap_warnings,
            vec![TapWarning::UnclosedHold {
                lane: 3,
                time_ms: 10
            }]
        );
    }

    #[test]
    fn unsupported_symbols_follow_policy() {
        let events = [at(0.0, 0, 'M'), at(10.0, 1, '1'), at(20.0, 2, '4')];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        assert_eq!(output.notes, vec![TapNote::new(10, 1)]);
        assert_eq!(output.tap_warnings.len(), 2);

        assert_eq!(
            generate(&events, SymbolPolicy::Reject),
            Err(TapError::UnsupportedSymbol {
                symbol: NoteSymbol::Mine,
                lane: 0,
                beat: 0.0
            })
        );
    }

    #[test]
    fn tempo_events_are_skipped() {
        let events = [
            TimedEvent {
                event: TimelineEvent::Tempo(crate::timeline::TempoEvent::Tempo {
                    beat: 0.0,
                    bpm: 120.0,
                }),
                time_ms: 0.0,
            },
            at(500.0, 0, '1'),
        ];
        let output = generate(&events, SymbolPolicy::Reject).unwrap();
        assert_eq!(output.notes, vec![TapNote::new(500, 0)]);
    }

    #[test]
    fn same_time_keeps_emission_order() {
        let events = [at(100.0, 3, '1'), at(100.0, 0, '2'), at(100.0, 1, '1')];
        let output = generate(&events, SymbolPolicy::Ignore).unwrap();
        let lanes: Vec<_> = output.notes.iter().map(|note| note.lane).collect();
        assert_eq!(lanes, vec![3, 0, 1]);
    }
}

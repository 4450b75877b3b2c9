//! Enumerating chart variants and extracting the data of one of them.
//!
//! A `NOTES` section body reads `style:author:difficulty:meter:radar:grid`. The variant is
//! identified by `style-difficulty` in lower case, e.g. `dance-single-hard`. `BPMS`, `STOPS` and
//! `OFFSET` are shared by every variant.

use itertools::Itertools;
use thiserror::Error;

use crate::{
    mixin::SourceRangeMixinExt,
    timeline::TempoEvent,
};

use super::{
    ChartError, ChartErrorWithRange, SmWarning, SmWarningWithRange,
    lex::SectionWithRange,
};

const STYLE_FIELD: usize = 0;
const DIFFICULTY_FIELD: usize = 2;
const GRID_FIELD: usize = 5;

/// Identifier of a chart variant, `style-difficulty` in lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepType(String);

impl StepType {
    /// Joins the style and difficulty tags of a `NOTES` section.
    #[must_use]
    pub fn from_tags(style: &str, difficulty: &str) -> Self {
        Self(format!(
            "{}-{}",
            style.trim().to_lowercase(),
            difficulty.trim().to_lowercase()
        ))
    }

    /// Derives the identifier from a `NOTES` section body, `None` if it has too few fields.
    #[must_use]
    pub fn from_notes_body(body: &str) -> Option<Self> {
        let mut fields = body.split(':');
        let style = fields.nth(STYLE_FIELD)?;
        let difficulty = fields.nth(DIFFICULTY_FIELD - STYLE_FIELD - 1)?;
        Some(Self::from_tags(style, difficulty))
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepType {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for StepType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for StepType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One measure of the note grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measure {
    /// Rows of the measure, each character is a lane.
    pub rows: Vec<String>,
}

/// The grid and timing directives of one chart variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedChart {
    /// Identifier of the selected variant.
    pub step_type: StepType,
    /// The note grid.
    pub measures: Vec<Measure>,
    /// Tempo changes and pauses, in order of appearance.
    pub tempo_events: Vec<TempoEvent>,
    /// Music offset in seconds. `#OFFSET`, `0.0` if absent.
    pub offset_seconds: f64,
}

/// Step types found in a chart, with warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct StepTypesOutput {
    /// Distinct step types in order of first appearance.
    pub step_types: Vec<StepType>,
    /// Warnings about `NOTES` sections which could not be identified.
    pub warnings: Vec<SmWarningWithRange>,
}

/// The selected chart, with warnings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct SelectOutput {
    /// The selected chart.
    pub chart: SelectedChart,
    /// Warnings about `NOTES` sections which could not be identified.
    pub select_warnings: Vec<SmWarningWithRange>,
}

/// An error occurred on selecting a chart variant.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// No `NOTES` section has the requested identifier.
    #[error("step type `{0}` not found")]
    StepTypeNotFound(StepType),
    /// A section needed for the selected chart is malformed.
    #[error(transparent)]
    Chart(#[from] ChartErrorWithRange),
}

/// Identifies every non-empty `NOTES` section, warning about those with too few fields.
fn identified_notes<'a>(
    sections: &'a [SectionWithRange],
    warnings: &mut Vec<SmWarningWithRange>,
) -> Vec<(StepType, &'a SectionWithRange, String)> {
    let mut found = vec![];
    for section in sections {
        if section.content().name() != "NOTES" {
            continue;
        }
        let body = section.content().body();
        if body.is_empty() {
            continue;
        }
        match StepType::from_notes_body(&body) {
            Some(step_type) => found.push((step_type, section, body)),
            None => warnings.push(SmWarning::UnidentifiableNotes.into_wrapper(section)),
        }
    }
    found
}

/// Enumerates the step types of the chart.
///
/// Each identifier is listed once, at its first `NOTES` section, even if later sections repeat it.
pub fn step_types(sections: &[SectionWithRange]) -> StepTypesOutput {
    let mut warnings = vec![];
    let step_types = identified_notes(sections, &mut warnings)
        .into_iter()
        .map(|(step_type, _, _)| step_type)
        .unique()
        .collect();
    StepTypesOutput {
        step_types,
        warnings,
    }
}

fn parse_number(section: &SectionWithRange, text: &str) -> Result<f64, ChartErrorWithRange> {
    text.trim().parse().map_err(|_| {
        ChartError::InvalidNumber {
            section: section.content().name().to_owned(),
            value: text.trim().to_owned(),
        }
        .into_wrapper(section)
    })
}

/// Parses `beat=value,beat=value,...`. Empty items, as left by a trailing comma, are skipped.
fn parse_pairs<'a>(
    section: &SectionWithRange,
    body: &'a str,
) -> Result<Vec<(&'a str, &'a str)>, ChartErrorWithRange> {
    body.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.split_once('=').ok_or_else(|| {
                ChartError::MalformedPair {
                    section: section.content().name().to_owned(),
                    item: item.to_owned(),
                }
                .into_wrapper(section)
            })
        })
        .collect()
}

fn parse_tempos(
    section: &SectionWithRange,
    body: &str,
) -> Result<Vec<TempoEvent>, ChartErrorWithRange> {
    parse_pairs(section, body)?
        .into_iter()
        .map(|(beat_text, bpm_text)| {
            let beat = parse_number(section, beat_text)?;
            let bpm = parse_number(section, bpm_text)?;
            if !bpm.is_normal() {
                return Err(ChartError::InvalidBpm {
                    beat: beat_text.trim().to_owned(),
                    bpm: bpm_text.trim().to_owned(),
                }
                .into_wrapper(section));
            }
            Ok(TempoEvent::Tempo { beat, bpm })
        })
        .collect()
}

fn parse_pauses(
    section: &SectionWithRange,
    body: &str,
) -> Result<Vec<TempoEvent>, ChartErrorWithRange> {
    parse_pairs(section, body)?
        .into_iter()
        .map(|(beat_text, duration_text)| {
            Ok(TempoEvent::Pause {
                beat: parse_number(section, beat_text)?,
                duration_ms: parse_number(section, duration_text)?,
            })
        })
        .collect()
}

/// Splits the grid field into measures on `,` and each measure into rows on whitespace.
fn parse_grid(grid: &str) -> Vec<Measure> {
    grid.split(',')
        .map(|measure| Measure {
            rows: measure.split_whitespace().map(ToOwned::to_owned).collect(),
        })
        .collect()
}

fn grid_field(
    section: &SectionWithRange,
    body: &str,
    step_type: &StepType,
) -> Result<Vec<Measure>, ChartErrorWithRange> {
    let grid = body.split(':').nth(GRID_FIELD).ok_or_else(|| {
        ChartError::MissingNoteData {
            step_type: step_type.to_string(),
        }
        .into_wrapper(section)
    })?;
    Ok(parse_grid(grid))
}

/// Extracts the chart of `step_type` with the global tempo directives and offset.
///
/// The first `NOTES` section with the identifier wins. Every `BPMS` and `STOPS` section
/// contributes events, and the last `OFFSET` section wins.
///
/// # Errors
///
/// [`SelectError::StepTypeNotFound`] if no `NOTES` section has the identifier, or
/// [`SelectError::Chart`] if a number or the grid field of the selected section is malformed.
pub fn select(
    sections: &[SectionWithRange],
    step_type: &StepType,
) -> Result<SelectOutput, SelectError> {
    let mut tempo_events = vec![];
    let mut offset_seconds = 0.0;
    for section in sections {
        let body = section.content().body();
        if body.is_empty() {
            continue;
        }
        match section.content().name() {
            "BPMS" => tempo_events.extend(parse_tempos(section, &body)?),
            "STOPS" => tempo_events.extend(parse_pauses(section, &body)?),
            "OFFSET" => offset_seconds = parse_number(section, &body)?,
            _ => {}
        }
    }

    let mut select_warnings = vec![];
    let notes = identified_notes(sections, &mut select_warnings);
    let (_, section, body) = notes
        .into_iter()
        .find(|(found, _, _)| found == step_type)
        .ok_or_else(|| SelectError::StepTypeNotFound(step_type.clone()))?;
    let measures = grid_field(section, &body, step_type)?;

    Ok(SelectOutput {
        chart: SelectedChart {
            step_type: step_type.clone(),
            measures,
            tempo_events,
            offset_seconds,
        },
        select_warnings,
    })
}

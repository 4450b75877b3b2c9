//! The conversion pipeline, from chart text to the note collection of a document.
//!
//! Chart text == [`crate::sm::lex`] ==> sections == [`crate::sm::step_type`] ==> chart ==
//! [`Timeline`] ==> timed events == [`crate::tap`] ==> notes == [`crate::archive::patch`] ==>
//! document
//!
//! Every stage finishes before the next one starts, and the document on disk is touched only after
//! all of them succeeded.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    archive::{
        ArchiveError, KeyedArchive,
        patch::{PatchError, replace_notes},
        save_with_backup,
    },
    config::{ConvertConfig, SymbolPolicy},
    prompt::StepTypePrompter,
    sm::{
        ChartErrorWithRange, SmWarningWithRange,
        lex::{self, LexOutput},
        step_type::{self, SelectError, SelectOutput, StepType, StepTypesOutput},
    },
    tap::{self, TapError, TapNote, TapOutput, TapWarning},
    timeline::Timeline,
};

/// A non-fatal problem found during the conversion.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvertWarning {
    /// From reading the chart text.
    #[error("Warn: chart: {0}")]
    Sm(#[from] SmWarningWithRange),
    /// From generating notes.
    #[error("Warn: notes: {0}")]
    Tap(#[from] TapWarning),
}

/// An error occurred during the conversion. The target document is untouched when one is raised.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No `NOTES` section has the requested identifier.
    #[error("step type `{0}` not found")]
    StepTypeNotFound(StepType),
    /// The prompter declined to choose a step type.
    #[error("no step type chosen")]
    NoStepTypeChosen,
    /// The note collection of the target is empty, so there is no class to give the new notes.
    #[error("no notes in target")]
    NoNotesInTarget,
    /// A chart section is malformed.
    #[error("chart: {0}")]
    Chart(#[from] ChartErrorWithRange),
    /// A grid symbol was rejected.
    #[error("notes: {0}")]
    Tap(#[from] TapError),
    /// The target document is malformed.
    #[error("target: {0}")]
    Archive(#[from] ArchiveError),
    /// A file could not be read.
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
}

impl From<SelectError> for ConvertError {
    fn from(value: SelectError) -> Self {
        match value {
            SelectError::StepTypeNotFound(step_type) => Self::StepTypeNotFound(step_type),
            SelectError::Chart(err) => Self::Chart(err),
        }
    }
}

impl From<PatchError> for ConvertError {
    fn from(value: PatchError) -> Self {
        match value {
            PatchError::NoNotesInTarget => Self::NoNotesInTarget,
            PatchError::Archive(err) => Self::Archive(err),
        }
    }
}

/// Enumerates the step types of the chart text.
pub fn step_types(source: &str) -> StepTypesOutput {
    let LexOutput {
        sections,
        lex_warnings,
    } = lex::parse(source);
    let StepTypesOutput {
        step_types,
        warnings,
    } = step_type::step_types(&sections);
    StepTypesOutput {
        step_types,
        warnings: lex_warnings.into_iter().chain(warnings).collect(),
    }
}

/// Notes of a chart, with warnings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct TapNotesOutput {
    /// Notes sorted by time.
    pub notes: Vec<TapNote>,
    /// Warnings from every stage.
    pub warnings: Vec<ConvertWarning>,
}

/// Converts the chart of `step_type` in the chart text into notes.
///
/// # Errors
///
/// [`ConvertError::StepTypeNotFound`], [`ConvertError::Chart`], or [`ConvertError::Tap`] under
/// [`SymbolPolicy::Reject`].
///
/// # Example
///
/// ```
/// use steptap::{config::SymbolPolicy, convert::tap_notes, tap::TapNote};
///
/// let source = "#OFFSET:0;\n#BPMS:0=120;\n#NOTES:dance-single::Hard::1.000:0000\n1000\n0000\n0000;\n";
/// let output = tap_notes(source, &"dance-single-hard".into(), SymbolPolicy::Ignore).unwrap();
/// assert_eq!(output.notes, vec![TapNote::new(500, 0)]);
/// ```
pub fn tap_notes(
    source: &str,
    step_type: &StepType,
    policy: SymbolPolicy,
) -> Result<TapNotesOutput, ConvertError> {
    let LexOutput {
        sections,
        lex_warnings,
    } = lex::parse(source);
    let SelectOutput {
        chart,
        select_warnings,
    } = step_type::select(&sections, step_type)?;
    let offset_seconds = chart.offset_seconds;
    let timed = Timeline::from_chart(&chart).resolve(offset_seconds);
    let TapOutput {
        notes,
        tap_warnings,
    } = tap::generate(&timed, policy)?;

    let warnings = lex_warnings
        .into_iter()
        .chain(select_warnings)
        .map(ConvertWarning::from)
        .chain(tap_warnings.into_iter().map(ConvertWarning::from))
        .collect();
    Ok(TapNotesOutput { notes, warnings })
}

/// Result of a conversion written to disk.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ConvertOutput {
    /// The notes written.
    pub notes: Vec<TapNote>,
    /// Number of notes the collection held before.
    pub replaced: usize,
    /// Where the original document was copied to.
    pub backup_path: PathBuf,
    /// Warnings from every stage.
    pub warnings: Vec<ConvertWarning>,
}

/// A chart file and the document file its notes go to.
///
/// # Example
///
/// ```no_run
/// use steptap::convert::StepToTap;
///
/// let converter = StepToTap::new("song.sm", "song.plist");
/// let types = converter.step_types()?.step_types;
/// println!("{types:?}");
/// converter.convert(&"dance-single-hard".into())?;
/// # Ok::<(), steptap::convert::ConvertError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepToTap {
    chart_path: PathBuf,
    target_path: PathBuf,
    config: ConvertConfig,
}

impl StepToTap {
    /// Binds a chart file and a target document, with the default configuration.
    pub fn new(chart_path: impl Into<PathBuf>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            chart_path: chart_path.into(),
            target_path: target_path.into(),
            config: ConvertConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }

    /// The chart file.
    #[must_use]
    pub fn chart_path(&self) -> &Path {
        &self.chart_path
    }

    /// The target document.
    #[must_use]
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Reads the chart file. Invalid UTF-8 sequences are replaced.
    fn read_chart(&self) -> Result<String, ConvertError> {
        let bytes = std::fs::read(&self.chart_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Enumerates the step types of the chart file.
    ///
    /// # Errors
    ///
    /// [`ConvertError::Io`] if the chart file cannot be read.
    pub fn step_types(&self) -> Result<StepTypesOutput, ConvertError> {
        Ok(step_types(&self.read_chart()?))
    }

    /// Converts the chart of `step_type` and replaces the note collection of the target.
    ///
    /// The target is backed up to its path with [`ConvertConfig::backup_suffix`] appended right
    /// before it is overwritten.
    ///
    /// # Errors
    ///
    /// Any [`ConvertError`]. The target is left untouched in every case but a failure to write the
    /// document after its backup was made.
    pub fn convert(&self, step_type: &StepType) -> Result<ConvertOutput, ConvertError> {
        let TapNotesOutput { notes, warnings } =
            tap_notes(&self.read_chart()?, step_type, self.config.symbol_policy)?;

        let mut archive = KeyedArchive::open(&self.target_path)?;
        let located = replace_notes(&mut archive, &self.config.collection_key, &notes)?;
        let backup_path =
            save_with_backup(&archive, &self.target_path, &self.config.backup_suffix)?;

        Ok(ConvertOutput {
            notes,
            replaced: located.previous_len(),
            backup_path,
            warnings,
        })
    }

    /// Lets `prompter` choose among the step types of the chart, then converts that one.
    ///
    /// # Errors
    ///
    /// [`ConvertError::NoStepTypeChosen`] if the prompter declines, otherwise as [`Self::convert`].
    pub fn convert_with_prompter(
        &self,
        prompter: &mut impl StepTypePrompter,
    ) -> Result<ConvertOutput, ConvertError> {
        let StepTypesOutput { step_types, .. } = self.step_types()?;
        let chosen = prompter
            .choose(&step_types)
            .ok_or(ConvertError::NoStepTypeChosen)?;
        self.convert(&chosen)
    }
}

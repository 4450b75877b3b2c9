//! The parser module of StepMania chart (`.sm`) text.
//!
//! Raw [String] == [`lex`] ==> [`lex::Section`]s == [`step_type`] ==> [`step_type::SelectedChart`]
//!
//! `lex` splits the text into `#NAME:body;` sections. `step_type` enumerates the chart variants
//! found in `NOTES` sections and extracts the grid and tempo directives of one of them.
//!
//! Our policies are:
//!
//! - Sections are recognized line by line. A section opens on a line starting with `#` and closes
//!   on the first line ending with `;`.
//! - Everything after `//` on a line is a comment.
//! - Tags other than `BPMS`, `STOPS`, `OFFSET` and `NOTES` are tokenized but never interpreted.

pub mod lex;
pub mod step_type;
pub mod symbol;

use thiserror::Error;

use crate::mixin::SourceRangeMixin;

/// A non-fatal problem found while reading the chart text.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmWarning {
    /// The section was never closed with `;`, so it spans until the end of the text.
    #[error("section `#{name}` is not terminated with `;`")]
    UnterminatedSection {
        /// Name of the section.
        name: String,
    },
    /// A `NOTES` section has too few `:` separated fields to name its step type.
    #[error("`#NOTES` section has too few fields to derive a step type")]
    UnidentifiableNotes,
}

/// A warning with the span of the section it was found in.
pub type SmWarningWithRange = SourceRangeMixin<SmWarning>;

/// An error occurred when interpreting chart sections. Nothing is written once one is raised.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartError {
    /// A number in `BPMS`, `STOPS` or `OFFSET` could not be parsed.
    #[error("invalid number `{value}` in `#{section}`")]
    InvalidNumber {
        /// Name of the section.
        section: String,
        /// The text failed to parse.
        value: String,
    },
    /// An item in `BPMS` or `STOPS` is not of the form `beat=value`.
    #[error("expected `beat=value` but found `{item}` in `#{section}`")]
    MalformedPair {
        /// Name of the section.
        section: String,
        /// The offending item.
        item: String,
    },
    /// A tempo of zero, or not finite, would make every later time meaningless.
    #[error("BPM `{bpm}` at beat `{beat}` must be a non-zero finite number")]
    InvalidBpm {
        /// The beat of the tempo change, as written.
        beat: String,
        /// The tempo, as written.
        bpm: String,
    },
    /// The selected `NOTES` section has no note data field.
    #[error("`#NOTES` section for `{step_type}` has no note data")]
    MissingNoteData {
        /// The identifier of the selected chart.
        step_type: String,
    },
}

/// A chart error with the span of the section it was raised for.
pub type ChartErrorWithRange = SourceRangeMixin<ChartError>;

//! Converts StepMania charts (`.sm`) into the note collection of a keyed archive document.
//!
//! The conversion runs in stages, each finishing before the next starts:
//!
//! 1. [`sm::lex`] splits the chart text into `#NAME:body;` sections.
//! 2. [`sm::step_type`] enumerates chart variants and extracts the grid, tempo changes, pauses
//!    and offset of one of them.
//! 3. [`timeline`] orders tempo and note events by beat and resolves them into milliseconds.
//! 4. [`tap`] turns the note events into tap and hold notes.
//! 5. [`archive::patch`] replaces the note collection of the target document, keeping the class
//!    of its existing notes, and [`archive::save_with_backup`] writes it after a backup copy.
//!
//! [`convert`] ties the stages together.
//!
//! # Example
//!
//! ```
//! use steptap::{
//!     config::SymbolPolicy,
//!     convert::{step_types, tap_notes},
//!     sm::step_type::StepType,
//! };
//!
//! let source = r"
//! #OFFSET:0;
//! #BPMS:0=120;
//! #NOTES:
//!      dance-single:
//!      :
//!      Hard:
//!      1:
//!      :
//! 0000
//! 1000
//! 2000
//! 3000
//! ;
//! ";
//! let types = step_types(source).step_types;
//! assert_eq!(types, vec![StepType::from("dance-single-hard")]);
//!
//! let output = tap_notes(source, &types[0], SymbolPolicy::Ignore).unwrap();
//! assert_eq!(output.notes.len(), 2);
//! assert_eq!(output.notes[1].time_ms, 1000);
//! assert_eq!(output.notes[1].hold_duration_ms, 500);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod archive;
pub mod config;
pub mod convert;
#[cfg(feature = "diagnostics")]
#[cfg_attr(docsrs, doc(cfg(feature = "diagnostics")))]
pub mod diagnostics;
pub mod mixin;
pub mod prelude;
pub mod prompt;
pub mod sm;
pub mod tap;
pub mod timeline;

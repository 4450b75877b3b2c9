//! Prelude module for the crate.
//!
//! You can use `use steptap::prelude::*;` to import the commonly used types at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{SimpleSource, ToAriadne, emit_convert_warnings, emit_sm_warnings};

pub use crate::{
    archive::{
        ArchiveError, KeyedArchive, ObjRef, PlistFormat,
        patch::{NoteCollection, PatchError, replace_notes},
        save_with_backup,
    },
    config::{ConvertConfig, SymbolPolicy},
    convert::{
        ConvertError, ConvertOutput, ConvertWarning, StepToTap, TapNotesOutput, step_types,
        tap_notes,
    },
    mixin::{SourceRangeMixin, SourceRangeMixinExt},
    prompt::{FirstAvailable, Fixed, StepTypePrompter},
    sm::{
        ChartError, ChartErrorWithRange, SmWarning, SmWarningWithRange,
        lex::{LexOutput, Section, SectionWithRange},
        step_type::{Measure, SelectError, SelectOutput, SelectedChart, StepType, StepTypesOutput},
        symbol::NoteSymbol,
    },
    tap::{HOLD_FLAG, TapError, TapNote, TapOutput, TapWarning},
    timeline::{NoteDirective, TempoEvent, TimedEvent, Timeline, TimelineEvent},
};

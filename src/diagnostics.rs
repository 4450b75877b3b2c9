//! Fancy diagnostics support using `ariadne`.
//!
//! Chart warnings and errors carry the byte span of their section ([`SourceRangeMixin`]), so
//! ariadne can point into the chart text and work out rows and columns by itself. Warnings from
//! note generation have no span and are reported at the start of the text.
//!
//! # Usage Example
//!
//! ```rust
//! use steptap::{convert::step_types, diagnostics::emit_sm_warnings};
//!
//! let source = "#TITLE:Test;\n#NOTES:broken;\n#BPMS:0=120\n";
//! let output = step_types(source);
//! emit_sm_warnings("test.sm", source, &output.warnings);
//! ```
//!
//! [`SourceRangeMixin`]: crate::mixin::SourceRangeMixin

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::{
    convert::ConvertWarning,
    sm::{ChartErrorWithRange, SmWarningWithRange},
};

/// Simple source container that holds the filename and source text.
pub struct SimpleSource<'a> {
    /// Name of the source file.
    name: &'a str,
    /// Source text content.
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Create a new source container instance.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Get source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Get source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Trait for converting positioned warnings and errors to `ariadne::Report`.
pub trait ToAriadne {
    /// Convert to ariadne Report.
    fn to_report<'a>(&self, src: &SimpleSource<'a>)
    -> Report<'a, (String, std::ops::Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: std::ops::Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, std::ops::Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

impl ToAriadne for SmWarningWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Warning,
            self.range(),
            "Chart",
            self.content(),
            Color::Yellow,
        )
    }
}

impl ToAriadne for ChartErrorWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Error,
            self.range(),
            "Chart",
            self.content(),
            Color::Red,
        )
    }
}

impl ToAriadne for ConvertWarning {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        match self {
            Self::Sm(warning) => warning.to_report(src),
            Self::Tap(warning) => {
                build_report(src, ReportKind::Warning, 0..0, "Notes", warning, Color::Cyan)
            }
        }
    }
}

/// Batch render chart warnings.
pub fn emit_sm_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a SmWarningWithRange>,
) {
    emit_reports(name, source, warnings);
}

/// Batch render conversion warnings.
pub fn emit_convert_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ConvertWarning>,
) {
    emit_reports(name, source, warnings);
}

fn emit_reports<'a, T: ToAriadne + 'a>(
    name: &'a str,
    source: &'a str,
    items: impl IntoIterator<Item = &'a T>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for item in items {
        let report = item.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Collect `ariadne::Report` instances for conversion warnings without printing.
#[must_use]
pub fn collect_convert_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ConvertWarning>,
) -> Vec<Report<'a, (String, std::ops::Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings.into_iter().map(|w| w.to_report(&simple)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SymbolPolicy,
        convert::{step_types, tap_notes},
    };

    #[test]
    fn reports_every_warning() {
        let source = "#NOTES:broken;\n#NOTES:dance-single::Hard::1:M003;\n#TITLE:open";
        let output = tap_notes(source, &"dance-single-hard".into(), SymbolPolicy::Ignore).unwrap();
        // unterminated TITLE, unidentifiable NOTES, mine, unmatched hold end
        assert_eq!(output.warnings.len(), 4);
        let reports = collect_convert_reports("test.sm", source, &output.warnings);
        assert_eq!(reports.len(), 4);
    }

    fn strip_ansi(text: &str) -> String {
        let mut plain = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                chars.by_ref().find(|&c| c == 'm');
            } else {
                plain.push(c);
            }
        }
        plain
    }

    #[test]
    fn spans_are_byte_offsets() {
        let source = "#TITLE:蝶蝶蝶蝶蝶蝶蝶蝶;\n#ARTIST:x;\n#NOTES:broken;";
        let output = step_types(source);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(&source[output.warnings[0].range()], "#NOTES:broken;");

        let report = output.warnings[0].to_report(&SimpleSource::new("test.sm", source));
        let mut rendered = vec![];
        report
            .write(("test.sm".to_string(), Source::from(source)), &mut rendered)
            .unwrap();
        let rendered = strip_ansi(&String::from_utf8(rendered).unwrap());
        assert!(rendered.contains("#NOTES:broken;"), "{rendered}");
    }
}

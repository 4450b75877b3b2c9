//! Lexical analyzer splitting chart text into `#NAME:body;` sections.

use crate::mixin::{SourceRangeMixin, SourceRangeMixinExt};

use super::{SmWarning, SmWarningWithRange};

/// A named block of chart text, `#NAME:body;`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    name: String,
    fragments: Vec<String>,
}

impl Section {
    /// Upper-cased tag between `#` and the first `:`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comment-stripped and trimmed lines of the body, the terminating `;` removed.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The body, fragments joined by newlines.
    #[must_use]
    pub fn body(&self) -> String {
        self.fragments.join("\n")
    }
}

/// A section with the byte span it covers in the source.
pub type SectionWithRange = SourceRangeMixin<Section>;

/// Lex results, includes sections and warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct LexOutput {
    /// Sections in order of appearance.
    pub sections: Vec<SectionWithRange>,
    /// Warnings that occurred during lexing.
    pub lex_warnings: Vec<SmWarningWithRange>,
}

struct OpenSection {
    name: String,
    fragments: Vec<String>,
    start: usize,
    end: usize,
}

impl OpenSection {
    fn close(self) -> SectionWithRange {
        Section {
            name: self.name,
            fragments: self.fragments,
        }
        .into_wrapper_range(self.start..self.end)
    }
}

enum LexState {
    Idle,
    Open(OpenSection),
}

fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code)
}

/// Splits `#NAME:rest` into the upper-cased name and the rest of the line.
fn section_header(line: &str) -> Option<(String, &str)> {
    let header = line.strip_prefix('#')?;
    let (name, rest) = header.split_once(':')?;
    Some((name.to_uppercase(), rest))
}

/// Appends `fragment` to the open section, closing it if the fragment ends with `;`.
fn feed(mut open: OpenSection, fragment: &str, sections: &mut Vec<SectionWithRange>) -> LexState {
    if let Some(last) = fragment.strip_suffix(';') {
        open.fragments.push(last.to_owned());
        sections.push(open.close());
        LexState::Idle
    } else {
        open.fragments.push(fragment.to_owned());
        LexState::Open(open)
    }
}

/// Analyzes and converts the chart text into [`Section`]s.
///
/// Malformed input never fails here: a section missing its `;` collects every line until the end
/// of the text and is reported with [`SmWarning::UnterminatedSection`].
pub fn parse(source: &str) -> LexOutput {
    let mut sections = vec![];
    let mut state = LexState::Idle;
    let mut line_start = 0;

    for raw in source.split_inclusive('\n') {
        let content_start = line_start + (raw.len() - raw.trim_start().len());
        let content_end = line_start + raw.trim_end().len();
        line_start += raw.len();

        let line = strip_comment(raw).trim();
        state = match state {
            LexState::Idle => match section_header(line) {
                Some((name, rest)) => {
                    let open = OpenSection {
                        name,
                        fragments: vec![],
                        start: content_start,
                        end: content_end,
                    };
                    feed(open, rest, &mut sections)
                }
                None => LexState::Idle,
            },
            LexState::Open(mut open) => {
                open.end = content_end.max(open.end);
                feed(open, line, &mut sections)
            }
        };
    }

    let mut lex_warnings = vec![];
    if let LexState::Open(open) = state {
        let section = open.close();
        lex_warnings.push(
            SmWarning::UnterminatedSection {
                name: section.content().name().to_owned(),
            }
            .into_wrapper(&section),
        );
        sections.push(section);
    }

    LexOutput {
        sections,
        lex_warnings,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names_and_bodies(output: &LexOutput) -> Vec<(String, String)> {
        output
            .sections
            .iter()
            .map(|s| (s.content().name().to_owned(), s.content().body()))
            .collect()
    }

    #[test]
    fn simple() {
        const SRC: &str = r"
#TITLE:Butterfly;
#offset:-0.010;
#BPMS:0.000=135.000
,64.000=140.000;
";
        let output = parse(SRC);
        assert_eq!(output.lex_warnings, vec![]);
        assert_eq!(
            names_and_bodies(&output),
            vec![
                ("TITLE".to_owned(), "Butterfly".to_owned()),
                ("OFFSET".to_owned(), "-0.010".to_owned()),
                ("BPMS".to_owned(), "0.000=135.000\n,64.000=140.000".to_owned()),
            ]
        );
    }

    #[test]
    fn comments_are_stripped() {
        const SRC: &str = "#NOTES:\n     dance-single: // style\n  :\n// measure 1\n0000\n;";
        let output = parse(SRC);
        assert_eq!(
            names_and_bodies(&output),
            vec![(
                "NOTES".to_owned(),
                "\ndance-single:\n:\n\n0000\n".to_owned()
            )]
        );
    }

    #[test]
    fn lines_outside_sections_are_ignored() {
        const SRC: &str = "garbage\n#NOCOLON\n#SUBTITLE:;\nmore garbage\n";
        let output = parse(SRC);
        assert_eq!(
            names_and_bodies(&output),
            vec![("SUBTITLE".to_owned(), String::new())]
        );
    }

    #[test]
    fn hash_inside_open_section_is_body() {
        const SRC: &str = "#BPMS:0=120\n#STOPS:;\n";
        let output = parse(SRC);
        assert_eq!(
            names_and_bodies(&output),
            vec![("BPMS".to_owned(), "0=120\n#STOPS:".to_owned())]
        );
    }

    #[test]
    fn unterminated_section() {
        const SRC: &str = "#TITLE:ok;\n#NOTES:dance-single\n0000";
        let output = parse(SRC);
        assert_eq!(output.sections.len(), 2);
        assert_eq!(
            output.lex_warnings,
            vec![
                SmWarning::UnterminatedSection {
                    name: "NOTES".to_owned()
                }
                .into_wrapper_range(11..35)
            ]
        );
    }

    #[test]
    fn section_range_covers_all_lines() {
        const SRC: &str = "  #BPMS:0=120\r\n,4=60;  \r\n";
        let output = parse(SRC);
        let section = &output.sections[0];
        assert_eq!(section.range(), 2..21);
        assert_eq!(section.content().body(), "0=120\n,4=60");
    }
}

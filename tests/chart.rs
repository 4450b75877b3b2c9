use pretty_assertions::assert_eq;
use steptap::prelude::*;

const TEST_SONG: &str = include_str!("files/test_song.sm");

fn hold(time_ms: i64, hold_duration_ms: i64, lane: usize) -> TapNote {
    TapNote {
        time_ms,
        hold_duration_ms,
        lane,
        flags: lane as u32 | HOLD_FLAG,
    }
}

#[test]
fn test_step_types_of_file() {
    let output = step_types(TEST_SONG);
    assert_eq!(output.warnings, vec![]);
    assert_eq!(
        output.step_types,
        vec![
            StepType::from("dance-single-easy"),
            StepType::from("dance-single-hard"),
            StepType::from("dance-double-medium"),
        ]
    );
}

#[test]
fn test_every_enumerated_step_type_converts() {
    for step_type in step_types(TEST_SONG).step_types {
        let output = tap_notes(TEST_SONG, &step_type, SymbolPolicy::Ignore);
        assert!(output.is_ok(), "{step_type}: {output:?}");
    }
}

#[test]
fn test_tempo_changes_and_pauses() {
    let output = tap_notes(
        TEST_SONG,
        &StepType::from("dance-single-easy"),
        SymbolPolicy::Reject,
    )
    .unwrap();
    assert_eq!(output.warnings, vec![]);
    // offset -0.1s starts beat 0 at 100ms, 120 BPM is 500ms a beat,
    // the pause on beat 4 adds 500ms and the tempo doubles on beat 8
    assert_eq!(
        output.notes,
        vec![
            TapNote::new(100, 0),
            TapNote::new(1100, 1),
            hold(2100, 1500, 0),
            TapNote::new(3100, 2),
            TapNote::new(4100, 3),
            TapNote::new(4600, 0),
            TapNote::new(4600, 3),
        ]
    );
}

#[test]
fn test_unsupported_symbols() {
    let hard = StepType::from("dance-single-hard");
    let output = tap_notes(TEST_SONG, &hard, SymbolPolicy::Ignore).unwrap();
    assert_eq!(
        output.notes,
        vec![TapNote::new(100, 0), hold(600, 1000, 3)]
    );
    assert_eq!(
        output.warnings,
        vec![ConvertWarning::Tap(TapWarning::UnsupportedSymbol {
            symbol: NoteSymbol::Mine,
            lane: 1,
            beat: 0.0,
        })]
    );

    let rejected = tap_notes(TEST_SONG, &hard, SymbolPolicy::Reject);
    assert!(matches!(
        rejected,
        Err(ConvertError::Tap(TapError::UnsupportedSymbol {
            symbol: NoteSymbol::Mine,
            lane: 1,
            ..
        }))
    ));
}

#[test]
fn test_double_lanes() {
    let output = tap_notes(
        TEST_SONG,
        &StepType::from("dance-double-medium"),
        SymbolPolicy::Ignore,
    )
    .unwrap();
    assert_eq!(
        output.notes,
        vec![TapNote::new(100, 0), TapNote::new(100, 7)]
    );
}

#[test]
fn test_step_type_not_found() {
    let err = tap_notes(
        TEST_SONG,
        &StepType::from("dance-single-challenge"),
        SymbolPolicy::Ignore,
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::StepTypeNotFound(ref t) if t.as_str() == "dance-single-challenge"));
    assert_eq!(
        err.to_string(),
        "step type `dance-single-challenge` not found"
    );
}

#[test]
fn test_single_tap_at_one_beat() {
    // one section per line, tap on row 1 of a 4-row measure, so beat 1 at 120 BPM
    const SRC: &str = "#OFFSET:0;\n#BPMS:0=120;\n#NOTES:dance-single::Hard::1.000:0000\n1000\n0000\n0000;\n";
    let output = tap_notes(SRC, &StepType::from("dance-single-hard"), SymbolPolicy::Ignore)
        .unwrap();
    assert_eq!(output.notes, vec![TapNote::new(500, 0)]);
    assert_eq!(output.notes[0].hold_duration_ms, 0);
}

#[test]
fn test_missing_offset_and_tempo() {
    const SRC: &str = "#NOTES:dance-single::Beginner:1::0000,1000;\n";
    let output = tap_notes(
        SRC,
        &StepType::from("dance-single-beginner"),
        SymbolPolicy::Ignore,
    )
    .unwrap();
    // 60 BPM from the start, measure 1 is beat 4
    assert_eq!(output.notes, vec![TapNote::new(4000, 0)]);
}

#[test]
fn test_malformed_offset_is_an_error() {
    const SRC: &str = "#OFFSET:soon;\n#NOTES:dance-single::Hard::1::1000;\n";
    let err = tap_notes(SRC, &StepType::from("dance-single-hard"), SymbolPolicy::Ignore)
        .unwrap_err();
    let ConvertError::Chart(chart_err) = err else {
        panic!("expected chart error");
    };
    assert_eq!(
        chart_err.content(),
        &ChartError::InvalidNumber {
            section: "OFFSET".to_owned(),
            value: "soon".to_owned(),
        }
    );
    assert_eq!(chart_err.range(), 0..13);
}

#[test]
fn test_identifier_roundtrip() {
    let LexOutput { sections, .. } = steptap::sm::lex::parse("#NOTES:a:b:c:d:e:1,2;");
    let section = sections[0].content();
    assert_eq!(section.name(), "NOTES");
    let fields: Vec<_> = section.body().split(':').map(str::trim).map(str::to_owned).collect();
    let expected = format!("{}-{}", fields[0].to_lowercase(), fields[2].to_lowercase());
    assert_eq!(
        StepType::from_notes_body(&section.body()).map(|t| t.to_string()),
        Some(expected)
    );
}

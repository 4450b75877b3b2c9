//! Convert the notes of a StepMania chart into the note collection of a keyed-archive document.
//!
//! Usage:
//!   cargo run --example `sm_to_tap` -- <`chart_path`> <`target_path`> [--step-type <TYPE>]
//!
//! Without `--step-type`, the step types of the chart are listed and one is read from stdin.
//! The target is backed up next to itself before it is overwritten.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use steptap::prelude::*;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sm_to_tap")]
#[command(about = "Replaces the tap notes of a document with a StepMania chart", long_about = None)]
struct Args {
    /// Chart file path
    #[arg(value_name = "CHART")]
    chart_path: PathBuf,

    /// Document file path
    #[arg(value_name = "TARGET")]
    target_path: PathBuf,

    /// Step type to convert, like `dance-single-hard`
    #[arg(short, long, value_name = "TYPE")]
    step_type: Option<String>,

    /// List the step types of the chart and exit
    #[arg(short, long)]
    list: bool,

    /// Suffix appended to the target path for the backup copy
    #[arg(long, default_value = ".bak", value_name = "SUFFIX")]
    backup_suffix: String,

    /// Fail on grid symbols other than taps and holds instead of skipping them
    #[arg(long)]
    reject_unsupported: bool,
}

/// Lists the step types on stdout and reads the chosen one from stdin.
fn ask(available: &[StepType]) -> Option<StepType> {
    println!("Step types found:");
    for (i, step_type) in available.iter().enumerate() {
        println!("  {}: {}", i + 1, step_type);
    }
    print!("Choose a number or a name: ");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let answer = line.trim();
    if answer.is_empty() {
        return None;
    }
    match answer.parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| available.get(i)).cloned(),
        Err(_) => Some(StepType::from(answer)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let policy = if args.reject_unsupported {
        SymbolPolicy::Reject
    } else {
        SymbolPolicy::Ignore
    };
    let config = ConvertConfig::default()
        .with_backup_suffix(args.backup_suffix)
        .with_symbol_policy(policy);
    let converter = StepToTap::new(&args.chart_path, &args.target_path).with_config(config);

    if args.list {
        return match converter.step_types() {
            Ok(output) => {
                for step_type in output.step_types {
                    println!("{step_type}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let result = match args.step_type {
        Some(step_type) => converter.convert(&StepType::from(step_type)),
        None => converter.convert_with_prompter(&mut ask),
    };

    match result {
        Ok(output) => {
            if !output.warnings.is_empty() {
                let name = args.chart_path.display().to_string();
                let source = std::fs::read_to_string(&args.chart_path).unwrap_or_default();
                emit_convert_warnings(&name, &source, &output.warnings);
            }
            println!(
                "Replaced {} notes with {}, backup at {}",
                output.replaced,
                output.notes.len(),
                output.backup_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(ConvertError::Chart(e)) => {
            let name = args.chart_path.display().to_string();
            let source = std::fs::read_to_string(&args.chart_path).unwrap_or_default();
            let _ = e
                .to_report(&SimpleSource::new(&name, &source))
                .eprint((name.clone(), ariadne::Source::from(source.as_str())));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

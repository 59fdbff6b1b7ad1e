use std::process;

use tycat_eval::catalog;
use tycat_eval::{run_catalog, Channel, EntryReport, RunOptions};

use crate::tap::Tap;
use crate::{print_json, report_error, OutputFormat, Settings};

pub(crate) fn cmd_run(only: &[String], settings: &Settings) {
    if let Some(label) = only.iter().find(|l| catalog::find(l).is_none()) {
        let msg = format!("unknown entry '{}'", label);
        report_error(&msg, settings.output, settings.quiet);
        process::exit(1);
    }

    let report = run_catalog(&RunOptions {
        step_limit: settings.step_limit,
        only: only.to_vec(),
        skip: settings.skip.clone(),
    });

    if !settings.quiet {
        match settings.output {
            OutputFormat::Json => print_json(&report),
            OutputFormat::Text => {
                let mut tap = Tap::new();
                for entry in &report.entries {
                    let desc = format!(
                        "{} ({}, {})",
                        entry.label, entry.category, entry.expectation
                    );
                    if entry.passed() {
                        tap.ok(desc, notes(entry));
                    } else {
                        tap.not_ok(desc, notes(entry));
                    }
                }
                tap.finish();
            }
        }
    }

    if !report.is_success() {
        process::exit(1);
    }
}

fn notes(entry: &EntryReport) -> Vec<String> {
    let mut notes: Vec<String> = entry
        .output
        .iter()
        .map(|o| match o.channel {
            Channel::Console => format!("console: {}", o.text),
            Channel::Alert => format!("alert: {}", o.text),
        })
        .collect();
    if let Some(probe) = &entry.probe {
        notes.push(format!("probe: {}", probe));
    }
    notes.extend(
        entry
            .diagnostics
            .iter()
            .map(|d| format!("{} error (line {}): {}", d.phase, d.line, d.message)),
    );
    if let Some(why) = &entry.failure {
        notes.push(format!("failure: {}", why));
    }
    notes
}

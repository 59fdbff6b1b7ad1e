//! The whole catalog must behave as each entry expects.

use tycat_eval::catalog::{self, Expect};
use tycat_eval::{run_catalog, Channel, RunOptions};

#[test]
fn every_entry_passes() {
    let report = run_catalog(&RunOptions::default());
    let failures: Vec<String> = report
        .entries
        .iter()
        .filter(|e| !e.passed())
        .map(|e| {
            format!(
                "{}: {} {:?}",
                e.label,
                e.failure.as_deref().unwrap_or(""),
                e.diagnostics.iter().map(|d| &d.message).collect::<Vec<_>>()
            )
        })
        .collect();
    assert!(failures.is_empty(), "failing entries:\n{}", failures.join("\n"));
    assert_eq!(report.passed, catalog::entries().len());
}

#[test]
fn only_the_enum_and_void_entries_write_output() {
    let report = run_catalog(&RunOptions::default());
    let writers: Vec<(&str, Channel, &str)> = report
        .entries
        .iter()
        .flat_map(|e| {
            e.output
                .iter()
                .map(move |o| (e.label.as_str(), o.channel, o.text.as_str()))
        })
        .collect();
    assert_eq!(
        writers,
        vec![
            ("enum", Channel::Alert, "Medium"),
            ("void", Channel::Console, "Lalalala"),
        ]
    );
}

#[test]
fn rejected_entries_carry_their_diagnostics() {
    let report = run_catalog(&RunOptions::default());
    for (entry, result) in catalog::entries().iter().zip(&report.entries) {
        if let Expect::Reject { diagnostic } = entry.expect {
            assert!(
                result.diagnostics.iter().any(|d| d.message.contains(diagnostic)),
                "{} lacks \"{}\"",
                entry.label,
                diagnostic
            );
        }
    }
}

#[test]
fn never_probe_reports_thrown_message() {
    let report = run_catalog(&RunOptions {
        only: vec!["never".into()],
        ..RunOptions::default()
    });
    assert_eq!(report.entries[0].probe.as_deref(), Some("throws blah!"));
}

#[test]
fn report_serializes_for_json_output() {
    let report = run_catalog(&RunOptions {
        only: vec!["tuple-overflow".into()],
        ..RunOptions::default()
    });
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["passed"], 1);
    let entry = &json["entries"][0];
    assert_eq!(entry["category"], "tuple");
    assert_eq!(entry["expectation"], "reject");
    assert_eq!(entry["status"], "pass");
    assert_eq!(entry["diagnostics"][0]["phase"], "check");
}

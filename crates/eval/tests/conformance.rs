//! Conformance suite for whole programs.
//!
//! Fixtures live under `conformance/` at the workspace root:
//! - `accept/<name>.tyc` + `<name>.out`: the program must check, evaluate
//!   without error and emit exactly the lines in `.out` (alerts are
//!   written as `[alert] text`).
//! - `reject/<name>.tyc` + `<name>.expected`: the program must be rejected
//!   and every line of `.expected` must appear in the diagnostics.

use std::path::{Path, PathBuf};

use tycat_eval::{exec_source, BufferSink, Channel, RunError, DEFAULT_STEP_LIMIT};

fn conformance_dir(kind: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("conformance")
        .join(kind)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}

fn run_accept_fixture(name: &str) {
    let dir = conformance_dir("accept");
    let src = read(&dir.join(format!("{}.tyc", name)));
    let expected = read(&dir.join(format!("{}.out", name)));

    let sink = BufferSink::new();
    exec_source(&src, name, Box::new(sink.clone()), DEFAULT_STEP_LIMIT)
        .unwrap_or_else(|e| panic!("{} failed: {}", name, e));

    let actual: Vec<String> = sink
        .take()
        .into_iter()
        .map(|e| match e.channel {
            Channel::Console => e.text,
            Channel::Alert => format!("[alert] {}", e.text),
        })
        .collect();
    let expected: Vec<&str> = expected.lines().collect();
    assert_eq!(
        actual, expected,
        "output mismatch for {}\n\nActual:\n{}\n\nExpected:\n{}",
        name,
        actual.join("\n"),
        expected.join("\n"),
    );
}

fn run_reject_fixture(name: &str) {
    let dir = conformance_dir("reject");
    let src = read(&dir.join(format!("{}.tyc", name)));
    let expected = read(&dir.join(format!("{}.expected", name)));

    let sink = BufferSink::new();
    let err = match exec_source(&src, name, Box::new(sink.clone()), DEFAULT_STEP_LIMIT) {
        Ok(()) => panic!("{} was accepted but should be rejected", name),
        Err(e) => e,
    };
    let diags = match err {
        RunError::Rejected(d) => d,
        RunError::Eval(e) => panic!("{} evaluated and failed instead: {}", name, e),
    };
    let rendered = diags.to_string();
    for line in expected.lines().filter(|l| !l.trim().is_empty()) {
        assert!(
            rendered.contains(line),
            "{}: missing diagnostic \"{}\"\n\nActual:\n{}",
            name,
            line,
            rendered
        );
    }
    assert!(sink.texts().is_empty(), "{} emitted output", name);
}

#[test]
fn every_fixture_is_listed() {
    for kind in ["accept", "reject"] {
        let count = std::fs::read_dir(conformance_dir(kind))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|x| x == "tyc"))
            .count();
        let listed = match kind {
            "accept" => ACCEPT.len(),
            _ => REJECT.len(),
        };
        assert_eq!(count, listed, "unlisted {} fixture", kind);
    }
}

const ACCEPT: &[&str] = &[
    "catalog",
    "class_fields",
    "enum_auto_increment",
    "loops",
    "narrowing",
    "optional_fields",
];

const REJECT: &[&str] = &[
    "boolean_mismatch",
    "collects_all",
    "missing_required",
    "never_completes",
    "private_access",
    "syntax_error",
    "tuple_overflow",
    "union_member",
];

// ──────────────────────────────────────────────
// Accepted programs
// ──────────────────────────────────────────────

#[test]
fn catalog() {
    run_accept_fixture("catalog");
}

#[test]
fn class_fields() {
    run_accept_fixture("class_fields");
}

#[test]
fn enum_auto_increment() {
    run_accept_fixture("enum_auto_increment");
}

#[test]
fn loops() {
    run_accept_fixture("loops");
}

#[test]
fn narrowing() {
    run_accept_fixture("narrowing");
}

#[test]
fn optional_fields() {
    run_accept_fixture("optional_fields");
}

// ──────────────────────────────────────────────
// Rejected programs
// ──────────────────────────────────────────────

#[test]
fn boolean_mismatch() {
    run_reject_fixture("boolean_mismatch");
}

#[test]
fn collects_all() {
    run_reject_fixture("collects_all");
}

#[test]
fn missing_required() {
    run_reject_fixture("missing_required");
}

#[test]
fn never_completes() {
    run_reject_fixture("never_completes");
}

#[test]
fn private_access() {
    run_reject_fixture("private_access");
}

#[test]
fn syntax_error() {
    run_reject_fixture("syntax_error");
}

#[test]
fn tuple_overflow() {
    run_reject_fixture("tuple_overflow");
}

#[test]
fn union_member() {
    run_reject_fixture("union_member");
}

//! Runs the catalog entry by entry against one persistent session.

use serde::Serialize;
use tycat_core::{parse, parse_expression, Checker, Diagnostic, Diagnostics};

use crate::catalog::{self, Category, Entry, Expect, Outcome, Probe};
use crate::interp::{Interpreter, DEFAULT_STEP_LIMIT};
use crate::sink::{BufferSink, Emission};
use crate::types::EvalError;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub step_limit: u64,
    /// Report only these labels; empty means all.
    pub only: Vec<String>,
    /// Labels left out of the report.
    pub skip: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            step_limit: DEFAULT_STEP_LIMIT,
            only: Vec::new(),
            skip: Vec::new(),
        }
    }
}

impl RunOptions {
    fn reports(&self, label: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|l| l == label))
            && !self.skip.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub label: String,
    pub category: Category,
    /// `accept` or `reject`.
    pub expectation: &'static str,
    pub status: Status,
    pub diagnostics: Vec<Diagnostic>,
    pub output: Vec<Emission>,
    /// What the probe actually produced, if the entry has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl EntryReport {
    fn new(entry: &Entry) -> Self {
        EntryReport {
            label: entry.label.to_owned(),
            category: entry.category,
            expectation: if entry.is_accepted() { "accept" } else { "reject" },
            status: Status::Pass,
            diagnostics: Vec::new(),
            output: Vec::new(),
            probe: None,
            failure: None,
        }
    }

    fn fail(&mut self, why: impl Into<String>) {
        self.status = Status::Fail;
        self.failure = Some(why.into());
    }

    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub entries: Vec<EntryReport>,
    pub passed: usize,
    pub failed: usize,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Checker and interpreter state shared by consecutive entries.
pub struct Session {
    checker: Checker,
    interp: Interpreter,
    output: BufferSink,
}

impl Session {
    pub fn new(step_limit: u64) -> Self {
        let output = BufferSink::new();
        let interp = Interpreter::new(Box::new(output.clone())).with_step_limit(step_limit);
        Session {
            checker: Checker::new("catalog"),
            interp,
            output,
        }
    }

    /// Check and, for accepted entries, evaluate one entry. Only entries
    /// that check cleanly change the session.
    pub fn run_entry(&mut self, entry: &Entry) -> EntryReport {
        let mut report = EntryReport::new(entry);
        let checked = parse(entry.source, entry.label)
            .map_err(Diagnostics::from)
            .and_then(|program| {
                let mut trial = self.checker.clone();
                trial.set_file(entry.label);
                trial.check_program(&program)?;
                Ok((program, trial))
            });

        match (&entry.expect, checked) {
            (Expect::Reject { diagnostic }, Err(diags)) => {
                if !diags.mentions(diagnostic) {
                    report.fail(format!("expected a diagnostic mentioning \"{}\"", diagnostic));
                }
                report.diagnostics = diags.0;
            }
            (Expect::Reject { .. }, Ok(_)) => {
                report.fail("accepted, but the checker should have rejected it");
            }
            (Expect::Accept { .. }, Err(diags)) => {
                report.fail("rejected by the checker");
                report.diagnostics = diags.0;
            }
            (Expect::Accept { probe }, Ok((program, trial))) => {
                self.checker = trial;
                let result = self.interp.run(&program);
                report.output = self.output.take();
                match result {
                    Err(e) => report.fail(format!("evaluation failed: {}", e)),
                    Ok(()) => {
                        if let Some(probe) = probe {
                            self.run_probe(entry.label, probe, &mut report);
                        }
                    }
                }
            }
        }
        log::debug!(
            "entry {}: {:?} ({} diagnostic(s))",
            entry.label,
            report.status,
            report.diagnostics.len()
        );
        report
    }

    fn run_probe(&mut self, label: &str, probe: &Probe, report: &mut EntryReport) {
        let expr = match parse_expression(probe.expr, label) {
            Ok(e) => e,
            Err(d) => {
                report.fail(format!("probe does not parse: {}", d));
                return;
            }
        };
        if let Err(diags) = self.checker.clone().check_expression(&expr) {
            report.fail(format!("probe rejected by the checker: {}", diags));
            return;
        }
        let result = self.interp.eval_expression(&expr);
        // Probe side effects are not part of the entry's output.
        self.output.take();
        let (actual, matched) = match (&probe.outcome, result) {
            (Outcome::Value(want), Ok(v)) => {
                let shown = v.inspect();
                let ok = shown == *want;
                (shown, ok)
            }
            (Outcome::Throws(want), Err(EvalError::Thrown { message })) => {
                let ok = message == *want;
                (format!("throws {}", message), ok)
            }
            (_, Ok(v)) => (v.inspect(), false),
            (_, Err(e)) => (e.to_string(), false),
        };
        if !matched {
            let want = match &probe.outcome {
                Outcome::Value(v) => (*v).to_owned(),
                Outcome::Throws(m) => format!("throws {}", m),
            };
            report.fail(format!("{} gave {}, expected {}", probe.expr, actual, want));
        }
        report.probe = Some(actual);
    }
}

/// Run every catalog entry in order. Filters only affect what is
/// reported; later entries depend on earlier declarations, so all run.
pub fn run_catalog(options: &RunOptions) -> Report {
    let mut session = Session::new(options.step_limit);
    let mut entries = Vec::new();
    for entry in catalog::entries() {
        let report = session.run_entry(entry);
        if options.reports(entry.label) {
            entries.push(report);
        }
    }
    let passed = entries.iter().filter(|e| e.passed()).count();
    let failed = entries.len() - passed;
    Report {
        entries,
        passed,
        failed,
    }
}

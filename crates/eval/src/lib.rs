//! tycat-eval: runs checked catalog-language programs.
//!
//! The interpreter evaluates programs that `tycat-core` has already
//! accepted. On top of it sit the example catalog, the runner that checks
//! and evaluates it entry by entry, and native Rust renditions of the same
//! features.

pub mod catalog;
pub mod interp;
pub mod native;
pub mod runner;
pub mod sink;
pub mod types;
pub mod value;

pub use catalog::{Category, Entry, Expect, Outcome, Probe};
pub use interp::{Interpreter, DEFAULT_STEP_LIMIT};
pub use runner::{run_catalog, EntryReport, Report, RunOptions, Session, Status};
pub use sink::{BufferSink, Channel, Emission, Sink, StdoutSink};
pub use types::{EvalError, RunError};
pub use value::Value;

use tycat_core::check_source;

/// Check `src` and, if it is accepted, evaluate it with output going to
/// `sink`.
pub fn exec_source(
    src: &str,
    file: &str,
    sink: Box<dyn Sink>,
    step_limit: u64,
) -> Result<(), RunError> {
    let (program, _checker) = check_source(src, file)?;
    log::debug!("{}: accepted, {} statement(s)", file, program.stmts.len());
    let mut interp = Interpreter::new(sink).with_step_limit(step_limit);
    interp.run(&program)?;
    Ok(())
}

pub(crate) mod check;
pub(crate) mod exec;
pub(crate) mod list;
pub(crate) mod native;
pub(crate) mod run;
pub(crate) mod show;

use std::path::Path;
use std::process;

use crate::{report_error, Settings};

/// Read a source file or exit with an error.
pub(crate) fn read_source(file: &Path, settings: &Settings) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", file.display(), e);
            report_error(&msg, settings.output, settings.quiet);
            process::exit(1);
        }
    }
}

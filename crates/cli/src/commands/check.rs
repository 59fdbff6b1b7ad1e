use std::path::Path;
use std::process;

use tycat_core::check_source;

use crate::commands::read_source;
use crate::{OutputFormat, Settings};

pub(crate) fn cmd_check(file: &Path, settings: &Settings) {
    let src = read_source(file, settings);
    let name = file.display().to_string();

    match check_source(&src, &name) {
        Ok((program, _)) => {
            log::debug!("{}: {} statement(s) checked", name, program.stmts.len());
            if !settings.quiet {
                match settings.output {
                    OutputFormat::Text => println!("ok: {}", name),
                    OutputFormat::Json => println!("{}", serde_json::json!({ "valid": true })),
                }
            }
        }
        Err(diags) => {
            match settings.output {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "valid": false,
                        "diagnostics": diags.iter().map(|d| d.to_json_value()).collect::<Vec<_>>(),
                    });
                    eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if !settings.quiet {
                        eprintln!("{}", diags);
                        eprintln!("{} error(s)", diags.len());
                    }
                }
            }
            process::exit(1);
        }
    }
}

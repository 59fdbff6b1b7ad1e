use std::path::Path;
use std::process;

use tycat_eval::{exec_source, BufferSink, RunError, Sink, StdoutSink};

use crate::commands::read_source;
use crate::{print_json, OutputFormat, Settings};

pub(crate) fn cmd_exec(file: &Path, settings: &Settings) {
    let src = read_source(file, settings);
    let name = file.display().to_string();

    // JSON collects output so it can be printed as one document.
    let buffer = BufferSink::new();
    let sink: Box<dyn Sink> = match settings.output {
        OutputFormat::Json => Box::new(buffer.clone()),
        OutputFormat::Text => Box::new(StdoutSink),
    };

    let result = exec_source(&src, &name, sink, settings.step_limit);
    if settings.output == OutputFormat::Json {
        print_json(&serde_json::json!({ "output": buffer.take() }));
    }
    if let Err(e) = result {
        report(&e, settings);
        process::exit(1);
    }
}

fn report(err: &RunError, settings: &Settings) {
    match settings.output {
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&err.to_json_value()).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            if !settings.quiet {
                eprintln!("{}", err);
            }
        }
    }
}

use tycat_eval::native::demonstrate;
use tycat_eval::{BufferSink, StdoutSink};

use crate::{print_json, OutputFormat, Settings};

pub(crate) fn cmd_native(settings: &Settings) {
    match settings.output {
        OutputFormat::Text => demonstrate(&mut StdoutSink),
        OutputFormat::Json => {
            let buffer = BufferSink::new();
            demonstrate(&mut buffer.clone());
            print_json(&serde_json::json!({ "output": buffer.take() }));
        }
    }
}

use std::process;

use tycat_eval::catalog::{self, Expect, Outcome};

use crate::{print_json, report_error, OutputFormat, Settings};

pub(crate) fn cmd_show(label: &str, settings: &Settings) {
    let Some(entry) = catalog::find(label) else {
        let msg = format!("unknown entry '{}'", label);
        report_error(&msg, settings.output, settings.quiet);
        process::exit(1);
    };

    match settings.output {
        OutputFormat::Json => print_json(entry),
        OutputFormat::Text => {
            if !settings.quiet {
                println!("// {} ({})", entry.label, entry.category);
                match &entry.expect {
                    Expect::Reject { diagnostic } => println!("// rejected: {}", diagnostic),
                    Expect::Accept { probe: None } => println!("// accepted"),
                    Expect::Accept { probe: Some(p) } => match &p.outcome {
                        Outcome::Value(v) => println!("// accepted; {} is {}", p.expr, v),
                        Outcome::Throws(m) => println!("// accepted; {} throws {}", p.expr, m),
                    },
                }
            }
            println!("{}", entry.source);
        }
    }
}

use tycat_eval::catalog::{self, Expect};

use crate::{print_json, OutputFormat, Settings};

pub(crate) fn cmd_list(settings: &Settings) {
    let entries = catalog::entries();
    match settings.output {
        OutputFormat::Json => {
            let listing: Vec<serde_json::Value> = entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "label": e.label,
                        "category": e.category,
                        "expect": if e.is_accepted() { "accept" } else { "reject" },
                    })
                })
                .collect();
            print_json(&listing);
        }
        OutputFormat::Text => {
            let width = entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
            for e in entries {
                let expect = match &e.expect {
                    Expect::Accept { .. } => "accept".to_owned(),
                    Expect::Reject { diagnostic } => format!("reject: {}", diagnostic),
                };
                println!("{:width$}  {:<10}  {}", e.label, e.category.to_string(), expect);
            }
            if !settings.quiet {
                println!();
                println!("{} entries", entries.len());
            }
        }
    }
}

mod commands;
mod config;
mod tap;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Catalog of static type-system features, checked and run.
#[derive(Parser)]
#[command(name = "tycat", version, about = "Catalog of static type-system features")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (default: tycat.toml in the current directory, if any)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluation step limit per entry or program
    #[arg(long, global = true)]
    step_limit: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check and evaluate every catalog entry, reporting each one
    Run {
        /// Comma-separated entry labels to report (default: all)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// List catalog entries
    List,

    /// Print the source of one catalog entry
    Show {
        /// Entry label, e.g. tuple-overflow
        label: String,
    },

    /// Parse and type-check a source file
    Check {
        /// Path to the source file
        file: PathBuf,
    },

    /// Type-check a source file, then evaluate it
    Exec {
        /// Path to the source file
        file: PathBuf,
    },

    /// Print the native Rust renditions of the catalog
    Native,
}

/// Flags and config file merged; flags win.
pub(crate) struct Settings {
    pub output: OutputFormat,
    pub quiet: bool,
    pub step_limit: u64,
    pub skip: Vec<String>,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Self {
        Settings {
            output: cli
                .output
                .or(config.output)
                .unwrap_or(OutputFormat::Text),
            quiet: cli.quiet || config.quiet.unwrap_or(false),
            step_limit: cli
                .step_limit
                .or(config.step_limit)
                .unwrap_or(tycat_eval::DEFAULT_STEP_LIMIT),
            skip: config.skip,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(
                &e.to_string(),
                cli.output.unwrap_or(OutputFormat::Text),
                cli.quiet,
            );
            process::exit(1);
        }
    };
    let settings = Settings::resolve(&cli, config);
    log::debug!(
        "output {:?}, step limit {}, {} skipped label(s)",
        settings.output,
        settings.step_limit,
        settings.skip.len()
    );

    match &cli.command {
        Commands::Run { only } => commands::run::cmd_run(only, &settings),
        Commands::List => commands::list::cmd_list(&settings),
        Commands::Show { label } => commands::show::cmd_show(label, &settings),
        Commands::Check { file } => commands::check::cmd_check(file, &settings),
        Commands::Exec { file } => commands::exec::cmd_exec(file, &settings),
        Commands::Native => commands::native::cmd_native(&settings),
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{{\"error\": \"serialization: {}\"}}", e),
    }
}

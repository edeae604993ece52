//! Command-line front end for hookgen.

use std::ffi::OsString;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod common;
pub mod generate;
pub mod inspect;

/// Crates whose log level `HOOKGEN_LOG=<level>` controls.
const LOG_TARGETS: [&str; 2] = ["hookgen_core", "hookgen_cli"];

#[derive(Parser, Debug)]
#[command(
    name = "hookgen",
    version,
    about = "Generate TypeScript query hooks from an OpenAPI document"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate types, the client surface and hooks
    Generate(generate::GenerateArgs),
    /// List routes with their generated names
    Inspect(inspect::InspectArgs),
}

/// Parse `args` (including the program name) and run the command.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing();
            match cli.command {
                Some(Commands::Generate(args)) => generate::run(args),
                Some(Commands::Inspect(args)) => inspect::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn log_filter(env: Option<&str>) -> String {
    // HOOKGEN_LOG is either a plain level or a full filter directive
    // like "hookgen_core=trace,hookgen_cli=info"
    let level = match env {
        Some(level) if is_plain_level(level) => level,
        Some(spec) => return spec.to_string(),
        None => "info",
    };
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn init_tracing() {
    let filter = log_filter(std::env::var("HOOKGEN_LOG").ok().as_deref());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    // A second run in the same process keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

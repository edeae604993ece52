//! `hookgen generate`: write the output directory or check it for drift.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use hookgen_core::{Generation, GenerationReport, Generator, StaleFile};
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::common::{Factory, Layout, SourceArgs, Target, input_path, load_document};

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(
        long,
        short = 'o',
        value_name = "DIR",
        help = "Output directory. Replaced as a whole on every run"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, help = "Query runtime to generate hooks for")]
    pub target: Option<Target>,

    #[arg(
        long,
        value_name = "MODULE",
        help = "Module the client instance is imported from"
    )]
    pub client_import: Option<String>,

    #[arg(long, value_name = "NAME", help = "Export name of the client instance")]
    pub client_export: Option<String>,

    #[arg(
        long,
        value_name = "BOOL",
        help = "Forward the query runtime's abort signal to the client"
    )]
    pub abort_signal: Option<bool>,

    #[arg(long, value_enum, help = "Declaration form of query options factories")]
    pub factory_style: Option<Factory>,

    #[arg(long, value_enum, help = "Hook module layout")]
    pub layout: Option<Layout>,

    #[arg(long, value_name = "FILE", help = "Write the generation report as JSON")]
    pub report: Option<PathBuf>,

    #[arg(
        long,
        help = "Do not write anything; print a diff and fail when the output is stale"
    )]
    pub check: bool,
}

pub fn run(args: GenerateArgs) -> i32 {
    match run_inner(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            1
        }
    }
}

fn run_inner(args: GenerateArgs) -> Result<i32, String> {
    let mut config = args.source.load_config()?;
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(target) = args.target {
        config.target = target.into();
    }
    if let Some(layout) = args.layout {
        config.layout = layout.into();
    }
    if let Some(factory) = args.factory_style {
        config.factory_style = Some(factory.into());
    }
    config.abort_signal = args.abort_signal.or(config.abort_signal);
    config.client_import = args.client_import.or(config.client_import);
    config.client_export = args.client_export.or(config.client_export);

    let profile = config.profile().map_err(|e| e.to_string())?;
    let input = input_path(&config)?;
    let doc = load_document(input)?;
    debug!(input = %input.display(), target = %profile.framework, "generating");

    let generator = Generator::new(profile);
    let Generation { plan, report } = generator.plan(&doc).map_err(|e| e.to_string())?;
    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }

    if args.check {
        let stale = plan.stale_files(&config.output).map_err(|e| e.to_string())?;
        if stale.is_empty() {
            println!(
                "{} {} is up to date",
                style("✓").green(),
                config.output.display()
            );
            return Ok(0);
        }
        for file in &stale {
            print!("{}", render_diff(file));
        }
        eprintln!(
            "{} {} file(s) in {} are out of date",
            style("✗").red(),
            stale.len(),
            config.output.display()
        );
        return Ok(1);
    }

    plan.write_atomic(&config.output).map_err(|e| e.to_string())?;
    print_summary(&report, &config.output);
    Ok(0)
}

fn write_report(report: &GenerationReport, path: &Path) -> Result<(), String> {
    let json = report
        .to_json()
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    fs::write(path, json + "\n")
        .map_err(|e| format!("Failed to write report {}: {e}", path.display()))
}

fn print_summary(report: &GenerationReport, output: &Path) {
    println!(
        "{} {} -> {}",
        style("✓").green(),
        report.summary(),
        style(output.display()).bold()
    );
    for warning in &report.warnings {
        println!("  {} {warning}", style("warning:").yellow());
    }
}

/// Unified diff between the file on disk and what generation would write.
pub fn render_diff(file: &StaleFile) -> String {
    let path = file.path.display();
    let current = file.current.as_deref().unwrap_or("");
    let expected = file.expected.as_deref().unwrap_or("");
    let (old_label, new_label) = match (&file.current, &file.expected) {
        (None, _) => ("missing", "new"),
        (_, None) => ("current", "removed"),
        _ => ("current", "generated"),
    };

    let mut output = String::new();
    let _ = writeln!(output, "{}", style(format!("--- {path} ({old_label})")).bold());
    let _ = writeln!(output, "{}", style(format!("+++ {path} ({new_label})")).bold());

    let diff = TextDiff::from_lines(current, expected);
    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let mut line = change.value().to_string();
                if change.missing_newline() {
                    line.push('\n');
                }
                let (sign, styled) = match change.tag() {
                    ChangeTag::Delete => ("-", style(line).red()),
                    ChangeTag::Insert => ("+", style(line).green()),
                    ChangeTag::Equal => (" ", style(line)),
                };
                let _ = write!(output, "{sign}{styled}");
            }
        }
    }
    output
}

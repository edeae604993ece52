use clap::Args;
use console::style;
use hookgen_core::{Generator, Inspection};

use crate::common::{SourceArgs, input_path, load_document};

#[derive(Args, Debug, Clone, Default)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn run(args: InspectArgs) -> i32 {
    match run_inner(&args) {
        Ok(inspection) => {
            print!("{}", render(&inspection));
            0
        }
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            1
        }
    }
}

fn run_inner(args: &InspectArgs) -> Result<Inspection, String> {
    let config = args.source.load_config()?;
    let profile = config.profile().map_err(|e| e.to_string())?;
    let doc = load_document(input_path(&config)?)?;
    Generator::new(profile)
        .inspect(&doc)
        .map_err(|e| e.to_string())
}

/// One line per route, then the warnings.
pub fn render(inspection: &Inspection) -> String {
    let mut out = String::new();
    for route in &inspection.routes {
        out.push_str(&format!("{route}\n"));
    }
    for warning in &inspection.warnings {
        out.push_str(&format!("{} {warning}\n", style("warning:").yellow()));
    }
    out
}

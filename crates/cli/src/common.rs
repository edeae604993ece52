//! Flags and config loading shared across commands

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use hookgen_core::{
    FactoryStyle, GeneratorConfig, OpenApiDocument, OutputLayout, TargetFramework,
};

/// Query runtime to generate hooks for
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum Target {
    /// TanStack Query for React
    React,
    /// TanStack Vue Query
    Vue,
}

impl From<Target> for TargetFramework {
    fn from(target: Target) -> Self {
        match target {
            Target::React => TargetFramework::React,
            Target::Vue => TargetFramework::Vue,
        }
    }
}

/// How hook modules are laid out in the output directory
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum Layout {
    /// One `hooks/<hook>.ts` module per route
    PerRoute,
    /// Every hook in a single `hooks.ts`
    SingleFile,
}

impl From<Layout> for OutputLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::PerRoute => OutputLayout::PerRoute,
            Layout::SingleFile => OutputLayout::SingleFile,
        }
    }
}

/// Declaration form of the query options factory
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum Factory {
    /// `export const getXQueryOptions = (...) => {...}`
    Const,
    /// `export function getXQueryOptions(...) {...}`
    Function,
}

impl From<Factory> for FactoryStyle {
    fn from(style: Factory) -> Self {
        match style {
            Factory::Const => FactoryStyle::Const,
            Factory::Function => FactoryStyle::Function,
        }
    }
}

/// `--input` and `--config`, accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(
        long,
        short = 'i',
        value_name = "FILE",
        help = "OpenAPI document (JSON or YAML). Overrides `input` in the config"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        long,
        short = 'c',
        value_name = "FILE",
        help = "Config file. Defaults to ./hookgen.toml when present"
    )]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the config file (or defaults) and apply `--input`.
    pub fn load_config(&self) -> Result<GeneratorConfig, String> {
        let cwd = std::env::current_dir()
            .map_err(|e| format!("Failed to read current directory: {e}"))?;
        let mut config = GeneratorConfig::discover(self.config.as_deref(), &cwd)
            .map_err(|e| e.to_string())?;
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        Ok(config)
    }
}

/// Path of the document to read, from flags or config.
pub fn input_path(config: &GeneratorConfig) -> Result<&Path, String> {
    config.input.as_deref().ok_or_else(|| {
        "No input document: pass --input or set `input` in hookgen.toml".to_string()
    })
}

pub fn load_document(path: &Path) -> Result<OpenApiDocument, String> {
    OpenApiDocument::from_path(path).map_err(|e| e.to_string())
}

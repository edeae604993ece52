//! Target framework profiles.
//!
//! Cancellation threading and the options-factory declaration style are
//! decided once per run by the [`TargetProfile`], never per route.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Default module the runtime client instance is imported from.
pub const DEFAULT_CLIENT_IMPORT: &str = "../api-client";
/// Default export name of the runtime client instance.
pub const DEFAULT_CLIENT_EXPORT: &str = "client";

/// UI framework the hooks are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFramework {
    #[default]
    React,
    Vue,
}

impl TargetFramework {
    /// Query runtime package the hooks import from.
    pub fn package(&self) -> &'static str {
        match self {
            TargetFramework::React => "@tanstack/react-query",
            TargetFramework::Vue => "@tanstack/vue-query",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TargetFramework::React => "react",
            TargetFramework::Vue => "vue",
        }
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFramework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "react" => Ok(Self::React),
            "vue" => Ok(Self::Vue),
            other => Err(format!("unknown target '{other}' (expected react or vue)")),
        }
    }
}

/// How the query options factory is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactoryStyle {
    /// `export const getXQueryOptions = (...) => { ... };`
    Const,
    /// `export function getXQueryOptions(...) { ... }`
    Function,
}

impl fmt::Display for FactoryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FactoryStyle::Const => "const",
            FactoryStyle::Function => "function",
        })
    }
}

impl FromStr for FactoryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "const" => Ok(Self::Const),
            "function" => Ok(Self::Function),
            other => Err(format!(
                "unknown factory style '{other}' (expected const or function)"
            )),
        }
    }
}

/// File layout of the generated hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// One `hooks/<hookName>.ts` file per route.
    #[default]
    PerRoute,
    /// Every hook in one `hooks.ts`.
    SingleFile,
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputLayout::PerRoute => "per-route",
            OutputLayout::SingleFile => "single-file",
        })
    }
}

impl FromStr for OutputLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "per-route" => Ok(Self::PerRoute),
            "single-file" => Ok(Self::SingleFile),
            other => Err(format!(
                "unknown layout '{other}' (expected per-route or single-file)"
            )),
        }
    }
}

/// Everything target-specific the generator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProfile {
    pub framework: TargetFramework,
    /// Whether the query fetcher forwards the runtime's abort signal.
    pub abort_signal: bool,
    pub factory_style: FactoryStyle,
    pub layout: OutputLayout,
    /// Module specifier of the runtime client, relative to the output root.
    pub client_import: String,
    /// Export name of the runtime client.
    pub client_export: String,
    /// Prefix every file with the generated-file banner.
    pub banner: bool,
}

impl TargetProfile {
    /// Framework defaults: React threads the abort signal and uses const
    /// factories, Vue does neither.
    pub fn new(framework: TargetFramework) -> Self {
        let (abort_signal, factory_style) = match framework {
            TargetFramework::React => (true, FactoryStyle::Const),
            TargetFramework::Vue => (false, FactoryStyle::Function),
        };
        Self {
            framework,
            abort_signal,
            factory_style,
            layout: OutputLayout::default(),
            client_import: DEFAULT_CLIENT_IMPORT.to_string(),
            client_export: DEFAULT_CLIENT_EXPORT.to_string(),
            banner: true,
        }
    }

    pub fn package(&self) -> &'static str {
        self.framework.package()
    }

    /// Client import specifier as seen from a file `depth` directories below
    /// the output root. Relative specifiers gain one `../` per level; bare
    /// package specifiers are left alone.
    pub fn client_import_from(&self, depth: usize) -> String {
        if depth == 0 || !self.client_import.starts_with('.') {
            return self.client_import.clone();
        }
        let rest = self
            .client_import
            .strip_prefix("./")
            .unwrap_or(&self.client_import);
        format!("{}{rest}", "../".repeat(depth))
    }
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self::new(TargetFramework::default())
    }
}

//! `hookgen.toml` configuration.
//!
//! Every key is optional. Relative `input` and `output` paths are resolved
//! against the directory holding the config file; command-line flags are
//! applied on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::ir::utils::is_identifier;
use crate::target::{FactoryStyle, OutputLayout, TargetFramework, TargetProfile};

/// File name looked up in the working directory when no config is given.
pub const CONFIG_FILE_NAME: &str = "hookgen.toml";

/// Output directory used when neither the config nor the CLI names one.
pub const DEFAULT_OUTPUT_DIR: &str = "src/api";

/// Locals and imports every generated hook module declares.
const RESERVED_CLIENT_NAMES: &[&str] = &[
    "args",
    "options",
    "clientOptions",
    "signal",
    "queryOverrides",
    "mutationOverrides",
    "queryOptions",
    "useQuery",
    "useMutation",
    "UseQueryOptions",
    "UseMutationOptions",
    "ApiClient",
    "ClientRequestOptions",
    "undefined",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// OpenAPI document (JSON or YAML).
    pub input: Option<PathBuf>,
    /// Output directory. Replaced as a whole on every run.
    pub output: PathBuf,
    pub target: TargetFramework,
    /// Module the runtime client instance is imported from.
    pub client_import: Option<String>,
    /// Export name of the runtime client instance.
    pub client_export: Option<String>,
    pub layout: OutputLayout,
    /// Overrides the target's abort-signal default.
    pub abort_signal: Option<bool>,
    /// Overrides the target's options-factory default.
    pub factory_style: Option<FactoryStyle>,
    /// Write the generated-file banner.
    pub banner: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            target: TargetFramework::default(),
            client_import: None,
            client_export: None,
            layout: OutputLayout::default(),
            abort_signal: None,
            factory_style: None,
            banner: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse TOML text. Relative paths are resolved against `base_dir`.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        config.input = config.input.map(|input| base_dir.join(input));
        config.output = base_dir.join(&config.output);
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, else `hookgen.toml` in `dir` if present, else defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Target profile with this config's overrides applied.
    pub fn profile(&self) -> Result<TargetProfile, ConfigError> {
        let mut profile = TargetProfile::new(self.target);
        profile.layout = self.layout;
        profile.banner = self.banner;
        if let Some(abort_signal) = self.abort_signal {
            profile.abort_signal = abort_signal;
        }
        if let Some(style) = self.factory_style {
            profile.factory_style = style;
        }
        if let Some(import) = &self.client_import {
            if import.trim().is_empty() {
                return Err(ConfigError::Invalid("client_import must not be empty".into()));
            }
            profile.client_import.clone_from(import);
        }
        if let Some(export) = &self.client_export {
            if !is_identifier(export) {
                return Err(ConfigError::Invalid(format!(
                    "client_export '{export}' is not a valid identifier"
                )));
            }
            if RESERVED_CLIENT_NAMES.contains(&export.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "client_export '{export}' shadows a name the generated hooks use"
                )));
            }
            profile.client_export.clone_from(export);
        }
        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.output, PathBuf::from("src/api"));
        assert!(config.banner);
        let profile = config.profile().unwrap();
        assert_eq!(profile, TargetProfile::default());
    }

    #[test]
    fn test_parse_and_resolve_paths() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            input = "openapi.yaml"
            output = "web/src/api"
            target = "vue"
            layout = "single-file"
            abort_signal = true
            factory_style = "const"
            client_import = "@/lib/client"
            client_export = "api"
            banner = false
            "#,
            Path::new("project/hookgen.toml"),
        )
        .unwrap();
        assert_eq!(config.input, Some(PathBuf::from("project/openapi.yaml")));
        assert_eq!(config.output, PathBuf::from("project/web/src/api"));

        let profile = config.profile().unwrap();
        assert_eq!(profile.framework, TargetFramework::Vue);
        assert_eq!(profile.layout, OutputLayout::SingleFile);
        assert!(profile.abort_signal);
        assert_eq!(profile.factory_style, FactoryStyle::Const);
        assert_eq!(profile.client_import, "@/lib/client");
        assert_eq!(profile.client_export, "api");
        assert!(!profile.banner);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = GeneratorConfig::from_toml_str("outptu = \"x\"", Path::new("hookgen.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_client_export() {
        let config = GeneratorConfig {
            client_export: Some("my-client".into()),
            ..GeneratorConfig::default()
        };
        assert!(matches!(config.profile(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_client_export_must_not_shadow_hook_locals() {
        for name in ["args", "options", "clientOptions", "signal", "queryOptions", "useQuery", "useMutation"] {
            let config = GeneratorConfig {
                client_export: Some(name.into()),
                ..GeneratorConfig::default()
            };
            let Err(ConfigError::Invalid(message)) = config.profile() else {
                unreachable!("{name} must be rejected");
            };
            assert!(message.contains(name), "{message}");
        }
        let config = GeneratorConfig {
            client_export: Some("apiClient".into()),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.profile().unwrap().client_export, "apiClient");
    }

    #[test]
    fn test_discover() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::discover(None, tmp.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());

        fs::write(tmp.path().join(CONFIG_FILE_NAME), "target = \"vue\"\n").unwrap();
        let config = GeneratorConfig::discover(None, tmp.path()).unwrap();
        assert_eq!(config.target, TargetFramework::Vue);
        assert_eq!(config.output, tmp.path().join("src/api"));
    }
}

//! Error taxonomy for the generation pipeline.
//!
//! Every variant here is fatal: the run aborts and nothing is written.
//! Non-fatal problems are [`crate::report::Warning`]s instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::collision::{Namespace, Owner};
use crate::model::ParamLocation;

/// Result type for hookgen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The API document is malformed or inconsistent.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Two routes (or a route and a schema) claim the same name.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// A route could not be turned into a binding, or output could not be written.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// The generator configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Malformed or unresolvable input document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Reading the document from disk failed.
    #[error("failed to read API document {path}: {source}")]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document is not valid JSON/YAML or does not match the OpenAPI shape.
    #[error("failed to parse API document: {0}")]
    Parse(String),

    /// The document is not an OpenAPI 3.x description.
    #[error("unsupported API document version: {0}")]
    UnsupportedVersion(String),

    /// A template placeholder has no `in: path` parameter definition.
    #[error("{route}: path parameter '{name}' appears in the template but is not defined")]
    MissingPathParameter {
        /// Route label, e.g. `GET /users/{userId}`.
        route: String,
        /// Placeholder name.
        name: String,
    },

    /// An `in: path` parameter is defined but absent from the template.
    #[error("{route}: path parameter '{name}' is defined but does not appear in the template")]
    UndeclaredPathParameter {
        /// Route label.
        route: String,
        /// Parameter name.
        name: String,
    },

    /// Two path keys describe the same (path, method) pair.
    #[error("{method} {path} is defined twice (conflicts with {method} {other})")]
    DuplicateRoute {
        /// HTTP method.
        method: String,
        /// Path of the second definition.
        path: String,
        /// Path of the first definition.
        other: String,
    },

    /// A `$ref` pointing into the document has no target.
    #[error("{site}: unresolved reference '{reference}'")]
    UnresolvedRef {
        /// The reference string.
        reference: String,
        /// Where the reference was found.
        site: String,
    },

    /// A parameter declares an `in` value other than path/query/header/cookie.
    #[error("{route}: parameter '{name}' has unsupported location '{location}'")]
    InvalidParameterLocation {
        /// Route label.
        route: String,
        /// Parameter name.
        name: String,
        /// Raw `in` value.
        location: String,
    },

    /// The same (name, location) pair is declared twice on one level.
    #[error("{route}: parameter '{name}' is declared twice in {location}")]
    DuplicateParameter {
        /// Route label.
        route: String,
        /// Parameter name.
        name: String,
        /// Location label.
        location: String,
    },

    /// A segment mixes literal text and a placeholder, e.g. `file-{id}`.
    #[error("{path}: segment '{segment}' embeds a path parameter inside literal text")]
    UnsupportedSegment {
        /// Raw path.
        path: String,
        /// Offending segment.
        segment: String,
    },

    /// A placeholder name occurs twice in one template.
    #[error("{path}: path parameter '{name}' appears more than once")]
    RepeatedPlaceholder {
        /// Raw path.
        path: String,
        /// Placeholder name.
        name: String,
    },
}

/// Two owners map to the same generated name.
#[derive(Debug, Error)]
#[error("{namespace} '{name}' is produced by both {first} and {second}")]
pub struct CollisionError {
    /// Namespace the name lives in.
    pub namespace: Namespace,
    /// The contested name.
    pub name: String,
    /// Owner that claimed the name first.
    pub first: Owner,
    /// Owner whose claim was rejected.
    pub second: Owner,
}

/// Failures while deriving bindings or writing output.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A parameter name appears in more than one parameter set.
    #[error("{route}: parameter '{name}' is declared in both {first} and {second}")]
    ParameterConflict {
        /// Route label.
        route: String,
        /// Parameter name.
        name: String,
        /// First location.
        first: ParamLocation,
        /// Second location.
        second: ParamLocation,
    },

    /// A query route was bound without its cache-key or options-factory name.
    #[error("{route}: query binding is missing its {missing} name")]
    MissingQueryName {
        /// Route label.
        route: String,
        /// Which generated name is absent.
        missing: &'static str,
    },

    /// The output directory has no usable parent for staging.
    #[error("invalid output directory {0}")]
    InvalidOutputDir(PathBuf),

    /// The output directory holds a file no earlier run wrote.
    #[error("refusing to replace {dir}: {file} was not written by hookgen")]
    UnmanagedFile {
        /// Output directory.
        dir: PathBuf,
        /// Offending file, relative to `dir`.
        file: PathBuf,
    },

    /// Filesystem failure during emission.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path being written or renamed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Invalid configuration file or values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::GeneratorConfig`].
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// TOML error.
        source: toml::de::Error,
    },

    /// A value is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl SchemaError {
    /// Create a parse error from any displayable source.
    pub fn parse(err: impl std::fmt::Display) -> Self {
        Self::Parse(err.to_string())
    }
}

impl GenerateError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

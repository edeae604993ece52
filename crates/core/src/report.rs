//! End-of-run generation report.
//!
//! Warnings are collected for the whole run and surfaced once, so a caller
//! can judge total degradation before trusting the output.

use std::fmt;

use serde::Serialize;

/// A non-fatal problem. The affected type degrades to `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A schema could not be resolved to a concrete TypeScript shape.
    PartialType {
        /// Route label or `schema <Name>`.
        site: String,
        /// What could not be typed, e.g. `response 200`.
        target: String,
        /// Why.
        detail: String,
    },
    /// Duplicate `/` separators were collapsed.
    CollapsedSeparator {
        /// The raw path.
        path: String,
    },
    /// A parameter was dropped (cookie parameters are not part of the argument bundle).
    SkippedParameter {
        /// Route label.
        route: String,
        /// Parameter name.
        name: String,
        /// Raw location.
        location: String,
    },
}

impl Warning {
    /// Shorthand for [`Warning::PartialType`].
    pub fn partial_type(
        site: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::PartialType {
            site: site.into(),
            target: target.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PartialType {
                site,
                target,
                detail,
            } => write!(f, "{site}: {target} typed as unknown ({detail})"),
            Warning::CollapsedSeparator { path } => {
                write!(f, "{path}: duplicate '/' separators collapsed")
            }
            Warning::SkippedParameter {
                route,
                name,
                location,
            } => write!(f, "{route}: {location} parameter '{name}' skipped"),
        }
    }
}

/// Summary of one generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// API title from the document.
    pub title: String,
    /// Number of routes bound.
    pub routes: usize,
    /// Query bindings emitted.
    pub queries: usize,
    /// Mutation bindings emitted.
    pub mutations: usize,
    /// Files in the output plan.
    pub files: usize,
    /// All warnings, in pipeline order.
    pub warnings: Vec<Warning>,
}

impl GenerationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of warnings that degraded a type to `unknown`.
    pub fn partial_types(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::PartialType { .. }))
            .count()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{} routes ({} queries, {} mutations), {} files, {} warnings",
            self.routes,
            self.queries,
            self.mutations,
            self.files,
            self.warnings.len()
        )
    }

    /// Pretty JSON form, for `--report`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

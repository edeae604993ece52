//! OpenAPI to TypeScript client surface and query-hook generator.
//!
//! A run loads an OpenAPI 3.x document into route models, binds each route
//! to a position on a nested client object, maps schemas to TypeScript
//! types and renders one hook module per route for TanStack Query (React)
//! or Vue Query. The whole file set is planned in memory and swapped into
//! the output directory atomically.
//!
//! ```no_run
//! use std::path::Path;
//! use hookgen_core::{TargetFramework, TargetProfile};
//!
//! let report = hookgen_core::generate(
//!     Path::new("openapi.yaml"),
//!     Path::new("src/api"),
//!     &TargetProfile::new(TargetFramework::React),
//! )?;
//! println!("{}", report.summary());
//! # Ok::<(), hookgen_core::Error>(())
//! ```

use std::path::Path;

pub mod binder;
pub mod binding;
pub mod codegen;
pub mod collision;
pub mod config;
pub mod error;
pub mod ir;
pub mod loader;
pub mod model;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod report;
pub mod spec;
pub mod target;
pub mod typemap;

pub use config::GeneratorConfig;
pub use error::{CollisionError, ConfigError, Error, GenerateError, Result, SchemaError};
pub use output::{OutputPlan, StaleFile};
pub use pipeline::{Generation, Generator, Inspection, RouteSummary};
pub use report::{GenerationReport, Warning};
pub use spec::OpenApiDocument;
pub use target::{FactoryStyle, OutputLayout, TargetFramework, TargetProfile};

/// Read `input`, generate for `profile` and replace `output` with the result.
pub fn generate(input: &Path, output: &Path, profile: &TargetProfile) -> Result<GenerationReport> {
    let doc = OpenApiDocument::from_path(input)?;
    Generator::new(profile.clone()).generate(&doc, output)
}

//! The generation pipeline.
//!
//! Loading, binding, name claiming and type mapping run serially in route
//! order. Only rendering of per-route hook files runs in parallel; every
//! renderer is a pure function of its binding, so output is identical
//! regardless of scheduling.

use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::binder::{BoundRoute, bind};
use crate::binding::{BindingKind, BindingSpec, classify, derive};
use crate::codegen::{
    CLIENT_MODULE, HOOKS_DIR, TYPES_MODULE, render_client, render_hook, render_hooks,
    render_index, render_types,
};
use crate::collision::{Claim, CollisionTable, Namespace, Owner};
use crate::error::Result;
use crate::ir::types::TsTypeDef;
use crate::loader::load;
use crate::model::{HttpMethod, LoadedApi};
use crate::output::OutputPlan;
use crate::report::{GenerationReport, Warning};
use crate::spec::OpenApiDocument;
use crate::target::{OutputLayout, TargetProfile};
use crate::typemap::{RouteTypes, TypeMapper};

/// A fully rendered run, not yet written to disk.
#[derive(Debug)]
pub struct Generation {
    pub plan: OutputPlan,
    pub report: GenerationReport,
}

/// One line of `hookgen inspect` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub method: HttpMethod,
    /// Path as written in the document.
    pub path: String,
    pub identifier: String,
    pub hook: String,
    pub kind: BindingKind,
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BindingKind::Query => "query",
            BindingKind::Mutation => "mutation",
        };
        write!(
            f,
            "{} {} -> {} [{kind}]",
            self.method, self.path, self.identifier
        )
    }
}

/// Routes with their resolved names, plus loader and binder warnings.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub title: String,
    pub routes: Vec<RouteSummary>,
    pub warnings: Vec<Warning>,
}

fn hook_path(hook: &str) -> PathBuf {
    Path::new(HOOKS_DIR).join(format!("{hook}.ts"))
}

/// Bind every route and claim its names. Component type names are claimed
/// first so a route can never shadow a schema type.
fn bind_all<'a>(
    api: &'a LoadedApi,
    mapper: &TypeMapper<'_>,
) -> Result<(Vec<BoundRoute<'a>>, Vec<Warning>)> {
    let mut table = CollisionTable::new();
    for (schema, ts_name) in mapper.component_names() {
        table.claim_all(
            &Owner::Schema(schema.clone()),
            &[Claim::new(Namespace::Symbol, ts_name)],
        )?;
    }

    let mut warnings = Vec::new();
    let mut bound = Vec::with_capacity(api.routes.len());
    for route in &api.routes {
        let b = bind(route);
        table.claim_all(&b.owner(), &b.claims())?;
        warnings.extend(b.warnings.iter().cloned());
        bound.push(b);
    }
    debug!(routes = bound.len(), names = table.len(), "routes bound");
    Ok((bound, warnings))
}

/// Drives one generation run for a target profile.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    profile: TargetProfile,
}

impl Generator {
    pub fn new(profile: TargetProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    /// Render the complete output file set in memory.
    pub fn plan(&self, doc: &OpenApiDocument) -> Result<Generation> {
        let api = load(doc)?;
        let mut warnings = api.warnings.clone();
        let mut mapper = TypeMapper::new(&api.schemas);

        let (bound, bind_warnings) = bind_all(&api, &mapper)?;
        warnings.extend(bind_warnings);

        let bindings = bound
            .iter()
            .map(|b| derive(b, &self.profile))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let components = mapper.component_defs();
        let route_types: Vec<_> = bound
            .iter()
            .map(|b| mapper.route_types(b.route, &b.names))
            .collect();
        warnings.extend(mapper.into_warnings());

        let plan = self.render(&components, &route_types, &bindings);
        let report = GenerationReport {
            title: api.title.clone(),
            routes: bindings.len(),
            queries: count(&bindings, BindingKind::Query),
            mutations: count(&bindings, BindingKind::Mutation),
            files: plan.len(),
            warnings,
        };

        for warning in &report.warnings {
            warn!("{warning}");
        }
        info!(
            title = %report.title,
            routes = report.routes,
            queries = report.queries,
            mutations = report.mutations,
            files = report.files,
            warnings = report.warnings.len(),
            "generation planned"
        );
        Ok(Generation { plan, report })
    }

    fn render(
        &self,
        components: &[TsTypeDef],
        route_types: &[RouteTypes],
        bindings: &[BindingSpec],
    ) -> OutputPlan {
        let profile = &self.profile;
        let mut plan = OutputPlan::new();
        plan.insert(
            format!("{TYPES_MODULE}.ts"),
            render_types(components, route_types, profile),
        );
        plan.insert(format!("{CLIENT_MODULE}.ts"), render_client(bindings, profile));
        match profile.layout {
            OutputLayout::PerRoute => {
                let hooks: Vec<(PathBuf, String)> = bindings
                    .par_iter()
                    .map(|b| (hook_path(b.hook_name()), render_hook(b, profile, 1)))
                    .collect();
                for (path, content) in hooks {
                    plan.insert(path, content);
                }
            }
            OutputLayout::SingleFile if !bindings.is_empty() => {
                plan.insert(format!("{HOOKS_DIR}.ts"), render_hooks(bindings, profile));
            }
            OutputLayout::SingleFile => {}
        }
        plan.insert("index.ts", render_index(bindings, profile));
        plan
    }

    /// Plan and atomically replace `out_dir` with the result.
    pub fn generate(&self, doc: &OpenApiDocument, out_dir: &Path) -> Result<GenerationReport> {
        let Generation { plan, report } = self.plan(doc)?;
        plan.write_atomic(out_dir)?;
        info!(path = %out_dir.display(), files = plan.len(), "output written");
        Ok(report)
    }

    /// Resolve names for every route without rendering anything.
    pub fn inspect(&self, doc: &OpenApiDocument) -> Result<Inspection> {
        let api = load(doc)?;
        let mapper = TypeMapper::new(&api.schemas);
        let (bound, bind_warnings) = bind_all(&api, &mapper)?;
        let routes = bound
            .iter()
            .map(|b| RouteSummary {
                method: b.route.method,
                path: b.route.path.raw().to_string(),
                identifier: b.names.identifier.clone(),
                hook: b.names.hook.clone(),
                kind: classify(b.route.method),
            })
            .collect();
        let mut warnings = api.warnings.clone();
        warnings.extend(bind_warnings);
        Ok(Inspection {
            title: api.title.clone(),
            routes,
            warnings,
        })
    }
}

fn count(bindings: &[BindingSpec], kind: BindingKind) -> usize {
    bindings.iter().filter(|b| b.kind() == kind).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::target::TargetFramework;

    fn doc(json: &str) -> OpenApiDocument {
        OpenApiDocument::from_json(json).unwrap()
    }

    const PETS: &str = r##"{
        "openapi": "3.1.0",
        "info": { "title": "Pets", "version": "1.0.0" },
        "paths": {
            "/pets": {
                "get": { "responses": { "200": { "description": "ok", "content": {
                    "application/json": { "schema": { "type": "array",
                        "items": { "$ref": "#/components/schemas/Pet" } } } } } } },
                "post": {
                    "requestBody": { "required": true, "content": {
                        "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } },
                    "responses": { "201": { "description": "created", "content": {
                        "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } } }
                }
            },
            "/pets/{petId}": {
                "get": {
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": { "200": { "description": "ok", "content": {
                        "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } } }
                }
            }
        },
        "components": { "schemas": { "Pet": { "type": "object",
            "required": ["name"], "properties": { "name": { "type": "string" } } } } }
    }"##;

    #[test]
    fn test_plan_per_route_layout() {
        let Generation { plan, report } = Generator::default().plan(&doc(PETS)).unwrap();
        let paths: Vec<_> = plan.files().map(|(p, _)| p.to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("client.ts"),
                PathBuf::from("hooks/useGetPets.ts"),
                PathBuf::from("hooks/useGetPetsPetId.ts"),
                PathBuf::from("hooks/usePostPets.ts"),
                PathBuf::from("index.ts"),
                PathBuf::from("types.ts"),
            ]
        );
        assert_eq!(report.title, "Pets");
        assert_eq!(report.routes, 3);
        assert_eq!(report.queries, 2);
        assert_eq!(report.mutations, 1);
        assert_eq!(report.files, 6);
        assert!(!report.has_warnings());

        let types = plan.get("types.ts").unwrap();
        assert!(types.contains("export interface Pet {"));
        assert!(types.contains("export type GetPetsResponse = Pet[];"));
        assert!(types.contains("export type PostPetsResponse = Pet;"));
        assert!(types.contains("export type GetPetsPetIdResponse = Pet;"));
    }

    #[test]
    fn test_plan_single_file_layout() {
        let mut profile = TargetProfile::new(TargetFramework::Vue);
        profile.layout = OutputLayout::SingleFile;
        let Generation { plan, .. } = Generator::new(profile).plan(&doc(PETS)).unwrap();
        assert_eq!(plan.len(), 4);
        let hooks = plan.get("hooks.ts").unwrap();
        assert!(hooks.contains("@tanstack/vue-query"));
        assert!(hooks.contains("usePostPets"));
    }

    #[test]
    fn test_schema_and_route_name_collision() {
        let err = Generator::default()
            .plan(&doc(
                r#"{ "openapi": "3.1.0",
                    "paths": { "/pets": { "get": {} } },
                    "components": { "schemas": { "GetPetsResponse": { "type": "string" } } } }"#,
            ))
            .unwrap_err();
        let Error::Collision(collision) = err else {
            unreachable!("expected a collision, got {err}");
        };
        assert_eq!(collision.name, "GetPetsResponse");
        assert_eq!(collision.first, Owner::Schema("GetPetsResponse".into()));
    }

    #[test]
    fn test_get_and_head_share_a_cache_namespace() {
        let err = Generator::default()
            .plan(&doc(
                r#"{ "openapi": "3.1.0", "paths": { "/ping": { "get": {}, "head": {} } } }"#,
            ))
            .unwrap_err();
        assert!(matches!(err, Error::Collision(ref c) if c.namespace == Namespace::CacheKey));
    }

    #[test]
    fn test_inspect() {
        let inspection = Generator::default().inspect(&doc(PETS)).unwrap();
        let lines: Vec<_> = inspection.routes.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "GET /pets -> GetPets [query]",
                "POST /pets -> PostPets [mutation]",
                "GET /pets/{petId} -> GetPetsPetId [query]",
            ]
        );
    }

    #[test]
    fn test_warnings_are_collected_from_every_stage() {
        let Generation { report, .. } = Generator::default()
            .plan(&doc(
                r#"{ "openapi": "3.1.0", "paths": { "/a//b": { "get": {
                    "parameters": [{ "name": "session", "in": "cookie" }],
                    "responses": { "200": { "description": "ok", "content": {
                        "application/json": { "schema": { "$ref": "other.yaml#/Thing" } } } } }
                } } } }"#,
            ))
            .unwrap();
        let kinds: Vec<_> = report
            .warnings
            .iter()
            .map(|w| match w {
                Warning::PartialType { .. } => "partial",
                Warning::CollapsedSeparator { .. } => "collapsed",
                Warning::SkippedParameter { .. } => "skipped",
            })
            .collect();
        assert_eq!(kinds, vec!["skipped", "collapsed", "partial"]);
    }
}

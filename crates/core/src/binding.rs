//! Per-route binding specifications.
//!
//! Safe methods become [`QueryBinding`]s (hook, cache-key function, options
//! factory); everything else becomes a [`MutationBinding`]. The split is a
//! sum type so every emission site has to handle both.

use std::collections::BTreeMap;

use crate::binder::{AccessorPath, BoundRoute};
use crate::error::GenerateError;
use crate::model::{HttpMethod, ParamLocation};
use crate::target::TargetProfile;

/// Lifecycle callbacks a mutation hook accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    OnSuccess,
    OnError,
    OnSettled,
    OnMutate,
}

impl LifecycleHook {
    pub const ALL: [Self; 4] = [
        Self::OnSuccess,
        Self::OnError,
        Self::OnSettled,
        Self::OnMutate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleHook::OnSuccess => "onSuccess",
            LifecycleHook::OnError => "onError",
            LifecycleHook::OnSettled => "onSettled",
            LifecycleHook::OnMutate => "onMutate",
        }
    }
}

/// Non-lifecycle mutation options passed through to the runtime untouched.
pub const MUTATION_PASSTHROUGH_KEYS: [&str; 2] = ["retry", "retryDelay"];

/// Kind of binding a method produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Query,
    Mutation,
}

/// GET and HEAD are queries, every other method is a mutation.
pub fn classify(method: HttpMethod) -> BindingKind {
    if method.is_query() {
        BindingKind::Query
    } else {
        BindingKind::Mutation
    }
}

/// What the generated functions take as the request argument bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputShape {
    /// The route takes no input; the client is called with `undefined`.
    None,
    /// The route takes an `<Name>Args` bundle.
    Args(String),
}

impl InputShape {
    pub fn args_type(&self) -> Option<&str> {
        match self {
            InputShape::None => None,
            InputShape::Args(name) => Some(name),
        }
    }
}

/// Query binding: hook, cache-key function and options factory.
#[derive(Debug, Clone)]
pub struct QueryBinding {
    pub generated_name: String,
    pub hook_name: String,
    pub cache_key_fn: String,
    pub options_fn: String,
    pub response_type: String,
    pub input: InputShape,
    /// First element of every cache key this binding produces.
    pub cache_namespace: String,
    /// The fetcher forwards the runtime's abort signal.
    pub supports_cancellation: bool,
    pub accessor: AccessorPath,
    /// Route label for docs, e.g. `GET /users/{userId}`.
    pub label: String,
    pub summary: Option<String>,
    pub deprecated: bool,
}

/// Mutation binding: one hook with lifecycle callbacks.
#[derive(Debug, Clone)]
pub struct MutationBinding {
    pub generated_name: String,
    pub hook_name: String,
    pub response_type: String,
    pub input: InputShape,
    pub lifecycle_hooks: Vec<LifecycleHook>,
    pub accessor: AccessorPath,
    pub label: String,
    pub summary: Option<String>,
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub enum BindingSpec {
    Query(QueryBinding),
    Mutation(MutationBinding),
}

impl BindingSpec {
    pub fn hook_name(&self) -> &str {
        match self {
            BindingSpec::Query(q) => &q.hook_name,
            BindingSpec::Mutation(m) => &m.hook_name,
        }
    }

    pub fn generated_name(&self) -> &str {
        match self {
            BindingSpec::Query(q) => &q.generated_name,
            BindingSpec::Mutation(m) => &m.generated_name,
        }
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            BindingSpec::Query(_) => BindingKind::Query,
            BindingSpec::Mutation(_) => BindingKind::Mutation,
        }
    }
}

/// Reject routes where one parameter name appears in two parameter sets.
fn check_parameter_conflicts(bound: &BoundRoute<'_>) -> Result<(), GenerateError> {
    let mut seen: BTreeMap<&str, ParamLocation> = BTreeMap::new();
    for param in bound.route.parameters.iter() {
        if let Some(first) = seen.insert(param.name.as_str(), param.location) {
            return Err(GenerateError::ParameterConflict {
                route: bound.route.label(),
                name: param.name.clone(),
                first,
                second: param.location,
            });
        }
    }
    Ok(())
}

/// Build the binding for one bound route.
pub fn derive(bound: &BoundRoute<'_>, profile: &TargetProfile) -> Result<BindingSpec, GenerateError> {
    check_parameter_conflicts(bound)?;

    let route = bound.route;
    let names = &bound.names;
    let input = match &names.args_type {
        Some(name) => InputShape::Args(name.clone()),
        None => InputShape::None,
    };

    let spec = match classify(route.method) {
        BindingKind::Query => {
            let Some(key_fn) = &names.query_key_fn else {
                return Err(GenerateError::MissingQueryName {
                    route: route.label(),
                    missing: "cache-key function",
                });
            };
            let Some(options_fn) = &names.query_options_fn else {
                return Err(GenerateError::MissingQueryName {
                    route: route.label(),
                    missing: "options factory",
                });
            };
            BindingSpec::Query(QueryBinding {
                generated_name: names.identifier.clone(),
                hook_name: names.hook.clone(),
                cache_key_fn: key_fn.clone(),
                options_fn: options_fn.clone(),
                response_type: names.response_type.clone(),
                input,
                cache_namespace: bound.cache_namespace.clone(),
                supports_cancellation: profile.abort_signal,
                accessor: bound.accessor.clone(),
                label: route.label(),
                summary: route.summary.clone(),
                deprecated: route.deprecated,
            })
        }
        BindingKind::Mutation => BindingSpec::Mutation(MutationBinding {
            generated_name: names.identifier.clone(),
            hook_name: names.hook.clone(),
            response_type: names.response_type.clone(),
            input,
            lifecycle_hooks: LifecycleHook::ALL.to_vec(),
            accessor: bound.accessor.clone(),
            label: route.label(),
            summary: route.summary.clone(),
            deprecated: route.deprecated,
        }),
    };
    Ok(spec)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::loader::load;
    use crate::spec::OpenApiDocument;
    use crate::target::TargetFramework;

    fn routes(json: &str) -> Vec<crate::model::RouteModel> {
        load(&OpenApiDocument::from_json(json).unwrap()).unwrap().routes
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(HttpMethod::Get), BindingKind::Query);
        assert_eq!(classify(HttpMethod::Head), BindingKind::Query);
        for method in [
            HttpMethod::Options,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Trace,
        ] {
            assert_eq!(classify(method), BindingKind::Mutation);
        }
    }

    #[test]
    fn test_query_binding_for_user_lookup() {
        let routes = routes(
            r#"{ "openapi": "3.1.0", "paths": { "/users/{userId}": { "get": {
                "parameters": [{ "name": "userId", "in": "path", "required": true }]
            } } } }"#,
        );
        let bound = bind(&routes[0]);
        let BindingSpec::Query(query) = derive(&bound, &TargetProfile::default()).unwrap() else {
            unreachable!("GET must produce a query binding");
        };
        assert_eq!(query.hook_name, "useGetUsersUserId");
        assert_eq!(query.cache_key_fn, "getGetUsersUserIdQueryKey");
        assert_eq!(query.options_fn, "getGetUsersUserIdQueryOptions");
        assert_eq!(query.cache_namespace, "/users/:userId");
        assert_eq!(query.input, InputShape::Args("GetUsersUserIdArgs".into()));
        assert!(query.supports_cancellation);
    }

    #[test]
    fn test_mutation_binding_has_lifecycle_hooks() {
        let routes = routes(r#"{ "openapi": "3.1.0", "paths": { "/users": { "post": {} } } }"#);
        let bound = bind(&routes[0]);
        let spec = derive(&bound, &TargetProfile::new(TargetFramework::Vue)).unwrap();
        assert_eq!(spec.kind(), BindingKind::Mutation);
        let BindingSpec::Mutation(mutation) = spec else {
            unreachable!("POST must produce a mutation binding");
        };
        assert_eq!(mutation.hook_name, "usePostUsers");
        assert_eq!(mutation.input, InputShape::None);
        let hooks: Vec<_> = mutation.lifecycle_hooks.iter().map(|h| h.as_str()).collect();
        assert_eq!(hooks, vec!["onSuccess", "onError", "onSettled", "onMutate"]);
    }

    #[test]
    fn test_parameter_conflict_is_fatal() {
        let routes = routes(
            r#"{ "openapi": "3.1.0", "paths": { "/items/{id}": { "get": {
                "parameters": [
                    { "name": "id", "in": "path", "required": true },
                    { "name": "id", "in": "query" }
                ]
            } } } }"#,
        );
        let bound = bind(&routes[0]);
        let err = derive(&bound, &TargetProfile::default()).unwrap_err();
        let GenerateError::ParameterConflict { name, first, second, .. } = err else {
            unreachable!("expected a parameter conflict");
        };
        assert_eq!(name, "id");
        assert_eq!(first, ParamLocation::Path);
        assert_eq!(second, ParamLocation::Query);
    }

    #[test]
    fn test_query_route_without_query_names_is_rejected() {
        let routes = routes(r#"{ "openapi": "3.1.0", "paths": { "/users": { "get": {} } } }"#);
        let mut bound = bind(&routes[0]);
        bound.names.query_options_fn = None;
        let err = derive(&bound, &TargetProfile::default()).unwrap_err();
        let GenerateError::MissingQueryName { route, missing } = err else {
            unreachable!("expected a missing query name");
        };
        assert_eq!(route, "GET /users");
        assert_eq!(missing, "options factory");

        bound.names.query_key_fn = None;
        let err = derive(&bound, &TargetProfile::default()).unwrap_err();
        assert!(err.to_string().contains("cache-key function"), "{err}");
    }
}

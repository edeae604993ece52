//! Loads an OpenAPI document into sorted [`RouteModel`]s.
//!
//! Loading is a pure transformation. Everything the rest of the pipeline
//! relies on (resolved references, consistent path parameters, unique
//! routes) is checked here and reported as a [`SchemaError`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::SchemaError;
use crate::model::{
    BodyEncoding, BodySpec, HttpMethod, LoadedApi, ParamLocation, ParamSpec, ParameterSets,
    ResponseSpec, RouteModel,
};
use crate::path::PathTemplate;
use crate::report::Warning;
use crate::spec::{
    Components, MediaType, OpenApiDocument, Operation, Parameter, PathItem, RefOr, Schema,
};

/// Prefix of references into the component schema table.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Guards against reference cycles between component entries.
const MAX_REF_DEPTH: usize = 32;

/// Load every route of the document.
pub fn load(doc: &OpenApiDocument) -> Result<LoadedApi, SchemaError> {
    check_version(doc)?;

    let components = doc.components.as_ref();
    let empty = BTreeMap::new();
    let schemas = components.map_or(&empty, |c| &c.schemas);

    for (name, schema) in schemas {
        check_schema_refs(schema, schemas, &format!("schema {name}"))?;
    }

    let mut routes = Vec::new();
    let mut warnings = Vec::new();
    let mut seen: BTreeMap<(String, HttpMethod), &str> = BTreeMap::new();

    for (raw_path, item) in &doc.paths {
        let template = PathTemplate::parse(raw_path);
        template.validate()?;

        for method in HttpMethod::ALL {
            let Some(op) = operation_for(item, method) else {
                continue;
            };

            if let Some(other) = seen.insert((template.shape(), method), raw_path) {
                return Err(SchemaError::DuplicateRoute {
                    method: method.to_string(),
                    path: raw_path.clone(),
                    other: other.to_string(),
                });
            }

            let label = format!("{method} {raw_path}");
            let parameters = collect_parameters(
                &label,
                &template,
                &item.parameters,
                &op.parameters,
                components,
                schemas,
                &mut warnings,
            )?;
            let request_body = collect_body(&label, op, components, schemas, &mut warnings)?;
            let responses = collect_responses(&label, op, components, schemas)?;

            debug!(route = %label, params = parameters.iter().count(), "loaded route");

            routes.push(RouteModel {
                method,
                path: template.clone(),
                operation_id: op.operation_id.clone(),
                summary: op.summary.clone(),
                description: op.description.clone(),
                tags: op.tags.clone(),
                deprecated: op.deprecated,
                parameters,
                request_body,
                responses,
                security: op.security.clone().unwrap_or_else(|| doc.security.clone()),
            });
        }
    }

    routes.sort_by_cached_key(|r| (r.path.normalized(), r.method));

    Ok(LoadedApi {
        title: doc.info.title.clone(),
        version: doc.info.version.clone(),
        routes,
        schemas: schemas.clone(),
        warnings,
    })
}

/// Name of the component schema a reference points at, if it is a local schema reference.
pub fn component_schema_name(reference: &str) -> Option<String> {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .map(decode_pointer_token)
}

/// Undo JSON pointer escaping (`~1` is `/`, `~0` is `~`).
fn decode_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn check_version(doc: &OpenApiDocument) -> Result<(), SchemaError> {
    if let Some(version) = &doc.swagger {
        return Err(SchemaError::UnsupportedVersion(format!("swagger {version}")));
    }
    match doc.openapi.as_deref() {
        Some(version) if version.starts_with("3.") => Ok(()),
        Some(version) => Err(SchemaError::UnsupportedVersion(format!("openapi {version}"))),
        None => Err(SchemaError::UnsupportedVersion(
            "missing 'openapi' field".to_string(),
        )),
    }
}

fn operation_for(item: &PathItem, method: HttpMethod) -> Option<&Operation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Head => item.head.as_ref(),
        HttpMethod::Options => item.options.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
        HttpMethod::Trace => item.trace.as_ref(),
    }
}

/// Follow `$ref` chains into one component section.
fn follow<'a, T>(
    item: &'a RefOr<T>,
    table: Option<&'a BTreeMap<String, RefOr<T>>>,
    section: &str,
    site: &str,
) -> Result<&'a T, SchemaError> {
    let prefix = format!("#/components/{section}/");
    let mut current = item;
    for _ in 0..MAX_REF_DEPTH {
        match current {
            RefOr::Item(value) => return Ok(value),
            RefOr::Ref(reference) => {
                current = reference
                    .ref_path
                    .strip_prefix(&prefix)
                    .map(decode_pointer_token)
                    .and_then(|name| table.and_then(|t| t.get(&name)))
                    .ok_or_else(|| SchemaError::UnresolvedRef {
                        reference: reference.ref_path.clone(),
                        site: site.to_string(),
                    })?;
            }
        }
    }
    let reference = match item {
        RefOr::Ref(r) => r.ref_path.clone(),
        RefOr::Item(_) => String::new(),
    };
    Err(SchemaError::UnresolvedRef {
        reference,
        site: format!("{site} (reference cycle)"),
    })
}

/// Every `#/components/schemas/<name>` reference must name an existing schema.
/// Other references are left to the type mapper, which degrades them.
fn check_schema_refs(
    schema: &Schema,
    schemas: &BTreeMap<String, Schema>,
    site: &str,
) -> Result<(), SchemaError> {
    if let Some(reference) = &schema.ref_path
        && let Some(name) = component_schema_name(reference)
        && !schemas.contains_key(&name)
    {
        return Err(SchemaError::UnresolvedRef {
            reference: reference.clone(),
            site: site.to_string(),
        });
    }
    schema
        .children()
        .try_for_each(|child| check_schema_refs(child, schemas, site))
}

fn collect_parameters(
    label: &str,
    template: &PathTemplate,
    shared: &[RefOr<Parameter>],
    own: &[RefOr<Parameter>],
    components: Option<&Components>,
    schemas: &BTreeMap<String, Schema>,
    warnings: &mut Vec<Warning>,
) -> Result<ParameterSets, SchemaError> {
    let mut sets = ParameterSets::default();

    // Operation-level parameters override path-level ones with the same (name, location).
    for level in [shared, own] {
        let mut seen = BTreeSet::new();
        for item in level {
            let param = follow(item, components.map(|c| &c.parameters), "parameters", label)?;

            if !seen.insert((param.location.as_str(), param.name.as_str())) {
                return Err(SchemaError::DuplicateParameter {
                    route: label.to_string(),
                    name: param.name.clone(),
                    location: param.location.clone(),
                });
            }

            let location = match param.location.as_str() {
                "path" => ParamLocation::Path,
                "query" => ParamLocation::Query,
                "header" => ParamLocation::Header,
                "cookie" => {
                    warnings.push(Warning::SkippedParameter {
                        route: label.to_string(),
                        name: param.name.clone(),
                        location: param.location.clone(),
                    });
                    continue;
                }
                other => {
                    return Err(SchemaError::InvalidParameterLocation {
                        route: label.to_string(),
                        name: param.name.clone(),
                        location: other.to_string(),
                    });
                }
            };

            if let Some(schema) = &param.schema {
                check_schema_refs(schema, schemas, label)?;
            }

            sets.upsert(ParamSpec {
                name: param.name.clone(),
                location,
                required: param.required || location == ParamLocation::Path,
                schema: param.schema.clone(),
                description: param.description.clone(),
                deprecated: param.deprecated,
            });
        }
    }

    let placeholders: BTreeSet<&str> = template.placeholders().collect();
    if let Some(missing) = placeholders
        .iter()
        .find(|name| !sets.path.iter().any(|p| p.name == **name))
    {
        return Err(SchemaError::MissingPathParameter {
            route: label.to_string(),
            name: (*missing).to_string(),
        });
    }
    if let Some(extra) = sets
        .path
        .iter()
        .find(|p| !placeholders.contains(p.name.as_str()))
    {
        return Err(SchemaError::UndeclaredPathParameter {
            route: label.to_string(),
            name: extra.name.clone(),
        });
    }

    Ok(sets)
}

/// Body media types in order of preference.
fn body_encoding(media_type: &str) -> Option<BodyEncoding> {
    if media_type == "multipart/form-data" || media_type == "application/x-www-form-urlencoded" {
        Some(BodyEncoding::Form)
    } else if media_type == "application/json" || media_type.ends_with("+json") {
        Some(BodyEncoding::Json)
    } else if media_type.starts_with("text/") {
        Some(BodyEncoding::Text)
    } else {
        None
    }
}

fn encoding_rank(encoding: BodyEncoding) -> u8 {
    match encoding {
        BodyEncoding::Form => 0,
        BodyEncoding::Json => 1,
        BodyEncoding::Text => 2,
    }
}

fn collect_body(
    label: &str,
    op: &Operation,
    components: Option<&Components>,
    schemas: &BTreeMap<String, Schema>,
    warnings: &mut Vec<Warning>,
) -> Result<Option<BodySpec>, SchemaError> {
    let Some(item) = &op.request_body else {
        return Ok(None);
    };
    let body = follow(
        item,
        components.map(|c| &c.request_bodies),
        "requestBodies",
        label,
    )?;
    check_content_refs(&body.content, schemas, label)?;

    let chosen = body
        .content
        .iter()
        .filter_map(|(media_type, media)| body_encoding(media_type).map(|e| (e, media_type, media)))
        .min_by_key(|(encoding, _, _)| encoding_rank(*encoding));

    match chosen {
        Some((encoding, media_type, media)) => Ok(Some(BodySpec {
            encoding,
            media_type: media_type.clone(),
            required: body.required,
            schema: media.schema.clone(),
        })),
        None => match body.content.keys().next() {
            Some(media_type) => {
                warnings.push(Warning::partial_type(
                    label,
                    "request body",
                    format!("unsupported media type '{media_type}'"),
                ));
                Ok(Some(BodySpec {
                    encoding: BodyEncoding::Json,
                    media_type: media_type.clone(),
                    required: body.required,
                    schema: None,
                }))
            }
            None => Ok(None),
        },
    }
}

fn collect_responses(
    label: &str,
    op: &Operation,
    components: Option<&Components>,
    schemas: &BTreeMap<String, Schema>,
) -> Result<BTreeMap<String, ResponseSpec>, SchemaError> {
    let mut responses = BTreeMap::new();
    for (status, item) in &op.responses {
        let response = follow(item, components.map(|c| &c.responses), "responses", label)?;
        check_content_refs(&response.content, schemas, label)?;

        // Prefer a JSON media type, then whatever comes first.
        let media = response
            .content
            .iter()
            .find(|(media_type, _)| body_encoding(media_type) == Some(BodyEncoding::Json))
            .or_else(|| response.content.iter().next());

        responses.insert(
            status.clone(),
            ResponseSpec {
                description: response.description.clone(),
                media_type: media.map(|(media_type, _)| media_type.clone()),
                schema: media.and_then(|(_, m)| m.schema.clone()),
            },
        );
    }
    Ok(responses)
}

fn check_content_refs(
    content: &BTreeMap<String, MediaType>,
    schemas: &BTreeMap<String, Schema>,
    site: &str,
) -> Result<(), SchemaError> {
    content
        .values()
        .filter_map(|m| m.schema.as_ref())
        .try_for_each(|schema| check_schema_refs(schema, schemas, site))
}

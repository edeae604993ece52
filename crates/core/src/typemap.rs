//! Schema to TypeScript type mapping.
//!
//! Anything that cannot be typed precisely (foreign references, `not`,
//! media types without a schema) degrades to `unknown` and leaves a
//! [`Warning::PartialType`] behind instead of failing the run.

use std::collections::{BTreeMap, HashSet};

use crate::binder::SymbolNames;
use crate::ir::types::{TsLiteral, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use crate::ir::utils::{
    enum_key, enum_literal, string_record, type_name, unknown_record,
};
use crate::loader::component_schema_name;
use crate::model::{BodyEncoding, ParamLocation, ParamSpec, ResponseSpec, RouteModel};
use crate::report::Warning;
use crate::spec::{AdditionalProperties, Discriminator, EnumValue, Schema, SchemaType};

/// Success statuses in order of preference.
const SUCCESS_STATUSES: [&str; 8] = ["200", "201", "202", "203", "206", "207", "2XX", "default"];

/// Generated types for one route.
#[derive(Debug, Clone)]
pub struct RouteTypes {
    pub args: Option<TsTypeDef>,
    pub response: TsTypeDef,
}

/// Maps schemas to [`TsType`]s, collecting warnings as it goes.
#[derive(Debug)]
pub struct TypeMapper<'a> {
    schemas: &'a BTreeMap<String, Schema>,
    names: BTreeMap<String, String>,
    warnings: Vec<Warning>,
}

/// Where a schema sits, for warning messages.
#[derive(Debug)]
struct Site<'s> {
    site: &'s str,
    target: &'s str,
}

impl<'a> TypeMapper<'a> {
    pub fn new(schemas: &'a BTreeMap<String, Schema>) -> Self {
        let names = schemas
            .keys()
            .map(|name| (name.clone(), type_name(name)))
            .collect();
        Self {
            schemas,
            names,
            warnings: Vec::new(),
        }
    }

    /// Exported TypeScript name per component schema, in document name order.
    pub fn component_names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// One type definition per component schema, sorted by schema name.
    pub fn component_defs(&mut self) -> Vec<TsTypeDef> {
        let schemas = self.schemas;
        schemas
            .iter()
            .map(|(name, schema)| self.component_def(name, schema))
            .collect()
    }

    fn component_def(&mut self, name: &str, schema: &Schema) -> TsTypeDef {
        let ts_name = self
            .names
            .get(name)
            .cloned()
            .unwrap_or_else(|| type_name(name));
        let site_label = format!("schema {name}");
        let site = Site {
            site: &site_label,
            target: "type",
        };
        let docs = schema_docs(schema);

        if let Some(values) = &schema.enum_values
            && !schema.is_nullable()
        {
            return TsTypeDef {
                name: ts_name,
                kind: TypeDefKind::ConstEnum {
                    values: normalize_enum_values(values),
                },
                docs,
            };
        }

        if let Some(properties) = &schema.properties
            && is_plain_object(schema)
        {
            let properties = self.properties(properties, schema.required.as_deref(), &site);
            return TsTypeDef {
                name: ts_name,
                kind: TypeDefKind::Interface { properties },
                docs,
            };
        }

        let ty = self.map(schema, &site);
        TsTypeDef {
            name: ts_name,
            kind: TypeDefKind::TypeAlias { ty },
            docs,
        }
    }

    /// Map one schema as found at `site`/`target` (used for warnings).
    pub fn schema_type(&mut self, schema: &Schema, site: &str, target: &str) -> TsType {
        self.map(schema, &Site { site, target })
    }

    fn degrade(&mut self, site: &Site<'_>, detail: String) -> TsType {
        self.warnings
            .push(Warning::partial_type(site.site, site.target, detail));
        TsType::unknown()
    }

    fn map(&mut self, schema: &Schema, site: &Site<'_>) -> TsType {
        let ty = self.map_inner(schema, site);
        if schema.nullable == Some(true) && !includes_null(&ty) {
            TsType::Union(vec![ty, TsType::Primitive(TsPrimitive::Null)])
        } else {
            ty
        }
    }

    fn map_inner(&mut self, schema: &Schema, site: &Site<'_>) -> TsType {
        // Handle $ref first
        if let Some(reference) = &schema.ref_path {
            return self.reference(reference, site);
        }

        // Handle const keyword
        if let Some(const_value) = &schema.const_value {
            return json_value_to_ts_type(const_value);
        }

        // Handle allOf (intersection)
        if let Some(all_of) = &schema.all_of {
            return self.intersection(all_of, site);
        }

        // Handle anyOf (union, often nullable)
        if let Some(any_of) = &schema.any_of {
            return self.union(any_of, None, site);
        }

        // Handle oneOf (discriminated union)
        if let Some(one_of) = &schema.one_of {
            return self.union(one_of, schema.discriminator.as_ref(), site);
        }

        match &schema.schema_type {
            Some(SchemaType::Single(t)) => self.schema_type_to_ts(t, schema, site),
            Some(SchemaType::Multiple(types)) => {
                let mut ts_types: Vec<_> = types
                    .iter()
                    .filter(|t| *t != "null")
                    .map(|t| self.schema_type_to_ts(t, schema, site))
                    .collect();
                if types.iter().any(|t| t == "null") {
                    ts_types.push(TsType::Primitive(TsPrimitive::Null));
                }
                match ts_types.len() {
                    0 => TsType::unknown(),
                    1 => ts_types.remove(0),
                    _ => TsType::Union(ts_types),
                }
            }
            None if schema.not.is_some() => {
                self.degrade(site, "unsupported keyword 'not'".to_string())
            }
            None if schema.properties.is_some() || schema.additional_properties.is_some() => {
                self.object_type(schema, site)
            }
            None if schema.enum_values.is_some() => enum_to_union_type(enum_values(schema)),
            None => TsType::unknown(),
        }
    }

    fn reference(&mut self, reference: &str, site: &Site<'_>) -> TsType {
        match component_schema_name(reference) {
            Some(name) => match self.names.get(&name) {
                Some(ts_name) => TsType::Ref(ts_name.clone()),
                None => self.degrade(site, format!("missing schema '{reference}'")),
            },
            None if reference.starts_with('#') => {
                self.degrade(site, format!("unsupported reference '{reference}'"))
            }
            None => self.degrade(site, format!("external reference '{reference}'")),
        }
    }

    fn intersection(&mut self, schemas: &[Schema], site: &Site<'_>) -> TsType {
        let mut types: Vec<_> = schemas.iter().map(|s| self.map(s, site)).collect();
        match types.len() {
            0 => TsType::unknown(),
            1 => types.remove(0),
            _ => TsType::Intersection(types),
        }
    }

    fn union(
        &mut self,
        schemas: &[Schema],
        discriminator: Option<&Discriminator>,
        site: &Site<'_>,
    ) -> TsType {
        let mut union_types = Vec::new();
        for schema in schemas {
            let base_type = self.map(schema, site);
            let tag = discriminator.and_then(|disc| {
                discriminator_value(disc, schema).map(|value| (disc.property_name.clone(), value))
            });
            match tag {
                // { petType: "dog" } & Dog
                Some((property, value)) => union_types.push(TsType::Intersection(vec![
                    TsType::Object(vec![TsProp::new(
                        property,
                        TsType::Literal(TsLiteral::String(value)),
                        false,
                    )]),
                    base_type,
                ])),
                None => union_types.push(base_type),
            }
        }
        match union_types.len() {
            0 => TsType::unknown(),
            1 => union_types.remove(0),
            _ => TsType::Union(union_types),
        }
    }

    fn schema_type_to_ts(&mut self, schema_type: &str, schema: &Schema, site: &Site<'_>) -> TsType {
        match schema_type {
            "string" if schema.enum_values.is_some() => enum_to_union_type(enum_values(schema)),
            "string" if schema.format.as_deref() == Some("binary") => TsType::Ref("Blob".into()),
            "string" => TsType::Primitive(TsPrimitive::String),
            "number" | "integer" if schema.enum_values.is_some() => {
                enum_to_union_type(enum_values(schema))
            }
            "number" | "integer" => TsType::Primitive(TsPrimitive::Number),
            "boolean" => TsType::Primitive(TsPrimitive::Boolean),
            "null" => TsType::Primitive(TsPrimitive::Null),
            "array" => match &schema.items {
                Some(items) => TsType::Array(Box::new(self.map(items, site))),
                None => TsType::Array(Box::new(TsType::unknown())),
            },
            "object" => self.object_type(schema, site),
            other => self.degrade(site, format!("unsupported type '{other}'")),
        }
    }

    fn object_type(&mut self, schema: &Schema, site: &Site<'_>) -> TsType {
        match (&schema.properties, &schema.additional_properties) {
            (Some(properties), Some(_)) => {
                // Intersection of props and record
                let props = self.properties(properties, schema.required.as_deref(), site);
                let additional = self.additional_properties(schema, site);
                TsType::Intersection(vec![TsType::Object(props), additional])
            }
            (Some(properties), None) => {
                TsType::Object(self.properties(properties, schema.required.as_deref(), site))
            }
            (None, Some(_)) => self.additional_properties(schema, site),
            (None, None) => unknown_record(),
        }
    }

    fn additional_properties(&mut self, schema: &Schema, site: &Site<'_>) -> TsType {
        match &schema.additional_properties {
            Some(AdditionalProperties::Bool(true)) | None => unknown_record(),
            Some(AdditionalProperties::Bool(false)) => TsType::Object(Vec::new()),
            Some(AdditionalProperties::Schema(s)) => string_record(self.map(s, site)),
        }
    }

    fn properties(
        &mut self,
        properties: &BTreeMap<String, Schema>,
        required: Option<&[String]>,
        site: &Site<'_>,
    ) -> Vec<TsProp> {
        let required: HashSet<&str> = required
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();
        properties
            .iter()
            .map(|(name, schema)| {
                let ty = self.map(schema, site);
                TsProp::new(name, ty, !required.contains(name.as_str()))
                    .with_doc(property_doc(schema.description.as_deref(), schema.deprecated))
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Route types
    // -------------------------------------------------------------------------

    /// `<Name>Args` (when the route has input) and `<Name>Response`.
    pub fn route_types(&mut self, route: &RouteModel, names: &SymbolNames) -> RouteTypes {
        let label = route.label();
        let args = names.args_type.as_ref().map(|args_name| TsTypeDef {
            name: args_name.clone(),
            kind: TypeDefKind::Interface {
                properties: self.args_properties(route, &label),
            },
            docs: vec![format!("Request arguments for `{label}`.")],
        });

        let (ty, description) = self.response_type(route, &label);
        let mut docs = vec![format!("Success response of `{label}`.")];
        docs.extend(description);
        RouteTypes {
            args,
            response: TsTypeDef {
                name: names.response_type.clone(),
                kind: TypeDefKind::TypeAlias { ty },
                docs,
            },
        }
    }

    fn args_properties(&mut self, route: &RouteModel, label: &str) -> Vec<TsProp> {
        let mut props = Vec::new();
        for location in [ParamLocation::Path, ParamLocation::Query, ParamLocation::Header] {
            let params = route.parameters.get(location);
            if params.is_empty() {
                continue;
            }
            let fields: Vec<_> = params
                .iter()
                .map(|param| self.param_property(param, label))
                .collect();
            let optional = fields.iter().all(|f| f.optional);
            props.push(TsProp::new(
                location.args_key(),
                TsType::Object(fields),
                optional,
            ));
        }

        if let Some(body) = &route.request_body {
            let ty = match (&body.schema, body.encoding) {
                (Some(schema), _) => self.schema_type(schema, label, "request body"),
                (None, BodyEncoding::Text) => TsType::Primitive(TsPrimitive::String),
                (None, BodyEncoding::Json | BodyEncoding::Form) => TsType::unknown(),
            };
            props.push(TsProp::new(body.encoding.args_key(), ty, !body.required));
        }
        props
    }

    fn param_property(&mut self, param: &ParamSpec, label: &str) -> TsProp {
        let target = format!("{} parameter '{}'", param.location, param.name);
        let ty = match &param.schema {
            Some(schema) => self.schema_type(schema, label, &target),
            None => TsType::Primitive(TsPrimitive::String),
        };
        TsProp::new(&param.name, ty, !param.required)
            .with_doc(property_doc(param.description.as_deref(), param.deprecated))
    }

    /// Preferred success response type and its description.
    fn response_type(&mut self, route: &RouteModel, label: &str) -> (TsType, Option<String>) {
        let chosen = SUCCESS_STATUSES
            .iter()
            .find_map(|status| route.responses.get(*status).map(|r| (*status, r)));

        match chosen {
            Some((status, response)) => {
                let ty = self.response_body_type(status, response, label);
                (ty, response.description.clone().filter(|d| !d.is_empty()))
            }
            None if route.responses.contains_key("204") => {
                (TsType::Primitive(TsPrimitive::Void), None)
            }
            None => {
                let ty = self.degrade(
                    &Site {
                        site: label,
                        target: "response",
                    },
                    "no success response documented".to_string(),
                );
                (ty, None)
            }
        }
    }

    fn response_body_type(&mut self, status: &str, response: &ResponseSpec, label: &str) -> TsType {
        let target = format!("response {status}");
        match (&response.media_type, &response.schema) {
            (None, _) => TsType::Primitive(TsPrimitive::Void),
            (Some(_), Some(schema)) => self.schema_type(schema, label, &target),
            (Some(media_type), None) => self.degrade(
                &Site {
                    site: label,
                    target: &target,
                },
                format!("no schema for media type '{media_type}'"),
            ),
        }
    }
}

/// An object schema that can be an `interface`.
fn is_plain_object(schema: &Schema) -> bool {
    schema.additional_properties.is_none()
        && schema.all_of.is_none()
        && schema.any_of.is_none()
        && schema.one_of.is_none()
        && schema.ref_path.is_none()
        && !schema.is_nullable()
}

fn includes_null(ty: &TsType) -> bool {
    match ty {
        TsType::Primitive(TsPrimitive::Null) | TsType::Literal(TsLiteral::Null) => true,
        TsType::Union(types) => types.iter().any(includes_null),
        _ => false,
    }
}

fn schema_docs(schema: &Schema) -> Vec<String> {
    let mut docs = Vec::new();
    if let Some(description) = schema.description.as_ref().filter(|d| !d.is_empty()) {
        docs.push(description.clone());
    }
    if schema.deprecated {
        docs.push("@deprecated".to_string());
    }
    docs
}

fn property_doc(description: Option<&str>, deprecated: bool) -> Option<String> {
    match (description.filter(|d| !d.is_empty()), deprecated) {
        (Some(d), true) => Some(format!("{d}\n@deprecated")),
        (Some(d), false) => Some(d.to_string()),
        (None, true) => Some("@deprecated".to_string()),
        (None, false) => None,
    }
}

/// Discriminator value for one union member: the mapping entry pointing at
/// its reference, or the referenced schema name.
fn discriminator_value(disc: &Discriminator, schema: &Schema) -> Option<String> {
    let reference = schema.ref_path.as_ref()?;
    match &disc.mapping {
        Some(mapping) => mapping
            .iter()
            .find(|(_, target)| *target == reference)
            .map(|(value, _)| value.clone()),
        None => component_schema_name(reference),
    }
}

/// Normalize enum values to (key, literal) pairs for const enum objects
fn normalize_enum_values(values: &[EnumValue]) -> Vec<(String, TsLiteral)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (enum_key(v, i), enum_literal(v)))
        .collect()
}

fn enum_values(schema: &Schema) -> &[EnumValue] {
    schema.enum_values.as_deref().unwrap_or_default()
}

fn enum_to_union_type(values: &[EnumValue]) -> TsType {
    let mut types: Vec<_> = values
        .iter()
        .map(|v| TsType::Literal(enum_literal(v)))
        .collect();
    match types.len() {
        0 => TsType::unknown(),
        1 => types.remove(0),
        _ => TsType::Union(types),
    }
}

/// Convert JSON value to TsType literal
fn json_value_to_ts_type(value: &serde_json::Value) -> TsType {
    match value {
        serde_json::Value::Null => TsType::Literal(TsLiteral::Null),
        serde_json::Value::Bool(b) => TsType::Literal(TsLiteral::Bool(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => TsType::Literal(TsLiteral::Int(i)),
            None => TsType::Literal(TsLiteral::Number(n.as_f64().unwrap_or(0.0))),
        },
        serde_json::Value::String(s) => TsType::Literal(TsLiteral::String(s.clone())),
        _ => TsType::unknown(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::ir::Emit;
    use crate::loader::load;
    use crate::spec::OpenApiDocument;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    fn map(json: &str) -> (String, Vec<Warning>) {
        let schemas = BTreeMap::from([("User".to_string(), Schema::default())]);
        let mut mapper = TypeMapper::new(&schemas);
        let ty = mapper.schema_type(&schema(json), "GET /a", "response 200");
        (ty.emit(), mapper.into_warnings())
    }

    #[test]
    fn test_primitives_and_formats() {
        assert_eq!(map(r#"{ "type": "integer" }"#).0, "number");
        assert_eq!(map(r#"{ "type": "string", "format": "binary" }"#).0, "Blob");
        assert_eq!(map(r#"{ "type": "string", "format": "date-time" }"#).0, "string");
        assert_eq!(map(r#"{ "type": ["string", "null"] }"#).0, "string | null");
        assert_eq!(map(r#"{ "type": "string", "nullable": true }"#).0, "string | null");
        assert_eq!(map(r#"{ "const": "fixed" }"#).0, "\"fixed\"");
        assert_eq!(map(r#"{ "type": "string", "enum": ["a", "b"] }"#).0, "\"a\" | \"b\"");
    }

    #[test]
    fn test_objects_and_records() {
        assert_eq!(
            map(r#"{ "type": "object", "properties": { "id": { "type": "integer" } }, "required": ["id"] }"#).0,
            "{ id: number }"
        );
        assert_eq!(
            map(r#"{ "type": "object", "additionalProperties": { "type": "string" } }"#).0,
            "Record<string, string>"
        );
        assert_eq!(map(r#"{ "type": "object" }"#).0, "Record<string, unknown>");
        assert_eq!(
            map(r##"{ "type": "array", "items": { "$ref": "#/components/schemas/User" } }"##).0,
            "User[]"
        );
    }

    #[test]
    fn test_discriminated_union() {
        let schemas = BTreeMap::from([
            ("Cat".to_string(), Schema::default()),
            ("Dog".to_string(), Schema::default()),
        ]);
        let mut mapper = TypeMapper::new(&schemas);
        let ty = mapper.schema_type(
            &schema(
                r##"{
                    "oneOf": [{ "$ref": "#/components/schemas/Cat" }, { "$ref": "#/components/schemas/Dog" }],
                    "discriminator": { "propertyName": "kind", "mapping": { "dog": "#/components/schemas/Dog" } }
                }"##,
            ),
            "schema Pet",
            "type",
        );
        assert_eq!(ty.emit(), "Cat | { kind: \"dog\" } & Dog");
    }

    #[test]
    fn test_unresolvable_schemas_degrade_with_warning() {
        let (ty, warnings) = map(r#"{ "$ref": "shared.yaml#/User" }"#);
        assert_eq!(ty, "unknown");
        assert_eq!(
            warnings,
            vec![Warning::partial_type(
                "GET /a",
                "response 200",
                "external reference 'shared.yaml#/User'"
            )]
        );

        let (ty, warnings) = map(r#"{ "not": { "type": "string" } }"#);
        assert_eq!(ty, "unknown");
        assert_eq!(warnings.len(), 1);

        let (ty, warnings) = map(r##"{ "$ref": "#/definitions/User" }"##);
        assert_eq!(ty, "unknown");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_component_defs() {
        let schemas = BTreeMap::from([
            (
                "Status".to_string(),
                schema(r#"{ "type": "string", "enum": ["active", "archived"] }"#),
            ),
            (
                "user.profile".to_string(),
                schema(
                    r#"{ "type": "object", "description": "A profile.", "properties": {
                        "name": { "type": "string", "description": "Display name" }
                    }, "required": ["name"] }"#,
                ),
            ),
            ("Ids".to_string(), schema(r#"{ "type": "array", "items": { "type": "integer" } }"#)),
        ]);
        let mut mapper = TypeMapper::new(&schemas);
        let defs = mapper.component_defs();
        let emitted: Vec<_> = defs.iter().map(Emit::emit).collect();
        assert_eq!(emitted[0], "export type Ids = number[];\n");
        assert!(emitted[1].starts_with("export const Status = {\n  active: \"active\","));
        assert_eq!(
            emitted[2],
            "/**\n * A profile.\n */\nexport interface UserProfile {\n  /**\n   * Display name\n   */\n  name: string;\n}\n"
        );
        assert!(mapper.into_warnings().is_empty());
    }

    #[test]
    fn test_route_args_and_response() {
        let api = load(
            &OpenApiDocument::from_json(
                r##"{ "openapi": "3.1.0", "paths": { "/users/{userId}": { "patch": {
                    "parameters": [
                        { "name": "userId", "in": "path", "schema": { "type": "string" } },
                        { "name": "dryRun", "in": "query", "schema": { "type": "boolean" } }
                    ],
                    "requestBody": { "required": true, "content": { "application/json": {
                        "schema": { "$ref": "#/components/schemas/User" } } } },
                    "responses": { "200": { "description": "Updated user", "content": {
                        "application/json": { "schema": { "$ref": "#/components/schemas/User" } } } } }
                } } },
                "components": { "schemas": { "User": { "type": "object" } } } }"##,
            )
            .unwrap(),
        )
        .unwrap();
        let bound = bind(&api.routes[0]);
        let mut mapper = TypeMapper::new(&api.schemas);
        let types = mapper.route_types(bound.route, &bound.names);
        assert_eq!(
            types.args.unwrap().emit(),
            "/**\n * Request arguments for `PATCH /users/{userId}`.\n */\nexport interface PatchUsersUserIdArgs {\n  param: {\n    userId: string;\n  };\n  query?: {\n    dryRun?: boolean;\n  };\n  json: User;\n}\n"
        );
        assert_eq!(
            types.response.emit(),
            "/**\n * Success response of `PATCH /users/{userId}`.\n * Updated user\n */\nexport type PatchUsersUserIdResponse = User;\n"
        );
    }

    #[test]
    fn test_response_status_priority() {
        let api = load(
            &OpenApiDocument::from_json(
                r#"{ "openapi": "3.1.0", "paths": {
                    "/a": { "delete": { "responses": { "204": { "description": "gone" } } } },
                    "/b": { "post": { "responses": {
                        "default": { "description": "err", "content": { "application/json": { "schema": { "type": "string" } } } },
                        "201": { "description": "made", "content": { "application/json": { "schema": { "type": "integer" } } } }
                    } } },
                    "/c": { "get": { "responses": { "200": { "description": "bytes", "content": { "application/octet-stream": {} } } } } }
                } }"#,
            )
            .unwrap(),
        )
        .unwrap();
        let mut mapper = TypeMapper::new(&api.schemas);
        let emitted: Vec<_> = api
            .routes
            .iter()
            .map(|route| {
                let bound = bind(route);
                match mapper.route_types(route, &bound.names).response.kind {
                    TypeDefKind::TypeAlias { ty } => ty.emit(),
                    _ => String::new(),
                }
            })
            .collect();
        assert_eq!(emitted, vec!["void", "number", "unknown"]);
        let warnings = mapper.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("application/octet-stream"));
    }
}

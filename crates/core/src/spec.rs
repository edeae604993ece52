//! OpenAPI document structs for serde deserialization.
//!
//! Covers the subset of OpenAPI 3.0/3.1 needed to build route models and
//! TypeScript types. Maps are `BTreeMap` so iteration order is stable.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SchemaError;

/// Root OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version string, e.g. `3.1.0`.
    pub openapi: Option<String>,
    /// Present only on Swagger 2.0 documents, which are rejected.
    pub swagger: Option<String>,
    /// Document metadata.
    #[serde(default)]
    pub info: Info,
    /// Path templates and their operations.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable definitions.
    pub components: Option<Components>,
    /// Document-level security requirements.
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
}

/// Document metadata.
#[derive(Debug, Default, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default)]
    pub title: String,
    /// API version.
    #[serde(default)]
    pub version: String,
}

/// Components section containing reusable definitions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas.
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    /// Named parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, RefOr<Parameter>>,
    /// Named request bodies.
    #[serde(default)]
    pub request_bodies: BTreeMap<String, RefOr<RequestBody>>,
    /// Named responses.
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
}

/// Security requirement: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Operations under one path template.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Inherited by every operation; operation-level entries win.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

/// One method on a path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
    /// Overrides the document-level requirements when present.
    pub security: Option<Vec<SecurityRequirement>>,
}

/// Either a `$ref` pointer or an inline value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{ "$ref": "#/components/..." }`
    Ref(Reference),
    /// Inline definition.
    Item(T),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    /// The pointer, e.g. `#/components/parameters/Limit`.
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Schema>,
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// The JSON Schema subset the type mapper understands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// `type`, a single name or (3.1) a list such as `["string", "null"]`.
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Human-readable description, carried into doc comments.
    pub description: Option<String>,

    pub properties: Option<BTreeMap<String, Schema>>,

    pub required: Option<Vec<String>>,

    pub items: Option<Box<Schema>>,

    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Mapped to a union, like `oneOf`.
    pub any_of: Option<Vec<Schema>>,

    pub one_of: Option<Vec<Schema>>,

    /// Mapped to an intersection.
    pub all_of: Option<Vec<Schema>>,

    /// Negation; has no TypeScript counterpart.
    pub not: Option<Box<Schema>>,

    /// `true`/absent means an open record, a schema types the values.
    pub additional_properties: Option<AdditionalProperties>,

    pub discriminator: Option<Discriminator>,

    /// Only `binary` changes the mapped type (to `Blob`).
    pub format: Option<String>,

    #[serde(rename = "const")]
    pub const_value: Option<serde_json::Value>,

    /// 3.0 style; 3.1 documents list `null` in `type` instead.
    pub nullable: Option<bool>,

    /// Marks the schema as deprecated.
    #[serde(default)]
    pub deprecated: bool,
}

/// One `enum` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    /// Tag property shared by every variant.
    pub property_name: String,
    /// Tag value to `$ref`; without it the tag is the schema name.
    pub mapping: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension, falling back to sniffing the text.
    pub fn detect(path: Option<&Path>, text: &str) -> Self {
        match path
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            Some("json") => Self::Json,
            _ if text.trim_start().starts_with('{') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl OpenApiDocument {
    /// Parse a document from text in the given format.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, SchemaError> {
        match format {
            DocumentFormat::Json => serde_json::from_str(text).map_err(SchemaError::parse),
            DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(SchemaError::parse),
        }
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Self::parse(json, DocumentFormat::Json)
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, DocumentFormat::detect(Some(path), &text))
    }
}

impl Schema {
    /// Check if this schema is nullable (OpenAPI 3.0 flag or `null` in a type array).
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }

        if let Some(SchemaType::Multiple(types)) = &self.schema_type
            && types.iter().any(|t| t == "null")
        {
            return true;
        }

        false
    }

    /// Iterate over every direct subschema (properties, items, combinators).
    pub fn children(&self) -> impl Iterator<Item = &Schema> {
        let props = self.properties.iter().flat_map(|p| p.values());
        let items = self.items.iter().map(|b| &**b);
        let not = self.not.iter().map(|b| &**b);
        let combos = [&self.any_of, &self.one_of, &self.all_of]
            .into_iter()
            .flatten()
            .flatten();
        let additional = match &self.additional_properties {
            Some(AdditionalProperties::Schema(s)) => Some(&**s),
            _ => None,
        };
        props.chain(items).chain(not).chain(combos).chain(additional)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_with_refs() {
        let doc = OpenApiDocument::from_json(
            r##"{
                "openapi": "3.1.0",
                "info": { "title": "Demo", "version": "1.0" },
                "paths": {
                    "/items": {
                        "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                        "get": { "responses": { "200": { "$ref": "#/components/responses/Items" } } }
                    }
                },
                "components": {
                    "parameters": { "Limit": { "name": "limit", "in": "query" } }
                }
            }"##,
        )
        .unwrap();

        let item = &doc.paths["/items"];
        assert!(matches!(&item.parameters[0], RefOr::Ref(r) if r.ref_path == "#/components/parameters/Limit"));
        let op = item.get.as_ref().unwrap();
        assert!(matches!(op.responses.get("200"), Some(RefOr::Ref(_))));
        let components = doc.components.unwrap();
        assert!(matches!(components.parameters.get("Limit"), Some(RefOr::Item(p)) if p.location == "query"));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "openapi: 3.0.3\ninfo:\n  title: Demo\n  version: '1'\npaths:\n  /ping:\n    head:\n      responses:\n        '204':\n          description: ok\n";
        let doc = OpenApiDocument::parse(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(doc.info.title, "Demo");
        assert!(doc.paths["/ping"].head.is_some());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            DocumentFormat::detect(Some(Path::new("api.YML")), "{"),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::detect(Some(Path::new("api.json")), "openapi: 3"),
            DocumentFormat::Json
        );
        assert_eq!(DocumentFormat::detect(None, "  {\"a\": 1}"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::detect(None, "openapi: 3.1.0"), DocumentFormat::Yaml);
    }

    #[test]
    fn test_nullable() {
        let schema: Schema = serde_json::from_str(r#"{ "type": ["string", "null"] }"#).unwrap();
        assert!(schema.is_nullable());
        let schema: Schema = serde_json::from_str(r#"{ "type": "string", "nullable": true }"#).unwrap();
        assert!(schema.is_nullable());
        let schema: Schema = serde_json::from_str(r#"{ "type": "string" }"#).unwrap();
        assert!(!schema.is_nullable());
    }

    #[test]
    fn test_children_visits_nested_schemas() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "type": "object",
                "properties": { "a": { "type": "string" } },
                "additionalProperties": { "type": "number" },
                "allOf": [{ "type": "object" }]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.children().count(), 3);
    }
}

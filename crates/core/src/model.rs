//! In-memory route model produced by the loader.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::path::PathTemplate;
use crate::report::Warning;
use crate::spec::{Schema, SecurityRequirement};

/// HTTP method. Declaration order is the canonical sort order for routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
}

impl HttpMethod {
    /// All methods in canonical order.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Head,
        Self::Options,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Title-cased form used as the identifier prefix (`Get`, `Post`, ...).
    pub fn title(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Head => "Head",
            HttpMethod::Options => "Options",
            HttpMethod::Post => "Post",
            HttpMethod::Put => "Put",
            HttpMethod::Patch => "Patch",
            HttpMethod::Delete => "Delete",
            HttpMethod::Trace => "Trace",
        }
    }

    /// Client callable suffix (`$get`, `$post`, ...).
    pub fn verb(&self) -> String {
        format!("${}", self.as_str().to_ascii_lowercase())
    }

    /// Safe methods become query bindings.
    pub fn is_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    /// Key of this parameter set inside the argument bundle.
    pub fn args_key(&self) -> &'static str {
        match self {
            ParamLocation::Path => "param",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved parameter definition.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    /// Type descriptor; `None` means the document gave no schema.
    pub schema: Option<Schema>,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// Parameters of one route, grouped by location in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParameterSets {
    pub path: Vec<ParamSpec>,
    pub query: Vec<ParamSpec>,
    pub header: Vec<ParamSpec>,
}

impl ParameterSets {
    pub fn get(&self, location: ParamLocation) -> &[ParamSpec] {
        match location {
            ParamLocation::Path => &self.path,
            ParamLocation::Query => &self.query,
            ParamLocation::Header => &self.header,
        }
    }

    /// Insert or replace (by name) a parameter in its location's set.
    pub fn upsert(&mut self, param: ParamSpec) {
        let set = match param.location {
            ParamLocation::Path => &mut self.path,
            ParamLocation::Query => &mut self.query,
            ParamLocation::Header => &mut self.header,
        };
        if let Some(existing) = set.iter_mut().find(|p| p.name == param.name) {
            *existing = param;
        } else {
            set.push(param);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.path.iter().chain(&self.query).chain(&self.header)
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty() && self.header.is_empty()
    }
}

/// How a request body is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
    Text,
}

impl BodyEncoding {
    /// Key of the body inside the argument bundle.
    pub fn args_key(&self) -> &'static str {
        match self {
            BodyEncoding::Json => "json",
            BodyEncoding::Form => "form",
            BodyEncoding::Text => "text",
        }
    }
}

/// Request body of a route.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub encoding: BodyEncoding,
    pub media_type: String,
    pub required: bool,
    pub schema: Option<Schema>,
}

/// One documented response.
#[derive(Debug, Clone, Default)]
pub struct ResponseSpec {
    pub description: Option<String>,
    /// First media type with content, if any.
    pub media_type: Option<String>,
    pub schema: Option<Schema>,
}

/// One (path, method) pair of the API description.
#[derive(Debug, Clone)]
pub struct RouteModel {
    pub method: HttpMethod,
    pub path: PathTemplate,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: ParameterSets,
    pub request_body: Option<BodySpec>,
    /// Keyed by status code (`200`, `2XX`, `default`, ...).
    pub responses: BTreeMap<String, ResponseSpec>,
    pub security: Vec<SecurityRequirement>,
}

impl RouteModel {
    /// Human-readable label, e.g. `GET /users/{userId}`.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path.raw())
    }

    /// Whether the route takes any input at all.
    pub fn has_input(&self) -> bool {
        !self.parameters.is_empty() || self.request_body.is_some()
    }
}

/// Output of the loader: sorted routes plus the schema table.
#[derive(Debug, Default)]
pub struct LoadedApi {
    pub title: String,
    pub version: String,
    /// Sorted by normalized path, then method.
    pub routes: Vec<RouteModel>,
    /// Component schemas by their document name.
    pub schemas: BTreeMap<String, Schema>,
    /// Non-fatal problems found while loading.
    pub warnings: Vec<Warning>,
}

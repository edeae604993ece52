//! Maps routes onto the path-chained client surface.
//!
//! A route's [`AccessorPath`] is the chain of property keys that reaches its
//! callable on the client object (`client.users[":userId"].$get`), and its
//! identifier is the method followed by one PascalCase token per segment
//! (`GetUsersUserId`). Both are pure functions of the path template and the
//! method.

use crate::collision::{Claim, Namespace, Owner};
use crate::ir::types::TsExpr;
use crate::ir::utils::{is_identifier, pascal_case};
use crate::model::{HttpMethod, RouteModel};
use crate::path::{SegmentToken, WILDCARD_TOKEN};
use crate::report::Warning;

/// Accessor key and identifier token used for the root path `/`.
pub const INDEX_KEY: &str = "index";
const INDEX_TOKEN: &str = "Index";

/// Ordered property keys leading to a route's callable, plus the method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorPath {
    keys: Vec<String>,
    method: HttpMethod,
}

impl AccessorPath {
    pub fn new(tokens: &[SegmentToken], method: HttpMethod) -> Self {
        let keys = if tokens.is_empty() {
            vec![INDEX_KEY.to_string()]
        } else {
            tokens.iter().map(SegmentToken::normalized).collect()
        };
        Self { keys, method }
    }

    /// Property keys from the client root, without the verb.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Callable name at the end of the chain (`$get`).
    pub fn verb(&self) -> String {
        self.method.verb()
    }

    /// Call target expression rooted at `root`, e.g. `client.users[":userId"].$get`.
    pub fn expression(&self, root: &str) -> TsExpr {
        let target = self
            .keys
            .iter()
            .fold(TsExpr::ident(root), |expr, key| access(expr, key));
        target.member(self.verb())
    }
}

/// `.key` for identifier-safe keys, `["key"]` otherwise.
fn access(expr: TsExpr, key: &str) -> TsExpr {
    if is_identifier(key) {
        expr.member(key)
    } else {
        expr.index(TsExpr::string(key))
    }
}

/// Identifier token for one segment.
pub fn identifier_token(token: &SegmentToken) -> String {
    match token {
        SegmentToken::Literal(text) | SegmentToken::Parameter(text) => {
            let word = pascal_case(text);
            if word.is_empty() {
                escape_token(text)
            } else {
                word
            }
        }
        SegmentToken::NumericLiteral(digits) => digits.clone(),
        SegmentToken::Wildcard(_) => WILDCARD_TOKEN.to_string(),
    }
}

/// `X` followed by the uppercase hex code of every character.
fn escape_token(text: &str) -> String {
    let mut escaped = "X".to_string();
    for c in text.chars() {
        escaped.push_str(&format!("{:X}", u32::from(c)));
    }
    escaped
}

/// Canonical identifier of a route: `<Method><Token...>`.
pub fn route_identifier(tokens: &[SegmentToken], method: HttpMethod) -> String {
    let mut name = method.title().to_string();
    if tokens.is_empty() {
        name.push_str(INDEX_TOKEN);
    }
    for token in tokens {
        name.push_str(&identifier_token(token));
    }
    name
}

/// Every exported name a route produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNames {
    /// Canonical identifier, e.g. `GetUsersUserId`.
    pub identifier: String,
    /// `use<Identifier>`
    pub hook: String,
    /// `<Identifier>Args`, absent when the route takes no input.
    pub args_type: Option<String>,
    /// `<Identifier>Response`
    pub response_type: String,
    /// `get<Identifier>QueryKey`, queries only.
    pub query_key_fn: Option<String>,
    /// `get<Identifier>QueryOptions`, queries only.
    pub query_options_fn: Option<String>,
}

impl SymbolNames {
    pub fn new(identifier: String, is_query: bool, has_input: bool) -> Self {
        Self {
            hook: format!("use{identifier}"),
            args_type: has_input.then(|| format!("{identifier}Args")),
            response_type: format!("{identifier}Response"),
            query_key_fn: is_query.then(|| format!("get{identifier}QueryKey")),
            query_options_fn: is_query.then(|| format!("get{identifier}QueryOptions")),
            identifier,
        }
    }
}

/// A route together with its place on the client surface.
#[derive(Debug, Clone)]
pub struct BoundRoute<'a> {
    pub route: &'a RouteModel,
    pub accessor: AccessorPath,
    pub names: SymbolNames,
    /// Normalized template, the cache-key namespace (`/users/:userId`).
    pub cache_namespace: String,
    pub warnings: Vec<Warning>,
}

impl BoundRoute<'_> {
    pub fn owner(&self) -> Owner {
        Owner::route(self.route.method, self.route.path.raw())
    }

    /// Names this route must own exclusively.
    pub fn claims(&self) -> Vec<Claim> {
        let names = &self.names;
        let mut claims = vec![
            Claim::new(Namespace::Identifier, &names.identifier),
            Claim::new(Namespace::Symbol, &names.hook),
            Claim::new(Namespace::Symbol, &names.response_type),
        ];
        claims.extend(
            [
                &names.args_type,
                &names.query_key_fn,
                &names.query_options_fn,
            ]
            .into_iter()
            .flatten()
            .map(|name| Claim::new(Namespace::Symbol, name)),
        );
        if self.route.method.is_query() {
            claims.push(Claim::new(Namespace::CacheKey, &self.cache_namespace));
        }
        claims
    }
}

/// Place a route on the client surface.
pub fn bind(route: &RouteModel) -> BoundRoute<'_> {
    let tokens = route.path.tokens();
    let identifier = route_identifier(tokens, route.method);
    let names = SymbolNames::new(identifier, route.method.is_query(), route.has_input());

    let mut warnings = Vec::new();
    if route.path.collapsed_separators() {
        warnings.push(Warning::CollapsedSeparator {
            path: route.path.raw().to_string(),
        });
    }

    BoundRoute {
        route,
        accessor: AccessorPath::new(tokens, route.method),
        names,
        cache_namespace: route.path.normalized(),
        warnings,
    }
}

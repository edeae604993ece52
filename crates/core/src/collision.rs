//! Name collision detection.
//!
//! [`CollisionTable`] is a plain accumulator owned by one generation run.
//! Each owner (a route, a component schema, or the fixed client runtime
//! surface) claims its names as one batch: the batch is checked against the
//! table and against itself, and only committed when every name is free.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::CollisionError;
use crate::model::HttpMethod;

/// Symbols every generated client surface exports.
pub const RUNTIME_SYMBOLS: [&str; 2] = ["ApiClient", "ClientRequestOptions"];

/// Kind of name being claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// Canonical per-route identifier, e.g. `GetUsersUserId`.
    Identifier,
    /// Exported TypeScript symbol (hooks, factories, types).
    Symbol,
    /// Normalized path used as the first cache-key element.
    CacheKey,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Identifier => "identifier",
            Namespace::Symbol => "exported symbol",
            Namespace::CacheKey => "cache key",
        })
    }
}

/// Who produced a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Route { method: HttpMethod, path: String },
    Schema(String),
    Runtime,
}

impl Owner {
    pub fn route(method: HttpMethod, path: impl Into<String>) -> Self {
        Owner::Route {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Route { method, path } => write!(f, "route {method} {path}"),
            Owner::Schema(name) => write!(f, "schema '{name}'"),
            Owner::Runtime => f.write_str("the client runtime surface"),
        }
    }
}

/// One name requested in one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub namespace: Namespace,
    pub name: String,
}

impl Claim {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }
}

/// Accumulated claims of a run.
#[derive(Debug, Clone)]
pub struct CollisionTable {
    claims: BTreeMap<(Namespace, String), Owner>,
}

impl Default for CollisionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionTable {
    /// A table with the runtime symbols already reserved.
    pub fn new() -> Self {
        let claims = RUNTIME_SYMBOLS
            .iter()
            .map(|name| ((Namespace::Symbol, (*name).to_string()), Owner::Runtime))
            .collect();
        Self { claims }
    }

    /// Check every claim, then commit them all. On error nothing is recorded.
    pub fn claim_all(&mut self, owner: &Owner, claims: &[Claim]) -> Result<(), CollisionError> {
        let mut batch = BTreeSet::new();
        for claim in claims {
            let key = (claim.namespace, claim.name.as_str());
            if let Some(first) = self.owner_of(claim.namespace, &claim.name) {
                return Err(CollisionError {
                    namespace: claim.namespace,
                    name: claim.name.clone(),
                    first: first.clone(),
                    second: owner.clone(),
                });
            }
            if !batch.insert(key) {
                return Err(CollisionError {
                    namespace: claim.namespace,
                    name: claim.name.clone(),
                    first: owner.clone(),
                    second: owner.clone(),
                });
            }
        }

        for claim in claims {
            self.claims
                .insert((claim.namespace, claim.name.clone()), owner.clone());
        }
        Ok(())
    }

    pub fn owner_of(&self, namespace: Namespace, name: &str) -> Option<&Owner> {
        self.claims.get(&(namespace, name.to_string()))
    }

    /// Number of committed claims, runtime reservations included.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

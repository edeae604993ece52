//! Path template parsing and segment classification.
//!
//! Every segment of a path maps to exactly one [`SegmentToken`]:
//!
//! | segment            | token                       |
//! |--------------------|-----------------------------|
//! | `{name}`           | `Parameter("name")`         |
//! | `123`              | `NumericLiteral("123")`     |
//! | `*`, `**`          | `Wildcard("*")`             |
//! | anything else      | `Literal(..)`               |
//!
//! Empty segments (leading, trailing or doubled `/`) are dropped.

use std::collections::BTreeSet;

use crate::error::SchemaError;

/// Sentinel used in identifiers for wildcard segments.
pub const WILDCARD_TOKEN: &str = "Wildcard";

/// Classified path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentToken {
    /// Plain resource segment, e.g. `users`.
    Literal(String),
    /// `{name}` placeholder.
    Parameter(String),
    /// All-digit segment, e.g. `1`. Kept verbatim.
    NumericLiteral(String),
    /// Glob segment made only of `*`.
    Wildcard(String),
}

impl SegmentToken {
    /// Classify a single non-empty segment.
    pub fn classify(segment: &str) -> Self {
        if let Some(name) = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            && !name.is_empty()
            && !name.contains(['{', '}'])
        {
            return Self::Parameter(name.to_string());
        }
        if segment.chars().all(|c| c.is_ascii_digit()) {
            return Self::NumericLiteral(segment.to_string());
        }
        if segment.chars().all(|c| c == '*') {
            return Self::Wildcard(segment.to_string());
        }
        Self::Literal(segment.to_string())
    }

    /// Segment as written in the normalized template (`:name` for parameters).
    pub fn normalized(&self) -> String {
        match self {
            SegmentToken::Parameter(name) => format!(":{name}"),
            SegmentToken::Literal(s) | SegmentToken::NumericLiteral(s) | SegmentToken::Wildcard(s) => {
                s.clone()
            }
        }
    }

    /// Segment with parameter names erased, for structural comparison.
    fn shape(&self) -> String {
        match self {
            SegmentToken::Parameter(_) => ":".to_string(),
            other => other.normalized(),
        }
    }
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    tokens: Vec<SegmentToken>,
    collapsed_separators: bool,
}

impl PathTemplate {
    /// Parse a raw template such as `/users/{userId}`. Never fails; use
    /// [`PathTemplate::validate`] to reject unsupported templates.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_matches('/');
        let collapsed_separators = trimmed.contains("//");
        let tokens = trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .map(SegmentToken::classify)
            .collect();

        Self {
            raw: raw.to_string(),
            tokens,
            collapsed_separators,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[SegmentToken] {
        &self.tokens
    }

    /// Whether an interior `//` was collapsed while parsing.
    pub fn collapsed_separators(&self) -> bool {
        self.collapsed_separators
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            SegmentToken::Parameter(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Normalized template used as the cache-key namespace: `/users/:userId`.
    pub fn normalized(&self) -> String {
        if self.tokens.is_empty() {
            return "/".to_string();
        }
        self.tokens
            .iter()
            .map(|t| format!("/{}", t.normalized()))
            .collect()
    }

    /// Template with parameter names erased: `/users/:`.
    pub fn shape(&self) -> String {
        self.tokens.iter().map(|t| format!("/{}", t.shape())).collect()
    }

    /// Reject literal segments that embed braces and repeated placeholders.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for token in &self.tokens {
            match token {
                SegmentToken::Literal(segment) if segment.contains(['{', '}']) => {
                    return Err(SchemaError::UnsupportedSegment {
                        path: self.raw.clone(),
                        segment: segment.clone(),
                    });
                }
                SegmentToken::Parameter(name) if !seen.insert(name.as_str()) => {
                    return Err(SchemaError::RepeatedPlaceholder {
                        path: self.raw.clone(),
                        name: name.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

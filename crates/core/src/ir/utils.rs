//! Naming and literal helpers shared by the type mapper, the binder and
//! the printer.

use super::types::{TsLiteral, TsPrimitive, TsType};
use crate::spec::EnumValue;

/// Whether `name` can be written as a bare property name or binding
/// (`foo`, `_x`, `$get`). Anything else must be quoted or bracketed.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let word = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '$');
    !first.is_ascii_digit() && word(first) && chars.all(word)
}

/// Escape `s` for a double-quoted string literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Object or interface key: bare when it is an identifier, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_string(name))
    }
}

/// Upper-case the first character, leaving the rest alone.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Split on anything that is not ASCII alphanumeric and capitalize each word:
/// `user-profiles` → `UserProfiles`, `userId` → `UserId`.
pub fn pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect()
}

/// Exported TypeScript name for a component schema (`user.profile` →
/// `UserProfile`, `2fa` → `_2fa`, `...` → `Schema`).
pub fn type_name(name: &str) -> String {
    match pascal_case(name) {
        pascal if pascal.is_empty() => "Schema".to_string(),
        pascal if pascal.starts_with(|c: char| c.is_ascii_digit()) => format!("_{pascal}"),
        pascal => pascal,
    }
}

pub fn enum_literal(value: &EnumValue) -> TsLiteral {
    match value {
        EnumValue::String(s) => TsLiteral::String(s.clone()),
        EnumValue::Integer(n) => TsLiteral::Int(*n),
        EnumValue::Float(f) => TsLiteral::Number(*f),
        EnumValue::Bool(b) => TsLiteral::Bool(*b),
        EnumValue::Null => TsLiteral::Null,
    }
}

/// Key of `value` inside a const-enum object. Floats fall back to their position.
pub fn enum_key(value: &EnumValue, position: usize) -> String {
    match value {
        EnumValue::String(s) => property_key(s),
        EnumValue::Integer(n) if *n < 0 => format!("VALUE_MINUS_{}", n.unsigned_abs()),
        EnumValue::Integer(n) => format!("VALUE_{n}"),
        EnumValue::Float(_) => format!("VALUE_{position}"),
        EnumValue::Bool(true) => "TRUE".into(),
        EnumValue::Bool(false) => "FALSE".into(),
        EnumValue::Null => "NULL".into(),
    }
}

/// `Record<string, T>`
pub fn string_record(value: TsType) -> TsType {
    TsType::Record {
        key: Box::new(TsType::Primitive(TsPrimitive::String)),
        value: Box::new(value),
    }
}

/// `Record<string, unknown>`, the shape of an open object.
pub fn unknown_record() -> TsType {
    string_record(TsType::unknown())
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Helpers for opaque Keycloak representations.
//!
//! Definitions are passed to Keycloak as-is. The operator only reads the
//! natural-key field (`clientId`, `username`, `alias`, `name`, `realm`) and
//! injects the few fields it owns (`id`, `secret`, `parentId`).

use crate::errors::{Error, Result};
use serde_json::{Map, Value};

/// Non-empty string field of a representation.
#[must_use]
pub fn string_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn as_object(definition: Option<&Value>) -> Result<Map<String, Value>> {
    match definition {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(Error::InvalidDefinition(
            "definition must be a JSON object".to_string(),
        )),
    }
}

/// Desired representation with the natural key defaulted to `name`.
///
/// # Errors
///
/// Returns [`Error::InvalidDefinition`] when the definition is not an object,
/// or when the natural key is present but not a string.
pub fn with_natural_key(
    definition: Option<&Value>,
    natural_key: Option<&str>,
    name: &str,
) -> Result<Value> {
    let mut map = as_object(definition)?;
    if let Some(key) = natural_key {
        match map.get(key) {
            None | Some(Value::Null) => {
                map.insert(key.to_string(), Value::String(name.to_string()));
            }
            Some(Value::String(s)) if s.is_empty() => {
                map.insert(key.to_string(), Value::String(name.to_string()));
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(Error::InvalidDefinition(format!(
                    "definition.{key} must be a string"
                )))
            }
        }
    }
    Ok(Value::Object(map))
}

/// Natural-key value of a desired representation.
///
/// # Errors
///
/// Returns [`Error::InvalidDefinition`] when the field is missing.
pub fn natural_key<'a>(desired: &'a Value, key: &str) -> Result<&'a str> {
    string_field(desired, key)
        .ok_or_else(|| Error::InvalidDefinition(format!("definition.{key} is required")))
}

/// Realm name of a realm definition. Unlike leaf keys it is never defaulted.
///
/// # Errors
///
/// Returns [`Error::InvalidDefinition`] when `realm` is missing, empty or not a string.
pub fn realm_name(definition: Option<&Value>) -> Result<String> {
    definition
        .and_then(|d| string_field(d, "realm"))
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidDefinition("definition.realm is required".to_string()))
}

/// Copy of `desired` with `field` set to `value`.
#[must_use]
pub fn with_field(desired: &Value, field: &str, value: Value) -> Value {
    let mut out = desired.clone();
    if let Value::Object(map) = &mut out {
        map.insert(field.to_string(), value);
    }
    out
}

/// Copy of `desired` carrying the remote identifier.
#[must_use]
pub fn with_id(desired: &Value, id: &str) -> Value {
    with_field(desired, "id", Value::String(id.to_string()))
}

/// First item of a collection whose `key` equals `value`.
#[must_use]
pub fn find_by<'a>(items: &'a [Value], key: &str, value: &str) -> Option<&'a Value> {
    items.iter().find(|item| string_field(item, key) == Some(value))
}

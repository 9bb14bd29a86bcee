//! JSON shapes exchanged with the engine's query API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use metactl_core::{InconsistencyStatus, InconsistentObject};

/// `{"type": <op>, "args": <args>}`
#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    #[serde(rename = "type")]
    pub op: &'a str,
    pub args: &'a Value,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawInconsistencyResponse {
    pub is_consistent: bool,
    #[serde(default)]
    pub inconsistent_objects: Vec<RawInconsistentObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawInconsistentObject {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub definition: Value,
}

impl RawInconsistencyResponse {
    pub fn into_status(self) -> InconsistencyStatus {
        InconsistencyStatus {
            is_consistent: self.is_consistent,
            objects: self
                .inconsistent_objects
                .into_iter()
                .map(RawInconsistentObject::into_object)
                .collect(),
        }
    }
}

impl RawInconsistentObject {
    /// Derive a display name and description from the raw definition.
    pub fn into_object(self) -> InconsistentObject {
        let def = &self.definition;
        let table = def.get("table").map(qualified_name);
        let (name, description) = match self.object_type.as_str() {
            "table" | "view" => {
                let name = def
                    .get("table")
                    .map(qualified_name)
                    .unwrap_or_else(|| qualified_name(def));
                let description = format!("table {name}");
                (name, description)
            }
            "object_relation" | "array_relation" | "remote_relationship" | "computed_field" => {
                let name = string_field(def, "name").unwrap_or_else(|| compact(def));
                let kind = self.object_type.replace('_', " ");
                let description = match &table {
                    Some(t) => format!("{kind} {name} on table {t}"),
                    None => format!("{kind} {name}"),
                };
                (name, description)
            }
            op if op.ends_with("_permission") => {
                let role = string_field(def, "role").unwrap_or_else(|| "unknown".to_string());
                let action = op.trim_end_matches("_permission");
                let name = format!("{role}-{action}-permission");
                let description = match &table {
                    Some(t) => format!("{action} permission on table {t} for role {role}"),
                    None => format!("{action} permission for role {role}"),
                };
                (name, description)
            }
            "function" => {
                let name = def
                    .get("function")
                    .map(qualified_name)
                    .unwrap_or_else(|| qualified_name(def));
                let description = format!("function {name}");
                (name, description)
            }
            "event_trigger" => {
                let name = def
                    .get("configuration")
                    .and_then(|c| string_field(c, "name"))
                    .or_else(|| string_field(def, "name"))
                    .unwrap_or_else(|| compact(def));
                let description = match &table {
                    Some(t) => format!("event trigger {name} on table {t}"),
                    None => format!("event trigger {name}"),
                };
                (name, description)
            }
            "remote_schema" => {
                let name = string_field(def, "name").unwrap_or_else(|| compact(def));
                let description = format!("remote schema {name}");
                (name, description)
            }
            other => {
                let name = string_field(def, "name").unwrap_or_else(|| compact(def));
                let description = format!("{} {}", other.replace('_', " "), compact(def));
                (name, description)
            }
        };
        InconsistentObject {
            name,
            object_type: self.object_type,
            description,
            reason: self.reason,
        }
    }
}

/// `"users"`, `{"name": "users"}` or `{"schema": "audit", "name": "users"}`.
/// The `public` schema is left implicit.
fn qualified_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match (map.get("schema"), map.get("name")) {
            (Some(Value::String(schema)), Some(Value::String(name))) if schema != "public" => {
                format!("{schema}.{name}")
            }
            (_, Some(Value::String(name))) => name.clone(),
            _ => compact(value),
        },
        other => compact(other),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn compact(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Position named by a bulk error path: `$.args[3].args` or `$[3]`.
pub(crate) fn bulk_index(path: &str) -> Option<usize> {
    let rest = path
        .strip_prefix("$.args[")
        .or_else(|| path.strip_prefix("$["))?;
    let end = rest.find(']')?;
    rest[..end].parse().ok()
}

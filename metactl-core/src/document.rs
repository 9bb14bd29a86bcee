//! The metadata document model.
//!
//! A [`MetadataDocument`] is an arbitrarily nested map/array/scalar tree.
//! metactl never looks inside it; it only moves it between the local file,
//! memory and the remote engine. Operations produce new values rather than
//! mutating an existing one.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataDocument(Value);

impl MetadataDocument {
    /// The empty baseline a remote engine holds after a reset.
    pub fn empty() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Render in the canonical encoding: pretty JSON, sorted keys, trailing
    /// newline. Structurally equal documents render identical text.
    pub fn to_canonical_string(&self) -> Result<String, serde_json::Error> {
        // serde_json::Map is BTreeMap-backed, so keys come out sorted.
        let mut out = serde_json::to_string_pretty(&self.0)?;
        out.push('\n');
        Ok(out)
    }
}

impl From<Value> for MetadataDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for MetadataDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_string_sorts_keys_and_ends_with_newline() {
        let doc = MetadataDocument::from(json!({"version": 2, "tables": []}));
        let text = doc.to_canonical_string().unwrap();
        assert!(text.ends_with('\n'));
        let tables_at = text.find("\"tables\"").unwrap();
        let version_at = text.find("\"version\"").unwrap();
        assert!(tables_at < version_at);
    }

    #[test]
    fn equal_documents_render_identically() {
        let a: MetadataDocument = serde_json::from_str(r#"{"b":1,"a":[true,null]}"#).unwrap();
        let b: MetadataDocument = serde_json::from_str(r#"{"a":[true,null],"b":1}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.to_canonical_string().unwrap(),
            b.to_canonical_string().unwrap()
        );
    }

    #[test]
    fn empty_is_an_empty_object() {
        assert_eq!(MetadataDocument::empty().as_value(), &json!({}));
    }
}

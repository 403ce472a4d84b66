//! Audit snapshots
//!
//! Ordered field-name → stringified-value mappings captured before and
//! after a mutation. Keys are kept sorted so serialized snapshots are
//! byte-stable and diffs are reproducible in tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A deterministic field → value mapping of an entity's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot(BTreeMap<String, String>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field value.
    pub fn field(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    /// Record a field value only when present.
    pub fn field_opt(self, name: impl Into<String>, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_iterate_in_key_order() {
        let snap = Snapshot::new()
            .field("semester", 4)
            .field("matricula", "A001")
            .field("status", "Active");

        let keys: Vec<&str> = snap.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["matricula", "semester", "status"]);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let a = Snapshot::new().field("b", 2).field("a", 1);
        let b = Snapshot::new().field("a", 1).field("b", 2);

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_field_opt_skips_none() {
        let snap = Snapshot::new().field_opt("code", None::<&str>);
        assert!(snap.is_empty());
    }
}

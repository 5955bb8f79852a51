//! Design-node identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Identifier of a node in the source design document.
///
/// Only nodes traceable to a design node carry one; containers synthesized
/// by the tree builder don't. The string is shared, so clones are a
/// refcount bump, and it is freed together with the last tree or diagnostic
/// holding it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DesignId(Arc<str>);

impl DesignId {
    pub fn new(s: &str) -> Self {
        DesignId(Arc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `s` names this ID.
    pub fn matches(&self, s: &str) -> bool {
        &*self.0 == s
    }
}

impl fmt::Debug for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DesignId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DesignId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DesignId(Arc::from(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_are_equal_ids() {
        let a = DesignId::new("1A2B:33");
        let b: DesignId = serde_json::from_str("\"1A2B:33\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "1A2B:33");
        assert!(a.matches("1A2B:33"));
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"1A2B:33\"");
    }

    #[test]
    fn display_is_bare_debug_is_prefixed() {
        let id = DesignId::new("header");
        assert_eq!(id.to_string(), "header");
        assert_eq!(format!("{id:?}"), "#header");
    }

    #[test]
    fn ids_are_owned_by_their_holders() {
        let id = DesignId::new("card");
        let held = id.clone();
        drop(id);
        assert_eq!(held.as_str(), "card");
        assert_eq!(Arc::strong_count(&held.0), 1);
    }
}

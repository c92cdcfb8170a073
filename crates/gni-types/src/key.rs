use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{join_key, KEY_SEPARATOR};
use crate::error::TypeError;

/// Primary key of an entity in the store.
///
/// Composite keys are built from components joined with `-`. A component
/// must be non-empty and must not itself contain the separator, otherwise
/// two different component lists could collide on the same key.
///
/// Single-component keys that are already canonical (addresses, base-58
/// subgraph ids) are built with [`EntityKey::new`], which applies the same
/// component rules.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// A single-component key.
    pub fn new(component: impl Into<String>) -> Result<Self, TypeError> {
        let component = component.into();
        check_component(&component)?;
        Ok(Self(component))
    }

    /// Join components in order.
    pub fn join<S: AsRef<str>>(parts: &[S]) -> Result<Self, TypeError> {
        if parts.is_empty() {
            return Err(TypeError::malformed("entity key needs at least one component"));
        }
        for part in parts {
            check_component(part.as_ref())?;
        }
        Ok(Self(join_key(parts)))
    }

    /// This key extended by one more component.
    pub fn child(&self, component: impl AsRef<str>) -> Result<Self, TypeError> {
        let component = component.as_ref();
        check_component(component)?;
        Ok(Self(join_key(&[self.0.as_str(), component])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The individual components, in order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// Reconstruct a key previously rendered with [`EntityKey::as_str`].
    ///
    /// Every `-`-separated component must be non-empty.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let parts: Vec<&str> = s.split(KEY_SEPARATOR).collect();
        Self::join(&parts)
    }
}

fn check_component(component: &str) -> Result<(), TypeError> {
    if component.is_empty() {
        return Err(TypeError::malformed("empty entity key component"));
    }
    if component.contains(KEY_SEPARATOR) {
        return Err(TypeError::malformed(format!(
            "entity key component contains separator: {component}"
        )));
    }
    Ok(())
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({})", self.0)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_builds_ordered_key() {
        let key = EntityKey::join(&["0xabc", "7"]).unwrap();
        assert_eq!(key.as_str(), "0xabc-7");
        assert_ne!(key, EntityKey::join(&["7", "0xabc"]).unwrap());
    }

    #[test]
    fn child_appends_component() {
        let subgraph = EntityKey::new("4LM4Csnp").unwrap();
        let version = subgraph.child("0").unwrap();
        assert_eq!(version.as_str(), "4LM4Csnp-0");
        assert_eq!(version.components().collect::<Vec<_>>(), vec!["4LM4Csnp", "0"]);
    }

    #[test]
    fn separator_in_component_is_rejected() {
        assert!(EntityKey::new("a-b").is_err());
        assert!(EntityKey::join(&["a", "b-c"]).is_err());
        assert!(EntityKey::new("a").unwrap().child("x-y").is_err());
    }

    #[test]
    fn empty_components_are_rejected() {
        assert!(EntityKey::new("").is_err());
        assert!(EntityKey::join::<&str>(&[]).is_err());
        assert!(EntityKey::join(&["a", ""]).is_err());
    }

    #[test]
    fn parse_inverts_as_str() {
        let key = EntityKey::join(&["0x12", "0x34", "1"]).unwrap();
        assert_eq!(EntityKey::parse(key.as_str()).unwrap(), key);
        assert!(EntityKey::parse("a--b").is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let key = EntityKey::join(&["tx", "3"]).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"tx-3\"");
        let back: EntityKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}

//! Content name registry.
//!
//! Maps each logical content name to the store location and fixed record
//! id that hold it, plus the snapshot file used when the record is missing.
//! Built once at startup and shared (`Arc<Registry>`) by every endpoint and
//! the resolver.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// A single registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Logical content name accepted by the endpoints (e.g. `faq`).
    pub name: String,
    /// Store location (collection/table) holding the record.
    pub collection: String,
    /// Fixed record identifier within the collection.
    pub record_id: String,
    /// Snapshot file name, relative to the snapshot directory.
    pub snapshot: String,
}

impl Mapping {
    pub fn new(name: &str, collection: &str, record_id: &str, snapshot: &str) -> Self {
        Self {
            name: name.to_string(),
            collection: collection.to_string(),
            record_id: record_id.to_string(),
            snapshot: snapshot.to_string(),
        }
    }
}

/// Built-in mapping table for the site's well-known content.
pub fn builtin_mappings() -> Vec<Mapping> {
    vec![
        Mapping::new("homepage", "pages", "homepage", "homepage.json"),
        Mapping::new("about", "pages", "about", "about.json"),
        Mapping::new("faq", "site_content", "faq", "faq.json"),
        Mapping::new("contact", "site_content", "contact", "contact.json"),
        Mapping::new("navigation", "site_settings", "navigation", "navigation.json"),
        Mapping::new("footer", "site_settings", "footer", "footer.json"),
    ]
}

/// Immutable name → mapping lookup table.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: HashMap<String, Mapping>,
}

impl Registry {
    /// Build a registry, rejecting empty or duplicate names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any name is empty or appears twice,
    /// or if a mapping has an empty collection or record id.
    pub fn new(mappings: impl IntoIterator<Item = Mapping>) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        for mapping in mappings {
            if mapping.name.trim().is_empty() {
                return Err(ConfigError::Invalid { field: "mappings".into(), reason: "name must not be empty".into() });
            }
            if mapping.collection.is_empty() || mapping.record_id.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "mappings".into(),
                    reason: format!("{}: collection and record_id are required", mapping.name),
                });
            }
            if entries.contains_key(&mapping.name) {
                return Err(ConfigError::Invalid {
                    field: "mappings".into(),
                    reason: format!("duplicate name: {}", mapping.name),
                });
            }
            entries.insert(mapping.name.clone(), mapping);
        }
        Ok(Self { entries })
    }

    /// Registry over [`builtin_mappings`].
    pub fn builtin() -> Self {
        let entries = builtin_mappings().into_iter().map(|m| (m.name.clone(), m)).collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), builtin_mappings().len());
        let faq = registry.get("faq").unwrap();
        assert_eq!(faq.collection, "site_content");
        assert_eq!(faq.record_id, "faq");
        assert!(registry.get("faqs").is_none());
    }

    #[test]
    fn test_builtin_mappings_are_valid() {
        assert!(Registry::new(builtin_mappings()).is_ok());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Registry::new(vec![
            Mapping::new("faq", "a", "1", "faq.json"),
            Mapping::new("faq", "b", "2", "faq.json"),
        ]);
        assert!(matches!(result, Err(ConfigError::Invalid { reason, .. }) if reason.contains("duplicate")));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Registry::new(vec![Mapping::new(" ", "a", "1", "x.json")]);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_names_sorted() {
        let registry =
            Registry::new(vec![Mapping::new("b", "c", "1", "b.json"), Mapping::new("a", "c", "2", "a.json")]).unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
    }
}

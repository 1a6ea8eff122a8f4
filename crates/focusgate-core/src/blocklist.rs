//! Persisted blocked-domain list.
//!
//! An ordered list of normalized domains with set semantics. Mutations
//! only write storage; rule synchronization happens downstream via the
//! storage-change subscription, so every observed mutation syncs exactly
//! once no matter which surface performed it.

use serde_json::Value;
use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::host::KeyValueStore;
use crate::rules::normalize_domain;

/// Storage key for the blocked-domain list.
pub const BLOCKED_KEY: &str = "blockedSites";

/// Seed list written on first install.
pub const SEED_DOMAINS: [&str; 4] = [
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "youtube.com",
];

#[derive(Clone)]
pub struct BlockedList {
    store: Arc<dyn KeyValueStore>,
}

impl BlockedList {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The persisted list; missing or unreadable storage is empty.
    pub fn get(&self) -> Vec<String> {
        match self.store.get(BLOCKED_KEY) {
            Ok(Some(Value::Array(items))) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "blocked list unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Add one domain. Rejects strings that fail normalization; adding
    /// a domain already present leaves the list unchanged.
    pub fn add(&self, raw: &str) -> Result<Vec<String>> {
        let domain = normalize_domain(raw).ok_or(ValidationError::InvalidDomain)?;
        let mut list = self.get();
        if !list.contains(&domain) {
            list.push(domain);
            self.persist(&list)?;
        }
        Ok(list)
    }

    /// Remove one domain (compared post-normalization). Removing an
    /// absent domain still succeeds.
    pub fn remove(&self, raw: &str) -> Result<Vec<String>> {
        let domain = normalize_domain(raw);
        let mut list = self.get();
        list.retain(|d| Some(d) != domain.as_ref());
        self.persist(&list)?;
        Ok(list)
    }

    /// Replace the whole list. Entries are normalized, invalid ones
    /// silently dropped, duplicates collapsed to their first occurrence.
    pub fn set(&self, raw: &[String]) -> Result<Vec<String>> {
        let mut list: Vec<String> = Vec::with_capacity(raw.len());
        for entry in raw {
            if let Some(domain) = normalize_domain(entry) {
                if !list.contains(&domain) {
                    list.push(domain);
                }
            }
        }
        self.persist(&list)?;
        Ok(list)
    }

    /// Seed the default list if nothing is persisted yet. Returns the
    /// list in effect afterwards and whether seeding happened.
    ///
    /// A read failure propagates rather than seeding: only a key that is
    /// verifiably absent (or not a list) may be overwritten.
    pub fn seed_if_missing(&self, seed: &[String]) -> Result<(Vec<String>, bool)> {
        match self.store.get(BLOCKED_KEY) {
            Ok(Some(Value::Array(_))) => Ok((self.get(), false)),
            Ok(_) => {
                let list: Vec<String> = seed.to_vec();
                self.persist(&list)?;
                Ok((list, true))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, list: &[String]) -> Result<()> {
        self.store.set(BLOCKED_KEY, serde_json::to_value(list)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::host::{ChangeListener, MemoryStore};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn list() -> BlockedList {
        BlockedList::new(Arc::new(MemoryStore::new()))
    }

    /// Store whose reads always fail, recording whether anything wrote.
    #[derive(Default)]
    struct UnreadableStore {
        wrote: AtomicBool,
    }

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StorageError> {
            Err(StorageError::Locked)
        }

        fn set(&self, _key: &str, _value: Value) -> Result<(), StorageError> {
            self.wrote.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn subscribe(&self, _listener: ChangeListener) {}
    }

    #[test]
    fn add_normalizes_and_dedupes() {
        let bl = list();
        assert_eq!(bl.add("https://www.A.com/x").unwrap(), vec!["a.com"]);
        // Same domain through a different spelling: unchanged, still ok.
        assert_eq!(bl.add("A.COM").unwrap(), vec!["a.com"]);
        assert_eq!(bl.get(), vec!["a.com"]);
    }

    #[test]
    fn add_rejects_invalid() {
        let bl = list();
        assert!(bl.add("localhost").is_err());
        assert!(bl.add("").is_err());
        assert!(bl.get().is_empty());
    }

    #[test]
    fn remove_matches_normalized_form() {
        let bl = list();
        bl.add("a.com").unwrap();
        bl.add("b.com").unwrap();
        let after = bl.remove("https://WWW.a.com").unwrap();
        assert_eq!(after, vec!["b.com"]);
        // Removing something absent is not an error.
        assert_eq!(bl.remove("c.com").unwrap(), vec!["b.com"]);
    }

    #[test]
    fn set_drops_invalid_and_duplicate_entries() {
        let bl = list();
        let input = vec![
            "A.com".to_string(),
            "not a domain".to_string(),
            "a.com/path".to_string(),
            "b.com".to_string(),
        ];
        assert_eq!(bl.set(&input).unwrap(), vec!["a.com", "b.com"]);
    }

    #[test]
    fn seed_only_when_missing() {
        let bl = list();
        let seed: Vec<String> = SEED_DOMAINS.iter().map(|s| s.to_string()).collect();
        let (seeded, wrote) = bl.seed_if_missing(&seed).unwrap();
        assert_eq!(seeded.len(), 4);
        assert!(wrote);
        bl.remove("youtube.com").unwrap();
        // A second install event must not resurrect the seed.
        let (kept, wrote) = bl.seed_if_missing(&seed).unwrap();
        assert_eq!(kept.len(), 3);
        assert!(!wrote);
    }

    #[test]
    fn read_failure_does_not_clobber_with_seed() {
        let store = Arc::new(UnreadableStore::default());
        let bl = BlockedList::new(store.clone());
        let seed: Vec<String> = SEED_DOMAINS.iter().map(|s| s.to_string()).collect();
        // A transient read error is not "missing": no seeding happens.
        assert!(bl.seed_if_missing(&seed).is_err());
        assert!(!store.wrote.load(Ordering::SeqCst));
    }
}

//! Content hashing and the cache gate consulted before parsing.

use crate::error::Result;
use crate::parser::strip_bom;
use crate::types::CardEntry;
use sha2::{Digest, Sha256};

/// Storage for fully resolved binders, keyed by file hash.
///
/// `persist` and `mark_complete` are called by the load orchestrator after
/// resolution, never by the parser.
pub trait BinderCache {
    fn is_complete(&self, file_hash: &str) -> Result<bool>;
    fn try_hydrate(&self, file_hash: &str) -> Result<Option<Vec<CardEntry>>>;
    fn persist(&self, file_hash: &str, entries: &[CardEntry]) -> Result<()>;
    fn mark_complete(&self, file_hash: &str) -> Result<()>;
}

/// SHA-256 over whitespace-normalized lines joined with `\n`.
///
/// Order-sensitive: swapping two lines changes the hash, reflowing spaces
/// inside a line does not.
pub fn file_hash(content: &str) -> String {
    let normalized = strip_bom(content)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Return cached entries when the cache is complete for `file_hash` and can
/// hydrate them. Any failure is logged and reported as a miss.
pub fn check(cache: &dyn BinderCache, file_hash: &str) -> Option<Vec<CardEntry>> {
    match cache.is_complete(file_hash) {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(file_hash, "cache incomplete");
            return None;
        }
        Err(e) => {
            tracing::warn!(file_hash, error = %e, "cache completeness check failed");
            return None;
        }
    }

    match cache.try_hydrate(file_hash) {
        Ok(Some(entries)) => Some(entries),
        Ok(None) => {
            tracing::debug!(file_hash, "cache marked complete but had nothing to hydrate");
            None
        }
        Err(e) => {
            tracing::warn!(file_hash, error = %e, "cache hydration failed");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::CacheError;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    /// In-memory cache used by the core's tests.
    #[derive(Default)]
    pub struct MemoryCache {
        pub entries: RefCell<HashMap<String, Vec<CardEntry>>>,
        pub complete: RefCell<HashSet<String>>,
        pub fail: bool,
    }

    impl BinderCache for MemoryCache {
        fn is_complete(&self, file_hash: &str) -> Result<bool> {
            if self.fail {
                return Err(CacheError::Storage("unavailable".into()));
            }
            Ok(self.complete.borrow().contains(file_hash))
        }

        fn try_hydrate(&self, file_hash: &str) -> Result<Option<Vec<CardEntry>>> {
            Ok(self.entries.borrow().get(file_hash).cloned())
        }

        fn persist(&self, file_hash: &str, entries: &[CardEntry]) -> Result<()> {
            self.entries
                .borrow_mut()
                .insert(file_hash.to_string(), entries.to_vec());
            Ok(())
        }

        fn mark_complete(&self, file_hash: &str) -> Result<()> {
            self.complete.borrow_mut().insert(file_hash.to_string());
            Ok(())
        }
    }

    #[test]
    fn hash_ignores_spacing_within_lines() {
        assert_eq!(file_hash("=NEO\n 1-3 "), file_hash("=NEO\n1-3"));
        assert_eq!(file_hash("=NEO\nfoo   bar"), file_hash("=NEO\nfoo bar"));
    }

    #[test]
    fn hash_is_order_sensitive() {
        assert_ne!(file_hash("=NEO\n1\n2"), file_hash("=NEO\n2\n1"));
        assert_eq!(file_hash("=NEO\n1\n2").len(), 64);
    }

    #[test]
    fn check_requires_completeness_and_hydration() {
        let cache = MemoryCache::default();
        let entries = vec![CardEntry::new("Island", "1", Some("NEO"))];
        cache.persist("h", &entries).unwrap();
        assert!(check(&cache, "h").is_none());

        cache.mark_complete("h").unwrap();
        assert_eq!(check(&cache, "h"), Some(entries));

        cache.mark_complete("other").unwrap();
        assert!(check(&cache, "other").is_none());
    }

    #[test]
    fn check_treats_errors_as_miss() {
        let cache = MemoryCache {
            fail: true,
            ..MemoryCache::default()
        };
        assert!(check(&cache, "h").is_none());
    }
}

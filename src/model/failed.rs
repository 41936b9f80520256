//! Failed-URL set.
//!
//! Shared, append-only collection of URLs that ended `offline`. A single
//! set may outlive one run so that chunked runs accumulate into it.

use std::sync::Arc;

use dashmap::DashSet;

/// Thread-safe set of failed URLs. Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct FailedUrls {
    inner: Arc<DashSet<String>>,
}

impl FailedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed URL. Returns false if it was already present.
    pub fn insert(&self, url: &str) -> bool {
        self.inner.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner.contains(url)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sorted copy of the set, for stable output.
    pub fn sorted(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        urls.sort();
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let failed = FailedUrls::new();
        let handle = failed.clone();

        assert!(handle.insert("http://b/2"));
        assert!(handle.insert("http://a/1"));
        assert!(!failed.insert("http://a/1"));

        assert_eq!(failed.len(), 2);
        assert!(failed.contains("http://b/2"));
        assert_eq!(failed.sorted(), vec!["http://a/1", "http://b/2"]);
    }
}

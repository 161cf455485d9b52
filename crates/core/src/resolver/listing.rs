//! Per-run cache of directory listings.

use std::collections::HashMap;

use crate::placer::DirListing;

/// Result of a resolver step that may need a directory listing first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Ready(T),
    /// List this directory, add it to the cache and ask again.
    NeedsListing(String),
}

/// Directory listings fetched during one run, keyed by path.
#[derive(Debug, Default)]
pub struct ListingCache {
    listings: HashMap<String, DirListing>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&DirListing> {
        self.listings.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, listing: DirListing) {
        self.listings.insert(path.into(), listing);
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn clear(&mut self) {
        self.listings.clear();
    }
}

use crate::catalog::Catalog;
use crate::config::LookupPolicy;
use crate::{Error, Result};
use ahash::AHashMap;

/// Maps normalized titles to catalog rows
#[derive(Debug, Clone)]
pub struct LookupIndex {
    policy: LookupPolicy,
    rows: AHashMap<String, usize>,
}

impl LookupIndex {
    /// Index every title; when several rows normalize to the same key the first row wins.
    pub fn build(catalog: &Catalog, policy: LookupPolicy) -> Self {
        let mut rows = AHashMap::with_capacity(catalog.len());
        for (row, title) in catalog.titles().enumerate() {
            rows.entry(Self::normalize(policy, title)).or_insert(row);
        }
        Self { policy, rows }
    }

    #[inline]
    fn normalize(policy: LookupPolicy, title: &str) -> String {
        match policy {
            LookupPolicy::Exact => title.to_string(),
            LookupPolicy::CaseInsensitive => title.to_lowercase(),
        }
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    /// Number of distinct keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find_row(&self, title: &str) -> Result<usize> {
        let found = match self.policy {
            LookupPolicy::Exact => self.rows.get(title),
            LookupPolicy::CaseInsensitive => self.rows.get(&title.to_lowercase()),
        };
        found
            .copied()
            .ok_or_else(|| Error::ItemNotFound(title.to_string()))
    }
}

// Dashboard session: the selection flow and the analysis cache.
//
// A session walks region → store → lock → tab. Results are cached per
// (store, analysis kind) so re-entering a tab's "run" does not recompute,
// but the cache only lives as long as the current tab and store: switching
// tabs or stores clears it. The locked selection itself always survives.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use tracing::debug;

use crate::analysis::frequency::FrequencyTable;
use crate::analysis::network::CooccurrenceGraph;
use crate::analysis::AnalysisError;
use crate::dataset::models::TextColumn;
use crate::sentiment::SentimentResult;
use crate::topics::model::TopicModel;

/// The dashboard's analysis tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Words,
    Network,
    Topics,
    Sentiment,
    Reviews,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Words,
        AnalysisKind::Network,
        AnalysisKind::Topics,
        AnalysisKind::Sentiment,
        AnalysisKind::Reviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Words => "words",
            AnalysisKind::Network => "network",
            AnalysisKind::Topics => "topics",
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::Reviews => "reviews",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub store: String,
    pub kind: AnalysisKind,
}

impl CacheKey {
    pub fn new(store: &str, kind: AnalysisKind) -> Self {
        Self {
            store: store.to_string(),
            kind,
        }
    }
}

/// A finished analysis, notices included, so a re-run shows the same thing.
#[derive(Debug, Clone)]
pub enum CachedResult {
    Words(Vec<(TextColumn, Result<FrequencyTable, AnalysisError>)>),
    Network(Box<CooccurrenceGraph>),
    Topics(Box<TopicModel>),
    Sentiment(SentimentResult),
}

impl CachedResult {
    /// Whether this result answers a run at the given minimum frequency.
    /// Only networks depend on it; other results always match.
    pub fn matches_threshold(&self, threshold: usize) -> bool {
        match self {
            CachedResult::Network(graph) => graph.threshold == threshold,
            _ => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<CacheKey, CachedResult>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CachedResult> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, result: CachedResult) {
        self.entries.insert(key, result);
    }

    /// Drop every entry whose key is not in `keep`.
    pub fn invalidate_except(&mut self, keep: &[CacheKey]) {
        self.entries.retain(|key, _| keep.contains(key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    region: Option<String>,
    store: Option<String>,
    locked: bool,
    tab: Option<AnalysisKind>,
    cache: AnalysisCache,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn store(&self) -> Option<&str> {
        self.store.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn tab(&self) -> Option<AnalysisKind> {
        self.tab
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AnalysisCache {
        &mut self.cache
    }

    /// Choose a region. A new region forgets the store and the cache.
    pub fn select_region(&mut self, region: &str) -> Result<()> {
        if self.locked {
            anyhow::bail!("Selection is locked; reset the session to change region");
        }
        if self.region.as_deref() != Some(region) {
            self.region = Some(region.to_string());
            self.store = None;
            self.cache.clear();
        }
        Ok(())
    }

    /// Choose a store within the selected region.
    pub fn select_store(&mut self, store: &str) -> Result<()> {
        if self.locked {
            anyhow::bail!("Selection is locked; reset the session to change store");
        }
        if self.region.is_none() {
            anyhow::bail!("Select a region before choosing a store");
        }
        if self.store.as_deref() != Some(store) {
            self.store = Some(store.to_string());
            self.cache.clear();
        }
        Ok(())
    }

    /// Fix the region and store; tabs become available.
    pub fn lock(&mut self) -> Result<()> {
        if self.store.is_none() {
            anyhow::bail!("Select a store before locking the selection");
        }
        self.locked = true;
        Ok(())
    }

    /// Switch tab. Moving to a different tab clears every cached result.
    pub fn select_tab(&mut self, tab: AnalysisKind) -> Result<()> {
        if !self.locked {
            anyhow::bail!("Lock the region and store selection first");
        }
        if self.tab != Some(tab) {
            debug!(from = ?self.tab, to = %tab, "Switching tab, clearing cache");
            self.cache.invalidate_except(&[]);
            self.tab = Some(tab);
        }
        Ok(())
    }

    /// Cache key for the current store and tab, once both are set.
    pub fn current_key(&self) -> Option<CacheKey> {
        Some(CacheKey::new(self.store.as_deref()?, self.tab?))
    }

    /// Back to an empty session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

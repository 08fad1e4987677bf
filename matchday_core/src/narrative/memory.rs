//! Anti-repeat memory - bounded recency lists at four scopes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use super::{Category, NarrativeError};
use crate::config::{MemoryConfig, ScopeLimits};
use crate::seed::stable_hash;

/// One remembered narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub text_hash: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjective: Option<String>,
}

impl MemoryEntry {
    pub fn new(text: &str, opener: Option<&str>, adjective: Option<&str>) -> Self {
        Self {
            text_hash: stable_hash(text),
            opener: opener.map(normalize),
            adjective: adjective.map(normalize),
        }
    }
}

fn normalize(fragment: &str) -> String {
    fragment.trim().to_lowercase()
}

/// Oldest-first list that evicts from the front once over capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecencyList {
    entries: VecDeque<MemoryEntry>,
}

impl RecencyList {
    pub fn push(&mut self, entry: MemoryEntry, capacity: usize) {
        self.entries.push_back(entry);
        self.apply_limit(capacity);
    }

    fn apply_limit(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn contains_text(&self, text_hash: u64) -> bool {
        self.entries.iter().any(|e| e.text_hash == text_hash)
    }

    /// Whether any of the last `window` entries shares the opener or the
    /// adjective of `candidate`.
    pub fn shares_fragment(&self, candidate: &MemoryEntry, window: usize) -> bool {
        self.entries.iter().rev().take(window).any(|e| {
            (candidate.opener.is_some() && e.opener == candidate.opener)
                || (candidate.adjective.is_some() && e.adjective == candidate.adjective)
        })
    }

    fn has_opener(&self, opener: &str) -> bool {
        self.entries.iter().any(|e| e.opener.as_deref() == Some(opener))
    }

    fn has_adjective(&self, adjective: &str) -> bool {
        self.entries.iter().any(|e| e.adjective.as_deref() == Some(adjective))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Memory scopes, in the order they are dropped when relaxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryScope {
    Round,
    Category,
    Pairing,
    Global,
}

impl MemoryScope {
    pub const RELAXATION_ORDER: [MemoryScope; 4] = [
        MemoryScope::Round,
        MemoryScope::Category,
        MemoryScope::Pairing,
        MemoryScope::Global,
    ];

    /// Scopes still checked at a relaxation level (0 = all, 4 = none).
    pub fn active_at(level: usize) -> &'static [MemoryScope] {
        let start = level.min(Self::RELAXATION_ORDER.len());
        &Self::RELAXATION_ORDER[start..]
    }
}

/// Which reused fragments a candidate carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FragmentReuse {
    pub opener: bool,
    pub adjective: bool,
}

/// Recently used narratives, shared across matches and rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiRepeatMemory {
    global: RecencyList,
    by_pairing: BTreeMap<String, RecencyList>,
    by_category: BTreeMap<Category, RecencyList>,
    round: RecencyList,
    current_round: Option<u32>,
    #[serde(skip)]
    limits: MemoryConfig,
}

impl AntiRepeatMemory {
    pub fn new(limits: MemoryConfig) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Replace the scope limits, evicting what no longer fits.
    pub fn set_limits(&mut self, limits: MemoryConfig) {
        self.limits = limits;
        self.global.apply_limit(limits.global.capacity);
        self.round.apply_limit(limits.round.capacity);
        for list in self.by_pairing.values_mut() {
            list.apply_limit(limits.pairing.capacity);
        }
        for list in self.by_category.values_mut() {
            list.apply_limit(limits.category.capacity);
        }
    }

    pub fn limits(&self) -> &MemoryConfig {
        &self.limits
    }

    /// Start a round. The round scope is cleared when the round changes.
    pub fn begin_round(&mut self, round: u32) {
        if self.current_round != Some(round) {
            self.round.clear();
            self.current_round = Some(round);
        }
    }

    pub fn current_round(&self) -> Option<u32> {
        self.current_round
    }

    fn scope(
        &self,
        scope: MemoryScope,
        pair_key: &str,
        category: Category,
    ) -> (Option<&RecencyList>, ScopeLimits) {
        match scope {
            MemoryScope::Round => (Some(&self.round), self.limits.round),
            MemoryScope::Category => (self.by_category.get(&category), self.limits.category),
            MemoryScope::Pairing => (self.by_pairing.get(pair_key), self.limits.pairing),
            MemoryScope::Global => (Some(&self.global), self.limits.global),
        }
    }

    /// Whether `candidate` repeats a remembered text anywhere in a scope, or its
    /// opener/adjective within the scope's fragment window.
    pub fn collides(
        &self,
        candidate: &MemoryEntry,
        scopes: &[MemoryScope],
        pair_key: &str,
        category: Category,
    ) -> bool {
        scopes.iter().any(|&scope| match self.scope(scope, pair_key, category) {
            (Some(list), limits) => {
                list.contains_text(candidate.text_hash)
                    || list.shares_fragment(candidate, limits.fragment_window)
            }
            (None, _) => false,
        })
    }

    /// Fragments of `candidate` already used this round or anywhere in global
    /// memory, regardless of window.
    pub fn fragment_reuse(&self, candidate: &MemoryEntry) -> FragmentReuse {
        let lists = [&self.round, &self.global];
        FragmentReuse {
            opener: candidate
                .opener
                .as_deref()
                .is_some_and(|o| lists.iter().any(|l| l.has_opener(o))),
            adjective: candidate
                .adjective
                .as_deref()
                .is_some_and(|a| lists.iter().any(|l| l.has_adjective(a))),
        }
    }

    /// Remember a chosen narrative in every scope.
    pub fn record(&mut self, entry: MemoryEntry, pair_key: &str, category: Category) {
        let limits = self.limits;
        self.round.push(entry.clone(), limits.round.capacity);
        self.by_category
            .entry(category)
            .or_default()
            .push(entry.clone(), limits.category.capacity);
        self.by_pairing
            .entry(pair_key.to_string())
            .or_default()
            .push(entry.clone(), limits.pairing.capacity);
        self.global.push(entry, limits.global.capacity);
    }

    pub fn global_len(&self) -> usize {
        self.global.len()
    }

    pub fn pairing_len(&self, pair_key: &str) -> usize {
        self.by_pairing.get(pair_key).map_or(0, RecencyList::len)
    }

    pub fn category_len(&self, category: Category) -> usize {
        self.by_category.get(&category).map_or(0, RecencyList::len)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.round.is_empty()
    }

    pub fn from_json(json: &str, limits: MemoryConfig) -> Result<Self, NarrativeError> {
        let mut memory: Self = serde_json::from_str(json)?;
        memory.set_limits(limits);
        Ok(memory)
    }

    pub fn to_json(&self) -> Result<String, NarrativeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file. A missing file gives an empty memory.
    pub fn load(path: impl AsRef<Path>, limits: MemoryConfig) -> Result<Self, NarrativeError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no narrative memory on disk, starting empty");
            return Ok(Self::new(limits));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, limits)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NarrativeError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

//! Season state - the persisted, cross-round part of the league save.
//!
//! Only the highlight selection counters are modelled here. Every other field
//! of the host's season state is carried through untouched so that loading and
//! saving never loses data this crate does not know about.

mod upgrade;

pub use upgrade::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

use crate::entities::PlayerId;

/// Current layout version of the season state.
pub const SEASON_STATE_VERSION: u32 = 2;

/// Errors raised while loading, saving or mutating season state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported season state version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Round {round} cannot be committed after round {last_committed}")]
    RoundAlreadyCommitted { round: u32, last_committed: u32 },
}

/// Per-player highlight counters for one season.
///
/// Appearance counts only ever grow within a season; the only mutation is
/// [`SelectionState::commit`], once per round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    appearances: BTreeMap<PlayerId, u32>,
    last_selected: BTreeMap<PlayerId, u32>,
    last_committed_round: Option<u32>,
}

impl SelectionState {
    /// Create an empty state, as at season start.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        appearances: BTreeMap<PlayerId, u32>,
        last_selected: BTreeMap<PlayerId, u32>,
        last_committed_round: Option<u32>,
    ) -> Self {
        Self {
            appearances,
            last_selected,
            last_committed_round,
        }
    }

    /// Season-to-date highlight appearances of a player.
    pub fn appearances(&self, id: &PlayerId) -> u32 {
        self.appearances.get(id).copied().unwrap_or(0)
    }

    /// Round in which the player was last selected, if ever.
    pub fn last_selected(&self, id: &PlayerId) -> Option<u32> {
        self.last_selected.get(id).copied()
    }

    /// Most recent round that was committed.
    pub fn last_committed_round(&self) -> Option<u32> {
        self.last_committed_round
    }

    pub fn appearance_map(&self) -> &BTreeMap<PlayerId, u32> {
        &self.appearances
    }

    pub fn last_selected_map(&self) -> &BTreeMap<PlayerId, u32> {
        &self.last_selected
    }

    /// Record a finalized selection for `round`.
    ///
    /// Every selected player gains one appearance and has its last-selected
    /// round set. Rounds must be committed in increasing order; a repeated or
    /// earlier round is rejected and leaves the state untouched.
    pub fn commit<'a>(
        &mut self,
        round: u32,
        selected: impl IntoIterator<Item = &'a PlayerId>,
    ) -> Result<(), StateError> {
        if let Some(last_committed) = self.last_committed_round {
            if round <= last_committed {
                return Err(StateError::RoundAlreadyCommitted {
                    round,
                    last_committed,
                });
            }
        }

        let unique: BTreeSet<&PlayerId> = selected.into_iter().collect();
        for id in unique {
            *self.appearances.entry(id.clone()).or_insert(0) += 1;
            self.last_selected.insert(id.clone(), round);
        }
        self.last_committed_round = Some(round);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.appearances.is_empty() && self.last_selected.is_empty()
    }
}

/// Stored layout of the season state. The selection maps are optional here
/// because saves written before highlight selection existed lack them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSeasonState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_version: Option<u32>,

    #[serde(default, alias = "startingSixAppearances")]
    pub highlight_appearances: Option<BTreeMap<PlayerId, u32>>,

    #[serde(default, alias = "lastStartingSixMatchday")]
    pub last_highlight_round: Option<BTreeMap<PlayerId, u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_committed_round: Option<u32>,

    /// Fields owned by the host (tables, schedule, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The season state in its current, fully upgraded form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonState {
    selection: SelectionState,
    extra: Map<String, Value>,
}

impl SeasonState {
    /// Create a fresh state for a new season.
    pub fn new_season() -> Self {
        Self::default()
    }

    /// Parse and upgrade a stored season state.
    pub fn from_json(json: &str) -> Result<(Self, UpgradeReport), StateError> {
        let stored: StoredSeasonState = serde_json::from_str(json)?;
        upgrade(stored)
    }

    /// Upgrade an already parsed stored state.
    pub fn upgrade(stored: StoredSeasonState) -> Result<(Self, UpgradeReport), StateError> {
        upgrade(stored)
    }

    /// Serialize in the current layout.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(&self.to_stored())?)
    }

    /// Load from a file. A missing file starts a new season.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, UpgradeReport), StateError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no season state on disk, starting empty");
            return Ok((Self::new_season(), UpgradeReport::fresh()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save to a file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// Host-owned field, if present.
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub(crate) fn from_parts(selection: SelectionState, extra: Map<String, Value>) -> Self {
        Self { selection, extra }
    }

    fn to_stored(&self) -> StoredSeasonState {
        StoredSeasonState {
            state_version: Some(SEASON_STATE_VERSION),
            highlight_appearances: Some(self.selection.appearances.clone()),
            last_highlight_round: Some(self.selection.last_selected.clone()),
            last_committed_round: self.selection.last_committed_round,
            extra: self.extra.clone(),
        }
    }
}

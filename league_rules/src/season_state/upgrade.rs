//! One-time upgrade of stored season state to the current layout.

use serde::{Deserialize, Serialize};

use super::{SeasonState, SelectionState, StateError, StoredSeasonState, SEASON_STATE_VERSION};

/// What the upgrade step had to do while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeReport {
    /// Version found on disk (`None` for saves that predate versioning).
    pub from_version: Option<u32>,
    /// Whether anything was filled in or rewritten.
    pub upgraded: bool,
    /// The appearance map was absent and initialized empty.
    pub initialized_appearances: bool,
    /// The last-selected map was absent and initialized empty.
    pub initialized_last_round: bool,
    /// The last committed round was absent and taken from the latest
    /// last-selected round.
    pub inferred_last_committed: bool,
    /// No stored state existed at all.
    pub fresh: bool,
}

impl UpgradeReport {
    pub(crate) fn fresh() -> Self {
        Self {
            from_version: None,
            upgraded: false,
            initialized_appearances: false,
            initialized_last_round: false,
            inferred_last_committed: false,
            fresh: true,
        }
    }
}

/// Bring a stored state up to [`SEASON_STATE_VERSION`].
///
/// Absent selection maps become empty maps. Applying this to a state that
/// was already saved in the current layout is a no-op.
pub fn upgrade(stored: StoredSeasonState) -> Result<(SeasonState, UpgradeReport), StateError> {
    if let Some(found) = stored.state_version {
        if found > SEASON_STATE_VERSION {
            return Err(StateError::UnsupportedVersion {
                found,
                supported: SEASON_STATE_VERSION,
            });
        }
    }

    let initialized_appearances = stored.highlight_appearances.is_none();
    let initialized_last_round = stored.last_highlight_round.is_none();

    let last_selected = stored.last_highlight_round.unwrap_or_default();
    // saves that predate the commit guard still carry the rounds they committed
    let inferred = match stored.last_committed_round {
        Some(_) => None,
        None => last_selected.values().copied().max(),
    };
    let last_committed_round = stored.last_committed_round.or(inferred);
    let inferred_last_committed = inferred.is_some();

    let upgraded = initialized_appearances
        || initialized_last_round
        || inferred_last_committed
        || stored.state_version != Some(SEASON_STATE_VERSION);

    let report = UpgradeReport {
        from_version: stored.state_version,
        upgraded,
        initialized_appearances,
        initialized_last_round,
        inferred_last_committed,
        fresh: false,
    };

    if upgraded {
        tracing::info!(
            from_version = ?stored.state_version,
            to_version = SEASON_STATE_VERSION,
            initialized_appearances,
            initialized_last_round,
            ?last_committed_round,
            "upgraded season state"
        );
    }

    let selection = SelectionState::from_parts(
        stored.highlight_appearances.unwrap_or_default(),
        last_selected,
        last_committed_round,
    );

    Ok((SeasonState::from_parts(selection, stored.extra), report))
}

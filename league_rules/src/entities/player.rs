//! Player entries as they appear in a lineup.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A single player listed in a team's lineup for one round.
///
/// Owned by the simulator and read-only here. The position is implied by
/// where the entry sits in [`TeamLineup`](super::TeamLineup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub id: PlayerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Overall rating. Missing ratings are filled in by the consumer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<f64>,

    /// Set when the player only made the lineup as part of the rotation.
    #[serde(default)]
    pub rotation: bool,
}

impl LineupEntry {
    /// Create a new entry with the given ID and rating.
    pub fn new(id: impl Into<String>, overall: f64) -> Self {
        Self {
            id: PlayerId::new(id),
            name: None,
            overall: Some(overall),
            rotation: false,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the entry as a rotation player.
    pub fn with_rotation(mut self, rotation: bool) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rating, or the given default when the simulator left it out.
    pub fn rating_or(&self, default: f64) -> f64 {
        self.overall.unwrap_or(default)
    }
}

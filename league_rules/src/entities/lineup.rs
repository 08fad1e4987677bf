//! Team lineups - forward lines, defense pairs, rotation groups and goalies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LineupEntry, Position, Slot};

/// Lineups for one round keyed by team name. Ordered so that every consumer
/// walks the teams in the same sequence.
pub type RoundLineups = BTreeMap<String, TeamLineup>;

/// Forward lines 1-4 plus the rotation group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardLines {
    #[serde(default)]
    pub line1: Vec<LineupEntry>,
    #[serde(default)]
    pub line2: Vec<LineupEntry>,
    #[serde(default)]
    pub line3: Vec<LineupEntry>,
    #[serde(default)]
    pub line4: Vec<LineupEntry>,
    #[serde(default)]
    pub rotation: Vec<LineupEntry>,
}

/// Defense pairs 1-3 plus the rotation group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefensePairs {
    #[serde(default)]
    pub pair1: Vec<LineupEntry>,
    #[serde(default)]
    pub pair2: Vec<LineupEntry>,
    #[serde(default)]
    pub pair3: Vec<LineupEntry>,
    #[serde(default)]
    pub rotation: Vec<LineupEntry>,
}

/// One team's lineup for a round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamLineup {
    #[serde(default)]
    pub forwards: ForwardLines,

    #[serde(default, alias = "defenders")]
    pub defense: DefensePairs,

    /// Starting goalie (a single object in the simulator's output).
    #[serde(default)]
    pub goalie: Option<LineupEntry>,

    /// Dressed backups, if the simulator lists them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backup_goalies: Vec<LineupEntry>,
}

impl TeamLineup {
    /// All entries for a position in listing order, tagged with their slot.
    ///
    /// Numbered units come first (top unit first), then the rotation group.
    pub fn units(&self, position: Position) -> Vec<(Slot, &LineupEntry)> {
        match position {
            Position::Forward => {
                let f = &self.forwards;
                tag_units(&[&f.line1, &f.line2, &f.line3, &f.line4], &f.rotation)
            }
            Position::Defender => {
                let d = &self.defense;
                tag_units(&[&d.pair1, &d.pair2, &d.pair3], &d.rotation)
            }
            Position::Goalie => self
                .goalie
                .iter()
                .map(|g| (Slot::Crease, g))
                .chain(self.backup_goalies.iter().map(|g| (Slot::Rotation, g)))
                .collect(),
        }
    }

    /// Total number of listed entries across all positions.
    pub fn entry_count(&self) -> usize {
        Position::ALL.iter().map(|p| self.units(*p).len()).sum()
    }
}

fn tag_units<'a>(
    units: &[&'a Vec<LineupEntry>],
    rotation: &'a [LineupEntry],
) -> Vec<(Slot, &'a LineupEntry)> {
    let mut tagged = Vec::new();
    for (index, unit) in units.iter().enumerate() {
        let slot = Slot::Unit(index as u8 + 1);
        tagged.extend(unit.iter().map(|entry| (slot, entry)));
    }
    tagged.extend(rotation.iter().map(|entry| (Slot::Rotation, entry)));
    tagged
}

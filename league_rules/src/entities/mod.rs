//! Entity definitions for the league: players, positions and lineup slots.

mod lineup;
mod player;

pub use lineup::*;
pub use player::*;

use serde::{Deserialize, Serialize};

/// Unique identifier for players, as issued by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a player ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playing positions relevant for highlight selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "D")]
    Defender,
    #[serde(rename = "G")]
    Goalie,
}

impl Position {
    /// All positions in bucket order.
    pub const ALL: [Position; 3] = [Position::Forward, Position::Defender, Position::Goalie];

    /// Short wire code ("F", "D", "G").
    pub fn code(&self) -> &'static str {
        match self {
            Position::Forward => "F",
            Position::Defender => "D",
            Position::Goalie => "G",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Where a player was listed in a team's lineup for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// Numbered forward line or defense pair (1 = top unit).
    Unit(u8),
    /// Starting goalie; goalies are not ranked by unit.
    Crease,
    /// Rotation group or backup roster.
    Rotation,
}

impl Slot {
    /// Rank for "best slot" comparisons, lower is better.
    pub fn rank(&self) -> u16 {
        match self {
            Slot::Crease => 0,
            Slot::Unit(n) => u16::from(*n),
            Slot::Rotation => u16::MAX,
        }
    }

    /// Check whether this slot outranks another one.
    pub fn is_better_than(&self, other: &Slot) -> bool {
        self.rank() < other.rank()
    }

    /// Unit number, if this is a numbered line or pair.
    pub fn unit(&self) -> Option<u8> {
        match self {
            Slot::Unit(n) => Some(*n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ranking() {
        assert!(Slot::Unit(1).is_better_than(&Slot::Unit(2)));
        assert!(Slot::Unit(4).is_better_than(&Slot::Rotation));
        assert!(!Slot::Rotation.is_better_than(&Slot::Unit(3)));
        assert!(!Slot::Unit(2).is_better_than(&Slot::Unit(2)));
        assert_eq!(Slot::Unit(3).unit(), Some(3));
        assert_eq!(Slot::Rotation.unit(), None);
    }

    #[test]
    fn test_position_wire_codes() {
        assert_eq!(serde_json::to_string(&Position::Forward).unwrap(), "\"F\"");
        assert_eq!(serde_json::to_string(&Position::Goalie).unwrap(), "\"G\"");
        let parsed: Position = serde_json::from_str("\"D\"").unwrap();
        assert_eq!(parsed, Position::Defender);
    }

    #[test]
    fn test_player_id_is_transparent() {
        let id = PlayerId::new("P-17");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P-17\"");
        assert_eq!(id.to_string(), "P-17");
    }
}

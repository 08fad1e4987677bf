//! Finished matches, result marks and team form.

mod form_table;

pub use form_table::*;

use serde::{Deserialize, Serialize};

/// A finished match as reported by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub home: String,
    pub away: String,
    pub g_home: u32,
    pub g_away: u32,

    #[serde(default)]
    pub overtime: bool,

    #[serde(default)]
    pub shootout: bool,

    /// Conference or grouping tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
}

impl MatchOutcome {
    /// Create a regulation result.
    pub fn new(home: impl Into<String>, away: impl Into<String>, g_home: u32, g_away: u32) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
            g_home,
            g_away,
            overtime: false,
            shootout: false,
            conference: None,
        }
    }

    /// Mark the match as decided in overtime.
    pub fn in_overtime(mut self) -> Self {
        self.overtime = true;
        self
    }

    /// Mark the match as decided by shootout.
    pub fn in_shootout(mut self) -> Self {
        self.shootout = true;
        self
    }

    pub fn with_conference(mut self, conference: impl Into<String>) -> Self {
        self.conference = Some(conference.into());
        self
    }

    /// Check if the score is level.
    pub fn is_level(&self) -> bool {
        self.g_home == self.g_away
    }

    /// Check if the home side counts as the winner. Level scores count for
    /// the home side so that winner/loser are always defined.
    pub fn home_wins(&self) -> bool {
        self.g_home >= self.g_away
    }

    pub fn winner(&self) -> &str {
        if self.home_wins() {
            &self.home
        } else {
            &self.away
        }
    }

    pub fn loser(&self) -> &str {
        if self.home_wins() {
            &self.away
        } else {
            &self.home
        }
    }

    pub fn winner_goals(&self) -> u32 {
        self.g_home.max(self.g_away)
    }

    pub fn loser_goals(&self) -> u32 {
        self.g_home.min(self.g_away)
    }

    pub fn margin(&self) -> u32 {
        self.winner_goals() - self.loser_goals()
    }

    /// Saturates at `u32::MAX` for corrupt scores.
    pub fn total_goals(&self) -> u32 {
        self.g_home.saturating_add(self.g_away)
    }

    /// Key used for narrative payloads and pairing memory ("home-away").
    pub fn pair_key(&self) -> String {
        format!("{}-{}", self.home, self.away)
    }

    /// Literal final score from the home side's view ("4:2").
    pub fn scoreline(&self) -> String {
        format!("{}:{}", self.g_home, self.g_away)
    }
}

/// One entry of a team's recent results.
///
/// Upstream writes these as strings; only the first letter matters
/// ("W", "win", "L", "loss"). Anything else counts as a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultMark {
    Win,
    Loss,
    Tie,
}

impl ResultMark {
    /// Parse a result mark from its upstream string form.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('W') => ResultMark::Win,
            Some('L') => ResultMark::Loss,
            _ => ResultMark::Tie,
        }
    }

    /// Contribution to the form score.
    pub fn points(&self) -> i32 {
        match self {
            ResultMark::Win => 1,
            ResultMark::Loss => -1,
            ResultMark::Tie => 0,
        }
    }
}

impl From<String> for ResultMark {
    fn from(raw: String) -> Self {
        ResultMark::parse(&raw)
    }
}

impl From<ResultMark> for String {
    fn from(mark: ResultMark) -> Self {
        match mark {
            ResultMark::Win => "W",
            ResultMark::Loss => "L",
            ResultMark::Tie => "T",
        }
        .to_string()
    }
}

/// Recent results of a team, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord(pub Vec<ResultMark>);

impl FormRecord {
    pub fn new(marks: impl IntoIterator<Item = ResultMark>) -> Self {
        Self(marks.into_iter().collect())
    }

    /// Build a record from raw upstream strings.
    pub fn from_marks<S: AsRef<str>>(raw: &[S]) -> Self {
        Self(raw.iter().map(|r| ResultMark::parse(r.as_ref())).collect())
    }

    /// Signed form score over the first `window` results.
    pub fn score(&self, window: usize) -> i32 {
        self.0.iter().take(window).map(ResultMark::points).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

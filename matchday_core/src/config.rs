//! Configuration for highlight selection and narrative generation.
//!
//! Every field has a default, so a TOML file only needs to list what it
//! changes:
//!
//! ```toml
//! [highlights.quotas]
//! forwards = 3
//! defenders = 2
//! goalies = 1
//!
//! [composer]
//! mode = "templates"
//! max_chars = 78
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use league_rules::Position;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchdayConfig {
    pub highlights: HighlightConfig,
    pub classifier: ClassifierThresholds,
    pub composer: ComposerConfig,
    pub memory: MemoryConfig,
}

impl MatchdayConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MatchdayConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject settings the generators cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.highlights;
        if h.quotas.total() == 0 {
            return Err(invalid("highlight quotas must select at least one player"));
        }
        if !(h.weight_floor > 0.0) {
            return Err(invalid("weight_floor must be positive"));
        }
        for (name, penalty) in [
            ("rotation_penalty", h.rotation_penalty),
            ("consecutive_penalty", h.consecutive_penalty),
            ("frequency_penalty", h.frequency_penalty),
        ] {
            if !(penalty.is_finite() && penalty >= 0.0) {
                return Err(invalid(format!("{name} must be a non-negative number")));
            }
        }
        if h.seed_modulus == 0 {
            return Err(invalid("seed_modulus must be non-zero"));
        }

        let c = &self.composer;
        if c.max_chars < MIN_TEXT_BOUND {
            return Err(invalid(format!(
                "max_chars must be at least {MIN_TEXT_BOUND}"
            )));
        }
        if c.preferred_min > c.preferred_max {
            return Err(invalid("preferred_min exceeds preferred_max"));
        }
        if c.candidate_count == 0 {
            return Err(invalid("candidate_count must be positive"));
        }
        for (name, chance) in [
            ("opener_chance", c.opener_chance),
            ("qualifier_chance", c.qualifier_chance),
            ("temporal_chance", c.temporal_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(invalid(format!("{name} must be within 0..=1")));
            }
        }

        for (name, limits) in self.memory.scopes() {
            if limits.capacity == 0 {
                return Err(invalid(format!("memory scope {name} needs a capacity")));
            }
        }

        if self.classifier.form_window == 0 {
            return Err(invalid("form_window must be positive"));
        }
        Ok(())
    }
}

/// Shortest text bound that still leaves room for a word and the ellipsis.
pub const MIN_TEXT_BOUND: usize = 8;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// Players to pick per position bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quotas {
    pub forwards: usize,
    pub defenders: usize,
    pub goalies: usize,
}

impl Default for Quotas {
    fn default() -> Self {
        Self {
            forwards: 3,
            defenders: 2,
            goalies: 1,
        }
    }
}

impl Quotas {
    pub fn for_position(&self, position: Position) -> usize {
        match position {
            Position::Forward => self.forwards,
            Position::Defender => self.defenders,
            Position::Goalie => self.goalies,
        }
    }

    pub fn total(&self) -> usize {
        self.forwards + self.defenders + self.goalies
    }
}

/// Weighting and seeding for highlight selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub quotas: Quotas,

    /// Bonus per unit, index 0 = top line/pair. Units past the end get none.
    pub slot_bonuses: Vec<f64>,

    pub rotation_penalty: f64,

    /// Applied when the player was selected in the previous round.
    pub consecutive_penalty: f64,

    /// Multiplied by the season-to-date appearance count.
    pub frequency_penalty: f64,

    /// Smallest weight the sampler will use.
    pub weight_floor: f64,

    /// Rating assumed when the simulator did not provide one.
    pub default_rating: f64,

    /// Base seed = (season * seed_round_stride + round) % seed_modulus.
    pub seed_round_stride: u64,
    pub seed_modulus: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            quotas: Quotas::default(),
            slot_bonuses: vec![6.0, 3.0, 1.0],
            rotation_penalty: 4.0,
            consecutive_penalty: 10.0,
            frequency_penalty: 0.8,
            weight_floor: 0.1,
            default_rating: 70.0,
            seed_round_stride: 1000,
            seed_modulus: 1 << 31,
        }
    }
}

/// Thresholds of the match classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub blowout_margin: u32,
    pub statement_margin: u32,
    /// Winner form minus loser form at or below this counts as an upset.
    pub upset_form_diff: i32,
    pub grind_margin: u32,
    pub high_scoring_total: u32,
    pub low_scoring_total: u32,
    /// Number of recent results that make up the form score.
    pub form_window: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            blowout_margin: 5,
            statement_margin: 3,
            upset_form_diff: -3,
            grind_margin: 1,
            high_scoring_total: 7,
            low_scoring_total: 3,
            form_window: 5,
        }
    }
}

/// How narrative text is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposerMode {
    /// Combine opener/verb/adjective/qualifier fragments and filter by memory.
    #[default]
    Compositional,
    /// Pick one of a few fixed templates per category.
    Templates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub mode: ComposerMode,
    pub candidate_count: usize,
    /// Hard bound on text length in characters.
    pub max_chars: usize,
    pub preferred_min: usize,
    pub preferred_max: usize,
    /// Score added per character outside the preferred band.
    pub length_weight: f64,
    pub opener_penalty: f64,
    pub adjective_penalty: f64,
    pub opener_chance: f64,
    pub qualifier_chance: f64,
    pub temporal_chance: f64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            mode: ComposerMode::Compositional,
            candidate_count: 150,
            max_chars: 110,
            preferred_min: 70,
            preferred_max: 100,
            length_weight: 0.5,
            opener_penalty: 15.0,
            adjective_penalty: 10.0,
            opener_chance: 0.5,
            qualifier_chance: 0.6,
            temporal_chance: 0.15,
        }
    }
}

/// Size of one memory scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeLimits {
    /// Entries kept before the oldest is evicted.
    pub capacity: usize,
    /// Most recent entries whose opener/adjective block a candidate outright.
    pub fragment_window: usize,
}

impl ScopeLimits {
    pub const fn new(capacity: usize, fragment_window: usize) -> Self {
        Self {
            capacity,
            fragment_window,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub global: ScopeLimits,
    pub pairing: ScopeLimits,
    pub category: ScopeLimits,
    pub round: ScopeLimits,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            global: ScopeLimits::new(150, 6),
            pairing: ScopeLimits::new(25, 3),
            category: ScopeLimits::new(40, 4),
            round: ScopeLimits::new(64, 64),
        }
    }
}

impl MemoryConfig {
    fn scopes(&self) -> [(&'static str, ScopeLimits); 4] {
        [
            ("global", self.global),
            ("pairing", self.pairing),
            ("category", self.category),
            ("round", self.round),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MatchdayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.highlights.quotas.total(), 6);
        assert_eq!(config.highlights.seed_modulus, 2_147_483_648);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MatchdayConfig::from_toml_str(
            r#"
            [highlights.quotas]
            forwards = 4

            [composer]
            mode = "templates"
            max_chars = 75
            "#,
        )
        .unwrap();

        assert_eq!(config.highlights.quotas.forwards, 4);
        assert_eq!(config.highlights.quotas.defenders, 2);
        assert_eq!(config.composer.mode, ComposerMode::Templates);
        assert_eq!(config.composer.max_chars, 75);
        assert_eq!(config.classifier, ClassifierThresholds::default());
    }

    #[test]
    fn test_zero_quota_rejected() {
        let err = MatchdayConfig::from_toml_str(
            r#"
            [highlights.quotas]
            forwards = 0
            defenders = 0
            goalies = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_negative_penalties_rejected() {
        let mut config = MatchdayConfig::default();
        config.highlights.frequency_penalty = -0.8;
        assert!(config.validate().is_err());

        config.highlights.frequency_penalty = 0.0;
        assert!(config.validate().is_ok());

        config.highlights.rotation_penalty = f64::NAN;
        assert!(config.validate().is_err());

        let err = MatchdayConfig::from_toml_str("[highlights]\nconsecutive_penalty = -10.0\n").unwrap_err();
        assert!(err.to_string().contains("consecutive_penalty"));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = MatchdayConfig::default();
        config.composer.preferred_min = 120;
        assert!(config.validate().is_err());

        config.composer.preferred_min = 10;
        config.composer.max_chars = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = MatchdayConfig::from_toml_str("[composer\nmode = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matchday.toml");
        std::fs::write(&path, "[classifier]\nblowout_margin = 6\n").unwrap();

        let config = MatchdayConfig::from_path(&path).unwrap();
        assert_eq!(config.classifier.blowout_margin, 6);
        assert_eq!(config.classifier.statement_margin, 3);
    }
}

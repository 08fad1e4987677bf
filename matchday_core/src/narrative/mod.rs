//! Match narratives - one short sentence per finished match.
//!
//! A match is classified from its score and both teams' form, then the
//! composer turns the category into text while the anti-repeat memory keeps
//! wording from recurring across matches and rounds. All randomness is keyed
//! by season, round, pairing, score and category.

mod classifier;
mod composer;
mod diversity;
mod memory;
mod phrases;
mod text;

pub use classifier::*;
pub use composer::*;
pub use diversity::*;
pub use memory::*;
pub use phrases::*;
pub use text::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use league_rules::{FormTable, MatchOutcome};

use crate::config::MatchdayConfig;
use crate::seed::narrative_seed_key;

#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("No phrases available for category {category}")]
    EmptyPhrasePool { category: Category },

    #[error("Pairing {pair} appears more than once in the round")]
    DuplicatePairing { pair: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Phrase pools plus the memory they are checked against.
///
/// Owned by the caller and passed into every call, so its lifetime is the
/// caller's decision (one round, one season, persisted in between).
#[derive(Debug, Clone, Default)]
pub struct NarrativeContext {
    pub book: PhraseBook,
    pub memory: AntiRepeatMemory,
}

impl NarrativeContext {
    pub fn new(book: PhraseBook, memory: AntiRepeatMemory) -> Self {
        Self { book, memory }
    }

    /// Standard phrases with empty memory.
    pub fn standard(config: &MatchdayConfig) -> Self {
        Self::new(PhraseBook::standard(), AntiRepeatMemory::new(config.memory))
    }
}

/// Facts recorded with each narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeMetadata {
    pub margin: u32,
    pub total_goals: u32,
    pub form_diff: i32,
    pub home_form: i32,
    pub away_form: i32,
    pub winner: String,
    pub loser: String,
    /// Final score from the home side ("4:2").
    pub result: String,
    pub overtime: bool,
    pub shootout: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
}

/// Narrative of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeRecord {
    pub text: String,
    pub category: Category,
    pub metadata: NarrativeMetadata,
}

/// Narratives of a round, plus the matches that produced none.
#[derive(Debug, Default)]
pub struct RoundNarratives {
    /// Keyed by "home-away".
    pub records: BTreeMap<String, NarrativeRecord>,
    pub failures: Vec<(String, NarrativeError)>,
}

/// Classifies matches and composes their narratives.
pub struct NarrativeEngine {
    classifier: Classifier,
    composer: PhraseComposer,
}

impl NarrativeEngine {
    pub fn new(config: &MatchdayConfig) -> Self {
        Self {
            classifier: Classifier::new(config.classifier),
            composer: PhraseComposer::new(config.composer.clone()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&MatchdayConfig::default())
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn composer(&self) -> &PhraseComposer {
        &self.composer
    }

    /// Narrate one match. Teams without form data count as neutral.
    pub fn narrate(
        &self,
        ctx: &mut NarrativeContext,
        season: u32,
        round: u32,
        outcome: &MatchOutcome,
        forms: &FormTable,
    ) -> Result<NarrativeRecord, NarrativeError> {
        validate_outcome(outcome)?;
        ctx.memory.begin_round(round);

        let window = self.classifier.thresholds().form_window;
        let home_form = forms.score_of(&outcome.home, window);
        let away_form = forms.score_of(&outcome.away, window);

        let (facts, category) = self.classifier.classify_outcome(outcome, home_form, away_form);
        let seed_key = narrative_seed_key(season, round, outcome, category);
        let pair_key = outcome.pair_key();

        let composition = self.composer.compose(
            ctx,
            &ComposeRequest {
                facts: &facts,
                category,
                seed_key: &seed_key,
                pair_key: &pair_key,
            },
        )?;

        tracing::debug!(
            season,
            round,
            pair = %pair_key,
            category = %category,
            relaxation = composition.relaxation,
            "composed narrative"
        );

        Ok(NarrativeRecord {
            text: composition.text,
            category,
            metadata: NarrativeMetadata {
                margin: facts.margin,
                total_goals: facts.total_goals,
                form_diff: facts.form_diff,
                home_form,
                away_form,
                winner: facts.winner,
                loser: facts.loser,
                result: outcome.scoreline(),
                overtime: outcome.overtime,
                shootout: outcome.shootout,
                conference: outcome.conference.clone(),
            },
        })
    }

    /// Narrate every match of a round in order. A failing match is logged and
    /// left out; the rest of the round still gets narratives.
    pub fn narrate_round(
        &self,
        ctx: &mut NarrativeContext,
        season: u32,
        round: u32,
        outcomes: &[MatchOutcome],
        forms: &FormTable,
    ) -> RoundNarratives {
        let mut narratives = RoundNarratives::default();
        let mut seen = HashSet::new();

        for outcome in outcomes {
            let pair = outcome.pair_key();
            let result = if seen.insert(pair.clone()) {
                self.narrate(ctx, season, round, outcome, forms)
            } else {
                Err(NarrativeError::DuplicatePairing { pair: pair.clone() })
            };

            match result {
                Ok(record) => {
                    narratives.records.insert(pair, record);
                }
                Err(error) => {
                    tracing::warn!(season, round, pair = %pair, %error, "no narrative for match");
                    narratives.failures.push((pair, error));
                }
            }
        }

        narratives
    }
}

impl Default for NarrativeEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn validate_outcome(outcome: &MatchOutcome) -> Result<(), NarrativeError> {
    let reason = if outcome.home.trim().is_empty() || outcome.away.trim().is_empty() {
        "team name is empty"
    } else if outcome.home == outcome.away {
        "team plays itself"
    } else {
        return Ok(());
    };
    Err(NarrativeError::InvalidMatch {
        reason: format!("{} ({})", reason, outcome.pair_key()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_rules::FormRecord;

    fn forms() -> FormTable {
        let mut forms = FormTable::new();
        forms.insert("Berlin", FormRecord::from_marks(&["W", "W", "W", "W", "W"]));
        forms.insert("Köln", FormRecord::from_marks(&["L", "L", "L", "L", "L"]));
        forms.insert("Mannheim", FormRecord::from_marks(&["L", "W", "L"]));
        forms
    }

    #[test]
    fn test_narrate_metadata() {
        let engine = NarrativeEngine::with_defaults();
        let mut ctx = NarrativeContext::standard(&MatchdayConfig::default());

        let outcome = MatchOutcome::new("Köln", "Berlin", 1, 3).with_conference("Nord");
        let record = engine.narrate(&mut ctx, 1, 4, &outcome, &forms()).unwrap();

        assert_eq!(record.category, Category::Fallback);
        assert_eq!(record.metadata.winner, "Berlin");
        assert_eq!(record.metadata.loser, "Köln");
        assert_eq!(record.metadata.result, "1:3");
        assert_eq!(record.metadata.margin, 2);
        assert_eq!(record.metadata.total_goals, 4);
        assert_eq!(record.metadata.home_form, -5);
        assert_eq!(record.metadata.away_form, 5);
        assert_eq!(record.metadata.form_diff, 10);
        assert_eq!(record.metadata.conference.as_deref(), Some("Nord"));
        assert!(record.text.chars().count() <= 110);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "FALLBACK");
    }

    #[test]
    fn test_scenario_categories() {
        let engine = NarrativeEngine::with_defaults();
        let mut ctx = NarrativeContext::standard(&MatchdayConfig::default());

        // winner Köln in bad form, margin 2
        let upset = MatchOutcome::new("Köln", "Berlin", 3, 1);
        let record = engine.narrate(&mut ctx, 1, 1, &upset, &forms()).unwrap();
        assert_eq!(record.category, Category::Upset);

        let blowout = MatchOutcome::new("Berlin", "Köln", 6, 1);
        let record = engine.narrate(&mut ctx, 1, 1, &blowout, &forms()).unwrap();
        assert_eq!(record.category, Category::Blowout);
    }

    #[test]
    fn test_missing_form_is_neutral() {
        let engine = NarrativeEngine::with_defaults();
        let mut ctx = NarrativeContext::standard(&MatchdayConfig::default());
        let outcome = MatchOutcome::new("Nobody", "Unknown", 2, 1);
        let record = engine.narrate(&mut ctx, 1, 1, &outcome, &FormTable::new()).unwrap();
        assert_eq!(record.category, Category::GrindWin);
        assert_eq!(record.metadata.form_diff, 0);
    }

    #[test]
    fn test_round_is_reproducible() {
        let engine = NarrativeEngine::with_defaults();
        let outcomes = vec![
            MatchOutcome::new("Berlin", "Köln", 4, 2),
            MatchOutcome::new("Mannheim", "Berlin", 2, 3).in_overtime(),
            MatchOutcome::new("Köln", "Mannheim", 0, 2),
        ];

        let run = || {
            let mut ctx = NarrativeContext::standard(&MatchdayConfig::default());
            engine
                .narrate_round(&mut ctx, 2, 7, &outcomes, &forms())
                .records
                .into_iter()
                .map(|(pair, record)| (pair, record.text))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_failures_are_isolated() {
        let engine = NarrativeEngine::with_defaults();
        let mut ctx = NarrativeContext::standard(&MatchdayConfig::default());
        let outcomes = vec![
            MatchOutcome::new("Berlin", "Berlin", 1, 0),
            MatchOutcome::new("Berlin", "Köln", 2, 1),
            MatchOutcome::new("Berlin", "Köln", 5, 1),
            MatchOutcome::new("", "Köln", 5, 1),
        ];

        let round = engine.narrate_round(&mut ctx, 1, 1, &outcomes, &forms());
        assert_eq!(round.records.len(), 1);
        assert_eq!(round.records["Berlin-Köln"].metadata.result, "2:1");
        assert_eq!(round.failures.len(), 3);
        assert!(matches!(round.failures[0].1, NarrativeError::InvalidMatch { .. }));
        assert!(matches!(round.failures[1].1, NarrativeError::DuplicatePairing { .. }));
    }

    #[test]
    fn test_rounds_share_memory() {
        let engine = NarrativeEngine::with_defaults();
        let mut ctx = NarrativeContext::standard(&MatchdayConfig::default());
        let outcome = [MatchOutcome::new("Berlin", "Köln", 3, 2)];

        engine.narrate_round(&mut ctx, 1, 1, &outcome, &forms());
        engine.narrate_round(&mut ctx, 1, 2, &outcome, &forms());
        assert_eq!(ctx.memory.pairing_len("Berlin-Köln"), 2);
        assert_eq!(ctx.memory.current_round(), Some(2));
    }
}

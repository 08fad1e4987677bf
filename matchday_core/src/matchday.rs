//! Per-round pipeline: highlight selection plus one narrative per match.
//!
//! Nothing here stops the host's round. Every failure is logged and returned
//! next to whatever was produced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use league_rules::{FormTable, MatchOutcome, RoundLineups, SeasonState};

use crate::config::{ConfigError, MatchdayConfig};
use crate::error::MatchdayError;
use crate::highlights::{HighlightSelection, HighlightSelector};
use crate::narrative::{NarrativeContext, NarrativeEngine, NarrativeRecord};

/// Season assumed when the round document does not name one.
pub const DEFAULT_SEASON: u32 = 1;

fn default_season() -> u32 {
    DEFAULT_SEASON
}

/// One round as delivered by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchdayInput {
    #[serde(default = "default_season")]
    pub season: u32,

    #[serde(alias = "spieltag")]
    pub round: u32,

    #[serde(default)]
    pub games: Vec<MatchOutcome>,

    /// Older exports list matches under this key instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<MatchOutcome>,

    #[serde(default)]
    pub lineups: RoundLineups,

    /// Overrides the derived highlight seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MatchdayInput {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON,
            round: 0,
            games: Vec::new(),
            results: Vec::new(),
            lineups: RoundLineups::new(),
            seed: None,
        }
    }
}

impl MatchdayInput {
    pub fn from_json(value: &Value) -> Result<Self, MatchdayError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// The round's matches: `games`, or `results` when `games` is empty.
    pub fn matches(&self) -> &[MatchOutcome] {
        if self.games.is_empty() {
            &self.results
        } else {
            &self.games
        }
    }
}

/// Build the form table for a round.
///
/// The standings document wins; teams it lacks are taken from any tables
/// embedded in the round document.
pub fn resolve_form(standings: &Value, round_doc: &Value) -> FormTable {
    let mut forms = FormTable::from_json(standings);
    forms.fill_missing(&FormTable::from_json(round_doc));
    forms
}

/// Part of the round a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureScope {
    Input,
    Highlight,
    /// A match, by pairing key.
    Match(String),
}

impl std::fmt::Display for FailureScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureScope::Input => f.write_str("input"),
            FailureScope::Highlight => f.write_str("highlight"),
            FailureScope::Match(pair) => write!(f, "match {pair}"),
        }
    }
}

#[derive(Debug)]
pub struct RoundFailure {
    pub scope: FailureScope,
    pub error: MatchdayError,
}

/// Everything produced for one round.
#[derive(Debug, Default)]
pub struct MatchdayOutput {
    pub highlight: Option<HighlightSelection>,
    /// Keyed by "home-away".
    pub narratives: BTreeMap<String, NarrativeRecord>,
    pub failures: Vec<RoundFailure>,
}

#[derive(Serialize)]
struct OutputPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    highlight: Option<&'a HighlightSelection>,
    narratives: &'a BTreeMap<String, NarrativeRecord>,
}

impl MatchdayOutput {
    /// Payload written next to the round's results.
    pub fn to_json(&self) -> Result<String, MatchdayError> {
        let payload = OutputPayload {
            highlight: self.highlight.as_ref(),
            narratives: &self.narratives,
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs both generators for a round and owns the narrative context between
/// rounds.
pub struct MatchdayProcessor {
    selector: HighlightSelector,
    engine: NarrativeEngine,
    context: NarrativeContext,
}

impl MatchdayProcessor {
    pub fn new(config: MatchdayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let context = NarrativeContext::standard(&config);
        Ok(Self {
            selector: HighlightSelector::new(config.highlights.clone()),
            engine: NarrativeEngine::new(&config),
            context,
        })
    }

    /// Use a loaded phrase book or persisted memory.
    pub fn with_context(mut self, context: NarrativeContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &NarrativeContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut NarrativeContext {
        &mut self.context
    }

    pub fn into_context(self) -> NarrativeContext {
        self.context
    }

    /// Run the round. The highlight is committed to `state` only when it was
    /// drawn successfully.
    pub fn process(
        &mut self,
        input: &MatchdayInput,
        forms: &FormTable,
        state: &mut SeasonState,
    ) -> MatchdayOutput {
        let mut output = MatchdayOutput::default();

        match self.selector.select_and_commit(
            &input.lineups,
            input.season,
            input.round,
            state.selection_mut(),
            input.seed,
        ) {
            Ok(selection) => {
                tracing::info!(
                    season = input.season,
                    round = input.round,
                    fallback_used = selection.meta.fallback_used,
                    forwards = selection.meta.pool_sizes.forwards,
                    defenders = selection.meta.pool_sizes.defenders,
                    goalies = selection.meta.pool_sizes.goalies,
                    "highlight selected"
                );
                output.highlight = Some(selection);
            }
            Err(error) => {
                tracing::warn!(season = input.season, round = input.round, %error, "no highlight for round");
                output.failures.push(RoundFailure {
                    scope: FailureScope::Highlight,
                    error: error.into(),
                });
            }
        }

        let round = self.engine.narrate_round(
            &mut self.context,
            input.season,
            input.round,
            input.matches(),
            forms,
        );
        output.narratives = round.records;
        output
            .failures
            .extend(round.failures.into_iter().map(|(pair, error)| RoundFailure {
                scope: FailureScope::Match(pair),
                error: error.into(),
            }));

        output
    }

    /// Run the round from raw documents. A round document that cannot be read
    /// yields an empty output with one input failure.
    pub fn process_json(
        &mut self,
        round_doc: &Value,
        standings: &Value,
        state: &mut SeasonState,
    ) -> MatchdayOutput {
        match MatchdayInput::from_json(round_doc) {
            Ok(input) => {
                let forms = resolve_form(standings, round_doc);
                self.process(&input, &forms, state)
            }
            Err(error) => {
                tracing::warn!(%error, "unreadable round input");
                MatchdayOutput {
                    failures: vec![RoundFailure {
                        scope: FailureScope::Input,
                        error,
                    }],
                    ..MatchdayOutput::default()
                }
            }
        }
    }
}

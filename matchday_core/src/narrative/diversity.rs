//! Diversity check for a phrase book: how often does wording repeat?

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use league_rules::MatchOutcome;

use super::{Category, ComposeRequest, MatchFacts, NarrativeContext, NarrativeError, PhraseComposer};

const SAMPLE_TEAMS: [&str; 4] = ["Team A", "Team B", "Team C", "Team D"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityReport {
    pub total: usize,
    pub unique: usize,
    /// Share of samples whose text was already produced, in percent.
    pub duplicate_rate: f64,
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub by_category: BTreeMap<Category, usize>,
}

/// Compose `samples` narratives for rotating synthetic matchups, cycling
/// through every category, and measure how varied the output is.
///
/// Uses `ctx` as-is, so a fresh memory measures the phrase book with
/// anti-repeat filtering in effect.
pub fn diversity_report(
    composer: &PhraseComposer,
    ctx: &mut NarrativeContext,
    samples: usize,
) -> Result<DiversityReport, NarrativeError> {
    let mut texts = Vec::with_capacity(samples);
    let mut by_category: BTreeMap<Category, usize> = BTreeMap::new();

    for i in 0..samples {
        let winner = SAMPLE_TEAMS[i % SAMPLE_TEAMS.len()];
        let loser = SAMPLE_TEAMS[(i + 1) % SAMPLE_TEAMS.len()];
        let category = Category::ALL[i % Category::ALL.len()];

        let outcome = MatchOutcome::new(winner, loser, 3 + (i % 3) as u32, 1);
        let facts = MatchFacts::derive(&outcome, 0, 0);
        let seed_key = format!("validation-{}-{}", i, category.tag());
        let pair_key = outcome.pair_key();

        let composition = composer.compose(
            ctx,
            &ComposeRequest {
                facts: &facts,
                category,
                seed_key: &seed_key,
                pair_key: &pair_key,
            },
        )?;

        *by_category.entry(category).or_insert(0) += 1;
        texts.push(composition.text);
    }

    let lengths: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    let unique = texts.iter().collect::<HashSet<_>>().len();
    let total = texts.len();

    let report = DiversityReport {
        total,
        unique,
        duplicate_rate: if total == 0 {
            0.0
        } else {
            (1.0 - unique as f64 / total as f64) * 100.0
        },
        avg_length: if total == 0 {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / total as f64
        },
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        by_category,
    };

    tracing::info!(
        total = report.total,
        unique = report.unique,
        duplicate_rate = report.duplicate_rate,
        "narrative diversity"
    );

    Ok(report)
}

//! Phrase composition.
//!
//! Compositional mode draws many candidate sentences from the category's
//! fragment pools, drops those that collide with memory, scores the rest and
//! keeps the best. If memory rejects everything, scopes are dropped one at a
//! time (round, category, pairing, global) until something survives.

use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::memory::{MemoryEntry, MemoryScope};
use super::phrases::render;
use super::text::{assemble, truncate_text};
use super::{Category, MatchFacts, NarrativeContext, NarrativeError};
use crate::config::{ComposerConfig, ComposerMode};
use crate::seed::{keyed_rng, stable_hash};

/// A generated sentence with the fragments memory tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseCandidate {
    pub text: String,
    pub opener: Option<String>,
    pub adjective: Option<String>,
}

impl PhraseCandidate {
    fn memory_entry(&self) -> MemoryEntry {
        MemoryEntry::new(&self.text, self.opener.as_deref(), self.adjective.as_deref())
    }
}

/// The chosen sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub text: String,
    pub opener: Option<String>,
    pub adjective: Option<String>,
    /// Memory scopes dropped before a candidate survived.
    pub relaxation: usize,
}

/// What the composer needs to know about one match.
#[derive(Debug, Clone, Copy)]
pub struct ComposeRequest<'a> {
    pub facts: &'a MatchFacts,
    pub category: Category,
    /// Key all randomness is derived from.
    pub seed_key: &'a str,
    /// Pairing scope key ("home-away").
    pub pair_key: &'a str,
}

impl ComposeRequest<'_> {
    fn score(&self) -> String {
        format!("{}:{}", self.facts.winner_goals, self.facts.loser_goals)
    }
}

pub struct PhraseComposer {
    config: ComposerConfig,
}

impl PhraseComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ComposerConfig::default())
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Produce a sentence and record it in memory.
    pub fn compose(
        &self,
        ctx: &mut NarrativeContext,
        request: &ComposeRequest<'_>,
    ) -> Result<Composition, NarrativeError> {
        let composition = match self.config.mode {
            ComposerMode::Compositional => self.compose_compositional(ctx, request)?,
            ComposerMode::Templates => self.compose_from_templates(ctx, request)?,
        };

        let entry = MemoryEntry::new(
            &composition.text,
            composition.opener.as_deref(),
            composition.adjective.as_deref(),
        );
        ctx.memory.record(entry, request.pair_key, request.category);
        Ok(composition)
    }

    /// Generate the deduplicated candidate list for a request.
    pub fn candidates(
        &self,
        ctx: &NarrativeContext,
        request: &ComposeRequest<'_>,
    ) -> Result<Vec<PhraseCandidate>, NarrativeError> {
        let phrases = ctx.book.phrases(request.category)?;
        if phrases.verbs.is_empty() {
            return Err(NarrativeError::EmptyPhrasePool {
                category: request.category,
            });
        }

        let facts = request.facts;
        let score = request.score();
        let mut rng = keyed_rng(request.seed_key);
        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(self.config.candidate_count);

        for _ in 0..self.config.candidate_count {
            let opener = if rng.gen::<f64>() < self.config.opener_chance {
                phrases.openers.choose(&mut rng)
            } else {
                None
            };
            let verb = match phrases.verbs.choose(&mut rng) {
                Some(verb) => verb,
                None => break,
            };
            let adjective = phrases.adjectives.choose(&mut rng);
            let qualifier = if rng.gen::<f64>() < self.config.qualifier_chance {
                phrases.qualifiers.choose(&mut rng)
            } else {
                None
            };
            let temporal = if rng.gen::<f64>() < self.config.temporal_chance {
                ctx.book.temporal.choose(&mut rng)
            } else {
                None
            };

            let mut core = render(verb, &facts.winner, &facts.loser, &score);
            if let Some(adjective) = adjective {
                core.push(' ');
                core.push_str(adjective);
            }
            let qualifier = qualifier.map(|q| render(q, &facts.winner, &facts.loser, &score));

            let text = truncate_text(
                &assemble(
                    opener.map(String::as_str),
                    &core,
                    temporal.map(String::as_str),
                    qualifier.as_deref(),
                ),
                self.config.max_chars,
            );

            if seen.insert(text.clone()) {
                candidates.push(PhraseCandidate {
                    text,
                    opener: opener.cloned(),
                    adjective: adjective.cloned(),
                });
            }
        }

        Ok(candidates)
    }

    fn length_penalty(&self, text: &str) -> f64 {
        let length = text.chars().count();
        let outside = if length < self.config.preferred_min {
            self.config.preferred_min - length
        } else if length > self.config.preferred_max {
            length - self.config.preferred_max
        } else {
            0
        };
        outside as f64 * self.config.length_weight
    }

    fn score(&self, ctx: &NarrativeContext, candidate: &PhraseCandidate) -> f64 {
        let reuse = ctx.memory.fragment_reuse(&candidate.memory_entry());
        let mut score = self.length_penalty(&candidate.text);
        if reuse.opener {
            score += self.config.opener_penalty;
        }
        if reuse.adjective {
            score += self.config.adjective_penalty;
        }
        score
    }

    fn compose_compositional(
        &self,
        ctx: &NarrativeContext,
        request: &ComposeRequest<'_>,
    ) -> Result<Composition, NarrativeError> {
        let candidates = self.candidates(ctx, request)?;

        let mut relaxation = 0;
        let survivors = loop {
            let scopes = MemoryScope::active_at(relaxation);
            let survivors: Vec<&PhraseCandidate> = candidates
                .iter()
                .filter(|c| {
                    !ctx.memory
                        .collides(&c.memory_entry(), scopes, request.pair_key, request.category)
                })
                .collect();
            if !survivors.is_empty() || scopes.is_empty() {
                break survivors;
            }
            relaxation += 1;
        };

        if relaxation > 0 {
            tracing::debug!(
                pair = request.pair_key,
                category = %request.category,
                relaxation,
                "relaxed narrative memory scopes"
            );
        }

        let best = survivors
            .into_iter()
            .map(|c| (self.score(ctx, c), c))
            .min_by(|a, b| candidate_order((a.0, &a.1.text), (b.0, &b.1.text)))
            .map(|(_, c)| c)
            .ok_or(NarrativeError::EmptyPhrasePool {
                category: request.category,
            })?;

        Ok(Composition {
            text: best.text.clone(),
            opener: best.opener.clone(),
            adjective: best.adjective.clone(),
            relaxation,
        })
    }

    fn compose_from_templates(
        &self,
        ctx: &NarrativeContext,
        request: &ComposeRequest<'_>,
    ) -> Result<Composition, NarrativeError> {
        let templates = &ctx.book.phrases(request.category)?.templates;
        if templates.is_empty() {
            return Err(NarrativeError::EmptyPhrasePool {
                category: request.category,
            });
        }

        let facts = request.facts;
        let score = request.score();
        let render_at = |index: usize| {
            truncate_text(
                &render(&templates[index], &facts.winner, &facts.loser, &score),
                self.config.max_chars,
            )
        };

        let len = templates.len();
        let start = (stable_hash(request.seed_key) % len as u64) as usize;
        let all_scopes = MemoryScope::active_at(0);

        let fresh = (0..len).map(|step| (start + step) % len).find_map(|index| {
            let text = render_at(index);
            let entry = MemoryEntry::new(&text, None, None);
            (!ctx
                .memory
                .collides(&entry, all_scopes, request.pair_key, request.category))
            .then_some(text)
        });

        let (text, relaxation) = match fresh {
            Some(text) => (text, 0),
            None => (render_at(start), all_scopes.len()),
        };

        Ok(Composition {
            text,
            opener: None,
            adjective: None,
            relaxation,
        })
    }
}

impl Default for PhraseComposer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Order two scored candidates: lower score first, then lower text hash.
pub fn candidate_order(a: (f64, &str), b: (f64, &str)) -> Ordering {
    a.0.total_cmp(&b.0)
        .then(stable_hash(a.1).cmp(&stable_hash(b.1)))
        .then_with(|| a.1.cmp(b.1))
}

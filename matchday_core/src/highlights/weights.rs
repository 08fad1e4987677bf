//! Selection weights.
//!
//! weight = rating + slot bonus - rotation penalty - consecutive penalty
//!          - frequency penalty * appearances

use serde::{Deserialize, Serialize};

use league_rules::{SelectionState, Slot};

use super::pool::Candidate;
use crate::config::HighlightConfig;

/// The individual terms of a candidate's weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBreakdown {
    pub rating: f64,
    pub slot_bonus: f64,
    pub rotation_penalty: f64,
    pub consecutive_penalty: f64,
    pub frequency_penalty: f64,
}

impl WeightBreakdown {
    /// Unclamped weight. The sampler applies the floor.
    pub fn total(&self) -> f64 {
        self.rating + self.slot_bonus
            - self.rotation_penalty
            - self.consecutive_penalty
            - self.frequency_penalty
    }
}

/// Computes candidate weights for one round.
pub struct WeightCalculator<'a> {
    config: &'a HighlightConfig,
    state: &'a SelectionState,
    round: u32,
}

impl<'a> WeightCalculator<'a> {
    pub fn new(config: &'a HighlightConfig, state: &'a SelectionState, round: u32) -> Self {
        Self {
            config,
            state,
            round,
        }
    }

    fn slot_bonus(&self, slot: Slot) -> f64 {
        slot.unit()
            .and_then(|unit| usize::from(unit).checked_sub(1))
            .and_then(|index| self.config.slot_bonuses.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Break a candidate's weight into its terms.
    pub fn breakdown(&self, candidate: &Candidate) -> WeightBreakdown {
        let appearances = self.state.appearances(&candidate.id);
        let consecutive = match (self.state.last_selected(&candidate.id), self.round.checked_sub(1)) {
            (Some(last), Some(previous)) => last == previous,
            _ => false,
        };

        WeightBreakdown {
            rating: candidate.rating,
            slot_bonus: self.slot_bonus(candidate.slot),
            rotation_penalty: if candidate.rotation {
                self.config.rotation_penalty
            } else {
                0.0
            },
            consecutive_penalty: if consecutive {
                self.config.consecutive_penalty
            } else {
                0.0
            },
            frequency_penalty: self.config.frequency_penalty * f64::from(appearances),
        }
    }

    pub fn weight(&self, candidate: &Candidate) -> f64 {
        self.breakdown(candidate).total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_rules::{PlayerId, Position};
    use proptest::prelude::*;

    fn candidate(id: &str, slot: Slot, rating: f64, rotation: bool) -> Candidate {
        Candidate {
            id: PlayerId::new(id),
            team: "Adler".to_string(),
            position: Position::Forward,
            slot,
            rating,
            rotation,
            weight: 0.0,
        }
    }

    #[test]
    fn test_slot_bonuses() {
        let config = HighlightConfig::default();
        let state = SelectionState::new();
        let calc = WeightCalculator::new(&config, &state, 5);

        assert_eq!(calc.weight(&candidate("a", Slot::Unit(1), 80.0, false)), 86.0);
        assert_eq!(calc.weight(&candidate("b", Slot::Unit(2), 80.0, false)), 83.0);
        assert_eq!(calc.weight(&candidate("c", Slot::Unit(3), 80.0, false)), 81.0);
        assert_eq!(calc.weight(&candidate("d", Slot::Unit(4), 80.0, false)), 80.0);
        assert_eq!(calc.weight(&candidate("e", Slot::Crease, 80.0, false)), 80.0);
        assert_eq!(calc.weight(&candidate("f", Slot::Rotation, 80.0, true)), 76.0);
    }

    #[test]
    fn test_consecutive_and_frequency_penalties() {
        let config = HighlightConfig::default();
        let mut state = SelectionState::new();
        let id = PlayerId::new("a");
        state.commit(3, [&id]).unwrap();
        state.commit(4, [&id]).unwrap();

        let c = candidate("a", Slot::Unit(1), 80.0, false);

        let next_round = WeightCalculator::new(&config, &state, 5).breakdown(&c);
        assert_eq!(next_round.consecutive_penalty, 10.0);
        assert!((next_round.frequency_penalty - 1.6).abs() < 1e-9);
        assert!((next_round.total() - 74.4).abs() < 1e-9);

        let later = WeightCalculator::new(&config, &state, 6).breakdown(&c);
        assert_eq!(later.consecutive_penalty, 0.0);
    }

    #[test]
    fn test_round_zero_has_no_previous_round() {
        let config = HighlightConfig::default();
        let state = SelectionState::new();
        let calc = WeightCalculator::new(&config, &state, 0);
        let b = calc.breakdown(&candidate("a", Slot::Unit(1), 70.0, false));
        assert_eq!(b.consecutive_penalty, 0.0);
    }

    proptest! {
        #[test]
        fn prop_more_appearances_lower_weight(
            rating in 0.0f64..120.0,
            appearances in 0u32..40,
            unit in 1u8..5,
            rotation in any::<bool>(),
        ) {
            let config = HighlightConfig::default();
            let id = PlayerId::new("p");
            let c = candidate("p", Slot::Unit(unit), rating, rotation);

            let mut fewer = SelectionState::new();
            let mut more = SelectionState::new();
            for round in 1..=appearances {
                fewer.commit(round, [&id]).unwrap();
            }
            for round in 1..=appearances + 1 {
                more.commit(round, [&id]).unwrap();
            }

            // same recency in both, so only the count differs
            let round = appearances + 10;
            let w_fewer = WeightCalculator::new(&config, &fewer, round).weight(&c);
            let w_more = WeightCalculator::new(&config, &more, round).weight(&c);
            prop_assert!(w_more < w_fewer);

            // strictly lower until the sampler floor takes over
            let floor = config.weight_floor;
            prop_assert!(w_more.max(floor) < w_fewer.max(floor) || w_fewer <= floor);
        }

        #[test]
        fn prop_better_slot_never_lowers_weight(rating in 0.0f64..120.0, unit in 2u8..6) {
            let config = HighlightConfig::default();
            let state = SelectionState::new();
            let calc = WeightCalculator::new(&config, &state, 1);
            let upper = calc.weight(&candidate("p", Slot::Unit(unit - 1), rating, false));
            let lower = calc.weight(&candidate("p", Slot::Unit(unit), rating, false));
            prop_assert!(upper >= lower);
        }
    }
}

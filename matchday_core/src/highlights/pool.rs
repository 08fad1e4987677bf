//! Candidate pool - every eligible player of a round, once.

use std::collections::HashMap;

use league_rules::{PlayerId, Position, RoundLineups, Slot};

/// A player eligible for this round's highlight, with its derived weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: PlayerId,
    pub team: String,
    pub position: Position,
    /// Best slot the player held this round.
    pub slot: Slot,
    pub rating: f64,
    pub rotation: bool,
    /// Raw weight; may be negative until the sampler clamps it.
    pub weight: f64,
}

/// Candidates split into position buckets, in first-listed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    forwards: Vec<Candidate>,
    defenders: Vec<Candidate>,
    goalies: Vec<Candidate>,
}

impl CandidatePool {
    pub fn bucket(&self, position: Position) -> &[Candidate] {
        match position {
            Position::Forward => &self.forwards,
            Position::Defender => &self.defenders,
            Position::Goalie => &self.goalies,
        }
    }

    pub fn bucket_mut(&mut self, position: Position) -> &mut Vec<Candidate> {
        match position {
            Position::Forward => &mut self.forwards,
            Position::Defender => &mut self.defenders,
            Position::Goalie => &mut self.goalies,
        }
    }

    /// Iterate over every candidate in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.forwards
            .iter()
            .chain(self.defenders.iter())
            .chain(self.goalies.iter())
    }

    pub fn len(&self) -> usize {
        self.forwards.len() + self.defenders.len() + self.goalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collect the round's candidates from all lineups.
///
/// Teams are walked in name order, positions in F/D/G order. A player listed
/// more than once in the same position keeps its best slot (and the rotation
/// flag of that listing). A player already claimed by another position is not
/// added again, so no identity appears in two buckets.
pub fn build_candidate_pool(lineups: &RoundLineups, default_rating: f64) -> CandidatePool {
    let mut pool = CandidatePool::default();
    let mut seen: HashMap<PlayerId, (Position, usize)> = HashMap::new();

    for (team, lineup) in lineups {
        for position in Position::ALL {
            for (slot, entry) in lineup.units(position) {
                match seen.get(&entry.id) {
                    Some(&(claimed, index)) if claimed == position => {
                        let existing = &mut pool.bucket_mut(position)[index];
                        if slot.is_better_than(&existing.slot) {
                            existing.slot = slot;
                            existing.rotation = entry.rotation;
                        }
                    }
                    Some(&(claimed, _)) => {
                        tracing::debug!(
                            player = %entry.id,
                            claimed = %claimed,
                            listed = %position,
                            "player listed under two positions, keeping first"
                        );
                    }
                    None => {
                        let bucket = pool.bucket_mut(position);
                        seen.insert(entry.id.clone(), (position, bucket.len()));
                        bucket.push(Candidate {
                            id: entry.id.clone(),
                            team: team.clone(),
                            position,
                            slot,
                            rating: entry.rating_or(default_rating),
                            rotation: entry.rotation,
                            weight: 0.0,
                        });
                    }
                }
            }
        }
    }

    pool
}

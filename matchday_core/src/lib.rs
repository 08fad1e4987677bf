//! # Matchday Core
//!
//! The generative side of the league: for every round it picks the highlight
//! players from the lineups and writes one short narrative per finished
//! match. Both are reproducible from season, round and match identity alone.
//!
//! ## Core Components
//!
//! - **highlights**: candidate pool, weights, seeded sampling and the commit
//!   into the season counters
//! - **narrative**: match classifier, phrase composer and anti-repeat memory
//! - **matchday**: the per-round pipeline that runs both and isolates failures
//! - **seed**: every seed and stable hash used by the generators
//! - **config**: tunable constants, loadable from TOML
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: generators are seeded per call from round and match keys
//! - **Explicit state**: selection counters and narrative memory are owned by
//!   the caller and passed in, never held globally
//! - **Never blocks the round**: failures degrade to missing output, not errors

pub mod config;
pub mod error;
pub mod highlights;
pub mod matchday;
pub mod narrative;
pub mod seed;

pub use config::*;
pub use error::*;
pub use highlights::*;
pub use matchday::*;
pub use narrative::*;
pub use seed::*;

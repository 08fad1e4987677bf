//! # League Rules
//!
//! The league model crate - lineups, match outcomes, team form and the persisted
//! season state. Everything here is produced or persisted by the host simulator;
//! this crate is the shared vocabulary and does not contain any selection or
//! narrative logic.
//!
//! ## Modules
//!
//! - **entities**: players, positions, line/pair slots and team lineups
//! - **results**: finished matches, result marks, form records and form tables
//! - **season_state**: versioned per-season state with the selection counters

pub mod entities;
pub mod results;
pub mod season_state;

pub use entities::*;
pub use results::*;
pub use season_state::*;

//! Error types shared across the matchday pipeline.

use thiserror::Error;

use crate::highlights::HighlightError;
use crate::narrative::NarrativeError;

/// Any failure of one pipeline step.
///
/// The round processor never returns this; it records it next to the scope
/// that failed and carries on with the rest of the round.
#[derive(Error, Debug)]
pub enum MatchdayError {
    #[error("Highlight selection failed: {0}")]
    Highlight(#[from] HighlightError),

    #[error("Narrative failed: {0}")]
    Narrative(#[from] NarrativeError),

    #[error("Malformed round input: {0}")]
    Input(#[from] serde_json::Error),
}

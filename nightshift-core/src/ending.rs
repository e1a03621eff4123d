//! Ending resolution.
//!
//! A pure function of the run's counters, checked in priority order:
//! secret beats everything, then good, neutral, bad.

use crate::constants::{
    GOOD_ENDING_MAX_HINTS, GOOD_ENDING_MAX_MISTAKES, NEUTRAL_ENDING_MAX_MISTAKES,
};
use crate::state::{EndingKind, GameState};

/// Resolve the ending for a run that survived the final compile.
#[must_use]
pub fn resolve(state: &GameState) -> EndingKind {
    // Never once closing the door outranks any score.
    if state.never_closed_door {
        return EndingKind::Secret;
    }
    if state.total_mistakes <= GOOD_ENDING_MAX_MISTAKES
        && state.total_hints_used <= GOOD_ENDING_MAX_HINTS
    {
        return EndingKind::Good;
    }
    if state.total_mistakes <= NEUTRAL_ENDING_MAX_MISTAKES {
        return EndingKind::Neutral;
    }
    EndingKind::Bad
}

//! Background diversions that lure the adversary away.
//!
//! Assigning a diversion buys distance at the price of a permanent speed
//! increase, a cooldown, and a return penalty. Repeat use of the same
//! diversion decays its distance payoff; the thing learns.

use crate::audio::{CueId, CueRequest};
use crate::constants::{BLACKOUT_DURATION, LEARNING_DECAY, SPEED_CAP};
use crate::data::{DiversionDef, DiversionSideEffect};
use crate::heat;
use crate::progression;
use crate::state::{ActiveDiversion, DiversionId, GameState, Phase};

/// Whether a diversion can be assigned right now.
#[must_use]
pub fn can_assign(state: &GameState, id: DiversionId) -> bool {
    state.active_diversion.is_none()
        && !state.diversions_disabled
        && state.phase.is_gameplay()
        && state.phase != Phase::FinalCompile
        && state
            .diversion_cooldowns
            .get(&id)
            .map_or(true, |cd| *cd <= 0.0)
}

/// Assign a diversion. Ignored when unavailable.
pub fn assign(state: &mut GameState, id: DiversionId) {
    if !can_assign(state, id) {
        return;
    }
    let Some(def) = state
        .content
        .as_ref()
        .and_then(|c| c.diversions.get(&id))
        .cloned()
    else {
        return;
    };

    state.push_cue(CueRequest::new(CueId::TaskAssign));

    let usage = state.diversion_usage.get(&id).copied().unwrap_or(0);
    let effective_boost = def.distance_boost * LEARNING_DECAY.powi(usage as i32);

    state.distance = (state.distance + effective_boost).min(100.0);
    state.speed = (state.speed + def.speed_increase).min(SPEED_CAP);

    if id == DiversionId::ServerCheck {
        state.used_special_diversion = true;
    }

    state.active_diversion = Some(ActiveDiversion {
        id,
        remaining: def.duration_sec,
    });
    state.diversion_cooldowns.insert(id, def.cooldown_sec);
    state.diversion_usage.insert(id, usage + 1);
    state.total_diversions_assigned += 1;

    apply_side_effect(state, &def);

    state.push_log(def.flavor_text.assign.clone());
    progression::check_phase_transition(state);
}

fn apply_side_effect(state: &mut GameState, def: &DiversionDef) {
    match def.side_effect {
        Some(DiversionSideEffect::Hint { value }) => state.hint_tokens += value,
        Some(DiversionSideEffect::InputLag { value }) => state.glitch.input_lag = value,
        Some(DiversionSideEffect::CursorInvert { value }) => state.glitch.cursor_invert = value,
        None => {}
    }
}

/// Advance cooldowns and the running diversion; apply the return penalty
/// when it completes.
pub fn tick(state: &mut GameState, dt: f32) {
    for cd in state.diversion_cooldowns.values_mut() {
        if *cd > 0.0 {
            *cd = (*cd - dt).max(0.0);
        }
    }

    let Some(active) = state.active_diversion.as_mut() else {
        return;
    };
    active.remaining -= dt;
    if active.remaining > 0.0 {
        return;
    }

    let id = active.id;
    state.active_diversion = None;
    let Some(def) = state
        .content
        .as_ref()
        .and_then(|c| c.diversions.get(&id))
        .cloned()
    else {
        return;
    };

    let penalty = def.return_penalty;
    state.glitch.add_spike(penalty.glitch_spike);
    state.glitch.input_lag = 0.0;
    state.glitch.cursor_invert = 0.0;

    if penalty.speed_burst > 0.0 {
        state.speed = (state.speed + penalty.speed_burst).min(SPEED_CAP);
    }
    if penalty.blackout {
        heat::trigger_blackout(state, BLACKOUT_DURATION);
    }

    state.push_log(def.flavor_text.ret.clone());
    state.push_cue(CueRequest::new(CueId::TaskReturn));
}

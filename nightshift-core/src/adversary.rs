//! The adversary state machine.
//!
//! Approach, telegraph gamble, breach stealth check, and the blackout
//! rush. Distance is the single source of truth for threat; every handler
//! recomputes the eased value after moving it.

use crate::audio::{CueId, CueRequest, TELEGRAPH_CUES};
use crate::constants::{
    ATTACK_THRESHOLD, BLACKOUT_RUSH_SPEED, BREACH_REPEL_MIN, BREACH_REPEL_SPAN,
    BREACH_RESOLVE_RATE, REAL_ATTACK_CHANCE, REPEL_DISTANCE_MAX, REPEL_DISTANCE_MIN,
    STEALTH_GRACE_PERIOD, STEALTH_SURVIVAL_CHANCE, TELEGRAPH_MAX, TELEGRAPH_MIN,
    THREAT_EASE_EXPONENT,
};
use crate::door;
use crate::state::{AdversaryState, GameState, MonitorState, Phase, Telegraph};

/// Recompute threat from the current distance.
pub fn update_threat(state: &mut GameState) {
    let threat = (1.0 - state.distance / 100.0).clamp(0.0, 1.0);
    state.threat = threat;
    state.threat_eased = threat.powf(THREAT_EASE_EXPONENT);
}

/// Advance the adversary by one tick.
pub fn tick(state: &mut GameState, dt: f32) {
    if !state.phase.is_gameplay() {
        return;
    }

    // A running diversion keeps it busy elsewhere; distance is frozen.
    if state.active_diversion.is_some() {
        return;
    }

    // Blackout overrides everything short of an attack already in motion.
    if state.is_blackout
        && !matches!(
            state.adversary,
            AdversaryState::Telegraphing | AdversaryState::Attacking
        )
    {
        blackout_rush(state, dt);
        return;
    }

    match state.adversary {
        AdversaryState::Idle => {
            state.adversary = AdversaryState::Approaching;
            update_threat(state);
        }
        AdversaryState::Approaching => approach(state, dt),
        AdversaryState::Telegraphing => telegraphing(state),
        AdversaryState::Attacking => attack(state),
        AdversaryState::Breached => breached(state, dt),
    }
}

fn approach(state: &mut GameState, dt: f32) {
    state.distance = (state.distance - state.speed * dt).max(0.0);
    update_threat(state);

    if state.distance <= 0.0 {
        // Caught in the open with nothing between you and it.
        attack(state);
        return;
    }

    if state.distance <= ATTACK_THRESHOLD {
        start_telegraph(state);
        state.push_log("[WARNING] Movement detected at door...");
    }
}

fn blackout_rush(state: &mut GameState, dt: f32) {
    state.distance = (state.distance - BLACKOUT_RUSH_SPEED * dt).max(0.0);
    update_threat(state);

    if state.distance <= ATTACK_THRESHOLD {
        start_telegraph(state);
        state.push_log("[CRITICAL] Rapid approach detected!");
    } else {
        state.adversary = AdversaryState::Approaching;
    }
}

fn start_telegraph(state: &mut GameState) {
    let duration = state.roll_range(TELEGRAPH_MIN, TELEGRAPH_MAX);
    let is_real = state.roll_under(REAL_ATTACK_CHANCE);

    state.telegraph = Some(Telegraph {
        start_time: state.time_elapsed,
        duration,
        is_real,
    });
    state.adversary = AdversaryState::Telegraphing;

    let cue_idx = (state.roll() * TELEGRAPH_CUES.len() as f32) as usize;
    let cue = TELEGRAPH_CUES[cue_idx.min(TELEGRAPH_CUES.len() - 1)];
    state.push_cue(CueRequest::with_volume(cue, 0.8));
    state.flashlight.strobe_intensity = 1.0;
}

fn telegraphing(state: &mut GameState) {
    let Some(telegraph) = state.telegraph else {
        // No warning window on record; fall back to approaching.
        state.adversary = AdversaryState::Approaching;
        return;
    };

    if telegraph.elapsed(state.time_elapsed) >= telegraph.duration {
        resolve_attack(state, telegraph.is_real);
        return;
    }

    update_threat(state);
}

fn resolve_attack(state: &mut GameState, is_real: bool) {
    state.telegraph = None;

    if !is_real {
        // Fake-out: it withdraws regardless of the door.
        repel(state, REPEL_DISTANCE_MIN, REPEL_DISTANCE_MAX);
        state.push_log("[INFO] Movement ceased. False alarm?");
        return;
    }

    if door::is_secure(state) {
        repel(state, REPEL_DISTANCE_MIN, REPEL_DISTANCE_MAX);
        state.push_log("[ALERT] Entry attempt blocked!");
        state.push_log("[INFO] Threat retreating...");
    } else {
        state.adversary = AdversaryState::Breached;
        state.push_log("[CRITICAL] DOOR NOT SECURED!");
        state.push_log("[WARNING] INTRUDER IN THE ROOM. STAY STILL. MONITOR OFF.");
        state.push_cue(CueRequest::new(CueId::DoorBurst));
    }
}

fn repel(state: &mut GameState, min: f32, max: f32) {
    state.distance = state.roll_range(min, max);
    state.adversary = AdversaryState::Approaching;
    update_threat(state);
}

fn attack(state: &mut GameState) {
    state.distance = 0.0;
    state.threat = 1.0;
    state.threat_eased = 1.0;
    state.adversary = AdversaryState::Attacking;
    state.phase = Phase::GameOver;
    state.push_log("[CRITICAL] BREACH DETECTED");
    state.push_log("[CRITICAL] DOOR COMPROMISED");
    state.push_log("[SYSTEM] PROCESS TERMINATED");
    state.push_cue(CueRequest::new(CueId::Jumpscare));
}

/// The intruder is in the room. Survival requires the monitor off and the
/// pointer held still past the grace period while repeated checks resolve.
fn breached(state: &mut GameState, dt: f32) {
    let is_still =
        state.monitor == MonitorState::Off && state.pointer_still_time >= STEALTH_GRACE_PERIOD;

    if !state.roll_under(BREACH_RESOLVE_RATE * dt) {
        return;
    }

    if !is_still {
        state.push_log("[CRITICAL] MOVEMENT DETECTED");
        attack(state);
        return;
    }

    if state.roll_under(STEALTH_SURVIVAL_CHANCE) {
        repel(state, BREACH_REPEL_MIN, BREACH_REPEL_MIN + BREACH_REPEL_SPAN);
        state.push_log("[INFO] Intruder seems to have left.");
        state.push_log("[SYSTEM] Life signs remaining: 1");
        state.push_cue(CueRequest::new(CueId::AdversaryRetreat));
    } else {
        state.push_log("[ERROR] Unexpected audio output detected.");
        state.push_log("[CRITICAL] LOCATION REVEALED");
        state.push_cue(CueRequest::new(CueId::MusicBox));
        attack(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ContentData;
    use crate::state::{DoorState, Telegraph};

    fn approaching_state() -> GameState {
        let mut state = GameState::default()
            .with_seed(7, ContentData::load_embedded().unwrap());
        state.phase = Phase::Phase1;
        state.adversary = AdversaryState::Approaching;
        state
    }

    #[test]
    fn approach_moves_by_speed_times_dt() {
        let mut state = approaching_state();
        state.speed = 2.0;
        tick(&mut state, 0.5);
        assert!((state.distance - 99.0).abs() < 1e-4);
        assert!(state.threat > 0.0);
        assert_eq!(state.adversary, AdversaryState::Approaching);
    }

    #[test]
    fn telegraph_starts_at_attack_threshold() {
        let mut state = approaching_state();
        state.distance = ATTACK_THRESHOLD + 0.01;
        state.speed = 2.0;
        tick(&mut state, 0.05);
        assert_eq!(state.adversary, AdversaryState::Telegraphing);
        let telegraph = state.telegraph.expect("telegraph must be armed");
        assert!(telegraph.duration >= TELEGRAPH_MIN && telegraph.duration <= TELEGRAPH_MAX);
        assert_eq!(state.flashlight.strobe_intensity, 1.0);
        assert!(!state.cues.is_empty());
    }

    #[test]
    fn diversion_freezes_distance() {
        let mut state = approaching_state();
        state.active_diversion = Some(crate::state::ActiveDiversion {
            id: crate::state::DiversionId::Copy,
            remaining: 5.0,
        });
        tick(&mut state, 1.0);
        assert_eq!(state.distance, 100.0);
    }

    #[test]
    fn real_attack_with_secure_door_repels() {
        let mut state = approaching_state();
        state.adversary = AdversaryState::Telegraphing;
        state.time_elapsed = 10.0;
        state.telegraph = Some(Telegraph {
            start_time: 5.0,
            duration: 3.0,
            is_real: true,
        });
        state.door = DoorState::Closed;
        state.door_closed_duration = 1.2;

        tick(&mut state, 0.05);
        assert_eq!(state.adversary, AdversaryState::Approaching);
        assert!(state.telegraph.is_none());
        assert!(state.distance >= REPEL_DISTANCE_MIN && state.distance <= REPEL_DISTANCE_MAX);
    }

    #[test]
    fn real_attack_with_insecure_door_breaches() {
        let mut state = approaching_state();
        state.adversary = AdversaryState::Telegraphing;
        state.time_elapsed = 10.0;
        state.telegraph = Some(Telegraph {
            start_time: 5.0,
            duration: 3.0,
            is_real: true,
        });
        // Closed, but not long enough.
        state.door = DoorState::Closed;
        state.door_closed_duration = 0.4;

        tick(&mut state, 0.05);
        assert_eq!(state.adversary, AdversaryState::Breached);
        assert!(state.telegraph.is_none());
    }

    #[test]
    fn fake_attack_retreats_through_open_door() {
        let mut state = approaching_state();
        state.adversary = AdversaryState::Telegraphing;
        state.time_elapsed = 10.0;
        state.telegraph = Some(Telegraph {
            start_time: 5.0,
            duration: 3.0,
            is_real: false,
        });
        state.door = DoorState::Open;

        tick(&mut state, 0.05);
        assert_eq!(state.adversary, AdversaryState::Approaching);
        assert!(state.distance >= REPEL_DISTANCE_MIN);
        assert_ne!(state.phase, Phase::GameOver);
    }

    #[test]
    fn blackout_rush_closes_faster() {
        let mut normal = approaching_state();
        normal.speed = 2.0;
        tick(&mut normal, 1.0);

        let mut rushed = approaching_state();
        rushed.speed = 2.0;
        rushed.is_blackout = true;
        tick(&mut rushed, 1.0);

        assert!(rushed.distance < normal.distance);
    }

    #[test]
    fn attacking_ends_the_run() {
        let mut state = approaching_state();
        state.adversary = AdversaryState::Attacking;
        tick(&mut state, 0.05);
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.threat, 1.0);
    }

    #[test]
    fn breach_movement_is_fatal_once_checked() {
        let mut state = approaching_state();
        state.adversary = AdversaryState::Breached;
        state.monitor = MonitorState::On;
        state.pointer_still_time = 0.0;
        // Drive until a resolution check fires; seeded so this terminates.
        for _ in 0..10_000 {
            tick(&mut state, 0.05);
            if state.adversary != AdversaryState::Breached {
                break;
            }
        }
        assert_eq!(state.adversary, AdversaryState::Attacking);
        assert_eq!(state.phase, Phase::GameOver);
    }
}

//! Heat accumulation and the blackout transition.
//!
//! Heat rises while the monitor draws power and falls while it is off.
//! Crossing the threshold triggers a blackout. Every code path that can
//! start a blackout funnels through [`trigger_blackout`] so the forced
//! door-open, monitor-off, and intercom-stop side effects cannot drift
//! apart.

use crate::audio::{CueId, CueRequest};
use crate::constants::{
    BLACKOUT_DURATION, BLACKOUT_RESET_HEAT, BLACKOUT_THRESHOLD, HEAT_COMPILE_COST,
    HEAT_COOLING_RATE, HEAT_DOOR_HOLD_COST, HEAT_PASSIVE_RATE_ON, INTERCOM_DRAIN_RATE,
};
use crate::state::{DoorState, GameState, MonitorState};

/// Advance the heat system by one tick.
pub fn tick(state: &mut GameState, dt: f32) {
    // During blackout nothing accumulates; only the countdown runs.
    if state.is_blackout {
        state.blackout_timer -= dt;
        if state.blackout_timer <= 0.0 {
            state.is_blackout = false;
            state.blackout_timer = 0.0;
            state.heat = BLACKOUT_RESET_HEAT;
            state.push_log("[SYSTEM] Power restored");
        }
        return;
    }

    let heat_mul = state.heat_multiplier();
    let cool_mul = state.cooling_multiplier();

    match state.monitor {
        MonitorState::On | MonitorState::Booting => {
            state.heat += HEAT_PASSIVE_RATE_ON * heat_mul * dt;
        }
        MonitorState::Off => {
            state.heat = (state.heat - HEAT_COOLING_RATE * cool_mul * dt).max(0.0);
        }
    }

    // Holding the door shut is physical work.
    if state.is_door_held && state.monitor == MonitorState::Off {
        state.heat += HEAT_DOOR_HOLD_COST * heat_mul * dt;
    }

    if state.is_intercom_playing {
        state.heat += INTERCOM_DRAIN_RATE * heat_mul * dt;
    }

    if state.heat >= BLACKOUT_THRESHOLD {
        trigger_blackout(state, BLACKOUT_DURATION);
    }
}

/// Apply an instantaneous heat cost, scaled by puzzle progress. Inert
/// during an active blackout: heat is pinned at the threshold and the
/// timer must never restart.
pub fn add_heat(state: &mut GameState, amount: f32) {
    add_heat_raw(state, amount * state.heat_multiplier());
}

/// Apply an instantaneous heat cost without progress scaling. Owns the
/// threshold check so every overload path enters blackout the same way.
pub fn add_heat_raw(state: &mut GameState, amount: f32) {
    if state.is_blackout {
        return;
    }
    state.heat += amount;
    if state.heat >= BLACKOUT_THRESHOLD {
        trigger_blackout(state, BLACKOUT_DURATION);
    }
}

/// Instant heat surge for a full compile pass. Exposed for platform
/// layers that charge compilation as a power event; the core submit path
/// does not call this itself.
pub fn add_compile_heat(state: &mut GameState) {
    add_heat(state, HEAT_COMPILE_COST);
}

/// The single entry point into blackout. Forces the door open, kills the
/// monitor and intercom, and locks input until the timer runs out.
pub fn trigger_blackout(state: &mut GameState, duration: f32) {
    state.is_blackout = true;
    state.blackout_timer = duration;
    state.heat = BLACKOUT_THRESHOLD;
    state.monitor = MonitorState::Off;
    state.boot_timer = 0.0;
    state.door = DoorState::Open;
    state.door_closed_duration = 0.0;
    state.is_door_held = false;
    state.is_intercom_playing = false;
    // Cut any barrier or defense samples still sounding.
    state.push_cue(CueRequest::stop(CueId::Intercom));
    state.push_cue(CueRequest::stop(CueId::Close));
    state.push_cue(CueRequest::stop(CueId::DoorBang));
    state.push_log("[CRITICAL] BLACKOUT - Power overload!");
    state.push_log("[WARNING] Door controls disabled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ModuleId;

    #[test]
    fn monitor_on_accumulates_passively() {
        let mut state = GameState::default();
        tick(&mut state, 1.0);
        assert!((state.heat - HEAT_PASSIVE_RATE_ON).abs() < 1e-5);
    }

    #[test]
    fn monitor_off_cools_and_clamps_at_zero() {
        let mut state = GameState::default();
        state.monitor = MonitorState::Off;
        state.heat = 0.5;
        tick(&mut state, 1.0);
        assert!(state.heat < 0.5);
        tick(&mut state, 10.0);
        assert_eq!(state.heat, 0.0);
    }

    #[test]
    fn door_hold_costs_only_with_monitor_off() {
        let mut off = GameState::default();
        off.monitor = MonitorState::Off;
        off.heat = 50.0;
        off.is_door_held = true;
        tick(&mut off, 1.0);
        let expected = 50.0 - HEAT_COOLING_RATE + HEAT_DOOR_HOLD_COST;
        assert!((off.heat - expected).abs() < 1e-4);
    }

    #[test]
    fn threshold_triggers_blackout_with_forced_state() {
        let mut state = GameState::default();
        state.heat = 99.9;
        state.door = DoorState::Closed;
        state.door_closed_duration = 2.0;
        state.is_door_held = true;
        state.is_intercom_playing = true;
        tick(&mut state, 1.0);

        assert!(state.is_blackout);
        assert_eq!(state.heat, BLACKOUT_THRESHOLD);
        assert_eq!(state.blackout_timer, BLACKOUT_DURATION);
        assert_eq!(state.door, DoorState::Open);
        assert_eq!(state.door_closed_duration, 0.0);
        assert!(!state.is_door_held);
        assert_eq!(state.monitor, MonitorState::Off);
        assert!(!state.is_intercom_playing);
    }

    #[test]
    fn blackout_expires_to_reset_heat() {
        let mut state = GameState::default();
        trigger_blackout(&mut state, BLACKOUT_DURATION);
        for _ in 0..98 {
            tick(&mut state, 0.05);
            assert!(state.is_blackout);
            assert_eq!(state.heat, BLACKOUT_THRESHOLD);
        }
        tick(&mut state, 0.2);
        assert!(!state.is_blackout);
        assert_eq!(state.heat, BLACKOUT_RESET_HEAT);
    }

    #[test]
    fn add_heat_scales_with_progress() {
        let mut state = GameState::default();
        add_heat(&mut state, 10.0);
        assert!((state.heat - 10.0).abs() < 1e-5);
    }

    #[test]
    fn add_heat_is_inert_during_blackout() {
        let mut state = GameState::default();
        trigger_blackout(&mut state, BLACKOUT_DURATION);
        for _ in 0..60 {
            tick(&mut state, 0.05);
        }
        let timer = state.blackout_timer;
        assert!(timer < BLACKOUT_DURATION);

        // A mid-blackout cost must not re-arm the countdown.
        add_heat(&mut state, 10.0);
        assert_eq!(state.heat, BLACKOUT_THRESHOLD);
        assert_eq!(state.blackout_timer, timer);
        add_heat_raw(&mut state, 10.0);
        assert_eq!(state.heat, BLACKOUT_THRESHOLD);
        assert_eq!(state.blackout_timer, timer);
    }

    #[test]
    fn raw_heat_skips_progress_scaling() {
        let mut state = GameState::default();
        for id in [ModuleId::Shell, ModuleId::Gasp] {
            state.module_progress.get_mut(&id).unwrap().completed = true;
        }
        add_heat_raw(&mut state, 10.0);
        assert!((state.heat - 10.0).abs() < 1e-5);

        state.heat = 96.0;
        add_heat_raw(&mut state, 5.0);
        assert!(state.is_blackout);
        assert_eq!(state.heat, BLACKOUT_THRESHOLD);
    }

    #[test]
    fn blackout_emits_loop_stop_cues() {
        let mut state = GameState::default();
        state.is_intercom_playing = true;
        trigger_blackout(&mut state, BLACKOUT_DURATION);

        let stopped: Vec<CueId> = state
            .cues
            .iter()
            .filter(|c| c.stop)
            .map(|c| c.id)
            .collect();
        for id in [CueId::Intercom, CueId::Close, CueId::DoorBang] {
            assert!(stopped.contains(&id), "missing stop cue for {id:?}");
        }
    }

    #[test]
    fn compile_surge_can_tip_into_blackout() {
        let mut state = GameState::default();
        add_compile_heat(&mut state);
        assert!((state.heat - HEAT_COMPILE_COST).abs() < 1e-5);

        state.heat = 90.0;
        add_compile_heat(&mut state);
        assert!(state.is_blackout);
    }
}

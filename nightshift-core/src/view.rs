//! Monitor power management.
//!
//! ON -> OFF is instant; OFF -> ON goes through a BOOTING delay. Toggling
//! is locked out during blackout, and toggle attempts while BOOTING are
//! ignored.

use crate::audio::{CueId, CueRequest};
use crate::constants::{
    BOOT_DURATION, SCARE_BOOT_BASE, SCARE_BOOT_THREAT, SCARE_MONITOR_OFF_BASE,
    SCARE_MONITOR_OFF_THREAT,
};
use crate::state::{GameState, JumpscareId, MonitorState};

/// Whether the editor accepts input right now.
#[must_use]
pub fn can_code(state: &GameState) -> bool {
    state.monitor == MonitorState::On && !state.is_blackout
}

/// Whether the door responds to the player right now.
#[must_use]
pub fn can_control_door(state: &GameState) -> bool {
    state.monitor == MonitorState::Off && !state.is_blackout
}

/// Handle a monitor toggle request.
pub fn toggle_monitor(state: &mut GameState) {
    if state.is_blackout {
        return;
    }

    match state.monitor {
        MonitorState::On => {
            // Something may be standing behind the reflection.
            let chance = SCARE_MONITOR_OFF_BASE + state.threat * SCARE_MONITOR_OFF_THREAT;
            if state.roll_under(chance) {
                state.trigger_jumpscare(JumpscareId::MonitorReflection, 1.5);
                state.push_cue(CueRequest::new(CueId::BreathBehind));
            }
            state.monitor = MonitorState::Off;
            state.push_cue(CueRequest::with_volume(CueId::Close, 0.8));
        }
        MonitorState::Off => {
            state.monitor = MonitorState::Booting;
            state.boot_timer = BOOT_DURATION;
            let chance = SCARE_BOOT_BASE + state.threat * SCARE_BOOT_THREAT;
            if state.roll_under(chance) {
                state.trigger_jumpscare(JumpscareId::BootGlitch, 0.5);
                state.push_cue(CueRequest::with_volume(CueId::DigitalScream, 0.6));
            }
            state.push_cue(CueRequest::with_volume(CueId::Open, 0.8));
        }
        MonitorState::Booting => {}
    }
}

/// Advance the boot sequence timer.
pub fn tick_boot(state: &mut GameState, dt: f32) {
    if state.monitor != MonitorState::Booting {
        return;
    }
    state.boot_timer -= dt;
    if state.boot_timer <= 0.0 {
        state.monitor = MonitorState::On;
        state.boot_timer = 0.0;
    }
}

/// Fraction of the boot sequence already elapsed.
#[must_use]
pub fn boot_progress(state: &GameState) -> f32 {
    if state.monitor != MonitorState::Booting {
        return 1.0;
    }
    1.0 - state.boot_timer / BOOT_DURATION
}

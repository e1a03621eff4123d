//! Door barrier and the one-second pre-close rule.
//!
//! The door only responds while the monitor is off. A closed door blocks
//! an attack only if it has been continuously closed for at least
//! [`DOOR_SAFE_DURATION`] when the telegraph resolves.

use crate::audio::{CueId, CueRequest};
use crate::constants::{
    DOOR_SAFE_DURATION, HEAT_DOOR_CLOSE_COST, SCARE_DOOR_SLAM_BASE, SCARE_DOOR_SLAM_COST_FACTOR,
    SCARE_DOOR_SLAM_THREAT,
};
use crate::heat;
use crate::state::{DoorState, GameState, JumpscareId, MonitorState};
use crate::view;

/// Advance the door each tick: apply blackout forcing, track the closed
/// timer, and follow the hold input.
pub fn tick(state: &mut GameState, dt: f32) {
    // Blackout springs the door open and keeps it there.
    if state.is_blackout {
        if state.door == DoorState::Closed {
            state.door = DoorState::Open;
            state.door_closed_duration = 0.0;
        }
        return;
    }

    // With the monitor on, the door is out of reach but keeps its state.
    if state.monitor != MonitorState::Off {
        if state.door == DoorState::Closed {
            state.door_closed_duration += dt;
        }
        return;
    }

    if state.is_door_held {
        if state.door == DoorState::Open {
            state.door = DoorState::Closed;
            state.door_closed_duration = dt;
        } else {
            state.door_closed_duration += dt;
        }
    } else if state.door == DoorState::Closed {
        state.door = DoorState::Open;
        state.door_closed_duration = 0.0;
    }
}

/// Whether the door would block an attack resolving right now.
#[must_use]
pub fn is_secure(state: &GameState) -> bool {
    state.door == DoorState::Closed && state.door_closed_duration >= DOOR_SAFE_DURATION
}

/// Handle the player grabbing the door. Pays the instant close cost; on a
/// bad grab the door slams, which costs extra and draws attention.
pub fn grab_door(state: &mut GameState) {
    if !view::can_control_door(state) || state.is_door_held {
        return;
    }

    state.is_door_held = true;
    state.never_closed_door = false;

    let slam_chance = SCARE_DOOR_SLAM_BASE + state.threat * SCARE_DOOR_SLAM_THREAT;
    if state.roll_under(slam_chance) {
        heat::add_heat(state, HEAT_DOOR_CLOSE_COST * SCARE_DOOR_SLAM_COST_FACTOR);
        state.trigger_jumpscare(JumpscareId::DoorSlam, 0.5);
        state.push_cue(CueRequest::new(CueId::DoorSlam));
    } else {
        heat::add_heat(state, HEAT_DOOR_CLOSE_COST);
        state.push_cue(CueRequest::with_volume(CueId::Close, 0.8));
    }
}

/// Handle the player letting go of the door.
pub fn release_door(state: &mut GameState) {
    if state.is_door_held {
        state.is_door_held = false;
        state.push_cue(CueRequest::with_volume(CueId::Open, 0.8));
    }
}

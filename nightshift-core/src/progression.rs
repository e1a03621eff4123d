//! Phase gates and the final compile countdown.
//!
//! Phases only ever move forward: intro after the first diversion, the
//! mid-game gates on completed modules, and the final compile when the
//! last module lands. The compile is a timed endurance segment; surviving
//! it hands the run to the ending resolver.

use crate::audio::{CueId, CueRequest};
use crate::constants::{
    COMPILE_DURATION, COMPILE_MILESTONES, PHASE2_MODULE_REQUIREMENT, PHASE3_MODULE_REQUIREMENT,
    phase_speed,
};
use crate::ending;
use crate::state::{GameState, Phase};

/// Move to a new phase, retuning adversary speed and logging the entry.
pub fn set_phase(state: &mut GameState, phase: Phase) {
    if state.phase == phase {
        return;
    }
    state.phase = phase;
    state.speed = phase_speed(phase);

    if phase.is_gameplay() {
        state.push_log(format!("[SYSTEM] Entering {}...", phase.as_str().to_uppercase()));
    }
    if phase == Phase::FinalCompile {
        start_final_compile(state);
    }
}

/// Check the forward-only phase gates and advance if one is satisfied.
pub fn check_phase_transition(state: &mut GameState) {
    let completed = state.completed_module_count();

    match state.phase {
        Phase::Intro if state.total_diversions_assigned >= 1 => {
            set_phase(state, Phase::Phase1);
            state.push_log("[SYSTEM] Threat Level Increasing. Entering PHASE 1.");
        }
        Phase::Phase1 if completed >= PHASE2_MODULE_REQUIREMENT => {
            set_phase(state, Phase::Phase2);
            state.push_log("[SYSTEM] Security escalation detected. Entering PHASE 2.");
        }
        Phase::Phase2 if completed >= PHASE3_MODULE_REQUIREMENT => {
            set_phase(state, Phase::Phase3);
            state.push_log("[SYSTEM] CRITICAL: Zombie process proximity alert. Entering PHASE 3.");
        }
        _ => {}
    }
}

/// Enter the final compile: diversions lock out, the countdown arms, and
/// the adversary moves at full speed.
pub fn start_final_compile(state: &mut GameState) {
    state.phase = Phase::FinalCompile;
    state.diversions_disabled = true;
    state.compile_progress = 0.0;
    state.compile_time_remaining = COMPILE_DURATION;
    state.speed = phase_speed(Phase::FinalCompile);

    state.push_log("");
    state.push_log("[SYSTEM] ========================================");
    state.push_log("[COMPILE] INITIATING FINAL COMPILE...");
    state.push_log("[WARNING] All tasks disabled during compilation.");
    state.push_log("[WARNING] DO NOT INTERRUPT THE PROCESS.");
    state.push_log("[SYSTEM] ========================================");
}

/// Advance the compile countdown, logging milestones as they pass.
pub fn tick_compile(state: &mut GameState, dt: f32) {
    if state.phase != Phase::FinalCompile {
        return;
    }

    let new_remaining = state.compile_time_remaining - dt;
    let new_progress = 1.0 - new_remaining / COMPILE_DURATION;

    let old_progress = state.compile_progress;
    for milestone in COMPILE_MILESTONES {
        if old_progress < milestone && new_progress >= milestone {
            state.push_log(format!(
                "[COMPILE] {}% complete...",
                (milestone * 100.0) as u32
            ));
        }
    }

    if new_remaining <= 0.0 {
        state.compile_progress = 1.0;
        state.compile_time_remaining = 0.0;
        state.ending = Some(ending::resolve(state));
        state.phase = Phase::Ending;
        state.push_log("[COMPILE] 100% - COMPILE SUCCESSFUL");
        state.push_log("[SYSTEM] escape.exe ready");
        state.push_cue(CueRequest::new(CueId::CompileSuccess));
    } else {
        state.compile_progress = new_progress;
        state.compile_time_remaining = new_remaining;
    }
}

//! Centralized balance and tuning constants for the Nightshift simulation.
//!
//! These values define the deterministic math for the core loop. Keeping
//! them together ensures gameplay can only be adjusted via code changes
//! reviewed in version control, rather than through external assets.

use crate::state::Phase;

// Tick driver ---------------------------------------------------------------
/// Hard cap on per-tick delta time; bounds worst-case state change on hitches.
pub const MAX_DELTA_TIME: f32 = 0.05;

// Heat system ---------------------------------------------------------------
pub(crate) const HEAT_PASSIVE_RATE_ON: f32 = 1.8;
pub(crate) const HEAT_TYPING_COST: f32 = 0.9;
pub(crate) const HEAT_COMPILE_COST: f32 = 27.0;
pub(crate) const HEAT_DOOR_CLOSE_COST: f32 = 15.0;
pub(crate) const HEAT_DOOR_HOLD_COST: f32 = 0.7;
pub(crate) const HEAT_COOLING_RATE: f32 = 0.6;
pub(crate) const HEAT_SCALING_MAX: f32 = 1.5;
pub(crate) const HEAT_SCALING_MIN_COOLING: f32 = 0.8;
pub(crate) const BLACKOUT_THRESHOLD: f32 = 100.0;
pub(crate) const BLACKOUT_DURATION: f32 = 5.0;
pub(crate) const BLACKOUT_RESET_HEAT: f32 = 50.0;

// Monitor boot --------------------------------------------------------------
pub(crate) const BOOT_DURATION: f32 = 1.5;

// Door ----------------------------------------------------------------------
/// Continuous closed time required before an attack resolves as blocked.
pub(crate) const DOOR_SAFE_DURATION: f32 = 1.0;

// Adversary -----------------------------------------------------------------
pub(crate) const INITIAL_DISTANCE: f32 = 100.0;
pub(crate) const INITIAL_SPEED: f32 = 1.5;
pub(crate) const SPEED_CAP: f32 = 5.0;
pub(crate) const ATTACK_THRESHOLD: f32 = 10.0;
pub(crate) const TELEGRAPH_MIN: f32 = 3.0;
pub(crate) const TELEGRAPH_MAX: f32 = 5.0;
pub(crate) const REAL_ATTACK_CHANCE: f32 = 0.6;
pub(crate) const REPEL_DISTANCE_MIN: f32 = 60.0;
pub(crate) const REPEL_DISTANCE_MAX: f32 = 80.0;
pub(crate) const BLACKOUT_RUSH_SPEED: f32 = 6.0;
pub(crate) const THREAT_EASE_EXPONENT: f32 = 1.6;

// Breach / stealth ----------------------------------------------------------
pub(crate) const BREACH_RESOLVE_RATE: f32 = 0.2;
pub(crate) const STEALTH_SURVIVAL_CHANCE: f32 = 0.7;
pub(crate) const STEALTH_GRACE_PERIOD: f32 = 0.5;
pub(crate) const STEALTH_STILL_THRESHOLD: f32 = 10.0;
pub(crate) const BREACH_REPEL_MIN: f32 = 70.0;
pub(crate) const BREACH_REPEL_SPAN: f32 = 20.0;

// Diversions ----------------------------------------------------------------
pub(crate) const LEARNING_DECAY: f32 = 0.82;

// Intercom defense ----------------------------------------------------------
pub(crate) const INTERCOM_INITIAL_COST: f32 = 5.0;
pub(crate) const INTERCOM_DRAIN_RATE: f32 = 1.4;
pub(crate) const INTERCOM_DISTANCE_BOOST: f32 = 60.0;
pub(crate) const INTERCOM_VARIANCE: f32 = 20.0;
pub(crate) const INTERCOM_PLAYBACK_SECS: f64 = 15.0;

// Final compile -------------------------------------------------------------
pub(crate) const COMPILE_DURATION: f32 = 60.0;
pub(crate) const COMPILE_MILESTONES: [f32; 5] = [0.1, 0.25, 0.5, 0.75, 0.9];

// Effects -------------------------------------------------------------------
pub(crate) const MAX_GLITCH_INTENSITY: f32 = 0.3;
pub(crate) const SPIKE_DECAY_RATE: f32 = 0.3;
pub(crate) const FLASHLIGHT_BASE_RADIUS: f32 = 400.0;
pub(crate) const FLASHLIGHT_THREAT_REDUCTION: f32 = 120.0;
pub(crate) const FLICKER_FACTOR: f32 = 0.3;
pub(crate) const STROBE_DECAY_RATE: f32 = 2.0;

// Audio mix -----------------------------------------------------------------
pub(crate) const AMBIENCE_BASE: f32 = 0.3;
pub(crate) const AMBIENCE_THREAT_DUCK: f32 = 0.1;
pub(crate) const HEARTBEAT_BASE: f32 = 0.1;
pub(crate) const HEARTBEAT_THREAT_GAIN: f32 = 0.6;
pub(crate) const FOOTSTEPS_BASE: f32 = 0.1;
pub(crate) const FOOTSTEPS_THREAT_GAIN: f32 = 0.5;
pub(crate) const BREATHING_THRESHOLD: f32 = 0.5;
pub(crate) const BREATHING_ABOVE_GAIN: f32 = 0.8;
pub(crate) const ADVERSARY_BREATH_THRESHOLD: f32 = 0.7;
pub(crate) const ADVERSARY_BREATH_MAX: f32 = 1.0;
pub(crate) const HEAT_DRONE_ONSET: f32 = 0.6;
pub(crate) const RATE_THREAT_GAIN: f32 = 0.3;
pub(crate) const MASTER_VOLUME: f32 = 1.0;

// Jumpscares (per-second sampling rates; scaled by dt each tick) ------------
pub(crate) const SCARE_RATE_HALL_FACE: f32 = 0.018;
pub(crate) const SCARE_RATE_BLOODY_BOARD: f32 = 0.018;
pub(crate) const SCARE_RATE_SERVER_EYES: f32 = 0.024;
pub(crate) const SCARE_RATE_MONITOR_CURSOR: f32 = 0.018;
pub(crate) const SCARE_MONITOR_OFF_BASE: f32 = 0.3;
pub(crate) const SCARE_MONITOR_OFF_THREAT: f32 = 0.4;
pub(crate) const SCARE_BOOT_BASE: f32 = 0.1;
pub(crate) const SCARE_BOOT_THREAT: f32 = 0.2;
pub(crate) const SCARE_DOOR_SLAM_BASE: f32 = 0.15;
pub(crate) const SCARE_DOOR_SLAM_THREAT: f32 = 0.1;
pub(crate) const SCARE_DOOR_SLAM_COST_FACTOR: f32 = 1.5;

// Terminal ------------------------------------------------------------------
pub(crate) const TERMINAL_MAX_LOGS: usize = 50;

// Phase tuning --------------------------------------------------------------

/// Adversary base speed per phase. Terminal and pre-game phases hold at zero.
pub(crate) const fn phase_speed(phase: Phase) -> f32 {
    match phase {
        Phase::Intro => 1.5,
        Phase::Phase1 => 2.0,
        Phase::Phase2 => 2.8,
        Phase::Phase3 => 3.5,
        Phase::FinalCompile => 5.0,
        Phase::Loading | Phase::Start | Phase::Ending | Phase::GameOver => 0.0,
    }
}

/// Distance lost on a wrong puzzle submission, by phase.
pub(crate) const fn fail_penalty(phase: Phase) -> f32 {
    match phase {
        Phase::Intro => 6.0,
        Phase::Phase1 => 8.0,
        Phase::Phase2 => 10.0,
        Phase::Phase3 => 12.0,
        Phase::FinalCompile => 15.0,
        Phase::Loading | Phase::Start | Phase::Ending | Phase::GameOver => 0.0,
    }
}

/// Completed-module counts gating the mid-game phase transitions.
pub(crate) const PHASE2_MODULE_REQUIREMENT: u32 = 2;
pub(crate) const PHASE3_MODULE_REQUIREMENT: u32 = 3;

// Ending thresholds ---------------------------------------------------------
pub(crate) const GOOD_ENDING_MAX_MISTAKES: u32 = 3;
pub(crate) const GOOD_ENDING_MAX_HINTS: u32 = 2;
pub(crate) const NEUTRAL_ENDING_MAX_MISTAKES: u32 = 8;

// Failed-submit run cue -----------------------------------------------------
pub(crate) const RUN_CUE_BASE_CHANCE: f32 = 0.1;
pub(crate) const RUN_CUE_THREAT_GAIN: f32 = 0.8;

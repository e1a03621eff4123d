//! Audio mix derivation and the cue vocabulary.
//!
//! The mix is a pure function of phase, adversary distance, heat, and
//! blackout status. Discrete sounds are requested as [`CueRequest`]s on the
//! aggregate's cue buffer; the platform layer drains and plays them.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADVERSARY_BREATH_MAX, ADVERSARY_BREATH_THRESHOLD, AMBIENCE_BASE, AMBIENCE_THREAT_DUCK,
    BREATHING_ABOVE_GAIN, BREATHING_THRESHOLD, FOOTSTEPS_BASE, FOOTSTEPS_THREAT_GAIN,
    HEARTBEAT_BASE, HEARTBEAT_THREAT_GAIN, HEAT_DRONE_ONSET, MASTER_VOLUME, RATE_THREAT_GAIN,
    THREAT_EASE_EXPONENT,
};
use crate::state::{GameState, Phase};

/// Continuous loop volumes and playback rates, all in [0, 1] except the
/// rates which sit at 1.0 or above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMix {
    pub ambience: f32,
    pub heartbeat: f32,
    pub footsteps: f32,
    pub breathing: f32,
    pub adversary_breath: f32,
    pub heat_drone: f32,
    pub heartbeat_rate: f32,
    pub breathing_rate: f32,
    /// Eased threat, exposed for the platform layer's own sweeteners.
    pub presence: f32,
    pub master: f32,
}

impl Default for AudioMix {
    fn default() -> Self {
        Self {
            ambience: AMBIENCE_BASE,
            heartbeat: HEARTBEAT_BASE,
            footsteps: FOOTSTEPS_BASE,
            breathing: 0.0,
            adversary_breath: 0.0,
            heat_drone: 0.0,
            heartbeat_rate: 1.0,
            breathing_rate: 1.0,
            presence: 0.0,
            master: MASTER_VOLUME,
        }
    }
}

/// Named one-shot and loop sounds the platform layer knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CueId {
    Typing,
    Error,
    Success,
    Glitch,
    DoorCreak,
    TaskAssign,
    TaskReturn,
    Jumpscare,
    CompileStart,
    CompileSuccess,
    Run,
    Whisper,
    DoorBang,
    Slithering,
    Click,
    Open,
    Close,
    Knocks,
    Intercom,
    DoorBurst,
    AdversaryRetreat,
    MusicBox,
    DigitalScream,
    BreathBehind,
    DoorSlam,
    JumpscareSting,
    ManyWhispers,
    DoorRattle,
    Growl,
    Scraping,
    VoiceMom,
    VoiceChild,
    VoiceMan,
}

/// Warning sounds the telegraph picks from at random.
pub(crate) const TELEGRAPH_CUES: [CueId; 6] = [
    CueId::DoorRattle,
    CueId::Growl,
    CueId::Scraping,
    CueId::VoiceMom,
    CueId::VoiceChild,
    CueId::VoiceMan,
];

/// A playback request with its volume, or a forced stop of whatever
/// sample with this id is still sounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueRequest {
    pub id: CueId,
    pub volume: f32,
    pub stop: bool,
}

impl CueRequest {
    #[must_use]
    pub const fn new(id: CueId) -> Self {
        Self {
            id,
            volume: 1.0,
            stop: false,
        }
    }

    #[must_use]
    pub const fn with_volume(id: CueId, volume: f32) -> Self {
        Self {
            id,
            volume,
            stop: false,
        }
    }

    /// Request that an in-flight sample of this id be cut immediately.
    #[must_use]
    pub const fn stop(id: CueId) -> Self {
        Self {
            id,
            volume: 0.0,
            stop: true,
        }
    }
}

fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Derive the loop mix from the current aggregate.
#[must_use]
pub fn compute_mix(state: &GameState) -> AudioMix {
    // Outside gameplay the loops fall silent except for base ambience.
    if matches!(
        state.phase,
        Phase::Loading | Phase::Start | Phase::Ending | Phase::GameOver
    ) {
        return AudioMix {
            ambience: AMBIENCE_BASE,
            heartbeat: 0.0,
            footsteps: 0.0,
            breathing: 0.0,
            adversary_breath: 0.0,
            heat_drone: 0.0,
            heartbeat_rate: 1.0,
            breathing_rate: 1.0,
            presence: 0.0,
            master: state.audio_mix.master,
        };
    }

    let threat = 1.0 - state.distance / 100.0;
    let eased = threat.max(0.0).powf(THREAT_EASE_EXPONENT);

    let mut ambience = clamp01(AMBIENCE_BASE - eased * AMBIENCE_THREAT_DUCK);
    let heartbeat = clamp01(HEARTBEAT_BASE + eased * HEARTBEAT_THREAT_GAIN);
    let footsteps = clamp01(FOOTSTEPS_BASE + eased * FOOTSTEPS_THREAT_GAIN);

    // Breathing keys off raw threat with a hard onset.
    let breathing = if threat < BREATHING_THRESHOLD {
        0.0
    } else {
        clamp01(BREATHING_ABOVE_GAIN * (threat - BREATHING_THRESHOLD) / (1.0 - BREATHING_THRESHOLD))
    };

    // The server hum dies with the power.
    if state.is_blackout {
        ambience = 0.0;
    }

    // High heat bleeds a stress drone into the ambience bed.
    let heat_ratio = state.heat / 100.0;
    let heat_drone = if heat_ratio > HEAT_DRONE_ONSET {
        let stress = ((heat_ratio - HEAT_DRONE_ONSET) / (1.0 - HEAT_DRONE_ONSET)).powi(2);
        ambience = (ambience + stress * 0.4).min(1.0);
        stress
    } else {
        0.0
    };

    let adversary_breath = if eased > ADVERSARY_BREATH_THRESHOLD {
        ((eased - ADVERSARY_BREATH_THRESHOLD) / (1.0 - ADVERSARY_BREATH_THRESHOLD)).powi(2)
            * ADVERSARY_BREATH_MAX
    } else {
        0.0
    };

    AudioMix {
        ambience,
        heartbeat,
        footsteps,
        breathing,
        adversary_breath,
        heat_drone,
        heartbeat_rate: 1.0 + eased * RATE_THREAT_GAIN,
        breathing_rate: 1.0 + eased * RATE_THREAT_GAIN,
        presence: eased,
        master: state.audio_mix.master,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gameplay_state(distance: f32) -> GameState {
        let mut state = GameState::default();
        state.phase = Phase::Phase1;
        state.distance = distance;
        state
    }

    #[test]
    fn loops_silent_outside_gameplay() {
        let mut state = GameState::default();
        state.phase = Phase::GameOver;
        state.distance = 5.0;
        let mix = compute_mix(&state);
        assert_eq!(mix.heartbeat, 0.0);
        assert_eq!(mix.footsteps, 0.0);
        assert_eq!(mix.ambience, AMBIENCE_BASE);
    }

    #[test]
    fn heartbeat_rises_with_threat() {
        let far = compute_mix(&gameplay_state(100.0));
        let near = compute_mix(&gameplay_state(10.0));
        assert!(near.heartbeat > far.heartbeat);
        assert!(near.heartbeat_rate > far.heartbeat_rate);
        assert!(near.ambience < far.ambience);
    }

    #[test]
    fn breathing_has_hard_onset() {
        // threat 0.4: below the 0.5 threshold
        let below = compute_mix(&gameplay_state(60.0));
        assert_eq!(below.breathing, 0.0);
        // threat 0.75: above it
        let above = compute_mix(&gameplay_state(25.0));
        assert!((above.breathing - 0.8 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn blackout_kills_ambience() {
        let mut state = gameplay_state(80.0);
        state.is_blackout = true;
        assert_eq!(compute_mix(&state).ambience, 0.0);
    }

    #[test]
    fn heat_drone_rises_above_sixty_percent() {
        let mut state = gameplay_state(100.0);
        state.heat = 50.0;
        assert_eq!(compute_mix(&state).heat_drone, 0.0);
        state.heat = 80.0;
        let mix = compute_mix(&state);
        assert!((mix.heat_drone - 0.25).abs() < 1e-6);
    }

    #[test]
    fn all_channels_stay_in_range() {
        for d in 0..=100 {
            let mix = compute_mix(&gameplay_state(d as f32));
            for v in [
                mix.ambience,
                mix.heartbeat,
                mix.footsteps,
                mix.breathing,
                mix.adversary_breath,
                mix.heat_drone,
            ] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}

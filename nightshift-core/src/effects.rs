//! Derived visual effect intensities.
//!
//! Glitch and flashlight values are pure functions of eased threat plus a
//! few decaying transients (spike, strobe). The rendering layer reads them
//! as-is; nothing here feeds back into gameplay.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FLASHLIGHT_BASE_RADIUS, FLASHLIGHT_THREAT_REDUCTION, FLICKER_FACTOR, MAX_GLITCH_INTENSITY,
    SPIKE_DECAY_RATE, STROBE_DECAY_RATE,
};
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlitchState {
    /// Baseline shader intensity, recomputed from threat every tick.
    pub intensity: f32,
    /// Transient burst on top of the baseline; decays toward zero.
    pub spike: f32,
    /// Input delay in seconds imposed by a diversion side effect.
    pub input_lag: f32,
    /// Cursor inversion strength imposed by a diversion side effect.
    pub cursor_invert: f32,
}

impl Default for GlitchState {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            spike: 0.0,
            input_lag: 0.0,
            cursor_invert: 0.0,
        }
    }
}

impl GlitchState {
    /// Combined intensity for the renderer, clamped to 1.
    #[must_use]
    pub fn total(&self) -> f32 {
        (self.intensity + self.spike).min(1.0)
    }

    /// Add a transient burst, saturating at full intensity.
    pub fn add_spike(&mut self, amount: f32) {
        self.spike = (self.spike + amount).min(1.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashlightState {
    pub enabled: bool,
    pub radius: f32,
    pub flicker_intensity: f32,
    /// Set to full on telegraph entry, decays quickly.
    pub strobe_intensity: f32,
}

impl Default for FlashlightState {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: FLASHLIGHT_BASE_RADIUS,
            flicker_intensity: 0.0,
            strobe_intensity: 0.0,
        }
    }
}

/// Recompute derived effects from the current eased threat and decay the
/// transient channels.
pub fn tick(state: &mut GameState, dt: f32) {
    let eased = state.threat_eased;

    state.glitch.intensity = eased * MAX_GLITCH_INTENSITY;
    state.glitch.spike = (state.glitch.spike - SPIKE_DECAY_RATE * dt).max(0.0);

    state.flashlight.radius = FLASHLIGHT_BASE_RADIUS - eased * FLASHLIGHT_THREAT_REDUCTION;
    state.flashlight.flicker_intensity = eased * FLICKER_FACTOR;
    state.flashlight.strobe_intensity =
        (state.flashlight.strobe_intensity - STROBE_DECAY_RATE * dt).max(0.0);
}

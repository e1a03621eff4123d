//! Shared aggregate state for the night-shift simulation.
//!
//! One `GameState` exists per run. It is mutated only through the ordered
//! tick sequence and through discrete intent dispatch; external readers
//! treat it as an immutable snapshot between ticks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::audio::{AudioMix, CueRequest};
use crate::constants::{INITIAL_DISTANCE, INITIAL_SPEED, TERMINAL_MAX_LOGS};
use crate::data::ContentData;
use crate::effects::{FlashlightState, GlitchState};

/// Top-level run phase. Drives which subsystems run and the adversary's
/// base speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Loading,
    #[default]
    Start,
    Intro,
    Phase1,
    Phase2,
    Phase3,
    FinalCompile,
    Ending,
    GameOver,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Start => "start",
            Self::Intro => "intro",
            Self::Phase1 => "phase1",
            Self::Phase2 => "phase2",
            Self::Phase3 => "phase3",
            Self::FinalCompile => "finalCompile",
            Self::Ending => "ending",
            Self::GameOver => "gameOver",
        }
    }

    /// Phases in which the tick sequence runs at all.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Loading | Self::Start)
    }

    /// Phases in which the player can act and the adversary advances.
    #[must_use]
    pub const fn is_gameplay(self) -> bool {
        matches!(
            self,
            Self::Intro | Self::Phase1 | Self::Phase2 | Self::Phase3 | Self::FinalCompile
        )
    }

    /// Terminal phases require an explicit restart to leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ending | Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monitor power state. OFF is required to control the door; ON is
/// required to submit puzzle answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorState {
    #[default]
    On,
    Off,
    Booting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorState {
    #[default]
    Open,
    Closed,
}

/// Which part of the room the player is facing. Presentation-level, but
/// tracked here for the secret-ending stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Focus {
    #[default]
    Monitor,
    Door,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdversaryState {
    #[default]
    Idle,
    Approaching,
    Telegraphing,
    Attacking,
    Breached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingKind {
    Good,
    Neutral,
    Bad,
    Secret,
}

impl EndingKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Neutral => "neutral",
            Self::Bad => "bad",
            Self::Secret => "secret",
        }
    }
}

/// Identifier for a diversion (background task) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiversionId {
    Copy,
    ServerCheck,
    CodeReview,
    PacketCapture,
    GarbageCollection,
}

impl DiversionId {
    pub const ALL: [Self; 5] = [
        Self::Copy,
        Self::ServerCheck,
        Self::CodeReview,
        Self::PacketCapture,
        Self::GarbageCollection,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::ServerCheck => "serverCheck",
            Self::CodeReview => "codeReview",
            Self::PacketCapture => "packetCapture",
            Self::GarbageCollection => "garbageCollection",
        }
    }
}

impl fmt::Display for DiversionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiversionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Self::Copy),
            "serverCheck" => Ok(Self::ServerCheck),
            "codeReview" => Ok(Self::CodeReview),
            "packetCapture" => Ok(Self::PacketCapture),
            "garbageCollection" => Ok(Self::GarbageCollection),
            _ => Err(()),
        }
    }
}

/// Identifier for a sequential puzzle module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleId {
    #[serde(rename = "THE_SHELL")]
    Shell,
    #[serde(rename = "THE_GASP")]
    Gasp,
    #[serde(rename = "THE_PARASITE")]
    Parasite,
    #[serde(rename = "THE_MIRROR")]
    Mirror,
    #[serde(rename = "THE_ASCENSION")]
    Ascension,
}

impl ModuleId {
    pub const ALL: [Self; 5] = [
        Self::Shell,
        Self::Gasp,
        Self::Parasite,
        Self::Mirror,
        Self::Ascension,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "THE_SHELL",
            Self::Gasp => "THE_GASP",
            Self::Parasite => "THE_PARASITE",
            Self::Mirror => "THE_MIRROR",
            Self::Ascension => "THE_ASCENSION",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-flight warning window. Present exactly while the adversary is
/// TELEGRAPHING.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telegraph {
    /// Game time at which the telegraph began.
    pub start_time: f64,
    pub duration: f32,
    pub is_real: bool,
}

impl Telegraph {
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f32 {
        (now - self.start_time).max(0.0) as f32
    }

    #[must_use]
    pub fn remaining(&self, now: f64) -> f32 {
        (self.duration - self.elapsed(now)).max(0.0)
    }
}

/// The currently running diversion, if any. While present, adversary
/// distance is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDiversion {
    pub id: DiversionId,
    pub remaining: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub step_index: usize,
    pub completed: bool,
    pub mistakes: u32,
}

/// Feedback from the most recent code submission, for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedback {
    pub success: bool,
    pub step_id: String,
    /// Monotonic counter so identical consecutive results still register.
    pub sequence: u64,
}

/// Brief visual interruptions sampled stochastically or triggered by
/// player interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JumpscareId {
    MonitorReflection,
    BootGlitch,
    DoorSlam,
    HallwayFace,
    BloodyBoard,
    ServerEyes,
    MonitorCursor,
}

/// One-shot effect scheduled against game time and drained at the start
/// of each tick. Replaces wall-clock timer callbacks so state changes
/// stay tick-synchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OneShotEffect {
    ClearJumpscare,
    EndIntercom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEffect {
    pub at: f64,
    pub effect: OneShotEffect,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    pub seed: u64,
    pub time_elapsed: f64,

    // Heat system
    pub heat: f32,
    pub is_blackout: bool,
    pub blackout_timer: f32,

    // View system
    pub monitor: MonitorState,
    pub boot_timer: f32,
    pub focus: Focus,

    // Door system
    pub door: DoorState,
    pub is_door_held: bool,
    pub door_closed_duration: f32,

    // Adversary
    pub adversary: AdversaryState,
    pub distance: f32,
    pub speed: f32,
    pub threat: f32,
    pub threat_eased: f32,
    pub telegraph: Option<Telegraph>,

    // Diversions
    pub active_diversion: Option<ActiveDiversion>,
    pub diversion_cooldowns: HashMap<DiversionId, f32>,
    pub diversion_usage: HashMap<DiversionId, u32>,
    pub diversions_disabled: bool,
    pub total_diversions_assigned: u32,

    // Puzzles
    pub current_module_index: usize,
    pub module_progress: HashMap<ModuleId, ModuleProgress>,
    pub editor_text: String,
    pub hint_tokens: u32,
    pub total_mistakes: u32,
    pub total_hints_used: u32,
    pub last_submit: Option<SubmitFeedback>,
    pub submit_sequence: u64,

    // Run stats, consumed only by the ending resolver
    pub never_closed_door: bool,
    pub used_special_diversion: bool,
    pub never_looked_at_door: bool,

    // Derived effects
    pub glitch: GlitchState,
    pub flashlight: FlashlightState,

    // Audio
    pub audio_mix: AudioMix,
    #[serde(skip)]
    pub cues: SmallVec<[CueRequest; 8]>,

    // Final compile
    pub compile_progress: f32,
    pub compile_time_remaining: f32,

    // Stealth
    pub pointer_still_time: f32,
    pub last_pointer: (f32, f32),

    // Intercom defense
    pub is_intercom_playing: bool,

    // Jumpscares
    pub active_jumpscare: Option<JumpscareId>,
    pub triggered_jumpscares: Vec<JumpscareId>,

    // Ending
    pub ending: Option<EndingKind>,

    // Terminal
    pub terminal_logs: Vec<String>,

    // One-shot effects keyed by game time
    pub scheduled: Vec<ScheduledEffect>,

    #[serde(skip)]
    pub rng: Option<ChaCha20Rng>,
    #[serde(skip)]
    pub content: Option<ContentData>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: Phase::Start,
            seed: 0,
            time_elapsed: 0.0,
            heat: 0.0,
            is_blackout: false,
            blackout_timer: 0.0,
            monitor: MonitorState::On,
            boot_timer: 0.0,
            focus: Focus::Monitor,
            door: DoorState::Open,
            is_door_held: false,
            door_closed_duration: 0.0,
            adversary: AdversaryState::Idle,
            distance: INITIAL_DISTANCE,
            speed: INITIAL_SPEED,
            threat: 0.0,
            threat_eased: 0.0,
            telegraph: None,
            active_diversion: None,
            diversion_cooldowns: DiversionId::ALL.iter().map(|id| (*id, 0.0)).collect(),
            diversion_usage: DiversionId::ALL.iter().map(|id| (*id, 0)).collect(),
            diversions_disabled: false,
            total_diversions_assigned: 0,
            current_module_index: 0,
            module_progress: ModuleId::ALL
                .iter()
                .map(|id| (*id, ModuleProgress::default()))
                .collect(),
            editor_text: String::new(),
            hint_tokens: 0,
            total_mistakes: 0,
            total_hints_used: 0,
            last_submit: None,
            submit_sequence: 0,
            never_closed_door: true,
            used_special_diversion: false,
            never_looked_at_door: true,
            glitch: GlitchState::default(),
            flashlight: FlashlightState::default(),
            audio_mix: AudioMix::default(),
            cues: SmallVec::new(),
            compile_progress: 0.0,
            compile_time_remaining: crate::constants::COMPILE_DURATION,
            pointer_still_time: 0.0,
            last_pointer: (0.0, 0.0),
            is_intercom_playing: false,
            active_jumpscare: None,
            triggered_jumpscares: Vec::new(),
            ending: None,
            terminal_logs: Vec::new(),
            scheduled: Vec::new(),
            rng: None,
            content: None,
        }
    }
}

impl GameState {
    /// Seed the aggregate's RNG and attach content; used at game creation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64, content: ContentData) -> Self {
        self.seed = seed;
        self.rng = Some(ChaCha20Rng::seed_from_u64(seed));
        self.content = Some(content);
        self
    }

    /// Reset the aggregate wholesale to the initial state, preserving
    /// content and reseeding the RNG from the stored seed.
    pub fn restart(&mut self) {
        let content = self.content.take();
        let seed = self.seed;
        *self = Self::default();
        self.seed = seed;
        self.rng = Some(ChaCha20Rng::seed_from_u64(seed));
        self.content = content;
    }

    /// Append a line to the capped terminal log.
    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.terminal_logs.len() >= TERMINAL_MAX_LOGS {
            let excess = self.terminal_logs.len() + 1 - TERMINAL_MAX_LOGS;
            self.terminal_logs.drain(..excess);
        }
        self.terminal_logs.push(line.into());
    }

    /// Queue a cue for the audio collaborator; drained by the driver.
    pub fn push_cue(&mut self, cue: CueRequest) {
        self.cues.push(cue);
    }

    /// Number of puzzle modules completed so far; drives heat scaling and
    /// the mid-game phase gates.
    #[must_use]
    pub fn completed_module_count(&self) -> u32 {
        self.module_progress
            .values()
            .filter(|p| p.completed)
            .count() as u32
    }

    /// Heat accumulation multiplier from puzzle progress.
    #[must_use]
    pub fn heat_multiplier(&self) -> f32 {
        let completed = self.completed_module_count() as f32;
        crate::constants::HEAT_SCALING_MAX.min(1.0 + completed * 0.1)
    }

    /// Cooling multiplier from puzzle progress.
    #[must_use]
    pub fn cooling_multiplier(&self) -> f32 {
        let completed = self.completed_module_count() as f32;
        crate::constants::HEAT_SCALING_MIN_COOLING.max(1.0 - completed * 0.04)
    }

    /// Uniform sample in [0, 1). Falls back to the midpoint when no RNG is
    /// attached (bare test states).
    pub(crate) fn roll(&mut self) -> f32 {
        self.rng.as_mut().map_or(0.5, |rng| rng.random())
    }

    /// Uniform sample in [lo, hi).
    pub(crate) fn roll_range(&mut self, lo: f32, hi: f32) -> f32 {
        self.rng
            .as_mut()
            .map_or((lo + hi) * 0.5, |rng| rng.random_range(lo..hi))
    }

    /// Bernoulli trial with probability `p`.
    pub(crate) fn roll_under(&mut self, p: f32) -> bool {
        self.roll() < p
    }

    /// Activate a jumpscare and schedule its clearance.
    pub(crate) fn trigger_jumpscare(&mut self, id: JumpscareId, duration_secs: f64) {
        self.active_jumpscare = Some(id);
        self.triggered_jumpscares.push(id);
        let at = self.time_elapsed + duration_secs;
        self.scheduled.push(ScheduledEffect {
            at,
            effect: OneShotEffect::ClearJumpscare,
        });
    }

    /// Register a one-shot effect to fire once game time reaches `at`.
    pub(crate) fn schedule(&mut self, at: f64, effect: OneShotEffect) {
        self.scheduled.push(ScheduledEffect { at, effect });
    }
}

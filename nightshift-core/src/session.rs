//! The session driver: fixed tick order and discrete intent dispatch.
//!
//! A [`Session`] owns the aggregate outright. The embedding platform calls
//! [`Session::tick`] once per frame and [`Session::dispatch`] for player
//! input; nothing else mutates the state. Invalid intents are silently
//! ignored so the platform layer never needs to pre-validate.

use log::{debug, trace};
use smallvec::SmallVec;

use crate::audio::{self, CueId, CueRequest};
use crate::constants::{
    INTERCOM_DISTANCE_BOOST, INTERCOM_INITIAL_COST, INTERCOM_PLAYBACK_SECS, INTERCOM_VARIANCE,
    MAX_DELTA_TIME, SCARE_RATE_BLOODY_BOARD, SCARE_RATE_HALL_FACE, SCARE_RATE_MONITOR_CURSOR,
    SCARE_RATE_SERVER_EYES, STEALTH_STILL_THRESHOLD, phase_speed,
};
use crate::data::ContentData;
use crate::state::{
    DiversionId, Focus, GameState, JumpscareId, MonitorState, OneShotEffect, Phase,
};
use crate::{adversary, diversions, door, effects, heat, progression, puzzles, view};

/// A discrete player input. Invalid or out-of-phase intents are ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    StartGame,
    Restart,
    ToggleMonitor,
    GrabDoor,
    ReleaseDoor,
    AssignDiversion(DiversionId),
    EditCode(String),
    SubmitCode,
    UseHint,
    UseIntercom,
    LookAt(Focus),
    PointerMoved { x: f32, y: f32 },
}

/// One run of the night shift, from boot banner to ending.
#[derive(Debug)]
pub struct Session {
    state: GameState,
}

impl Session {
    #[must_use]
    pub fn new(seed: u64, content: ContentData) -> Self {
        Self {
            state: GameState::default().with_seed(seed, content),
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Drain the cue buffer for the platform audio layer.
    pub fn take_cues(&mut self) -> SmallVec<[CueRequest; 8]> {
        std::mem::take(&mut self.state.cues)
    }

    /// Advance the simulation by one frame. `dt` is clamped so a hitch
    /// can never move the world more than 50 ms at once.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_DELTA_TIME);
        let state = &mut self.state;

        if !state.phase.is_active() {
            return;
        }

        state.time_elapsed += f64::from(dt);
        drain_scheduled(state);

        if state.phase.is_gameplay() {
            view::tick_boot(state, dt);
            heat::tick(state, dt);
            door::tick(state, dt);
            adversary::tick(state, dt);
            effects::tick(state, dt);
            state.audio_mix = audio::compute_mix(state);
            progression::check_phase_transition(state);
            diversions::tick(state, dt);
            progression::tick_compile(state, dt);
            tick_stealth(state, dt);
            sample_ambient_jumpscare(state, dt);
        } else {
            // Terminal phases still settle effects and silence the mix.
            effects::tick(state, dt);
            state.audio_mix = audio::compute_mix(state);
        }
    }

    /// Apply a discrete player intent.
    pub fn dispatch(&mut self, intent: Intent) {
        let state = &mut self.state;
        match intent {
            Intent::StartGame => {
                if state.phase == Phase::Start {
                    start_game(state);
                } else {
                    trace!("ignoring StartGame in phase {}", state.phase);
                }
            }
            Intent::Restart => {
                debug!("restarting session with seed {}", state.seed);
                state.restart();
            }
            Intent::ToggleMonitor => {
                if state.phase.is_gameplay() {
                    view::toggle_monitor(state);
                }
            }
            Intent::GrabDoor => {
                if state.phase.is_gameplay() {
                    door::grab_door(state);
                }
            }
            Intent::ReleaseDoor => {
                if state.phase.is_gameplay() {
                    door::release_door(state);
                }
            }
            Intent::AssignDiversion(id) => diversions::assign(state, id),
            Intent::EditCode(text) => {
                if state.phase.is_gameplay() && view::can_code(state) {
                    puzzles::edit_code(state, &text);
                }
            }
            Intent::SubmitCode => {
                if state.phase.is_gameplay() && view::can_code(state) {
                    puzzles::submit(state);
                }
            }
            Intent::UseHint => {
                if state.phase.is_gameplay() {
                    puzzles::use_hint(state);
                }
            }
            Intent::UseIntercom => {
                if state.phase.is_gameplay() {
                    use_intercom(state);
                }
            }
            Intent::LookAt(focus) => look_at(state, focus),
            Intent::PointerMoved { x, y } => pointer_moved(state, x, y),
        }
    }
}

fn start_game(state: &mut GameState) {
    state.phase = Phase::Intro;
    state.speed = phase_speed(Phase::Intro);

    for line in [
        "[BOOT] NIGHTSHIFT KERNEL v4.2.0 Loaded",
        "[SYSTEM] Establishing operator link...",
        "[CONNECT] Night operator on duty",
        "[STATUS] Building systems: UNSTABLE",
        "[WARNING] External comms: OFFLINE",
        "[WARNING] Perimeter breach detected",
        "",
        "[INFO] Monitor controls: toggle ON/OFF",
        "[INFO] Door controls: hold to close (monitor must be OFF)",
        "[WARNING] High load increases heat. Heat > 100% = BLACKOUT",
        "",
        "[PROTOCOL] Stabilization required. Complete all modules.",
        "[PROTOCOL] Assign background tasks to draw attention away.",
    ] {
        state.push_log(line);
    }

    let first = state
        .content
        .as_ref()
        .and_then(|c| c.modules.first())
        .cloned();
    if let Some(module) = first {
        state.push_log("");
        state.push_log(module.narrative_intro.clone());
        if let Some(step) = module.steps.first() {
            state.editor_text = step.starter_code.clone();
        }
    }
}

fn use_intercom(state: &mut GameState) {
    if state.is_intercom_playing || state.is_blackout {
        return;
    }

    state.is_intercom_playing = true;
    let boost = INTERCOM_DISTANCE_BOOST + state.roll() * INTERCOM_VARIANCE;
    state.distance = (state.distance + boost).min(100.0);
    adversary::update_threat(state);
    state.push_log("[SYSTEM] Intercom broadcasting to Hallway 105...");
    state.push_cue(CueRequest::with_volume(CueId::Intercom, 0.8));

    let end_at = state.time_elapsed + INTERCOM_PLAYBACK_SECS;
    state.schedule(end_at, OneShotEffect::EndIntercom);

    // The burst of power alone can tip an overloaded system.
    heat::add_heat_raw(state, INTERCOM_INITIAL_COST);
}

fn look_at(state: &mut GameState, focus: Focus) {
    if state.focus == focus {
        return;
    }
    state.focus = focus;
    match focus {
        Focus::Door => {
            state.never_looked_at_door = false;
            state.push_cue(CueRequest::new(CueId::Close));
        }
        Focus::Monitor => state.push_cue(CueRequest::new(CueId::Open)),
    }
}

fn pointer_moved(state: &mut GameState, x: f32, y: f32) {
    let (lx, ly) = state.last_pointer;
    if (x - lx).abs() > STEALTH_STILL_THRESHOLD || (y - ly).abs() > STEALTH_STILL_THRESHOLD {
        state.pointer_still_time = 0.0;
    }
    state.last_pointer = (x, y);
}

fn tick_stealth(state: &mut GameState, dt: f32) {
    state.pointer_still_time += dt;
}

/// Fire one-shot effects whose game time has arrived.
fn drain_scheduled(state: &mut GameState) {
    let now = state.time_elapsed;
    let mut due = Vec::new();
    state.scheduled.retain(|s| {
        if s.at <= now {
            due.push(s.effect);
            false
        } else {
            true
        }
    });
    for effect in due {
        match effect {
            OneShotEffect::ClearJumpscare => state.active_jumpscare = None,
            OneShotEffect::EndIntercom => state.is_intercom_playing = false,
        }
    }
}

/// Ambient jumpscare sampling. Rates are per second and scaled by dt, so
/// expected frequency does not depend on tick rate.
fn sample_ambient_jumpscare(state: &mut GameState, dt: f32) {
    if state.active_jumpscare.is_some() {
        return;
    }

    let r = state.roll();
    if state.monitor == MonitorState::Off {
        let hall = SCARE_RATE_HALL_FACE * dt;
        let board = hall + SCARE_RATE_BLOODY_BOARD * dt;
        let eyes = board + SCARE_RATE_SERVER_EYES * dt;
        if r < hall {
            state.trigger_jumpscare(JumpscareId::HallwayFace, 1.5);
            state.push_cue(CueRequest::with_volume(CueId::JumpscareSting, 0.7));
        } else if r < board {
            state.trigger_jumpscare(JumpscareId::BloodyBoard, 5.0);
        } else if r < eyes {
            state.trigger_jumpscare(JumpscareId::ServerEyes, 3.0);
            state.push_cue(CueRequest::with_volume(CueId::ManyWhispers, 0.8));
        }
    } else if r < SCARE_RATE_MONITOR_CURSOR * dt {
        state.trigger_jumpscare(JumpscareId::MonitorCursor, 3.0);
    }
}

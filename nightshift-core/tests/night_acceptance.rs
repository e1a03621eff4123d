//! Seeded long-run sweeps and statistical acceptance checks.
//!
//! These tests drive full sessions with a deterministic intent script and
//! assert the structural invariants every tick, then sample the stochastic
//! resolutions across many seeds and check their rates against the tuned
//! probabilities within tolerance.

use nightshift_core::{
    adversary, AdversaryState, ContentData, DiversionId, DoorState, Focus, GameEngine, GameState,
    Intent, Phase,
};

const DT: f32 = 0.05;

fn assert_invariants(state: &GameState, tick_no: usize) {
    assert!(
        (0.0..=100.0).contains(&state.distance),
        "distance out of range at tick {tick_no}: {}",
        state.distance
    );
    assert!(
        (0.0..=100.0).contains(&state.heat),
        "heat out of range at tick {tick_no}: {}",
        state.heat
    );
    assert!(
        (0.0..=1.0).contains(&state.threat),
        "threat out of range at tick {tick_no}"
    );
    if state.is_blackout {
        assert_eq!(
            state.door,
            DoorState::Open,
            "blackout must force the door open at tick {tick_no}"
        );
        assert!(!state.is_door_held);
        assert!(!state.is_intercom_playing);
    }
    assert_eq!(
        state.telegraph.is_some(),
        state.adversary == AdversaryState::Telegraphing,
        "telegraph presence must match the TELEGRAPHING state at tick {tick_no}"
    );
    assert!(state.speed <= 5.0 + f32::EPSILON);
}

/// A fixed input script that exercises most of the surface: monitor
/// toggles, door holds, diversions, typing, intercom, and looks.
fn scripted_intent(tick_no: usize) -> Option<Intent> {
    match tick_no % 600 {
        0 => Some(Intent::AssignDiversion(DiversionId::Copy)),
        90 => Some(Intent::ToggleMonitor),
        100 => Some(Intent::GrabDoor),
        160 => Some(Intent::ReleaseDoor),
        170 => Some(Intent::ToggleMonitor),
        240 => Some(Intent::EditCode("intake.open(1)".into())),
        250 => Some(Intent::SubmitCode),
        300 => Some(Intent::UseIntercom),
        370 => Some(Intent::LookAt(Focus::Door)),
        380 => Some(Intent::LookAt(Focus::Monitor)),
        450 => Some(Intent::AssignDiversion(DiversionId::ServerCheck)),
        520 => Some(Intent::PointerMoved { x: 100.0, y: 80.0 }),
        530 => Some(Intent::PointerMoved { x: 0.0, y: 0.0 }),
        _ => None,
    }
}

#[test]
fn long_runs_hold_invariants_for_many_seeds() {
    let engine = GameEngine::embedded().expect("embedded content");

    for seed in 0..24u64 {
        let mut session = engine.create_session(seed);
        session.dispatch(Intent::StartGame);

        for tick_no in 0..6000 {
            if let Some(intent) = scripted_intent(tick_no) {
                session.dispatch(intent);
            }
            session.tick(DT);
            assert_invariants(session.state(), tick_no);
            session.take_cues();

            if session.state().phase.is_terminal() {
                break;
            }
        }
    }
}

#[test]
fn game_over_is_reached_when_left_unattended() {
    // With no input at all, the approach must eventually end the run.
    let engine = GameEngine::embedded().unwrap();
    let mut session = engine.create_session(17);
    session.dispatch(Intent::StartGame);

    for _ in 0..200_000 {
        session.tick(DT);
        if session.state().phase == Phase::GameOver {
            break;
        }
    }
    assert_eq!(session.state().phase, Phase::GameOver);
    assert_eq!(session.state().distance, 0.0);
}

#[test]
fn restarted_session_replays_identically() {
    let engine = GameEngine::embedded().unwrap();
    let mut first = engine.create_session(23);
    first.dispatch(Intent::StartGame);
    for _ in 0..2000 {
        first.tick(DT);
    }
    let replay_distance = first.state().distance;
    let replay_logs = first.state().terminal_logs.clone();

    first.dispatch(Intent::Restart);
    first.dispatch(Intent::StartGame);
    for _ in 0..2000 {
        first.tick(DT);
    }
    assert_eq!(first.state().distance, replay_distance);
    assert_eq!(first.state().terminal_logs, replay_logs);
}

#[test]
fn telegraph_reality_rate_tracks_the_tuned_chance() {
    let content = ContentData::load_embedded().unwrap();
    let trials = 600u32;
    let mut real = 0u32;

    for seed in 0..trials {
        let mut state = GameState::default().with_seed(u64::from(seed) + 10_000, content.clone());
        state.phase = Phase::Phase1;
        state.adversary = AdversaryState::Approaching;
        state.distance = 10.2;
        state.speed = 2.0;

        // One tick is enough to cross the attack threshold.
        adversary::tick(&mut state, DT * 4.0);
        let telegraph = state.telegraph.expect("telegraph must arm at the threshold");
        assert!((3.0..=5.0).contains(&telegraph.duration));
        if telegraph.is_real {
            real += 1;
        }
    }

    let rate = f64::from(real) / f64::from(trials);
    assert!(
        (0.52..=0.68).contains(&rate),
        "real-attack rate {rate:.3} outside tolerance around 0.60"
    );
}

#[test]
fn repelled_distance_lands_in_the_tuned_band() {
    let content = ContentData::load_embedded().unwrap();

    for seed in 0..200u64 {
        let mut state = GameState::default().with_seed(seed, content.clone());
        state.phase = Phase::Phase2;
        state.adversary = AdversaryState::Approaching;
        state.distance = 10.1;
        state.speed = 2.0;
        adversary::tick(&mut state, DT);
        assert_eq!(state.adversary, AdversaryState::Telegraphing);

        // Force the warning window shut and resolve it with the door
        // sealed long enough to block a real attempt.
        state.time_elapsed += 6.0;
        state.door = DoorState::Closed;
        state.door_closed_duration = 2.0;
        adversary::tick(&mut state, DT);

        assert_eq!(state.adversary, AdversaryState::Approaching);
        assert!(
            (60.0..=80.0).contains(&state.distance),
            "repel distance {} out of band",
            state.distance
        );
    }
}

#[test]
fn breach_survival_rate_tracks_the_stealth_chance() {
    let content = ContentData::load_embedded().unwrap();
    let trials = 400u32;
    let mut survived = 0u32;

    for seed in 0..trials {
        let mut state = GameState::default().with_seed(u64::from(seed) + 500, content.clone());
        state.phase = Phase::Phase2;
        state.adversary = AdversaryState::Breached;
        state.monitor = nightshift_core::MonitorState::Off;
        state.pointer_still_time = 5.0;

        for _ in 0..4000 {
            adversary::tick(&mut state, DT);
            if state.adversary != AdversaryState::Breached {
                break;
            }
        }
        match state.adversary {
            AdversaryState::Approaching => survived += 1,
            AdversaryState::Attacking => {}
            other => panic!("breach resolved into unexpected state {other:?}"),
        }
    }

    let rate = f64::from(survived) / f64::from(trials);
    assert!(
        (0.62..=0.78).contains(&rate),
        "breach survival rate {rate:.3} outside tolerance around 0.70"
    );
}

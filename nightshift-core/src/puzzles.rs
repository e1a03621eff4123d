//! Code submission and judging.
//!
//! Submitted text is normalized (whitespace collapsed, lowercased) before
//! being judged against the current step's validation rule. Success
//! advances the step or module; failure costs distance and feeds the
//! mistake counters the ending resolver reads.

use regex::RegexBuilder;

use crate::audio::{CueId, CueRequest};
use crate::constants::{HEAT_TYPING_COST, RUN_CUE_BASE_CHANCE, RUN_CUE_THREAT_GAIN, fail_penalty};
use crate::data::{PuzzleModule, PuzzleStep, ValidationRule};
use crate::heat;
use crate::progression;
use crate::state::{GameState, Phase, SubmitFeedback};

/// Canonical form used for all text comparison: unified newlines, tabs to
/// spaces, runs of spaces collapsed, lines trimmed, lowercased.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    let mut text = code.replace("\r\n", "\n").replace('\t', "  ");
    while text.contains("  ") {
        text = text.replace("  ", " ");
    }
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_lowercase()
}

/// Judge normalized input against a validation rule. Patterns are compiled
/// case-insensitively; content validation guarantees they parse.
#[must_use]
pub fn validate_answer(input: &str, rule: &ValidationRule) -> bool {
    let normalized = normalize_code(input);
    match rule {
        ValidationRule::MustInclude { tokens } => tokens
            .iter()
            .all(|token| normalized.contains(&normalize_code(token))),
        ValidationRule::Exact { answer } => normalized == normalize_code(answer),
        ValidationRule::Regex { pattern } => RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(&normalized))
            .unwrap_or(false),
    }
}

/// The module and step the player is currently working, cloned out of
/// content so callers can keep mutating the aggregate.
#[must_use]
pub fn current_step(state: &GameState) -> Option<(PuzzleModule, PuzzleStep)> {
    let content = state.content.as_ref()?;
    let module = content.modules.get(state.current_module_index)?;
    let progress = state.module_progress.get(&module.id)?;
    let step = module.steps.get(progress.step_index)?;
    Some((module.clone(), step.clone()))
}

/// Handle an edit to the in-game editor. Growth is typing and typing
/// makes heat.
pub fn edit_code(state: &mut GameState, text: &str) {
    let grown = text.len().saturating_sub(state.editor_text.len());
    if grown > 0 {
        heat::add_heat(state, HEAT_TYPING_COST * grown as f32);
        state.push_cue(CueRequest::with_volume(CueId::Typing, 0.6));
    }
    state.editor_text = text.to_string();
}

/// Submit the editor contents against the current step.
pub fn submit(state: &mut GameState) {
    if state.phase == Phase::FinalCompile || state.phase.is_terminal() {
        return;
    }
    let Some((module, step)) = current_step(state) else {
        return;
    };

    state.push_cue(CueRequest::new(CueId::CompileStart));

    if validate_answer(&state.editor_text, &step.validation) {
        apply_success(state, &module, &step);
    } else {
        apply_failure(state, &module, &step);
    }
}

fn apply_success(state: &mut GameState, module: &PuzzleModule, step: &PuzzleStep) {
    state.push_log(step.on_success.log_message.clone());
    state.push_cue(CueRequest::new(CueId::Success));

    if let Some(dc) = step.on_success.distance_change {
        if dc != 0.0 {
            state.distance = (state.distance + dc).min(100.0);
        }
    }

    let next_step_index = state
        .module_progress
        .get(&module.id)
        .map_or(0, |p| p.step_index)
        + 1;
    let module_completed = next_step_index >= module.steps.len();

    if let Some(progress) = state.module_progress.get_mut(&module.id) {
        progress.step_index = next_step_index;
        progress.completed = module_completed;
    }

    if module_completed {
        state.push_log(format!("[SYSTEM] Module {} COMPLETE", module.title));
        advance_module(state);
        progression::check_phase_transition(state);
    } else if let Some(next) = module.steps.get(next_step_index) {
        state.editor_text = next.starter_code.clone();
    }

    push_feedback(state, step, true);
}

fn advance_module(state: &mut GameState) {
    let next_index = state.current_module_index + 1;
    let next = state
        .content
        .as_ref()
        .and_then(|c| c.modules.get(next_index))
        .cloned();

    match next {
        Some(next_module) => {
            state.current_module_index = next_index;
            state.editor_text = next_module
                .steps
                .first()
                .map(|s| s.starter_code.clone())
                .unwrap_or_default();
            state.push_log("");
            state.push_log(next_module.narrative_intro.clone());
        }
        None => progression::start_final_compile(state),
    }
}

fn apply_failure(state: &mut GameState, module: &PuzzleModule, step: &PuzzleStep) {
    state.push_log(step.on_fail.log_message.clone());
    state.push_cue(CueRequest::new(CueId::Error));

    let penalty = fail_penalty(state.phase);
    state.distance = (state.distance - penalty).max(0.0);

    state.total_mistakes += 1;
    if let Some(progress) = state.module_progress.get_mut(&module.id) {
        progress.mistakes += 1;
    }

    if let Some(spike) = step.on_fail.glitch_spike {
        state.glitch.add_spike(spike);
    }

    // The closer it is, the more likely a wrong answer makes it sprint.
    let threat = 1.0 - state.distance / 100.0;
    if state.roll_under(RUN_CUE_BASE_CHANCE + threat * RUN_CUE_THREAT_GAIN) {
        let volume = 0.2 + threat.powi(3) * 0.8;
        state.push_cue(CueRequest::with_volume(CueId::Run, volume));
    }

    push_feedback(state, step, false);
}

fn push_feedback(state: &mut GameState, step: &PuzzleStep, success: bool) {
    state.submit_sequence += 1;
    state.last_submit = Some(SubmitFeedback {
        success,
        step_id: step.id.clone(),
        sequence: state.submit_sequence,
    });
}

/// Spend a hint token on the current step.
pub fn use_hint(state: &mut GameState) {
    if state.hint_tokens == 0 {
        state.push_log("[ERROR] No hint tokens available.");
        return;
    }
    let Some((_, step)) = current_step(state) else {
        return;
    };
    if step.hints.is_empty() {
        return;
    }

    let index = (state.total_hints_used as usize).min(step.hints.len() - 1);
    let hint = step.hints[index].clone();
    state.hint_tokens -= 1;
    state.total_hints_used += 1;
    state.push_log(format!("[HINT] {hint}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ContentData;
    use crate::state::ModuleId;

    fn puzzle_state() -> GameState {
        let mut state = GameState::default().with_seed(11, ContentData::load_embedded().unwrap());
        state.phase = Phase::Phase1;
        state
    }

    #[test]
    fn normalization_table() {
        assert_eq!(normalize_code("  Foo   Bar  "), "foo bar");
        assert_eq!(normalize_code("a\r\nb"), "a\nb");
        assert_eq!(normalize_code("x\ty"), "x y");
        assert_eq!(normalize_code("  line one  \n\tline two\t"), "line one\nline two");
    }

    #[test]
    fn validation_rules() {
        let must = ValidationRule::MustInclude {
            tokens: vec!["bind(".into(), "WATCHDOG_0".into()],
        };
        assert!(validate_answer("loop.attach(bind(watchdog_0))", &must));
        assert!(!validate_answer("loop.attach(watchdog_0)", &must));

        let exact = ValidationRule::Exact {
            answer: "intake.open(1)".into(),
        };
        assert!(validate_answer("  INTAKE.open(1)  ", &exact));
        assert!(!validate_answer("intake.open(2)", &exact));

        let re = ValidationRule::Regex {
            pattern: r"exhaust\.route\(stage_[1-9]\)".into(),
        };
        assert!(validate_answer("exhaust.route(stage_4)", &re));
        assert!(!validate_answer("exhaust.route(stage_0)", &re));
    }

    #[test]
    fn correct_submission_advances_step() {
        let mut state = puzzle_state();
        state.editor_text = "loop.attach(bind(WATCHDOG_0))".into();
        submit(&mut state);

        let progress = state.module_progress[&ModuleId::Shell];
        assert_eq!(progress.step_index, 1);
        assert!(!progress.completed);
        assert_eq!(state.total_mistakes, 0);
        let feedback = state.last_submit.as_ref().unwrap();
        assert!(feedback.success);
        assert_eq!(feedback.step_id, "shell_01");
    }

    #[test]
    fn completing_a_module_advances_and_loads_next_starter() {
        let mut state = puzzle_state();
        state.editor_text = "loop.attach(bind(WATCHDOG_0))".into();
        submit(&mut state);
        state.editor_text = "release()\nhalt()".into();
        submit(&mut state);

        assert!(state.module_progress[&ModuleId::Shell].completed);
        assert_eq!(state.current_module_index, 1);
        assert!(state
            .terminal_logs
            .iter()
            .any(|l| l.contains("THE_GASP")));
    }

    #[test]
    fn wrong_submission_costs_distance_and_counts() {
        let mut state = puzzle_state();
        state.distance = 50.0;
        state.editor_text = "nonsense".into();
        submit(&mut state);

        assert!((state.distance - 42.0).abs() < 1e-4);
        assert_eq!(state.total_mistakes, 1);
        assert_eq!(state.module_progress[&ModuleId::Shell].mistakes, 1);
        assert!(state.glitch.spike > 0.0);
        assert!(!state.last_submit.as_ref().unwrap().success);
    }

    #[test]
    fn distance_clamps_at_zero_on_failure() {
        let mut state = puzzle_state();
        state.distance = 3.0;
        state.editor_text = "nonsense".into();
        submit(&mut state);
        assert_eq!(state.distance, 0.0);
    }

    #[test]
    fn hint_flow() {
        let mut state = puzzle_state();
        use_hint(&mut state);
        assert_eq!(state.total_hints_used, 0);
        assert!(state.terminal_logs.iter().any(|l| l.contains("No hint")));

        state.hint_tokens = 2;
        use_hint(&mut state);
        assert_eq!(state.hint_tokens, 1);
        assert_eq!(state.total_hints_used, 1);
        assert!(state.terminal_logs.iter().any(|l| l.starts_with("[HINT]")));
    }

    #[test]
    fn typing_heats_only_on_growth() {
        let mut state = puzzle_state();
        edit_code(&mut state, "abc");
        let after_growth = state.heat;
        assert!((after_growth - 3.0 * HEAT_TYPING_COST).abs() < 1e-4);

        edit_code(&mut state, "ab");
        assert_eq!(state.heat, after_growth);
        assert_eq!(state.editor_text, "ab");
    }

    #[test]
    fn submission_ignored_during_final_compile() {
        let mut state = puzzle_state();
        state.phase = Phase::FinalCompile;
        state.editor_text = "loop.attach(bind(WATCHDOG_0))".into();
        submit(&mut state);
        assert!(state.last_submit.is_none());
    }
}

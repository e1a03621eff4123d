//! Content definitions for diversions and puzzle modules.
//!
//! Content ships as embedded JSON and is validated once at engine
//! construction. Malformed content is a fatal startup condition; the tick
//! loop never defends against it at runtime.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::state::{DiversionId, ModuleId};

pub const EMBEDDED_DIVERSION_DATA: &str = include_str!("../assets/data/diversions.json");
pub const EMBEDDED_PUZZLE_DATA: &str = include_str!("../assets/data/puzzles.json");

/// Errors raised while loading or validating content data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("content JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate diversion definition: {0}")]
    DuplicateDiversion(DiversionId),
    #[error("missing diversion definition: {0}")]
    MissingDiversion(DiversionId),
    #[error("no puzzle modules defined")]
    NoModules,
    #[error("duplicate puzzle module: {0}")]
    DuplicateModule(ModuleId),
    #[error("module {0} has no steps")]
    EmptyModule(ModuleId),
    #[error("step {step} has an invalid pattern: {source}")]
    BadPattern {
        step: String,
        source: regex::Error,
    },
}

/// One-shot bonus or drawback applied when a diversion is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiversionSideEffect {
    Hint { value: u32 },
    InputLag { value: f32 },
    CursorInvert { value: f32 },
}

/// Penalty applied when the adversary returns at the end of a diversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPenalty {
    pub glitch_spike: f32,
    pub speed_burst: f32,
    pub blackout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorText {
    pub assign: String,
    #[serde(rename = "return")]
    pub ret: String,
}

/// A timed background task that lures the adversary away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversionDef {
    pub id: DiversionId,
    pub label: String,
    pub description: String,
    pub duration_sec: f32,
    pub cooldown_sec: f32,
    pub distance_boost: f32,
    pub speed_increase: f32,
    pub return_penalty: ReturnPenalty,
    pub side_effect: Option<DiversionSideEffect>,
    pub flavor_text: FlavorText,
}

/// Rule used to judge a submitted answer against a puzzle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationRule {
    MustInclude { tokens: Vec<String> },
    Exact { answer: String },
    Regex { pattern: String },
}

/// Scripted outcome attached to a step's success or failure branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEffect {
    pub log_message: String,
    #[serde(default)]
    pub distance_change: Option<f32>,
    #[serde(default)]
    pub glitch_spike: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStep {
    pub id: String,
    pub prompt: String,
    pub starter_code: String,
    pub validation: ValidationRule,
    pub hints: Vec<String>,
    pub on_success: StepEffect,
    pub on_fail: StepEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleModule {
    pub id: ModuleId,
    pub title: String,
    pub order: u32,
    pub narrative_intro: String,
    pub steps: Vec<PuzzleStep>,
}

#[derive(Debug, Deserialize)]
struct DiversionFile {
    diversions: Vec<DiversionDef>,
}

#[derive(Debug, Deserialize)]
struct PuzzleFile {
    modules: Vec<PuzzleModule>,
}

/// Validated content bundle the simulation runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentData {
    pub diversions: HashMap<DiversionId, DiversionDef>,
    pub modules: Vec<PuzzleModule>,
}

impl ContentData {
    /// Load and validate content from JSON strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either document fails to parse or validation
    /// finds a structural problem.
    pub fn from_json(diversions_json: &str, puzzles_json: &str) -> Result<Self, ConfigError> {
        let diversion_file: DiversionFile = serde_json::from_str(diversions_json)?;
        let puzzle_file: PuzzleFile = serde_json::from_str(puzzles_json)?;

        let mut diversions = HashMap::new();
        for def in diversion_file.diversions {
            if diversions.insert(def.id, def.clone()).is_some() {
                return Err(ConfigError::DuplicateDiversion(def.id));
            }
        }

        let mut modules = puzzle_file.modules;
        modules.sort_by_key(|m| m.order);

        let data = Self {
            diversions,
            modules,
        };
        data.validate()?;
        Ok(data)
    }

    /// Load the content embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded assets fail validation; this
    /// indicates a packaging defect and should abort startup.
    pub fn load_embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_DIVERSION_DATA, EMBEDDED_PUZZLE_DATA)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for id in DiversionId::ALL {
            if !self.diversions.contains_key(&id) {
                return Err(ConfigError::MissingDiversion(id));
            }
        }
        if self.modules.is_empty() {
            return Err(ConfigError::NoModules);
        }
        let mut seen = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            if seen.contains(&module.id) {
                return Err(ConfigError::DuplicateModule(module.id));
            }
            seen.push(module.id);
            if module.steps.is_empty() {
                return Err(ConfigError::EmptyModule(module.id));
            }
            for step in &module.steps {
                if let ValidationRule::Regex { pattern } = &step.validation {
                    RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|source| ConfigError::BadPattern {
                            step: step.id.clone(),
                            source,
                        })?;
                }
            }
        }
        Ok(())
    }

    /// Number of puzzle modules in play order.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

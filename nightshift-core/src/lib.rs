//! Nightshift Core Engine
//!
//! Platform-agnostic core logic for the Nightshift survival loop: heat and
//! blackout management, the door barrier, the adversary state machine,
//! diversions, puzzle modules, and the ending resolver. This crate carries
//! no rendering, audio playback, or input handling; the embedding platform
//! drives a [`Session`] with ticks and intents and reads the aggregate
//! state back.

pub mod adversary;
pub mod audio;
pub mod constants;
pub mod data;
pub mod diversions;
pub mod door;
pub mod effects;
pub mod ending;
pub mod heat;
pub mod progression;
pub mod puzzles;
pub mod session;
pub mod state;
pub mod view;

// Re-export commonly used types
pub use audio::{AudioMix, CueId, CueRequest, compute_mix};
pub use data::{
    ConfigError, ContentData, DiversionDef, DiversionSideEffect, FlavorText, PuzzleModule,
    PuzzleStep, ReturnPenalty, StepEffect, ValidationRule,
};
pub use effects::{FlashlightState, GlitchState};
pub use ending::resolve as resolve_ending;
pub use puzzles::{normalize_code, validate_answer};
pub use session::{Intent, Session};
pub use state::{
    ActiveDiversion, AdversaryState, DiversionId, DoorState, EndingKind, Focus, GameState,
    JumpscareId, ModuleId, ModuleProgress, MonitorState, OneShotEffect, Phase, ScheduledEffect,
    SubmitFeedback, Telegraph,
};

/// Trait for abstracting content loading operations.
/// Platform-specific implementations should provide this.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the diversion definitions JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn load_diversion_data(&self) -> Result<String, Self::Error>;

    /// Load the puzzle module definitions JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn load_puzzle_data(&self) -> Result<String, Self::Error>;
}

/// Loader backed by the content compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl DataLoader for EmbeddedLoader {
    type Error = std::convert::Infallible;

    fn load_diversion_data(&self) -> Result<String, Self::Error> {
        Ok(data::EMBEDDED_DIVERSION_DATA.to_string())
    }

    fn load_puzzle_data(&self) -> Result<String, Self::Error> {
        Ok(data::EMBEDDED_PUZZLE_DATA.to_string())
    }
}

/// Main engine for constructing validated sessions.
pub struct GameEngine {
    content: ContentData,
}

impl GameEngine {
    /// Create an engine by loading and validating content through the
    /// provided loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded, parsed, or
    /// validated. Malformed content aborts startup rather than being
    /// tolerated at runtime.
    pub fn new<L>(loader: &L) -> Result<Self, anyhow::Error>
    where
        L: DataLoader,
        L::Error: Into<anyhow::Error>,
    {
        let diversions = loader.load_diversion_data().map_err(Into::into)?;
        let puzzles = loader.load_puzzle_data().map_err(Into::into)?;
        let content = ContentData::from_json(&diversions, &puzzles)?;
        Ok(Self { content })
    }

    /// Engine backed by the crate's embedded content.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded assets fail validation; this is a
    /// packaging defect.
    pub fn embedded() -> Result<Self, anyhow::Error> {
        Self::new(&EmbeddedLoader)
    }

    /// The validated content this engine hands to new sessions.
    #[must_use]
    pub fn content(&self) -> &ContentData {
        &self.content
    }

    /// Start a fresh seeded session.
    #[must_use]
    pub fn create_session(&self, seed: u64) -> Session {
        Session::new(seed, self.content.clone())
    }
}

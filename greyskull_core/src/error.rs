//! Error types for the greyskull_core library.

use crate::LiftName;
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for greyskull_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    // ------------------------------------------------------------------
    // Missing references in caller-supplied data
    // ------------------------------------------------------------------
    /// The user has not started (or has no selected) program
    #[error("no active program. Use 'greyskull program start' to begin a program")]
    NoActiveProgram,

    /// The active program id does not match any of the user's programs
    #[error("current program {0} not found in user programs")]
    CycleNotFound(Uuid),

    /// A lift in the day's template has no tracked working weight
    #[error("missing weight for lift {0}")]
    MissingWeight(LiftName),

    /// Progression was requested for a lift without a tracked weight
    #[error("current weight not found for lift {0}")]
    WeightNotFound(LiftName),

    /// No increment configured for a lift
    #[error("no progression rule found for lift {0}")]
    NoProgressionRule(LiftName),

    #[error("program {0} not found")]
    ProgramNotFound(String),

    #[error("user {0:?} not found")]
    UserNotFound(String),

    #[error("no current user set. Use 'greyskull user create' or 'greyskull user switch' first")]
    NoCurrentUser,

    // ------------------------------------------------------------------
    // Malformed preconditions
    // ------------------------------------------------------------------
    /// A completed lift has no AMRAP set to drive progression
    #[error("no AMRAP set found for lift {0}")]
    NoAmrapSet(LiftName),

    /// No AMRAP result was supplied for a lift being logged
    #[error("no AMRAP reps recorded for lift {0}")]
    MissingAmrapReps(LiftName),

    #[error("invalid program: {0}")]
    InvalidProgram(String),

    /// Program template validation error
    #[error("Program validation error: {0}")]
    ProgramValidation(String),

    #[error("user {0:?} already exists (case-insensitive)")]
    UserAlreadyExists(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid weight for {lift}: {weight} (must be positive)")]
    InvalidWeight { lift: LiftName, weight: f64 },

    #[error("invalid reps for {lift}: {reps} (must be positive unless failures are allowed)")]
    InvalidReps { lift: LiftName, reps: u32 },

    /// Malformed interactive input
    #[error("input error: {0}")]
    Input(String),
}

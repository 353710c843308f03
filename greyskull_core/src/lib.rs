#![forbid(unsafe_code)]

//! Core domain model and business logic for the Greyskull LP tracker.
//!
//! This crate provides:
//! - Domain types (lifts, set templates, programs, workouts, users)
//! - Set generation and workout assembly
//! - AMRAP-driven weight progression
//! - Built-in program templates
//! - Persistence (user repository) and configuration

pub mod types;
pub mod error;
pub mod calculator;
pub mod progression;
pub mod program;
pub mod config;
pub mod logging;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use calculator::{
    calculate_next_workout, calculate_warmup_sets, calculate_working_sets, round_down,
    workout_day,
};
pub use progression::{calculate_new_weight, calculate_progression, Progression};
pub use program::{greyskull_lp, ProgramCatalog};
pub use config::Config;
pub use repository::{JsonUserRepository, UserRepository};
pub use service::{UserService, WorkoutLog};

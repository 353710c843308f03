//! Core domain types for the Greyskull LP tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Lifts and set kinds
//! - Program templates (set, lift, and day templates plus progression rules)
//! - Generated workouts and their concrete sets
//! - Users and their per-program cycle state

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Lift and Set Kinds
// ============================================================================

/// One of the four barbell lifts tracked by the program
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LiftName {
    Squat,
    Deadlift,
    BenchPress,
    OverheadPress,
}

impl LiftName {
    /// All lifts, in the order weight changes are reported
    pub const ALL: [LiftName; 4] = [
        LiftName::OverheadPress,
        LiftName::BenchPress,
        LiftName::Squat,
        LiftName::Deadlift,
    ];

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            LiftName::Squat => "Squat",
            LiftName::Deadlift => "Deadlift",
            LiftName::BenchPress => "Bench Press",
            LiftName::OverheadPress => "Overhead Press",
        }
    }
}

impl fmt::Display for LiftName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LiftName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "squat" => Ok(LiftName::Squat),
            "deadlift" => Ok(LiftName::Deadlift),
            "bench" | "bench_press" | "benchpress" => Ok(LiftName::BenchPress),
            "press" | "ohp" | "overhead_press" | "overheadpress" => Ok(LiftName::OverheadPress),
            other => Err(Error::Input(format!("unknown lift: {}", other))),
        }
    }
}

/// Role of a set within a lift
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    Warmup,
    Working,
    /// As many reps as possible; drives progression
    Amrap,
}

// ============================================================================
// Program Templates
// ============================================================================

/// A prescribed set as a fraction of the working weight
///
/// A `weight_percentage` of exactly 0.0 means the empty bar.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetTemplate {
    pub reps: u32,
    pub weight_percentage: f64,
    pub kind: SetKind,
}

impl SetTemplate {
    pub fn new(reps: u32, weight_percentage: f64, kind: SetKind) -> Self {
        Self {
            reps,
            weight_percentage,
            kind,
        }
    }
}

/// Warmup and working templates for one lift on one day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LiftTemplate {
    pub lift: LiftName,
    pub warmup_sets: Vec<SetTemplate>,
    pub working_sets: Vec<SetTemplate>,
}

/// The lifts performed on one day of the cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutTemplate {
    pub day: u32,
    pub lifts: Vec<LiftTemplate>,
}

/// Parameters of the AMRAP-driven progression policy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionRules {
    /// Weight added on a normal progression, per lift
    pub increments: HashMap<LiftName, f64>,
    /// Multiplier applied to the current weight on failure (e.g. 0.9)
    pub deload_fraction: f64,
    /// AMRAP reps at or above which the increment is doubled
    pub double_threshold: u32,
}

/// A complete program definition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub workouts: Vec<WorkoutTemplate>,
    pub progression_rules: ProgressionRules,
}

impl Program {
    /// Number of days before the cycle repeats
    pub fn cycle_length(&self) -> u32 {
        self.workouts.len() as u32
    }
}

// ============================================================================
// Generated Workouts
// ============================================================================

/// A concrete set with a computed weight
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Set {
    pub id: Uuid,
    pub weight: f64,
    pub target_reps: u32,
    /// Reps performed; 0 until recorded
    pub actual_reps: u32,
    pub kind: SetKind,
    /// 1-based position within the lift
    pub order: u32,
}

impl Set {
    pub fn is_complete(&self) -> bool {
        self.actual_reps > 0
    }
}

/// One lift of a workout with all of its sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lift {
    pub id: Uuid,
    pub lift: LiftName,
    pub sets: Vec<Set>,
}

impl Lift {
    /// The lift's AMRAP set, if the template had one
    pub fn amrap_set(&self) -> Option<&Set> {
        self.sets.iter().find(|s| s.kind == SetKind::Amrap)
    }
}

/// A generated (or completed) workout for one day of the cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub user_program_id: Uuid,
    pub day: u32,
    pub exercises: Vec<Lift>,
    pub entered_at: DateTime<Utc>,
}

// ============================================================================
// Users and Cycle State
// ============================================================================

/// A user's run through a program: the mutable cycle state
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProgram {
    pub id: Uuid,
    pub user_id: Uuid,
    pub program_id: Uuid,
    pub starting_weights: HashMap<LiftName, f64>,
    pub current_weights: HashMap<LiftName, f64>,
    /// 1-based day index; wrapped into the cycle when a workout is built
    pub current_day: u32,
    pub started_at: DateTime<Utc>,
}

/// A tracked lifter
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub current_program: Option<Uuid>,
    #[serde(default)]
    pub programs: HashMap<Uuid, UserProgram>,
    #[serde(default)]
    pub workout_history: Vec<Workout>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into().trim().to_string(),
            current_program: None,
            programs: HashMap::new(),
            workout_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Check that the username is usable as a file name
    ///
    /// Usernames start with a letter and contain only letters, digits and dashes.
    pub fn validate(&self) -> Result<()> {
        let username = self.username.trim();

        let Some(first) = username.chars().next() else {
            return Err(Error::InvalidUsername("username cannot be empty".into()));
        };
        if !first.is_ascii_alphabetic() {
            return Err(Error::InvalidUsername(
                "username must start with a letter".into(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::InvalidUsername(
                "username may only contain letters, numbers, and dashes".into(),
            ));
        }

        Ok(())
    }

    /// Resolve the active program's cycle state
    pub fn active_program(&self) -> Result<&UserProgram> {
        let id = self.current_program.ok_or(Error::NoActiveProgram)?;
        self.programs.get(&id).ok_or(Error::CycleNotFound(id))
    }

    pub fn active_program_mut(&mut self) -> Result<&mut UserProgram> {
        let id = self.current_program.ok_or(Error::NoActiveProgram)?;
        self.programs.get_mut(&id).ok_or(Error::CycleNotFound(id))
    }
}

//! Built-in program templates and the program catalog.
//!
//! Programs are immutable values. The built-in Greyskull LP template is built
//! once and cached; alternate programs (custom files, test fixtures) are
//! added to a [`ProgramCatalog`] instead of replacing any global.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// Fixed id of the built-in program, stable across releases
pub const GREYSKULL_LP_ID: Uuid = Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440000);

/// Cached built-in program
static GREYSKULL_LP: Lazy<Program> = Lazy::new(build_greyskull_lp);

/// Get a reference to the cached Greyskull LP program
pub fn greyskull_lp() -> &'static Program {
    &GREYSKULL_LP
}

/// Every Greyskull lift ramps up the same way: empty bar, 55%, 70%, 85%
fn standard_warmups() -> Vec<SetTemplate> {
    vec![
        SetTemplate::new(5, 0.0, SetKind::Warmup),
        SetTemplate::new(4, 0.55, SetKind::Warmup),
        SetTemplate::new(3, 0.70, SetKind::Warmup),
        SetTemplate::new(2, 0.85, SetKind::Warmup),
    ]
}

/// 2x5 plus a final 5+ AMRAP set at the working weight
fn two_by_five_plus() -> Vec<SetTemplate> {
    vec![
        SetTemplate::new(5, 1.0, SetKind::Working),
        SetTemplate::new(5, 1.0, SetKind::Working),
        SetTemplate::new(5, 1.0, SetKind::Amrap),
    ]
}

fn day(day: u32, lifts: [LiftName; 2]) -> WorkoutTemplate {
    WorkoutTemplate {
        day,
        lifts: lifts
            .into_iter()
            .map(|lift| LiftTemplate {
                lift,
                warmup_sets: standard_warmups(),
                working_sets: two_by_five_plus(),
            })
            .collect(),
    }
}

/// Build the OG Greyskull LP program
///
/// **Note**: prefer [`greyskull_lp()`] for lookups. This returns an owned copy
/// that tests and custom catalogs may modify.
pub fn build_greyskull_lp() -> Program {
    use LiftName::*;

    Program {
        id: GREYSKULL_LP_ID,
        name: "OG Greyskull LP".into(),
        version: "1.0.0".into(),
        workouts: vec![
            day(1, [OverheadPress, Squat]),
            day(2, [BenchPress, Deadlift]),
            day(3, [OverheadPress, Squat]),
            day(4, [BenchPress, Squat]),
            day(5, [OverheadPress, Deadlift]),
            day(6, [BenchPress, Squat]),
        ],
        progression_rules: ProgressionRules {
            increments: HashMap::from([
                // Upper body
                (OverheadPress, 2.5),
                (BenchPress, 2.5),
                // Lower body
                (Squat, 5.0),
                (Deadlift, 5.0),
            ]),
            deload_fraction: 0.9,
            double_threshold: 10,
        },
    }
}

impl Program {
    /// Distinct lifts used anywhere in the program, in first-seen order
    pub fn lifts(&self) -> Vec<LiftName> {
        let mut lifts = Vec::new();
        for template in self.workouts.iter().flat_map(|w| &w.lifts) {
            if !lifts.contains(&template.lift) {
                lifts.push(template.lift);
            }
        }
        lifts
    }

    /// Load a program definition from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let program: Program = serde_json::from_str(&contents)?;
        tracing::info!("Loaded program '{}' from {:?}", program.name, path);
        Ok(program)
    }

    /// Validate the program for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut missing_increments = HashSet::new();

        if self.name.trim().is_empty() {
            errors.push("Program has empty name".to_string());
        }
        if self.workouts.is_empty() {
            errors.push(format!("Program '{}' has no workout days", self.name));
        }

        for (i, workout) in self.workouts.iter().enumerate() {
            let expected = i as u32 + 1;
            if workout.day != expected {
                errors.push(format!(
                    "Workout at position {} is numbered day {}",
                    expected, workout.day
                ));
            }
            if workout.lifts.is_empty() {
                errors.push(format!("Day {} has no lifts", workout.day));
            }

            for lift in &workout.lifts {
                let amraps = lift
                    .working_sets
                    .iter()
                    .filter(|s| s.kind == SetKind::Amrap)
                    .count();
                if amraps != 1 {
                    errors.push(format!(
                        "Day {} {}: expected exactly one AMRAP set, found {}",
                        workout.day, lift.lift, amraps
                    ));
                } else if lift.working_sets.last().map(|s| s.kind) != Some(SetKind::Amrap) {
                    errors.push(format!(
                        "Day {} {}: AMRAP set must be the last working set",
                        workout.day, lift.lift
                    ));
                }

                if lift.warmup_sets.iter().any(|s| s.kind != SetKind::Warmup) {
                    errors.push(format!(
                        "Day {} {}: warmup block contains a non-warmup set",
                        workout.day, lift.lift
                    ));
                }

                for tpl in lift.warmup_sets.iter().chain(&lift.working_sets) {
                    if !(0.0..=1.0).contains(&tpl.weight_percentage) {
                        errors.push(format!(
                            "Day {} {}: weight percentage {} outside [0, 1]",
                            workout.day, lift.lift, tpl.weight_percentage
                        ));
                    }
                    if tpl.reps == 0 {
                        errors.push(format!(
                            "Day {} {}: set template with zero reps",
                            workout.day, lift.lift
                        ));
                    }
                }

                if !self.progression_rules.increments.contains_key(&lift.lift)
                    && missing_increments.insert(lift.lift)
                {
                    errors.push(format!("No progression increment for {}", lift.lift));
                }
            }
        }

        let rules = &self.progression_rules;
        if !(rules.deload_fraction > 0.0 && rules.deload_fraction < 1.0) {
            errors.push(format!(
                "Deload fraction {} must be between 0 and 1",
                rules.deload_fraction
            ));
        }
        if rules.double_threshold < crate::progression::DELOAD_REP_FLOOR {
            errors.push(format!(
                "Double threshold {} is below the deload floor",
                rules.double_threshold
            ));
        }
        for (lift, increment) in &rules.increments {
            if *increment <= 0.0 {
                errors.push(format!("Increment for {} must be positive", lift));
            }
        }

        errors
    }
}

/// The set of programs a user can start
#[derive(Clone, Debug)]
pub struct ProgramCatalog {
    programs: Vec<Program>,
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProgramCatalog {
    /// Catalog with only the built-in programs
    pub fn builtin() -> Self {
        Self {
            programs: vec![greyskull_lp().clone()],
        }
    }

    /// Add a program, replacing any existing program with the same id
    pub fn with_program(mut self, program: Program) -> Self {
        if let Some(existing) = self.programs.iter_mut().find(|p| p.id == program.id) {
            tracing::warn!(
                "Program '{}' replaces '{}' (same id {})",
                program.name,
                existing.name,
                program.id
            );
            *existing = program;
        } else {
            self.programs.push(program);
        }
        self
    }

    /// Add a program loaded from a JSON file, rejecting invalid definitions
    pub fn load_program(self, path: &Path) -> Result<Self> {
        let program = Program::load_from(path)?;
        let errors = program.validate();
        if !errors.is_empty() {
            return Err(Error::ProgramValidation(errors.join("; ")));
        }
        Ok(self.with_program(program))
    }

    pub fn list(&self) -> &[Program] {
        &self.programs
    }

    pub fn get_by_id(&self, id: &Uuid) -> Result<&Program> {
        self.programs
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::ProgramNotFound(id.to_string()))
    }

    /// Validate every program, prefixing errors with the program name
    pub fn validate(&self) -> Vec<String> {
        self.programs
            .iter()
            .flat_map(|p| {
                p.validate()
                    .into_iter()
                    .map(move |e| format!("{}: {}", p.name, e))
            })
            .collect()
    }
}

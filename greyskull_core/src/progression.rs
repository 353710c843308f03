//! Progression logic for updating working weights.
//!
//! After each logged workout the AMRAP result of every lift decides the next
//! working weight:
//! - Fewer than 5 reps: deload to a fraction of the current weight
//! - At or above the double threshold: add twice the lift's increment
//! - Otherwise: add the increment once
//!
//! Only the resulting weight is rounded; rep counts are compared as recorded.

use crate::calculator::round_down;
use crate::{Error, Lift, LiftName, ProgressionRules, Result, Workout};
use std::collections::HashMap;

/// AMRAP reps below this count as a failed session
pub const DELOAD_REP_FLOOR: u32 = 5;

/// Outcome of an AMRAP set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progression {
    Deload,
    Normal,
    Double,
}

impl Progression {
    /// Classify an AMRAP result against the rules
    ///
    /// Both boundaries belong to the higher tier: exactly 5 reps is a normal
    /// progression, exactly `double_threshold` reps is a double.
    pub fn classify(amrap_reps: u32, rules: &ProgressionRules) -> Self {
        if amrap_reps < DELOAD_REP_FLOOR {
            Progression::Deload
        } else if amrap_reps >= rules.double_threshold {
            Progression::Double
        } else {
            Progression::Normal
        }
    }
}

/// Compute the next working weight for a single lift
pub fn calculate_new_weight(
    current_weight: f64,
    amrap_reps: u32,
    base_increment: f64,
    rules: &ProgressionRules,
) -> f64 {
    let raw = match Progression::classify(amrap_reps, rules) {
        Progression::Deload => current_weight * rules.deload_fraction,
        Progression::Double => current_weight + 2.0 * base_increment,
        Progression::Normal => current_weight + base_increment,
    };

    round_down(raw)
}

/// Reps recorded on a lift's AMRAP set
pub fn amrap_reps(lift: &Lift) -> Result<u32> {
    lift.amrap_set()
        .map(|set| set.actual_reps)
        .ok_or(Error::NoAmrapSet(lift.lift))
}

/// Compute updated working weights from a completed workout
///
/// Lifts that were not part of the workout keep their weight.
pub fn calculate_progression(
    completed: &Workout,
    current_weights: &HashMap<LiftName, f64>,
    rules: &ProgressionRules,
) -> Result<HashMap<LiftName, f64>> {
    let mut new_weights = current_weights.clone();

    for exercise in &completed.exercises {
        let reps = amrap_reps(exercise)?;

        let increment = rules
            .increments
            .get(&exercise.lift)
            .copied()
            .ok_or(Error::NoProgressionRule(exercise.lift))?;

        let current = current_weights
            .get(&exercise.lift)
            .copied()
            .ok_or(Error::WeightNotFound(exercise.lift))?;

        let next = calculate_new_weight(current, reps, increment, rules);

        tracing::debug!(
            "{}: {} AMRAP reps ({:?}), {} -> {}",
            exercise.lift,
            reps,
            Progression::classify(reps, rules),
            current,
            next
        );

        new_weights.insert(exercise.lift, next);
    }

    Ok(new_weights)
}

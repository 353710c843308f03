//! Plain-text rendering of workouts, progression and history.

use greyskull_core::{Lift, SetKind, Workout, WorkoutLog};
use std::io::{self, Write};

/// Format a weight without decimals when it is whole
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{:.1}", weight)
    }
}

/// Render a planned workout
pub fn write_workout(out: &mut impl Write, workout: &Workout) -> io::Result<()> {
    writeln!(out, "Day {} Workout:", workout.day)?;
    writeln!(out, "================")?;

    for exercise in &workout.exercises {
        writeln!(out)?;
        write_lift(out, exercise)?;
    }
    Ok(())
}

fn write_lift(out: &mut impl Write, exercise: &Lift) -> io::Result<()> {
    writeln!(out, "{}:", exercise.lift)?;

    let warmups: Vec<_> = exercise
        .sets
        .iter()
        .filter(|s| s.kind == SetKind::Warmup)
        .collect();
    if !warmups.is_empty() {
        writeln!(out, "  Warmup:")?;
        for set in warmups {
            writeln!(
                out,
                "    {} reps @ {} lbs",
                set.target_reps,
                format_weight(set.weight)
            )?;
        }
    }

    writeln!(out, "  Working Sets:")?;
    let working = exercise.sets.iter().filter(|s| s.kind != SetKind::Warmup);
    for (i, set) in working.enumerate() {
        match set.kind {
            SetKind::Amrap => writeln!(
                out,
                "    Set {}: {}+ reps @ {} lbs (AMRAP)",
                i + 1,
                set.target_reps,
                format_weight(set.weight)
            )?,
            _ => writeln!(
                out,
                "    Set {}: {} reps @ {} lbs",
                i + 1,
                set.target_reps,
                format_weight(set.weight)
            )?,
        }
    }
    Ok(())
}

/// Render the weight changes from a logged workout
pub fn write_weight_changes(out: &mut impl Write, log: &WorkoutLog) -> io::Result<()> {
    let changes = log.changes();
    if changes.is_empty() {
        writeln!(out, "No weight changes.")?;
        return Ok(());
    }

    writeln!(out, "Weight updates:")?;
    for (lift, old, new) in changes {
        let diff = new - old;
        let sign = if diff > 0.0 { "+" } else { "" };
        writeln!(
            out,
            "  {}: {} → {} lbs ({}{:.1})",
            lift,
            format_weight(old),
            format_weight(new),
            sign,
            diff
        )?;
    }
    Ok(())
}

/// One line per completed workout with the AMRAP result for each lift
pub fn write_history(out: &mut impl Write, workouts: &[Workout]) -> io::Result<()> {
    if workouts.is_empty() {
        writeln!(out, "No workouts logged yet.")?;
        return Ok(());
    }

    for workout in workouts {
        let results: Vec<String> = workout
            .exercises
            .iter()
            .filter_map(|exercise| {
                let set = exercise.amrap_set()?;
                Some(format!(
                    "{} {} x {}",
                    exercise.lift,
                    format_weight(set.weight),
                    set.actual_reps
                ))
            })
            .collect();

        writeln!(
            out,
            "{}  Day {}  {}",
            workout.entered_at.format("%Y-%m-%d"),
            workout.day,
            results.join(", ")
        )?;
    }
    Ok(())
}

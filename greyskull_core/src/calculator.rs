//! Workout generation from program templates.
//!
//! Turns a working weight and a list of set templates into concrete sets,
//! and assembles a full day's workout from a user's cycle state.
//!
//! Everything here is pure: inputs in, new values out.

use crate::{
    Error, Lift, LiftTemplate, Program, Result, Set, SetKind, SetTemplate, User, UserProgram,
    Workout,
};
use chrono::Utc;
use uuid::Uuid;

/// Smallest loadable jump on the bar (a pair of 1.25 plates)
pub const ROUNDING_INCREMENT: f64 = 2.5;

/// Working weights at or below this skip the warmup block entirely
pub const WARMUP_FLOOR: f64 = 85.0;

/// Weight of the empty bar, used for 0% warmup templates
pub const BAR_WEIGHT: f64 = 45.0;

/// Round down to the nearest multiple of [`ROUNDING_INCREMENT`]
///
/// Never rounds up, including for values already on a multiple.
pub fn round_down(weight: f64) -> f64 {
    (weight / ROUNDING_INCREMENT).floor() * ROUNDING_INCREMENT
}

/// Generate warmup sets for a working weight
///
/// Returns no sets when `working_weight <= 85`; light weights need no ramp-up.
/// Order numbering starts at 1.
pub fn calculate_warmup_sets(working_weight: f64, templates: &[SetTemplate]) -> Vec<Set> {
    if working_weight <= WARMUP_FLOOR {
        tracing::debug!(
            "Working weight {} at or below warmup floor, skipping warmups",
            working_weight
        );
        return Vec::new();
    }

    templates
        .iter()
        .enumerate()
        .map(|(i, tpl)| {
            let weight = if tpl.weight_percentage == 0.0 {
                BAR_WEIGHT
            } else {
                round_down(working_weight * tpl.weight_percentage)
            };

            Set {
                id: Uuid::now_v7(),
                weight,
                target_reps: tpl.reps,
                actual_reps: 0,
                kind: SetKind::Warmup,
                order: i as u32 + 1,
            }
        })
        .collect()
}

/// Generate working sets, all at the rounded working weight
///
/// Each set keeps its template's kind (working or AMRAP). Order numbering
/// starts at 1; [`build_lift`] renumbers after any warmups.
pub fn calculate_working_sets(working_weight: f64, templates: &[SetTemplate]) -> Vec<Set> {
    let weight = round_down(working_weight);

    templates
        .iter()
        .enumerate()
        .map(|(i, tpl)| Set {
            id: Uuid::now_v7(),
            weight,
            target_reps: tpl.reps,
            actual_reps: 0,
            kind: tpl.kind,
            order: i as u32 + 1,
        })
        .collect()
}

/// Map an ever-increasing day counter onto the cycle (1-based)
///
/// `workout_day(7, 6) == 1`, `workout_day(6, 6) == 6`.
/// A zero-length cycle has only day 1.
pub fn workout_day(current_day: u32, total_days: u32) -> u32 {
    if total_days == 0 {
        return 1;
    }
    let wrapped = (i64::from(current_day) - 1).rem_euclid(i64::from(total_days));
    wrapped as u32 + 1
}

/// Build one lift: warmups followed by working sets, numbered continuously
pub fn build_lift(working_weight: f64, template: &LiftTemplate) -> Lift {
    let mut sets = calculate_warmup_sets(working_weight, &template.warmup_sets);
    let offset = sets.len() as u32;

    sets.extend(
        calculate_working_sets(working_weight, &template.working_sets)
            .into_iter()
            .map(|mut set| {
                set.order += offset;
                set
            }),
    );

    Lift {
        id: Uuid::now_v7(),
        lift: template.lift,
        sets,
    }
}

/// Build the workout for a cycle state's current day
pub fn build_workout(user_program: &UserProgram, program: &Program) -> Result<Workout> {
    if program.workouts.is_empty() {
        return Err(Error::InvalidProgram(format!(
            "program '{}' has no workout days",
            program.name
        )));
    }

    let day = workout_day(user_program.current_day, program.cycle_length());
    let template = &program.workouts[(day - 1) as usize];

    let exercises = template
        .lifts
        .iter()
        .map(|lift_template| {
            let weight = user_program
                .current_weights
                .get(&lift_template.lift)
                .copied()
                .ok_or(Error::MissingWeight(lift_template.lift))?;
            Ok(build_lift(weight, lift_template))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Built day {} workout with {} lifts (counter at {})",
        day,
        exercises.len(),
        user_program.current_day
    );

    Ok(Workout {
        id: Uuid::now_v7(),
        user_program_id: user_program.id,
        day,
        exercises,
        entered_at: Utc::now(),
    })
}

/// Calculate the next workout for a user's active program
pub fn calculate_next_workout(user: &User, program: &Program) -> Result<Workout> {
    let user_program = user.active_program()?;
    build_workout(user_program, program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::build_greyskull_lp;
    use crate::LiftName;
    use std::collections::HashMap;

    fn warmup_templates() -> Vec<SetTemplate> {
        vec![
            SetTemplate::new(5, 0.0, SetKind::Warmup),
            SetTemplate::new(4, 0.55, SetKind::Warmup),
            SetTemplate::new(3, 0.70, SetKind::Warmup),
            SetTemplate::new(2, 0.85, SetKind::Warmup),
        ]
    }

    fn working_templates() -> Vec<SetTemplate> {
        vec![
            SetTemplate::new(5, 1.0, SetKind::Working),
            SetTemplate::new(5, 1.0, SetKind::Working),
            SetTemplate::new(5, 1.0, SetKind::Amrap),
        ]
    }

    fn weights(ohp: f64, bench: f64, squat: f64, deadlift: f64) -> HashMap<LiftName, f64> {
        HashMap::from([
            (LiftName::OverheadPress, ohp),
            (LiftName::BenchPress, bench),
            (LiftName::Squat, squat),
            (LiftName::Deadlift, deadlift),
        ])
    }

    fn user_at_day(day: u32, current_weights: HashMap<LiftName, f64>) -> User {
        let program = build_greyskull_lp();
        let mut user = User::new("tester");
        let user_program = UserProgram {
            id: Uuid::now_v7(),
            user_id: user.id,
            program_id: program.id,
            starting_weights: current_weights.clone(),
            current_weights,
            current_day: day,
            started_at: Utc::now(),
        };
        user.current_program = Some(user_program.id);
        user.programs.insert(user_program.id, user_program);
        user
    }

    #[test]
    fn test_round_down() {
        assert_eq!(round_down(0.0), 0.0);
        assert_eq!(round_down(2.4), 0.0);
        assert_eq!(round_down(53.625), 52.5);
        assert_eq!(round_down(55.0), 55.0);
        assert_eq!(round_down(97.3), 95.0);
        assert_eq!(round_down(99.99), 97.5);
    }

    #[test]
    fn test_round_down_idempotent() {
        for i in 0..2000 {
            let x = i as f64 * 0.37;
            let once = round_down(x);
            assert_eq!(round_down(once), once, "not idempotent for {}", x);
        }
    }

    #[test]
    fn test_no_warmups_at_or_below_floor() {
        for weight in [0.0, 45.0, 80.0, 84.9, 85.0] {
            assert!(calculate_warmup_sets(weight, &warmup_templates()).is_empty());
        }
        assert_eq!(calculate_warmup_sets(85.1, &warmup_templates()).len(), 4);
    }

    #[test]
    fn test_warmups_for_100() {
        let sets = calculate_warmup_sets(100.0, &warmup_templates());

        let weights: Vec<f64> = sets.iter().map(|s| s.weight).collect();
        let reps: Vec<u32> = sets.iter().map(|s| s.target_reps).collect();
        let orders: Vec<u32> = sets.iter().map(|s| s.order).collect();

        assert_eq!(weights, vec![45.0, 55.0, 70.0, 85.0]);
        assert_eq!(reps, vec![5, 4, 3, 2]);
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert!(sets.iter().all(|s| s.kind == SetKind::Warmup));
        assert!(sets.iter().all(|s| !s.is_complete()));
    }

    #[test]
    fn test_warmups_for_97_5_round_down() {
        let sets = calculate_warmup_sets(97.5, &warmup_templates());
        let weights: Vec<f64> = sets.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![45.0, 52.5, 67.5, 82.5]);
    }

    #[test]
    fn test_empty_templates() {
        assert!(calculate_warmup_sets(200.0, &[]).is_empty());
        assert!(calculate_working_sets(200.0, &[]).is_empty());
    }

    #[test]
    fn test_working_sets_share_rounded_weight() {
        let sets = calculate_working_sets(137.3, &working_templates());

        assert_eq!(sets.len(), 3);
        assert!(sets.iter().all(|s| s.weight == 135.0));
        assert_eq!(sets[0].kind, SetKind::Working);
        assert_eq!(sets[1].kind, SetKind::Working);
        assert_eq!(sets[2].kind, SetKind::Amrap);
        assert_eq!(sets.iter().map(|s| s.order).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_light_working_weight_reproduced() {
        // No bar-weight floor on working sets
        let sets = calculate_working_sets(20.0, &working_templates());
        assert!(sets.iter().all(|s| s.weight == 20.0));
    }

    #[test]
    fn test_workout_day() {
        assert_eq!(workout_day(1, 6), 1);
        assert_eq!(workout_day(6, 6), 6);
        assert_eq!(workout_day(7, 6), 1);
        assert_eq!(workout_day(12, 6), 6);
        assert_eq!(workout_day(100, 6), 4);
        assert_eq!(workout_day(0, 6), 6);
        assert_eq!(workout_day(5, 0), 1);
    }

    #[test]
    fn test_build_lift_renumbers_working_sets() {
        let template = LiftTemplate {
            lift: LiftName::Squat,
            warmup_sets: warmup_templates(),
            working_sets: working_templates(),
        };

        let lift = build_lift(150.0, &template);
        let orders: Vec<u32> = lift.sets.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7]);

        let light = build_lift(80.0, &template);
        let orders: Vec<u32> = light.sets.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_calculate_day_one() {
        let program = build_greyskull_lp();
        let user = user_at_day(1, weights(95.0, 125.0, 135.0, 185.0));

        let workout = calculate_next_workout(&user, &program).unwrap();

        assert_eq!(workout.day, 1);
        assert_eq!(workout.user_program_id, user.current_program.unwrap());
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].lift, LiftName::OverheadPress);
        assert_eq!(workout.exercises[1].lift, LiftName::Squat);

        // 95 > 85, so full warmups
        let ohp = &workout.exercises[0];
        assert_eq!(ohp.sets.len(), 7);
        assert_eq!(ohp.amrap_set().unwrap().weight, 95.0);
        assert_eq!(ohp.amrap_set().unwrap().order, 7);
    }

    #[test]
    fn test_calculate_wraps_cycle() {
        let program = build_greyskull_lp();
        let user = user_at_day(8, weights(95.0, 125.0, 135.0, 185.0));

        let workout = calculate_next_workout(&user, &program).unwrap();
        assert_eq!(workout.day, 2);
        assert_eq!(workout.exercises[0].lift, LiftName::BenchPress);
        assert_eq!(workout.exercises[1].lift, LiftName::Deadlift);
    }

    #[test]
    fn test_calculate_light_lift_has_no_warmups() {
        let program = build_greyskull_lp();
        let user = user_at_day(1, weights(65.0, 125.0, 135.0, 185.0));

        let workout = calculate_next_workout(&user, &program).unwrap();
        let ohp = &workout.exercises[0];
        assert_eq!(ohp.sets.len(), 3);
        assert!(ohp.sets.iter().all(|s| s.kind != SetKind::Warmup));
        assert_eq!(ohp.sets[0].order, 1);
    }

    #[test]
    fn test_calculate_missing_weight() {
        let program = build_greyskull_lp();
        let mut current = weights(95.0, 125.0, 135.0, 185.0);
        current.remove(&LiftName::Squat);
        let user = user_at_day(1, current);

        match calculate_next_workout(&user, &program) {
            Err(Error::MissingWeight(lift)) => assert_eq!(lift, LiftName::Squat),
            other => panic!("expected MissingWeight, got {:?}", other),
        }
    }

    #[test]
    fn test_calculate_without_active_program() {
        let program = build_greyskull_lp();
        let user = User::new("nobody");
        assert!(matches!(
            calculate_next_workout(&user, &program),
            Err(Error::NoActiveProgram)
        ));
    }

    #[test]
    fn test_calculate_empty_program() {
        let mut program = build_greyskull_lp();
        program.workouts.clear();
        let user = user_at_day(1, weights(95.0, 125.0, 135.0, 185.0));
        assert!(matches!(
            calculate_next_workout(&user, &program),
            Err(Error::InvalidProgram(_))
        ));
    }
}

//! User-level workflows shared by the CLI commands.
//!
//! The service loads state through a [`UserRepository`], hands it to the pure
//! calculator and progression functions, and persists the result.

use crate::calculator::{build_workout, workout_day};
use crate::program::ProgramCatalog;
use crate::progression::calculate_progression;
use crate::repository::UserRepository;
use crate::{Error, LiftName, Program, Result, SetKind, User, UserProgram, Workout};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Result of logging a workout
#[derive(Clone, Debug)]
pub struct WorkoutLog {
    /// The completed workout as stored in history
    pub workout: Workout,
    pub previous_weights: HashMap<LiftName, f64>,
    pub new_weights: HashMap<LiftName, f64>,
    /// Day of the cycle the next workout will use
    pub next_day: u32,
}

impl WorkoutLog {
    /// Lifts whose weight changed, in reporting order
    pub fn changes(&self) -> Vec<(LiftName, f64, f64)> {
        LiftName::ALL
            .iter()
            .filter_map(|lift| {
                let old = *self.previous_weights.get(lift)?;
                let new = *self.new_weights.get(lift)?;
                (old != new).then_some((*lift, old, new))
            })
            .collect()
    }
}

/// High-level user operations on top of a repository
pub struct UserService<R: UserRepository> {
    repo: R,
    catalog: ProgramCatalog,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R, catalog: ProgramCatalog) -> Self {
        Self { repo, catalog }
    }

    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Create a user and make them current
    pub fn create_user(&self, username: &str) -> Result<User> {
        let user = User::new(username);
        user.validate()?;

        match self.repo.get(&user.username) {
            Ok(_) => return Err(Error::UserAlreadyExists(user.username)),
            Err(Error::UserNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        self.repo.create(&user)?;
        self.repo.set_current(&user.username)?;
        Ok(user)
    }

    /// Make an existing user current, returning them with original casing
    pub fn switch_user(&self, username: &str) -> Result<User> {
        let user = self.repo.get(username)?;
        self.repo.set_current(&user.username)?;
        Ok(user)
    }

    /// All usernames and the current one, if set
    pub fn list_users(&self) -> Result<(Vec<String>, Option<String>)> {
        let usernames = self.repo.list()?;
        let current = match self.repo.get_current() {
            Ok(name) => Some(name),
            Err(Error::NoCurrentUser) => None,
            Err(e) => return Err(e),
        };
        Ok((usernames, current))
    }

    pub fn require_current_user(&self) -> Result<User> {
        let username = self.repo.get_current()?;
        self.repo.get(&username)
    }

    /// Current user with their active cycle state and its program
    pub fn current_program(&self) -> Result<(User, UserProgram, &Program)> {
        let user = self.require_current_user()?;
        let user_program = user.active_program()?.clone();
        let program = self.catalog.get_by_id(&user_program.program_id)?;
        Ok((user, user_program, program))
    }

    /// Start a program for the current user at day 1
    ///
    /// Every lift the program uses needs a positive starting weight.
    pub fn start_program(
        &self,
        program_id: &Uuid,
        starting_weights: HashMap<LiftName, f64>,
    ) -> Result<(User, &Program)> {
        let mut user = self.require_current_user()?;
        let program = self.catalog.get_by_id(program_id)?;

        for lift in program.lifts() {
            match starting_weights.get(&lift) {
                None => return Err(Error::MissingWeight(lift)),
                Some(&weight) if !(weight > 0.0) => {
                    return Err(Error::InvalidWeight { lift, weight })
                }
                Some(_) => {}
            }
        }

        let user_program = UserProgram {
            id: Uuid::now_v7(),
            user_id: user.id,
            program_id: program.id,
            current_weights: starting_weights.clone(),
            starting_weights,
            current_day: 1,
            started_at: Utc::now(),
        };

        tracing::info!(
            "{} started {} ({})",
            user.username,
            program.name,
            user_program.id
        );

        user.current_program = Some(user_program.id);
        user.programs.insert(user_program.id, user_program);
        self.repo.update(&user)?;

        Ok((user, program))
    }

    /// The workout the current user should do next
    pub fn next_workout(&self) -> Result<Workout> {
        let (_, user_program, program) = self.current_program()?;
        build_workout(&user_program, program)
    }

    /// Record the next workout with the given AMRAP results and progress
    ///
    /// Non-AMRAP sets are recorded as completed at their target reps.
    pub fn log_workout(
        &self,
        amrap_reps: &HashMap<LiftName, u32>,
        allow_failure: bool,
    ) -> Result<WorkoutLog> {
        let (mut user, user_program, program) = self.current_program()?;

        let planned = build_workout(&user_program, program)?;
        let completed = complete_workout(&planned, amrap_reps, allow_failure)?;

        let new_weights = calculate_progression(
            &completed,
            &user_program.current_weights,
            &program.progression_rules,
        )?;
        let next_day = workout_day(user_program.current_day + 1, program.cycle_length());

        {
            let state = user.active_program_mut()?;
            state.current_weights = new_weights.clone();
            state.current_day = next_day;
        }
        user.workout_history.push(completed.clone());
        self.repo.update(&user)?;

        tracing::info!(
            "Logged day {} for {}; next is day {}",
            completed.day,
            user.username,
            next_day
        );

        Ok(WorkoutLog {
            workout: completed,
            previous_weights: user_program.current_weights,
            new_weights,
            next_day,
        })
    }

    /// Most recent completed workouts for the current user, newest first
    pub fn history(&self, limit: usize) -> Result<Vec<Workout>> {
        let user = self.require_current_user()?;
        Ok(user.workout_history.into_iter().rev().take(limit).collect())
    }
}

/// Fill in actual reps on a planned workout
///
/// AMRAP sets take the supplied reps; all other sets are recorded at target.
/// Zero AMRAP reps count as a failure and are rejected unless allowed.
pub fn complete_workout(
    planned: &Workout,
    amrap_reps: &HashMap<LiftName, u32>,
    allow_failure: bool,
) -> Result<Workout> {
    let mut completed = planned.clone();
    completed.id = Uuid::now_v7();
    completed.entered_at = Utc::now();

    for exercise in &mut completed.exercises {
        let lift = exercise.lift;
        for set in &mut exercise.sets {
            set.actual_reps = match set.kind {
                SetKind::Amrap => {
                    let reps = *amrap_reps.get(&lift).ok_or(Error::MissingAmrapReps(lift))?;
                    if reps == 0 && !allow_failure {
                        return Err(Error::InvalidReps { lift, reps });
                    }
                    reps
                }
                SetKind::Warmup | SetKind::Working => set.target_reps,
            };
        }
    }

    Ok(completed)
}

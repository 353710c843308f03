mod display;
mod input;

use clap::{Parser, Subcommand};
use greyskull_core::*;
use input::Prompter;
use std::collections::HashMap;
use std::io::{self, StdinLock, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "greyskull")]
#[command(about = "Greyskull LP workout tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Browse and start programs
    Program {
        #[command(subcommand)]
        command: ProgramCommands,
    },

    /// Show, log and review workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user and make them current
    Create {
        /// Prompted for when omitted
        username: Option<String>,
    },
    /// List all users
    List,
    /// Switch the current user
    Switch { username: String },
}

#[derive(Subcommand)]
enum ProgramCommands {
    /// List available programs
    List,
    /// Start a program for the current user
    Start {
        /// Program id (skips the selection prompt)
        #[arg(long)]
        program: Option<Uuid>,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Show the next workout
    Next,
    /// Perform the next workout and record AMRAP results
    Log {
        /// Accept 0 reps on an AMRAP set
        #[arg(long)]
        allow_failure: bool,
    },
    /// Show recently logged workouts
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

type Service = UserService<JsonUserRepository>;
type StdPrompter = Prompter<StdinLock<'static>, Stdout>;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        greyskull_core::logging::init_with_level("debug");
    } else {
        greyskull_core::logging::init();
    }

    let config = match &cli.config {
        Some(path) => Config::load_or_default(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let catalog = config.program_catalog()?;
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Program validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::ProgramValidation("Invalid program catalog".into()));
    }

    let service = UserService::new(JsonUserRepository::new(&data_dir)?, catalog);
    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create { username } => cmd_user_create(&service, &mut prompter, username),
            UserCommands::List => cmd_user_list(&service),
            UserCommands::Switch { username } => cmd_user_switch(&service, &username),
        },
        Commands::Program { command } => match command {
            ProgramCommands::List => cmd_program_list(&service),
            ProgramCommands::Start { program } => {
                let program = program.or(config.program.default_program);
                cmd_program_start(&service, &mut prompter, program)
            }
        },
        Commands::Workout { command } => match command {
            WorkoutCommands::Next => cmd_workout_next(&service),
            WorkoutCommands::Log { allow_failure } => {
                cmd_workout_log(&service, &mut prompter, allow_failure)
            }
            WorkoutCommands::History { limit } => cmd_workout_history(&service, limit),
        },
    }
}

fn cmd_user_create(
    service: &Service,
    prompter: &mut StdPrompter,
    username: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompter.username()?,
    };

    let user = service.create_user(&username)?;
    println!(
        "User \"{}\" created successfully and set as current user.",
        user.username
    );
    Ok(())
}

fn cmd_user_list(service: &Service) -> Result<()> {
    let (usernames, current) = service.list_users()?;
    if usernames.is_empty() {
        println!("No users found. Create one with 'greyskull user create'.");
        return Ok(());
    }

    println!("Users:");
    for name in usernames {
        if current.as_deref() == Some(name.as_str()) {
            println!("* {} (current)", name);
        } else {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_user_switch(service: &Service, username: &str) -> Result<()> {
    let user = service.switch_user(username)?;
    println!("Switched to user \"{}\".", user.username);
    Ok(())
}

fn cmd_program_list(service: &Service) -> Result<()> {
    println!("Available programs:");
    for (i, program) in service.catalog().list().iter().enumerate() {
        println!(
            "{}. {} (v{}, {} days) [{}]",
            i + 1,
            program.name,
            program.version,
            program.cycle_length(),
            program.id
        );
    }
    Ok(())
}

fn cmd_program_start(
    service: &Service,
    prompter: &mut StdPrompter,
    program_id: Option<Uuid>,
) -> Result<()> {
    // Fail before prompting for anything
    let user = service.require_current_user()?;

    let program = match program_id {
        Some(id) => service.catalog().get_by_id(&id)?,
        None => match service.catalog().list() {
            [only] => only,
            programs => prompter.select_program(programs)?,
        },
    };

    println!("Starting {} for {}.", program.name, user.username);
    let mut weights = HashMap::new();
    for lift in program.lifts() {
        weights.insert(lift, prompter.starting_weight(lift)?);
    }

    let (_, program) = service.start_program(&program.id, weights)?;
    let first_day: Vec<_> = program
        .workouts
        .first()
        .map(|w| w.lifts.iter().map(|l| l.lift.to_string()).collect())
        .unwrap_or_default();

    println!();
    println!("Program started! {}", program.name);
    println!("Day 1 will be: {}", first_day.join(", "));
    Ok(())
}

fn cmd_workout_next(service: &Service) -> Result<()> {
    let workout = service.next_workout()?;
    display::write_workout(&mut io::stdout().lock(), &workout)?;
    Ok(())
}

fn cmd_workout_log(
    service: &Service,
    prompter: &mut StdPrompter,
    allow_failure: bool,
) -> Result<()> {
    let workout = service.next_workout()?;
    display::write_workout(&mut io::stdout().lock(), &workout)?;
    println!();

    let mut amrap_reps = HashMap::new();
    for exercise in &workout.exercises {
        let set = exercise
            .amrap_set()
            .ok_or(Error::NoAmrapSet(exercise.lift))?;
        let reps = prompter.amrap_reps(exercise.lift, set.target_reps, allow_failure)?;
        amrap_reps.insert(exercise.lift, reps);
    }

    let log = service.log_workout(&amrap_reps, allow_failure)?;

    println!();
    display::write_weight_changes(&mut io::stdout().lock(), &log)?;
    println!();
    println!("Workout logged successfully!");
    println!("Next workout: Day {}", log.next_day);
    Ok(())
}

fn cmd_workout_history(service: &Service, limit: usize) -> Result<()> {
    let workouts = service.history(limit)?;
    display::write_history(&mut io::stdout().lock(), &workouts)?;
    Ok(())
}

//! Interactive prompts for the CLI.
//!
//! Invalid answers are reported and asked again; running out of input is an
//! error so piped sessions cannot loop forever.

use greyskull_core::{Error, LiftName, Program, Result};
use std::io::{BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a question and return the trimmed answer
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Input("unexpected end of input".into()));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    pub fn username(&mut self) -> Result<String> {
        loop {
            let name = self.ask("Enter username: ")?;
            if !name.is_empty() {
                return Ok(name);
            }
            self.say("Username cannot be empty.")?;
        }
    }

    /// Pick one program from a numbered list
    pub fn select_program<'a>(&mut self, programs: &'a [Program]) -> Result<&'a Program> {
        self.say("Available programs:")?;
        for (i, program) in programs.iter().enumerate() {
            self.say(&format!("{}. {} (v{})", i + 1, program.name, program.version))?;
        }

        loop {
            let answer = self.ask(&format!("Select a program (1-{}): ", programs.len()))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=programs.len()).contains(&n) => return Ok(&programs[n - 1]),
                _ => self.say("Invalid selection. Please try again.")?,
            }
        }
    }

    pub fn starting_weight(&mut self, lift: LiftName) -> Result<f64> {
        loop {
            let answer = self.ask(&format!("Enter starting weight for {} (lbs): ", lift))?;
            match answer.parse::<f64>() {
                Ok(weight) if weight.is_finite() && weight > 0.0 => return Ok(weight),
                _ => self.say("Weight must be a positive number.")?,
            }
        }
    }

    /// Reps completed on an AMRAP set; zero only when failure is allowed
    pub fn amrap_reps(&mut self, lift: LiftName, target: u32, allow_failure: bool) -> Result<u32> {
        loop {
            let answer = self.ask(&format!(
                "How many reps did you complete for {} AMRAP set ({}+)? ",
                lift, target
            ))?;
            match answer.parse::<u32>() {
                Ok(reps) if reps > 0 || allow_failure => return Ok(reps),
                _ if allow_failure => self.say("Reps must be a whole number.")?,
                _ => self.say("Reps must be a positive whole number.")?,
            }
        }
    }
}

//! Command-line arguments and the interactive command grammar.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use visualmath_core::NavigationPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "visualmath",
    version,
    about = "Step through a math concept in the terminal",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// The math concept to visualize. Asked for interactively when omitted.
    pub topic: Option<String>,

    /// Only allow moving one step at a time (disables `jump`).
    #[arg(long)]
    pub sequential: bool,

    /// Directory of extra curated sequences (`*.json`).
    #[arg(long, value_name = "DIR")]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List example and curated topics.
    Topics {
        /// Directory of extra curated sequences (`*.json`).
        #[arg(long, value_name = "DIR")]
        catalog: Option<PathBuf>,
    },
    /// Print the JSON Schema of a curated sequence file.
    Schema,
}

impl Cli {
    pub fn policy(&self) -> NavigationPolicy {
        if self.sequential {
            NavigationPolicy::Sequential
        } else {
            NavigationPolicy::FreeJump
        }
    }
}

/// A line typed while the viewer is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Next,
    Previous,
    /// Zero-based target index.
    Jump(usize),
    Help,
    Quit,
}

pub const HELP: &str = "commands: [enter]/n next, p previous, j <step> jump, h help, q quit";

pub fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or("n").to_lowercase();
    let input = match command.as_str() {
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        "j" | "jump" => {
            let step = words
                .next()
                .ok_or_else(|| "jump needs a step number".to_string())?;
            let step: usize = step
                .parse()
                .map_err(|_| format!("'{}' is not a step number", step))?;
            if step == 0 {
                return Err("step numbers start at 1".to_string());
            }
            Input::Jump(step - 1)
        }
        other => return Err(format!("unknown command '{}'", other)),
    };
    if words.next().is_some() {
        return Err(format!("too many arguments for '{}'", command));
    }
    Ok(input)
}

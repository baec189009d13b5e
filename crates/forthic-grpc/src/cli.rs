use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::codec::ExecutionOutcome;
use crate::config::DEFAULT_ADDRESS;
use crate::value::{StackValue, stack_from_json};

#[derive(Parser, Debug)]
#[command(name = "forthicctl", about = "Forthic remote runtime CLI client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single word in the remote runtime.
    Exec {
        /// gRPC server address (e.g. http://127.0.0.1:50051).
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        addr: String,
        /// Word to execute.
        #[arg(long)]
        word: String,
        #[command(flatten)]
        stack: StackArgs,
    },
    /// Execute several words in one round trip.
    Sequence {
        /// gRPC server address (e.g. http://127.0.0.1:50051).
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        addr: String,
        /// Words to execute, in order. Repeat the flag for each word.
        #[arg(long = "word", required = true)]
        words: Vec<String>,
        #[command(flatten)]
        stack: StackArgs,
    },
}

/// Initial stack, given inline or as a file. A JSON array is spread into one
/// stack entry per element.
#[derive(Args, Debug, Default)]
pub struct StackArgs {
    /// Inline JSON stack (e.g. '[2, 3]').
    #[arg(long, conflicts_with = "stack_file")]
    pub stack: Option<String>,
    /// File holding a JSON stack.
    #[arg(long)]
    pub stack_file: Option<PathBuf>,
}

pub fn load_stack(args: &StackArgs) -> Result<Vec<StackValue>, String> {
    let text = match (&args.stack, &args.stack_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?,
        (None, None) => return Ok(Vec::new()),
    };
    stack_from_json(&text).map_err(|err| format!("invalid json stack: {err}"))
}

/// Lines to print for an outcome, bottom of the stack first.
pub fn render_outcome(outcome: &ExecutionOutcome) -> Vec<String> {
    match outcome {
        ExecutionOutcome::Stack(stack) => stack.iter().map(ToString::to_string).collect(),
        ExecutionOutcome::Error(info) => vec![info.to_string()],
    }
}

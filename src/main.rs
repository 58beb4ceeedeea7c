//! Kestrel - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kestrel::repl::LineRepl;
use kestrel::util::logger::{self, LogLevel};
use kestrel::{run, run_file, NAME, VERSION};

/// A small scripting language with an interactive, completion-aware REPL
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(version = VERSION)]
#[command(about = "Kestrel scripting language", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive REPL (the default)
    Repl,

    /// Run a Kestrel source file
    Run {
        /// Source file to run
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Evaluate Kestrel code from the command line
    Eval {
        /// Code to evaluate
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logger::init_with_level(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    match args.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            LineRepl::new()?.run()?;
        }
        Commands::Run { file } => {
            run_file(&file).with_context(|| format!("Failed to run: {}", file.display()))?;
        }
        Commands::Eval { code } => {
            if let Some(result) = run(&code)? {
                println!("{}", result);
            }
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}

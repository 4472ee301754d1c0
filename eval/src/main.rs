mod case;
mod cli;
mod outcome;
mod report;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "eval",
    version,
    about = "Trial harness for the blocks-world executioner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List cases under eval/cases.
    List,
    /// Run a case's trials and print the aggregated report.
    Run {
        case_id: String,
        /// Override the case's trial count.
        #[arg(long)]
        trials: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    executioner::logging::init();
    let cli = Cli::parse();
    let repo_root = std::env::current_dir()?;
    match cli.command {
        Command::List => cli::list_cases(&repo_root),
        Command::Run {
            case_id,
            trials,
            json,
        } => cli::run_case_by_id(&repo_root, &case_id, trials, json),
    }
}

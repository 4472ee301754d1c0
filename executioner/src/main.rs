//! Blocks-world plan executioner.
//!
//! Loads a scenario (initial world state + plan), executes the plan with
//! stochastic failure injection and reports each step. Exit codes are listed
//! in [`executioner::exit_codes`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use executioner::core::error::MalformedPlan;
use executioner::core::types::{Action, PlanResult};
use executioner::exit_codes;
use executioner::io::config::{ExecutionConfig, Mode, load_config, write_config};
use executioner::io::scenario::{load_scenario, sample_scenario, write_scenario};
use executioner::logging;
use executioner::run::{RunOptions, run_scenario};

const DEFAULT_CONFIG: &str = "executioner.toml";
const DEFAULT_SCENARIO: &str = "scenario.toml";

#[derive(Parser)]
#[command(
    name = "executioner",
    version,
    about = "Execute blocks-world plans with injected failures"
)]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a sample scenario and a default config if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check a scenario's world state and plan, and print the initial state.
    Validate {
        #[arg(default_value = DEFAULT_SCENARIO)]
        scenario: PathBuf,
    },
    /// Execute a scenario's plan.
    Run {
        #[arg(default_value = DEFAULT_SCENARIO)]
        scenario: PathBuf,
        /// Failure probability in [0, 1); overrides the config.
        #[arg(short, long)]
        probability: Option<f64>,
        /// Seed for reproducible failures; overrides the config.
        #[arg(long)]
        seed: Option<u64>,
        /// Executioner to use; overrides the config.
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Print the world state after every action.
        #[arg(long)]
        log_state: bool,
        /// Do not echo events to stdout.
        #[arg(short, long)]
        quiet: bool,
        /// Pause for questions after every successful action.
        #[arg(short, long)]
        interactive: bool,
        /// Append every event to this file.
        #[arg(long)]
        transcript: Option<PathBuf>,
        /// Print a JSON summary instead of the final state.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            let code = if err.downcast_ref::<MalformedPlan>().is_some() {
                exit_codes::MALFORMED
            } else {
                exit_codes::INVALID
            };
            std::process::exit(code);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Validate { scenario } => cmd_validate(&scenario),
        Command::Run {
            scenario,
            probability,
            seed,
            mode,
            log_state,
            quiet,
            interactive,
            transcript,
            json,
        } => {
            let mut config = load_config(&cli.config)?;
            apply_overrides(&mut config, probability, seed, mode, log_state, quiet || json);
            cmd_run(
                &scenario,
                RunOptions {
                    config,
                    transcript,
                    interactive,
                },
                json,
            )
        }
    }
}

fn apply_overrides(
    config: &mut ExecutionConfig,
    probability: Option<f64>,
    seed: Option<u64>,
    mode: Option<Mode>,
    log_state: bool,
    quiet: bool,
) {
    if let Some(p) = probability {
        config.failure_probability = p;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(mode) = mode {
        config.mode = mode;
    }
    config.log_state |= log_state;
    if quiet {
        config.echo_events = false;
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    let scenario_path = Path::new(DEFAULT_SCENARIO);
    if force || !scenario_path.exists() {
        write_scenario(scenario_path, &sample_scenario())
            .with_context(|| format!("write {}", scenario_path.display()))?;
    }
    if force || !config_path.exists() {
        write_config(config_path, &ExecutionConfig::default())
            .with_context(|| format!("write {}", config_path.display()))?;
    }
    Ok(exit_codes::OK)
}

fn cmd_validate(scenario_path: &Path) -> Result<i32> {
    let scenario = load_scenario(scenario_path)?;
    if let Some((step, action)) = scenario
        .plan
        .iter()
        .enumerate()
        .find(|(_, action)| matches!(action, Action::Unknown { .. }))
    {
        bail!(MalformedPlan {
            step: step + 1,
            action: action.to_string(),
        });
    }
    println!(
        "{}",
        scenario
            .state
            .display("Here is the description for the initial state named")
    );
    println!("plan: {} action(s)", scenario.plan.len());
    Ok(exit_codes::OK)
}

fn cmd_run(scenario_path: &Path, options: RunOptions, json: bool) -> Result<i32> {
    let scenario = load_scenario(scenario_path)?;
    let summary = run_scenario(&scenario, &options)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialize summary")?
        );
    } else if let Some(state) = &summary.final_world {
        println!("{}", state.display("Here is the final state"));
    }

    Ok(match summary.result {
        PlanResult::Completed => exit_codes::OK,
        PlanResult::Aborted { .. } => exit_codes::ABORTED,
    })
}

//! Command dispatch for the steptree binary.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::build_runtime;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::demo::{self, Scenario};
use crate::domain::{State, ToTermTree};

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run { scenario }) => cmd_run(*scenario, settings),
        Some(Commands::Plan { scenario }) => cmd_plan(*scenario),
        Some(Commands::Config { command }) => cmd_config(command, cli, settings),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

#[instrument(skip(settings))]
fn cmd_run(scenario: Scenario, settings: &Settings) -> CliResult<()> {
    let tree = scenario.build();
    let runtime = build_runtime(&settings.runtime)?;

    let mut state = State::new();
    let result = runtime.block_on(tree.execute_with(&mut state));
    debug!(?state, "run finished");

    output::header(&format!("{} ({})", scenario, tree.name()));
    for event in demo::trace(&state) {
        output::detail(event);
    }

    match result {
        Ok(()) => {
            output::success(&format!("{} passed", scenario));
            Ok(())
        }
        Err(e) => {
            output::failure(&format!("{} failed", scenario));
            Err(CliError::Run(e))
        }
    }
}

fn cmd_plan(scenario: Scenario) -> CliResult<()> {
    let tree = scenario.build();
    output::header("Tree:");
    output::info(&tree.to_tree_string());
    output::header("Phases:");
    for phase in tree.schedule() {
        output::detail(&phase);
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, cli: &Cli, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            output::info(&format!("global: {}", global));
            let project_dir = match &cli.project_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().map_err(|e| {
                    CliError::Usage(format!("cannot determine current directory: {e}"))
                })?,
            };
            output::info(&format!("local:  {}", local_config_path(&project_dir).display()));
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

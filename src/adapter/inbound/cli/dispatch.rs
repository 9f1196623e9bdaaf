//! Routes a parsed command line to its handler.

use crate::adapter::inbound::cli::command::{Cli, Commands, CurveCommand, LedgerCommand};
use crate::adapter::inbound::cli::output::{self, OutputConfig};
use crate::adapter::inbound::cli::report::Outcome;
use crate::adapter::inbound::cli::{curve, ledger, liquidity, provision, registry};
use crate::error::Result;
use crate::infrastructure::bootstrap::{self, SessionOptions};
use crate::infrastructure::config::settings::Config;

/// Run one command to completion.
///
/// # Errors
///
/// Returns an error if configuration, wiring or a fatal stage fails.
pub async fn execute(cli: Cli) -> Result<Outcome> {
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let Cli {
        config: config_path,
        network,
        yes,
        command,
        ..
    } = cli;

    if let Commands::Curve(CurveCommand::Preview(args)) = &command {
        if let Some(start) = args.start {
            curve::preview_generated(args, start)?;
            return Ok(Outcome::Completed);
        }
    }

    let mut config = Config::load(&config_path)?;
    if let Some(name) = network {
        config.select_network(&name)?;
    }

    if let Commands::Curve(CurveCommand::Preview(_)) = &command {
        curve::preview_tiers(&config.instances)?;
        return Ok(Outcome::Completed);
    }

    config.init_logging();
    let chain_id = config.active_network()?.chain_id;
    output::header(env!("CARGO_PKG_VERSION"), &config.network, chain_id);

    let options = SessionOptions { assume_yes: yes };
    let progress = output::progress("Connecting...");
    let mut orchestrator = match bootstrap::build_orchestrator(&config, options).await {
        Ok(orchestrator) => {
            progress.succeed("Connected");
            orchestrator
        }
        Err(e) => {
            progress.fail("Connection failed");
            return Err(e);
        }
    };

    match command {
        Commands::Provision(command) => provision::execute(&mut orchestrator, command).await,
        Commands::Liquidity(command) => liquidity::execute(&orchestrator, command).await,
        Commands::Registry(command) => registry::execute(&orchestrator, command).await,
        Commands::Task(command) => registry::execute_task(&orchestrator, command).await,
        Commands::Ledger(LedgerCommand::Show) => {
            ledger::show(orchestrator.ledger());
            Ok(Outcome::Completed)
        }
        Commands::Curve(_) => Ok(Outcome::Completed),
    }
}

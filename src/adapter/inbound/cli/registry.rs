//! Handlers for `lpforge registry` and `lpforge task`.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{RegistryCommand, TaskCommand};
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::report::{self, Outcome};
use crate::application::orchestrator::Orchestrator;
use crate::error::Result;

#[derive(Tabled)]
struct UnregisteredRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Instance")]
    lp: String,
}

/// Execute a registry subcommand.
///
/// # Errors
///
/// Returns an error if the operation fails as a whole, including bulk
/// operations on a network not tagged local.
pub async fn execute(orchestrator: &Orchestrator, command: RegistryCommand) -> Result<Outcome> {
    match command {
        RegistryCommand::RegisterAll => {
            output::section("Registering every instance");
            let outcome = orchestrator.register_all().await?;
            Ok(report::bulk("registry.register-all", &outcome))
        }
        RegistryCommand::UnregisterAll => {
            output::section("Unregistering every instance");
            let outcome = orchestrator.unregister_all().await?;
            Ok(report::bulk("registry.unregister-all", &outcome))
        }
        RegistryCommand::Register(arg) => {
            let changed = orchestrator.register_lp(arg.lp).await?;
            toggled("registry.register", arg.lp, changed, "Registered", "Already registered");
            Ok(Outcome::Completed)
        }
        RegistryCommand::Unregister(arg) => {
            let changed = orchestrator.unregister_lp(arg.lp).await?;
            toggled("registry.unregister", arg.lp, changed, "Unregistered", "Not registered");
            Ok(Outcome::Completed)
        }
        RegistryCommand::ListUnregistered(arg) => {
            let instances = orchestrator.list_unregistered(arg.registry).await?;
            if output::is_json() {
                output::result(json!({
                    "command": "registry.list-unregistered",
                    "instances": instances,
                }));
                return Ok(Outcome::Completed);
            }

            output::section("Unregistered instances");
            if instances.is_empty() {
                output::note("None");
                return Ok(Outcome::Completed);
            }
            let rows: Vec<_> = instances
                .iter()
                .map(|i| UnregisteredRow {
                    market: i.market.to_string(),
                    lp: i.lp.to_string(),
                })
                .collect();
            output::table(&Table::new(rows).to_string());
            Ok(Outcome::Completed)
        }
    }
}

/// Execute a rebalance task subcommand.
///
/// # Errors
///
/// Returns an error if the automation adapter is not recorded.
pub async fn execute_task(orchestrator: &Orchestrator, command: TaskCommand) -> Result<Outcome> {
    match command {
        TaskCommand::CreateAll => {
            output::section("Creating rebalance tasks");
            let outcome = orchestrator.create_rebalance_tasks().await?;
            Ok(report::bulk("task.create-all", &outcome))
        }
        TaskCommand::CancelAll => {
            output::section("Cancelling rebalance tasks");
            let outcome = orchestrator.cancel_rebalance_tasks().await?;
            Ok(report::bulk("task.cancel-all", &outcome))
        }
    }
}

fn toggled(
    command: &str,
    lp: alloy_primitives::Address,
    changed: bool,
    done: &str,
    unchanged: &str,
) {
    if output::is_json() {
        output::result(json!({
            "command": command,
            "lp": lp,
            "changed": changed,
        }));
        return;
    }
    if changed {
        output::success(&format!("{done} {lp}"));
    } else {
        output::note(&format!("{unchanged}: {lp}"));
    }
}

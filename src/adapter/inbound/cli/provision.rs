//! Handlers for `lpforge provision`.

use crate::adapter::inbound::cli::command::ProvisionCommand;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::report::{self, Outcome};
use crate::application::orchestrator::Orchestrator;
use crate::error::Result;

/// Execute a provisioning subcommand.
///
/// # Errors
///
/// Returns an error if a singleton stage fails. Per-market and per-round
/// failures are reported in the summary instead.
pub async fn execute(orchestrator: &mut Orchestrator, command: ProvisionCommand) -> Result<Outcome> {
    let (name, summary) = match command {
        ProvisionCommand::All => {
            output::section("Provisioning everything");
            ("provision.all", orchestrator.provision_all().await?)
        }
        ProvisionCommand::Market(arg) => {
            output::section("Provisioning market");
            output::field("Market", arg.market);
            (
                "provision.market",
                orchestrator.provision_market(arg.market).await?,
            )
        }
        ProvisionCommand::Fundraising => {
            output::section("Provisioning fundraising");
            ("provision.fundraising", orchestrator.provision_fundraising().await?)
        }
    };

    Ok(report::summary(name, &summary))
}

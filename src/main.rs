use clap::Parser;
use lpforge::adapter::inbound::cli::command::Cli;
use lpforge::adapter::inbound::cli::{dispatch, output};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = tokio::select! {
        result = dispatch::execute(cli) => match result {
            Ok(outcome) => outcome.exit_code(),
            Err(e) => {
                output::error(&e.to_string());
                1
            }
        },
        _ = signal::ctrl_c() => {
            info!("Interrupted");
            output::warning("Interrupted, completed steps are recorded");
            130
        }
    };

    std::process::exit(code);
}

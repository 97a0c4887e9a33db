mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Config is loaded and logging initialized inside dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("telecharger error: {:#}", err);
        std::process::exit(1);
    }
}

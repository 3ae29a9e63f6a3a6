//! `kumu-admin` entry point.

use clap::Parser;
use kumu_admin::cli::{self, Cli};
use kumu_admin::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = cli::run(cli).await {
        tracing::error!(error = %err, "command failed");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

use clap::Parser;
use netatmo_collector::cli::{run, Cli};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("Error ({}): {}", error.category(), error);
        process::exit(error.exit_code());
    }
}

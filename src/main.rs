// estate_estimator - main.rs
// Parses the command line and hands off to the CLI runner

use clap::Parser;
use estate_estimator::cli::{run, Cli};
use std::process::exit;

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("❌ {e:#}");
            exit(1);
        }
    }
}

use anyhow::Result;

use scoutdesk::cli::Command;
use scoutdesk::{handle_serve, handle_setup, interpret};

fn main() {
    sensible_env_logger::init!();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match interpret() {
        Command::Serve { port } => handle_serve(port),
        Command::Setup { seed } => handle_setup(seed),
    }
}

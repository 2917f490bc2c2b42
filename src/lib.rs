pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod favorites;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_setup(seed: bool) -> Result<()> {
    let config = AppConfig::new();
    let db_path = std::env::var("DATABASE_PATH")
        .unwrap_or_else(|_| config.server.default_database_path.to_string());

    let pool = database::create_pool(&db_path)?;
    let mut conn = database::get_connection(&pool)?;

    database::setup::reset_database(&mut conn)?;
    if seed {
        database::setup::seed_demo_data(&mut conn)?;
    }
    Ok(())
}

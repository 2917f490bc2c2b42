use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::cache::LogInvalidator;
use crate::config::AppConfig;
use crate::database;
use crate::services::reconciliation::ReconciliationService;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let db_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| self.config.server.default_database_path.to_string());

        let pool = database::create_pool(&db_path)?;

        let reconciliation = Arc::new(ReconciliationService::new(
            pool.clone(),
            Arc::new(LogInvalidator),
            &self.config,
        ));

        let state = Arc::new(AppState {
            pool,
            reconciliation,
        });

        let app = create_router(state).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

use dotenvy::dotenv;
use school_core::observability::init_tracing;
use school_portal::config::get_configuration;
use school_portal::services::{AdminAllowList, RoleResolver, SchoolService, SheetsClient};
use school_portal::startup::build_router;
use school_portal::AppState;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "school-portal",
        &configuration.observability.log_level,
        configuration.observability.otlp_endpoint.as_deref(),
    )?;

    let admins = AdminAllowList::new(&configuration.access.admin_emails);
    if admins.is_empty() {
        tracing::warn!("Admin allow-list is empty; nobody will get the admin role");
    }

    let roster = Arc::new(
        SheetsClient::new(
            configuration.sheets.clone(),
            configuration.retry.to_retry_config(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build spreadsheet client: {}", e))?,
    );

    let state = AppState::new(
        Arc::new(RoleResolver::new(admins, roster.clone())),
        Arc::new(SchoolService::new(roster)),
    );

    let app = build_router(state, &configuration.server);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting school-portal on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

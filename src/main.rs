use storefront_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    setup_environment();

    tracing::info!("Storefront server starting...");

    // 2. Load configuration
    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "configuration loaded"
    );

    // 3. Initialize shared state (database, JWT, mailer)
    let state = ServerState::initialize(&config).await?;

    // 4. Run the HTTP server until shutdown
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

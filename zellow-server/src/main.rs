use zellow_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, config, logging
    let config = setup_environment()?;

    print_banner();
    tracing::info!(environment = %config.environment, "Zellow server starting...");

    // 2. Database and services
    let state = ServerState::initialize(&config)?;

    // 3. HTTP server (starts the background tasks)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {:#}", e);
        return Err(e);
    }

    Ok(())
}

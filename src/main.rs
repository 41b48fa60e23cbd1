use tokio::net::TcpListener;

use hayya::{app, logging, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config);
    if !state.chat.is_available() {
        tracing::warn!("chat endpoints will answer with fallback messages");
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("hayya listening on {}", config.bind_addr);
    axum::serve(listener, app(state, &config)).await?;
    Ok(())
}

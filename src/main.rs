use std::sync::Arc;

use tracing::info;

use subtrack::application::use_cases::subscription::SubscriptionUseCase;
use subtrack::infrastructure::config::AppConfig;
use subtrack::infrastructure::sheets::GoogleSheetsClient;
use subtrack::interfaces::http::start_server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = AppConfig::load().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let store = Arc::new(GoogleSheetsClient::new(&config));
    let subscription = Arc::new(SubscriptionUseCase::new(store));

    info!(
        addr = %config.bind_addr,
        port = config.bind_port,
        "Starting subscription reconciliation service"
    );

    start_server(subscription, &config.bind_addr, config.bind_port)?.await
}

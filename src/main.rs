use log::{error, info};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting SSE broadcast server [{}] with keep-alive every {}s",
        config.runtime_env(),
        config.keep_alive().as_secs()
    );

    let sse_manager = Arc::new(service::init_sse_manager(&config));
    let app_state = AppState::new(config, &sse_manager);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}

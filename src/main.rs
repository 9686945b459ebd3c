use std::sync::Arc;

use docserve::config::{AppState, Config, DEFAULT_CONFIG_PATH};
use docserve::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;

    if let Err(e) = logger::init(&cfg) {
        eprintln!("[ERROR] Failed to initialize logging: {e}");
    }

    // Create Tokio runtime, sized by server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &state.config, state.document_root.path());

    server::run(listener, state, server::shutdown_signal()).await?;
    Ok(())
}

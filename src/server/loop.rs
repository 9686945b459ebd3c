// Server loop module
// Accepts connections until a shutdown signal, then drains them

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` resolves
///
/// Once it does, the listener is closed, open connections are asked to finish
/// their in-flight request, and the loop waits up to
/// `performance.shutdown_grace` seconds for them before returning.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(state.connection_count());

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    // A timeout here just means some connections are abandoned
    let _ = tokio::time::timeout(grace, graceful.shutdown()).await;
    logger::log_shutdown_finished(state.connection_count());

    Ok(())
}

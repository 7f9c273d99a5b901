use tokio::signal;

/// Resolves on Ctrl+C so axum can drain in-flight requests before exiting.
pub async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        crate::error::log_error(&e);
        std::future::pending::<()>().await;
    }

    #[cfg(not(windows))]
    println!();
    tracing::info!("Ctrl+C received. Please wait, finishing in-flight requests.");
}

//! Client execution logic with reconnection support.

use std::time::{Duration, Instant};

use crate::{config::ClientConfig, error::ClientError, session::run_client_session};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the relay client with reconnection logic
///
/// Authorization failures (close codes 4000 / 4001) end the run immediately.
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Instant::now();
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as {} (attempt {}/{})",
            config.url,
            config.role.label(),
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&config, started_at).await {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(e) if e.is_terminal() => {
                tracing::error!("{}", e);
                tracing::error!("Authorization was rejected by the relay. Exiting.");
                return Err(Box::new(e));
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(Box::new(ClientError::ConnectionError(format!(
                        "gave up after {} attempts",
                        MAX_RECONNECT_ATTEMPTS
                    ))));
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

//! Watch command - the long-running hot-reload session.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::session::Session;

/// Validate the watch root, then run until Ctrl+C.
pub async fn run(settings: Settings) {
    if let Err(e) = settings.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ctrl_c_token.cancel(),
            Err(e) => tracing::error!("[session] failed to listen for Ctrl+C: {e}"),
        }
    });

    if let Err(e) = Session::new(settings).run(shutdown).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

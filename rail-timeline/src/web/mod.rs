//! Web layer for movement decisions and schedule lookups.
//!
//! Provides HTTP endpoints over a loaded policy table and timeline.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ServerConfig};

use tracing::info;

/// Bind to the configured address and serve until the process exits.
pub async fn serve(state: AppState, config: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "listening");
    axum::serve(listener, create_router(state)).await
}

//! Web push delivery for AlertTrail: the background worker that renders
//! pushed alerts, the page-side subscription client, and a small companion
//! server for the endpoints they talk to.

pub mod adapters;
#[cfg(not(target_arch = "wasm32"))]
pub mod app;
#[cfg(target_arch = "wasm32")]
mod bindings;
pub mod client;
pub mod config;
pub mod ports;
#[cfg(not(target_arch = "wasm32"))]
pub mod push;
#[cfg(not(target_arch = "wasm32"))]
pub mod state;
#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) mod testing;
pub mod types;
pub mod worker;

#[cfg(not(target_arch = "wasm32"))]
pub use app::app;
#[cfg(not(target_arch = "wasm32"))]
pub use push::vapid::{VapidCredentials, generate_vapid_credentials};

#[cfg(not(target_arch = "wasm32"))]
pub async fn serve(config: config::AppConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app(config)).await
}

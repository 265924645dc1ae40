pub mod page;
#[cfg(not(target_arch = "wasm32"))]
pub mod push;
pub mod server_api;
#[cfg(not(target_arch = "wasm32"))]
pub mod time;
pub mod worker;

/// Failure reported by a browser primitive (a rejected promise or a thrown
/// exception), reduced to its message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

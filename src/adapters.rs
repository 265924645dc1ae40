#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod http;
#[cfg(not(target_arch = "wasm32"))]
mod sender;
#[cfg(not(target_arch = "wasm32"))]
mod time;

#[cfg(not(target_arch = "wasm32"))]
pub use sender::WebPushSender;
#[cfg(not(target_arch = "wasm32"))]
pub use self::time::UtcTimeProvider;

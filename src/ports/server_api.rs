use futures::future::LocalBoxFuture;

use crate::types::push::{PublicKeyResponse, PushSubscription, SendTestResponse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerApiError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("request to {path} failed: {message}")]
    Transport { path: &'static str, message: String },
    #[error("invalid response from {path}: {message}")]
    Decode { path: &'static str, message: String },
}

/// The three server endpoints the subscription client talks to.
pub trait PushServerApi {
    fn fetch_public_key(&self) -> LocalBoxFuture<'_, Result<PublicKeyResponse, ServerApiError>>;
    fn submit_subscription<'a>(
        &'a self,
        subscription: &'a PushSubscription,
    ) -> LocalBoxFuture<'a, Result<(), ServerApiError>>;
    fn send_test(&self) -> LocalBoxFuture<'_, Result<SendTestResponse, ServerApiError>>;
}

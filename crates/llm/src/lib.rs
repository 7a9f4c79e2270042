//! Client for the zova generation backend.
//!
//! Requests are routed by the MIME type of the optional upload and sent as JSON
//! (text only) or multipart (`file` + `message`).
use std::sync::Arc;

mod http_adapter;
mod provider;
mod route;

pub use http_adapter::{FILE_FIELD, HttpBackendAdapter, MESSAGE_FIELD};
pub use provider::{
    BackendConfig, BackendError, BackendResult, BoxFuture, GenerationBackend, GenerationOutcome,
    GenerationRequest, ReplyPayload, Upload,
};
pub use route::{MediaKind, Route, select_route};

pub fn create_backend(config: BackendConfig) -> BackendResult<Arc<dyn GenerationBackend>> {
    tracing::info!(base_url = %config.base_url, "creating http generation backend");
    Ok(Arc::new(HttpBackendAdapter::new(config)?))
}

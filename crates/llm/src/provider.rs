use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use snafu::Snafu;

use super::route::{Route, select_route};

/// Origin for backend requests; routes are appended to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, route: Route) -> String {
        format!("{}{}", self.base_url, route.path())
    }
}

/// File content sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// One generation call: message text plus an optional upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub message: String,
    pub upload: Option<Upload>,
}

impl GenerationRequest {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            upload: None,
        }
    }

    pub fn with_upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    pub fn route(&self) -> Route {
        select_route(self.upload.as_ref().map(|upload| upload.mime_type.as_str()))
    }
}

/// JSON body returned by every generation route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Result of a request whose response body was readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Replied { reply: Option<String> },
    Rejected { status: u16, error: Option<String> },
}

impl GenerationOutcome {
    /// Classifies a decoded payload.
    ///
    /// A 2xx status succeeds unless the payload says `success: false`.
    pub fn from_payload(status: u16, payload: ReplyPayload) -> Self {
        let status_ok = (200..300).contains(&status);
        if status_ok && payload.success != Some(false) {
            Self::Replied {
                reply: payload.reply,
            }
        } else {
            Self::Rejected {
                status,
                error: payload.error,
            }
        }
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("failed to build http client on `{stage}`, {source}"))]
    BuildHttpClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("upload '{file_name}' has invalid MIME type '{mime_type}'"))]
    InvalidUploadMime {
        stage: &'static str,
        file_name: String,
        mime_type: String,
        source: reqwest::Error,
    },
    #[snafu(display("request to {route} failed on `{stage}`, {source}"))]
    SendRequest {
        stage: &'static str,
        route: Route,
        source: reqwest::Error,
    },
    #[snafu(display("failed to read response body from {route}, {source}"))]
    ReadResponseBody {
        stage: &'static str,
        route: Route,
        source: reqwest::Error,
    },
    #[snafu(display("response from {route} (status {status}) is not a reply payload: {source}"))]
    DecodePayload {
        stage: &'static str,
        route: Route,
        status: u16,
        source: serde_json::Error,
    },
    #[snafu(display("generation worker stopped unexpectedly: {details}"))]
    WorkerPanicked {
        stage: &'static str,
        details: String,
    },
}

/// Transport to the generation backend.
///
/// `Err` means the exchange itself failed (network, unreadable body). A backend that
/// answered with an error payload yields `Ok(GenerationOutcome::Rejected { .. })`.
pub trait GenerationBackend: Send + Sync {
    fn base_url(&self) -> &str;
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> BoxFuture<'static, BackendResult<GenerationOutcome>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ReplyPayload {
        match serde_json::from_str(json) {
            Ok(payload) => payload,
            Err(error) => panic!("fixture should decode: {error}"),
        }
    }

    #[test]
    fn success_status_with_reply_is_replied() {
        let outcome = GenerationOutcome::from_payload(200, payload(r#"{"reply":"hi"}"#));
        assert_eq!(
            outcome,
            GenerationOutcome::Replied {
                reply: Some("hi".to_string())
            }
        );
    }

    #[test]
    fn explicit_success_false_is_rejected_even_on_200() {
        let outcome = GenerationOutcome::from_payload(
            200,
            payload(r#"{"success":false,"error":"quota exceeded"}"#),
        );
        assert_eq!(
            outcome,
            GenerationOutcome::Rejected {
                status: 200,
                error: Some("quota exceeded".to_string())
            }
        );
    }

    #[test]
    fn explicit_success_true_is_replied() {
        let outcome =
            GenerationOutcome::from_payload(201, payload(r#"{"success":true,"reply":"ok"}"#));
        assert!(matches!(outcome, GenerationOutcome::Replied { .. }));
    }

    #[test]
    fn error_status_is_rejected_without_description() {
        let outcome = GenerationOutcome::from_payload(502, payload("{}"));
        assert_eq!(
            outcome,
            GenerationOutcome::Rejected {
                status: 502,
                error: None
            }
        );
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = BackendConfig::new(" http://localhost:3000/ ");
        assert_eq!(config.url_for(Route::Pdf), "http://localhost:3000/generate-pdf");
    }

    #[test]
    fn request_route_uses_upload_mime_type() {
        let request = GenerationRequest::text("describe").with_upload(Upload::new(
            "song.mp3",
            "audio/mpeg",
            vec![1_u8, 2, 3],
        ));
        assert_eq!(request.route(), Route::Audio);
        assert_eq!(GenerationRequest::text("hello").route(), Route::Text);
    }
}

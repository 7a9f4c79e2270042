use reqwest::multipart::{Form, Part};
use serde::Serialize;
use snafu::ResultExt;

use super::provider::{
    BackendConfig, BackendResult, BoxFuture, BuildHttpClientSnafu, DecodePayloadSnafu,
    GenerationBackend, GenerationOutcome, GenerationRequest, InvalidUploadMimeSnafu,
    ReadResponseBodySnafu, ReplyPayload, SendRequestSnafu, Upload,
};

/// Multipart field carrying the raw upload.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the message text. Always sent, possibly empty.
pub const MESSAGE_FIELD: &str = "message";

#[derive(Serialize)]
struct TextBody<'a> {
    message: &'a str,
}

/// Talks to the generation backend over plain HTTP.
pub struct HttpBackendAdapter {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBackendAdapter {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context(BuildHttpClientSnafu {
                stage: "http-adapter-new",
            })?;

        Ok(Self { config, client })
    }

    fn build_form(upload: Upload, message: String) -> BackendResult<Form> {
        let mut part = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
        if !upload.mime_type.is_empty() {
            part = part.mime_str(&upload.mime_type).context(InvalidUploadMimeSnafu {
                stage: "build-multipart-file",
                file_name: upload.file_name.clone(),
                mime_type: upload.mime_type.clone(),
            })?;
        }

        Ok(Form::new()
            .part(FILE_FIELD, part)
            .text(MESSAGE_FIELD, message))
    }

    async fn send_generation(
        client: reqwest::Client,
        config: BackendConfig,
        request: GenerationRequest,
    ) -> BackendResult<GenerationOutcome> {
        let route = request.route();
        let url = config.url_for(route);
        let GenerationRequest { message, upload } = request;

        let builder = client.post(&url);
        let builder = match upload {
            Some(upload) => {
                tracing::debug!(
                    route = %route,
                    file_name = %upload.file_name,
                    mime_type = %upload.mime_type,
                    size = upload.bytes.len(),
                    "sending multipart generation request"
                );
                builder.multipart(Self::build_form(upload, message)?)
            }
            None => {
                tracing::debug!(route = %route, "sending json generation request");
                builder.json(&TextBody { message: &message })
            }
        };

        let response = builder.send().await.context(SendRequestSnafu {
            stage: "send-generation-request",
            route,
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.context(ReadResponseBodySnafu {
            stage: "read-generation-response",
            route,
        })?;

        // Non-JSON bodies count as transport failures whatever the status says.
        let payload: ReplyPayload = serde_json::from_str(&body).context(DecodePayloadSnafu {
            stage: "decode-generation-response",
            route,
            status,
        })?;

        let outcome = GenerationOutcome::from_payload(status, payload);
        if let GenerationOutcome::Rejected { status, error } = &outcome {
            tracing::warn!(
                route = %route,
                status,
                error = error.as_deref().unwrap_or_default(),
                "backend rejected generation request"
            );
        }

        Ok(outcome)
    }
}

impl GenerationBackend for HttpBackendAdapter {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn generate(
        &self,
        request: GenerationRequest,
    ) -> BoxFuture<'static, BackendResult<GenerationOutcome>> {
        Box::pin(Self::send_generation(
            self.client.clone(),
            self.config.clone(),
            request,
        ))
    }
}

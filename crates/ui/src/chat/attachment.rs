use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::{OptionExt, ResultExt, Snafu};
use zova_llm::{MediaKind, Upload};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AttachmentError {
    #[snafu(display("failed to read attachment at {path:?} on `{stage}`: {source}"))]
    ReadAttachment {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("attachment path {path:?} does not name a file"))]
    MissingFileName { stage: &'static str, path: PathBuf },
}

pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// A user-selected file. Content is shared so the rendered message and the
/// in-flight upload can both hold it without copying.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    content: Arc<[u8]>,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Reads a file from disk, guessing its MIME type from the extension.
    pub async fn load(path: impl AsRef<Path>) -> AttachmentResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .context(MissingFileNameSnafu {
                stage: "attachment-file-name",
                path: path.to_path_buf(),
            })?;

        let content = tokio::fs::read(path).await.context(ReadAttachmentSnafu {
            stage: "read-attachment-file",
            path: path.to_path_buf(),
        })?;

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        tracing::debug!(
            name = %name,
            mime_type = %mime_type,
            size = content.len(),
            "loaded attachment"
        );

        Ok(Self::new(name, mime_type, content))
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn to_upload(&self) -> Upload {
        Upload::new(
            self.name.clone(),
            self.mime_type.clone(),
            Arc::clone(&self.content),
        )
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Attachment")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

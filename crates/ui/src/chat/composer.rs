use crate::chat::attachment::Attachment;

/// Composition state captured at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub attachment: Option<Attachment>,
}

/// The draft the user is editing: pending text plus at most one attachment.
///
/// Selecting a second attachment replaces the first.
#[derive(Debug, Default)]
pub struct Composer {
    text: String,
    attachment: Option<Attachment>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Stages an attachment, returning the one it replaced.
    pub fn add_attachment(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.attachment.replace(attachment)
    }

    pub fn remove_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.attachment.is_none()
    }

    /// Returns the draft as it stands and resets the composer.
    pub fn snapshot_and_clear(&mut self) -> Draft {
        Draft {
            text: std::mem::take(&mut self.text),
            attachment: self.attachment.take(),
        }
    }
}

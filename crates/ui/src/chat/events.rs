use zova_llm::{BackendResult, GenerationOutcome, Route};

use crate::chat::attachment::Attachment;
use crate::chat::message::SubmissionId;

/// User input that mutates the draft or triggers a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    TextChanged(String),
    AttachmentSelected(Attachment),
    AttachmentRemoved,
    Submit,
}

/// Result of a send action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty text and no attachment; nothing happened.
    Ignored,
    /// A reply is still awaited; the draft was left untouched.
    Busy,
    Dispatched {
        submission: SubmissionId,
        route: Route,
    },
}

/// Emitted by the generation worker when its single request completes.
#[derive(Debug)]
pub struct ReplyArrived {
    pub submission: SubmissionId,
    pub result: BackendResult<GenerationOutcome>,
}

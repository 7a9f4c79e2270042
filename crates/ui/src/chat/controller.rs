use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use zova_llm::{
    BackendError, BackendResult, BoxFuture, GenerationBackend, GenerationOutcome,
    GenerationRequest, Route,
};

use crate::chat::attachment::Attachment;
use crate::chat::composer::Composer;
use crate::chat::events::{ComposerEvent, ReplyArrived, SubmitOutcome};
use crate::chat::message::{Conversation, Message, MessageId, SubmissionId};
use crate::chat::view::ConversationView;

/// Bot text appended when the backend could not be reached or answered garbage.
pub const CONNECTIVITY_FAILURE_TEXT: &str =
    "Sorry, a connection error occurred. Make sure the backend server is reachable.";
/// Prefix of bot messages that carry a backend-reported error.
pub const ERROR_MARKER: &str = "Error: ";
pub const DEFAULT_ERROR_DESCRIPTION: &str = "Something went wrong";

/// Exchange whose reply has not arrived yet.
#[derive(Debug, Clone, Copy)]
struct PendingReply {
    submission: SubmissionId,
    route: Route,
}

/// Receiving end for worker completions.
///
/// Kept apart from the controller so an event loop can wait on it while still
/// feeding input events to the controller.
pub struct ReplyReceiver {
    replies: mpsc::UnboundedReceiver<ReplyArrived>,
}

impl ReplyReceiver {
    pub async fn recv(&mut self) -> Option<ReplyArrived> {
        self.replies.recv().await
    }

    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<ReplyArrived> {
        self.replies.try_recv().ok()
    }
}

/// Owns the draft and the conversation, and runs the submit protocol.
pub struct ChatController<V> {
    composer: Composer,
    conversation: Conversation,
    backend: Arc<dyn GenerationBackend>,
    view: V,
    pending: Option<PendingReply>,
    reply_tx: mpsc::UnboundedSender<ReplyArrived>,
    next_message_id: u64,
    next_submission_id: u64,
}

impl<V: ConversationView> ChatController<V> {
    pub fn new(backend: Arc<dyn GenerationBackend>, view: V) -> (Self, ReplyReceiver) {
        let (reply_tx, replies) = mpsc::unbounded_channel();
        let controller = Self {
            composer: Composer::new(),
            conversation: Conversation::new(),
            backend,
            view,
            pending: None,
            reply_tx,
            next_message_id: 1,
            next_submission_id: 1,
        };

        (controller, ReplyReceiver { replies })
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn backend_url(&self) -> &str {
        self.backend.base_url()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies one input event. Only `Submit` produces an outcome.
    pub fn handle_event(&mut self, event: ComposerEvent) -> Option<SubmitOutcome> {
        match event {
            ComposerEvent::TextChanged(text) => self.set_text(text),
            ComposerEvent::AttachmentSelected(attachment) => self.add_attachment(attachment),
            ComposerEvent::AttachmentRemoved => self.remove_attachment(),
            ComposerEvent::Submit => return Some(self.submit()),
        }

        None
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.composer.set_text(text);
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        if let Some(replaced) = self.composer.add_attachment(attachment) {
            tracing::debug!(replaced = %replaced.name, "staged attachment replaced");
        }
        self.view.show_pending_attachment(self.composer.attachment());
    }

    pub fn remove_attachment(&mut self) {
        if self.composer.remove_attachment().is_some() {
            self.view.show_pending_attachment(None);
        }
    }

    /// Sends the current draft.
    ///
    /// The user message and typing indicator are rendered before this returns; the
    /// reply is applied later through [`ChatController::handle_reply`].
    pub fn submit(&mut self) -> SubmitOutcome {
        if let Some(pending) = self.pending {
            // One exchange at a time: the draft stays intact so the user can resend.
            tracing::debug!(
                submission = ?pending.submission,
                route = %pending.route,
                "submit rejected while a reply is pending"
            );
            return SubmitOutcome::Busy;
        }

        let draft = self.composer.snapshot_and_clear();
        if draft.attachment.is_some() {
            self.view.show_pending_attachment(None);
        }

        let text = draft.text.trim().to_string();
        if text.is_empty() && draft.attachment.is_none() {
            tracing::debug!("empty draft ignored");
            return SubmitOutcome::Ignored;
        }

        let message_id = self.alloc_message_id();
        self.append_message(Message::user(message_id, text.clone(), draft.attachment.clone()));
        self.view.show_typing();

        let mut request = GenerationRequest::text(text);
        if let Some(attachment) = &draft.attachment {
            request = request.with_upload(attachment.to_upload());
        }

        let route = request.route();
        let submission = self.alloc_submission_id();
        self.pending = Some(PendingReply { submission, route });
        self.spawn_generation(submission, request);

        tracing::info!(submission = ?submission, route = %route, "generation request dispatched");
        SubmitOutcome::Dispatched { submission, route }
    }

    /// Settles the pending exchange with its reply. Stale replies are dropped.
    pub fn handle_reply(&mut self, reply: ReplyArrived) {
        let Some(pending) = self.pending else {
            tracing::warn!(
                submission = ?reply.submission,
                "reply arrived with no pending exchange"
            );
            return;
        };

        if pending.submission != reply.submission {
            tracing::warn!(
                expected = ?pending.submission,
                received = ?reply.submission,
                "ignoring reply for a different submission"
            );
            return;
        }

        self.pending = None;
        self.view.hide_typing();

        let text = match reply.result {
            Ok(GenerationOutcome::Replied { reply }) => reply,
            Ok(GenerationOutcome::Rejected { status, error }) => {
                tracing::warn!(
                    route = %pending.route,
                    status,
                    error = error.as_deref().unwrap_or_default(),
                    "backend reported a failure"
                );
                Some(backend_error_text(error.as_deref()))
            }
            Err(error) => {
                tracing::error!(
                    route = %pending.route,
                    base_url = %self.backend.base_url(),
                    error = %error,
                    "generation request failed"
                );
                Some(CONNECTIVITY_FAILURE_TEXT.to_string())
            }
        };

        let message_id = self.alloc_message_id();
        self.append_message(Message::bot(message_id, text));
    }

    fn spawn_generation(&self, submission: SubmissionId, request: GenerationRequest) {
        // A panicking backend still has to settle the exchange, whether it panics
        // while building the request future or while polling it.
        let backend = &self.backend;
        let generation: BoxFuture<'static, BackendResult<GenerationOutcome>> =
            match panic::catch_unwind(AssertUnwindSafe(|| backend.generate(request))) {
                Ok(generation) => generation,
                Err(payload) => {
                    let error = worker_panicked("start-generation", payload.as_ref());
                    Box::pin(async move { Err(error) })
                }
            };
        let worker = AssertUnwindSafe(generation).catch_unwind();
        let reply_tx = self.reply_tx.clone();

        tokio::spawn(async move {
            let result = worker.await.unwrap_or_else(|payload| {
                Err(worker_panicked("generation-worker", payload.as_ref()))
            });

            if reply_tx.send(ReplyArrived { submission, result }).is_err() {
                tracing::debug!(submission = ?submission, "controller dropped before reply");
            }
        });
    }

    fn append_message(&mut self, message: Message) {
        let message = self.conversation.append(message);
        self.view.append_message(message);
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }

    fn alloc_submission_id(&mut self) -> SubmissionId {
        let id = SubmissionId::new(self.next_submission_id);
        self.next_submission_id = self.next_submission_id.saturating_add(1);
        id
    }
}

fn backend_error_text(error: Option<&str>) -> String {
    let description = error
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .unwrap_or(DEFAULT_ERROR_DESCRIPTION);
    format!("{ERROR_MARKER}{description}")
}

fn worker_panicked(stage: &'static str, payload: &(dyn Any + Send)) -> BackendError {
    let details = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    BackendError::WorkerPanicked { stage, details }
}

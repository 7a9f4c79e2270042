pub mod attachment;
/// Draft state edited by the user before sending.
pub mod composer;
/// Submit protocol and reply handling.
pub mod controller;
/// Event contracts between input, controller and generation worker.
pub mod events;
pub mod format;
/// Domain entities for the conversation log.
pub mod message;
pub mod terminal;
pub mod view;

pub use attachment::{Attachment, AttachmentError, AttachmentResult};
pub use composer::{Composer, Draft};
pub use controller::{
    CONNECTIVITY_FAILURE_TEXT, ChatController, DEFAULT_ERROR_DESCRIPTION, ERROR_MARKER,
    ReplyReceiver,
};
pub use events::{ComposerEvent, ReplyArrived, SubmitOutcome};
pub use format::{attachment_line, format_byte_size, media_glyph, pending_attachment_line};
pub use message::{Conversation, Message, MessageId, Sender, SubmissionId};
pub use terminal::{TYPING_TEXT, TerminalView, render_message};
pub use view::ConversationView;

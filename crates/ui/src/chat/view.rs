use crate::chat::attachment::Attachment;
use crate::chat::message::Message;

/// Rendering surface the controller drives.
pub trait ConversationView {
    /// Appends a message to the visible end of the conversation.
    fn append_message(&mut self, message: &Message);
    fn show_typing(&mut self);
    fn hide_typing(&mut self);

    /// Reflects the attachment currently staged in the composer.
    fn show_pending_attachment(&mut self, _attachment: Option<&Attachment>) {}

    /// Short out-of-band status line such as a rejected command.
    fn show_notice(&mut self, _notice: &str) {}

    /// Called once per line the user entered, before it is acted on.
    fn input_entered(&mut self) {}
}

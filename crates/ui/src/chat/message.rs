use crate::chat::attachment::Attachment;

/// Stable identifier for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier for one submit and its single reply.
///
/// This changes on every submit so a reply can only ever settle the exchange it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub u64);

impl SubmissionId {
    /// Creates a typed submission identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a message. Empty text is stored as `None`.
    pub fn new(
        id: MessageId,
        sender: Sender,
        text: Option<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id,
            sender,
            text: text.filter(|text| !text.is_empty()),
            attachments,
        }
    }

    /// Creates the user's side of an exchange.
    pub fn user(id: MessageId, text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self::new(
            id,
            Sender::User,
            Some(text.into()),
            attachment.into_iter().collect(),
        )
    }

    /// Creates a bot reply or bot-authored notice.
    pub fn bot(id: MessageId, text: Option<String>) -> Self {
        Self::new(id, Sender::Bot, text, Vec::new())
    }
}

/// Append-only conversation log for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

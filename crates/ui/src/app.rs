use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use zova_llm::{GenerationBackend, MediaKind};

use crate::chat::{
    Attachment, ChatController, ComposerEvent, ConversationView, ReplyReceiver, SubmitOutcome,
};

pub const HELP_TEXT: &str = "type a message and press enter to send | \
start it with // to send a leading / | /attach <path> stages a file | /detach removes it | \
/send sends the staged file without text | /quit exits";

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Say(String),
    Send,
    Attach(PathBuf),
    Detach,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses a line. Returns `None` for an unknown or malformed `/command`.
    ///
    /// A leading `//` sends the rest of the line, starting with a single `/`, as text.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Some(Self::Say(line.to_string()));
        };
        if command.starts_with('/') {
            return Some(Self::Say(command.to_string()));
        }

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (command, ""),
        };

        match (name, argument) {
            ("attach", "") => None,
            ("attach", path) => Some(Self::Attach(PathBuf::from(path))),
            ("detach", "") => Some(Self::Detach),
            ("send", "") => Some(Self::Send),
            ("help", "") => Some(Self::Help),
            ("quit" | "exit", "") => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Terminal front-end: feeds stdin lines and worker replies to the controller
/// from a single loop.
pub struct ChatShell<V> {
    controller: ChatController<V>,
    replies: ReplyReceiver,
}

impl<V: ConversationView> ChatShell<V> {
    pub fn new(backend: Arc<dyn GenerationBackend>, view: V) -> Self {
        let (controller, replies) = ChatController::new(backend, view);
        Self {
            controller,
            replies,
        }
    }

    pub fn controller(&self) -> &ChatController<V> {
        &self.controller
    }

    pub fn into_controller(self) -> ChatController<V> {
        self.controller
    }

    /// Runs until `/quit` or end of input.
    ///
    /// At end of input a pending reply is awaited, and a draft kept back by a busy
    /// rejection is sent once it lands, so the conversation always ends on a bot
    /// message.
    pub async fn run<R>(&mut self, input: R)
    where
        R: AsyncBufRead + Unpin,
    {
        let Self {
            controller,
            replies,
        } = self;
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if !handle_line(controller, &line).await {
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        tracing::error!(error = %error, "failed to read input");
                        break;
                    }
                },
                Some(reply) = replies.recv() => controller.handle_reply(reply),
            }
        }

        loop {
            if controller.is_awaiting_reply() {
                match replies.recv().await {
                    Some(reply) => controller.handle_reply(reply),
                    None => return,
                }
            } else if controller.composer().is_empty()
                || !matches!(controller.submit(), SubmitOutcome::Dispatched { .. })
            {
                return;
            } else {
                tracing::debug!("sent draft kept back while a reply was pending");
            }
        }
    }
}

/// Applies one input line. Returns `false` when the user asked to quit.
async fn handle_line<V: ConversationView>(
    controller: &mut ChatController<V>,
    line: &str,
) -> bool {
    controller.view_mut().input_entered();

    let Some(command) = ShellCommand::parse(line) else {
        controller
            .view_mut()
            .show_notice(&format!("unknown command `{}`; {HELP_TEXT}", line.trim()));
        return true;
    };

    match command {
        ShellCommand::Say(text) => {
            controller.handle_event(ComposerEvent::TextChanged(text));
            submit(controller);
        }
        ShellCommand::Send => submit(controller),
        ShellCommand::Attach(path) => match Attachment::load(&path).await {
            Ok(attachment) => {
                if attachment.kind() == MediaKind::Other {
                    tracing::warn!(
                        name = %attachment.name,
                        mime_type = %attachment.mime_type,
                        "attachment is not an image, audio or PDF; it will go to the text route"
                    );
                }
                controller.handle_event(ComposerEvent::AttachmentSelected(attachment));
            }
            Err(error) => {
                tracing::warn!(path = ?path, error = %error, "failed to stage attachment");
                controller.view_mut().show_notice(&error.to_string());
            }
        },
        ShellCommand::Detach => {
            controller.handle_event(ComposerEvent::AttachmentRemoved);
        }
        ShellCommand::Help => controller.view_mut().show_notice(HELP_TEXT),
        ShellCommand::Quit => return false,
    }

    true
}

fn submit<V: ConversationView>(controller: &mut ChatController<V>) {
    if controller.handle_event(ComposerEvent::Submit) == Some(SubmitOutcome::Busy) {
        controller
            .view_mut()
            .show_notice("still waiting for the previous reply; send again once it arrives");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_messages() {
        assert_eq!(
            ShellCommand::parse("hello there"),
            Some(ShellCommand::Say("hello there".into()))
        );
        assert_eq!(ShellCommand::parse(""), Some(ShellCommand::Say(String::new())));
    }

    #[test]
    fn double_slash_sends_literal_slash() {
        assert_eq!(
            ShellCommand::parse("//etc/hosts is what?"),
            Some(ShellCommand::Say("/etc/hosts is what?".into()))
        );
        assert_eq!(
            ShellCommand::parse("  //"),
            Some(ShellCommand::Say("/".into()))
        );
        assert_eq!(ShellCommand::parse("/etc/hosts is what?"), None);
    }

    #[test]
    fn commands_are_recognised() {
        assert_eq!(
            ShellCommand::parse("/attach ~/Pictures/cat photo.png"),
            Some(ShellCommand::Attach(PathBuf::from("~/Pictures/cat photo.png")))
        );
        assert_eq!(ShellCommand::parse(" /detach "), Some(ShellCommand::Detach));
        assert_eq!(ShellCommand::parse("/send"), Some(ShellCommand::Send));
        assert_eq!(ShellCommand::parse("/help"), Some(ShellCommand::Help));
        assert_eq!(ShellCommand::parse("/exit"), Some(ShellCommand::Quit));
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert_eq!(ShellCommand::parse("/attach"), None);
        assert_eq!(ShellCommand::parse("/detach now"), None);
        assert_eq!(ShellCommand::parse("/frobnicate"), None);
    }
}

use std::io::{self, IsTerminal, Write};

use crate::chat::attachment::Attachment;
use crate::chat::format::{attachment_line, pending_attachment_line};
use crate::chat::message::{Message, Sender};
use crate::chat::view::ConversationView;

pub const TYPING_TEXT: &str = "Gemini is typing...";

const CLEAR_LINE: &str = "\r\x1b[2K";
const CURSOR_UP: &str = "\x1b[1A";

/// Line-oriented conversation surface.
///
/// On an interactive terminal the typing indicator is drawn without a newline and
/// erased in place; anything printed while it is up goes above it and the indicator
/// is redrawn. Otherwise it is written once and left in the output.
pub struct TerminalView<W> {
    out: W,
    ansi: bool,
    echoes_input: bool,
    typing_visible: bool,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let ansi = out.is_terminal();
        Self::new(out, ansi).with_input_echo(ansi && io::stdin().is_terminal())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out,
            ansi,
            echoes_input: false,
            typing_visible: false,
        }
    }

    /// Whether the terminal echoes typed lines onto this output.
    pub fn with_input_echo(mut self, echoes_input: bool) -> Self {
        self.echoes_input = echoes_input;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(error) = result {
            tracing::warn!(error = %error, "failed to write to terminal");
        }
    }

    /// Writes complete lines, keeping an inline typing indicator below them.
    fn write_lines(&mut self, lines: &str) {
        if self.ansi && self.typing_visible {
            self.write(&format!("{CLEAR_LINE}{lines}{TYPING_TEXT}"));
        } else {
            self.write(lines);
        }
    }
}

/// Renders one message as the lines printed for it.
pub fn render_message(message: &Message) -> String {
    let label = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };

    let mut rendered = String::new();
    match &message.text {
        Some(text) => {
            let mut lines = text.lines();
            if let Some(first) = lines.next() {
                rendered.push_str(&format!("{label} > {first}\n"));
            }
            for line in lines {
                rendered.push_str(&format!("      {line}\n"));
            }
        }
        None => rendered.push_str(&format!("{label} >\n")),
    }

    for attachment in &message.attachments {
        rendered.push_str(&format!("      {}\n", attachment_line(attachment)));
    }

    rendered
}

impl<W: Write> ConversationView for TerminalView<W> {
    fn append_message(&mut self, message: &Message) {
        let rendered = render_message(message);
        self.write_lines(&rendered);
    }

    fn show_typing(&mut self) {
        self.typing_visible = true;
        if self.ansi {
            self.write(TYPING_TEXT);
        } else {
            self.write(&format!("{TYPING_TEXT}\n"));
        }
    }

    fn hide_typing(&mut self) {
        if !self.typing_visible {
            return;
        }
        self.typing_visible = false;
        if self.ansi {
            self.write(CLEAR_LINE);
        }
    }

    fn show_pending_attachment(&mut self, attachment: Option<&Attachment>) {
        let line = match attachment {
            Some(attachment) => format!("staged {}\n", pending_attachment_line(attachment)),
            None => "no attachment staged\n".to_string(),
        };
        self.write_lines(&line);
    }

    fn show_notice(&mut self, notice: &str) {
        self.write_lines(&format!("-- {notice}\n"));
    }

    fn input_entered(&mut self) {
        // The echoed line was typed after the indicator; the cursor sits below it.
        if self.ansi && self.echoes_input && self.typing_visible {
            self.write(&format!("{CURSOR_UP}{CLEAR_LINE}{TYPING_TEXT}"));
        }
    }
}

use std::io::{self, Write};

use crate::config::ChatConfig;
use crate::screen::{ChatMessage, ConversationLog, Participant, RequestState, ScreenView};

/// Writes screen views as plain text.
///
/// Request output is printed incrementally: a streamed `Success` only
/// writes what extends the text already on screen. Conversation messages
/// are printed once each, in log order, as soon as they and every message
/// before them have settled. An error already on screen is not printed
/// again until the next request.
pub struct Renderer<W: Write> {
    out: W,
    user_label: String,
    model_label: String,
    printed: String,
    last_error: Option<String>,
    printed_messages: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self::with_labels(out, &ChatConfig::default())
    }

    pub fn with_labels(out: W, chat: &ChatConfig) -> Self {
        Self {
            out,
            user_label: chat.user_label.clone(),
            model_label: chat.model_label.clone(),
            printed: String::new(),
            last_error: None,
            printed_messages: 0,
        }
    }

    pub fn render(&mut self, view: &ScreenView) -> io::Result<()> {
        match view {
            ScreenView::Request(state) => self.render_request(state)?,
            ScreenView::Conversation(log) => self.render_conversation(log)?,
        }
        self.out.flush()
    }

    /// End the current request's output. The next `Success` starts fresh.
    pub fn finish(&mut self) -> io::Result<()> {
        self.end_line()?;
        self.last_error = None;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_request(&mut self, state: &RequestState) -> io::Result<()> {
        match state {
            RequestState::Idle | RequestState::Pending => {
                self.last_error = None;
                Ok(())
            }
            RequestState::Success { text } => {
                self.last_error = None;
                match text.strip_prefix(self.printed.as_str()) {
                    Some(suffix) => write!(self.out, "{suffix}")?,
                    None => {
                        // Replaced rather than extended: start a new line.
                        self.end_line()?;
                        write!(self.out, "{text}")?;
                    }
                }
                self.printed.clone_from(text);
                Ok(())
            }
            RequestState::Error { message } => {
                if self.last_error.as_deref() == Some(message.as_str()) {
                    return Ok(());
                }
                self.end_line()?;
                writeln!(self.out, "error: {message}")?;
                self.last_error = Some(message.clone());
                Ok(())
            }
        }
    }

    fn end_line(&mut self) -> io::Result<()> {
        if !self.printed.is_empty() && !self.printed.ends_with('\n') {
            writeln!(self.out)?;
        }
        self.printed.clear();
        Ok(())
    }

    fn render_conversation(&mut self, log: &ConversationLog) -> io::Result<()> {
        let settled: Vec<&ChatMessage> = log
            .messages()
            .iter()
            .skip(self.printed_messages)
            .take_while(|m| !m.pending)
            .collect();

        for message in settled {
            match message.participant {
                Participant::User => writeln!(self.out, "{}: {}", self.user_label, message.text)?,
                Participant::Model => writeln!(self.out, "{}: {}", self.model_label, message.text)?,
                Participant::Error => writeln!(self.out, "error: {}", message.text)?,
            }
            self.printed_messages += 1;
        }
        Ok(())
    }
}

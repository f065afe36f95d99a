use serde::{Deserialize, Serialize};

use crate::types::Sender;

/// A single chat message, either typed by the user or returned by the bot.
///
/// Messages are transient: they exist to be rendered and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The message text.  May be empty; trimming is the caller's job.
    pub text: String,

    /// Who wrote the message.
    pub sender: Sender,
}

impl Message {
    /// Create a new `Message`.
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    /// Create a message written by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    /// Create a message written by the bot.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }
}

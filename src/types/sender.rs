use std::fmt;

use serde::{Deserialize, Serialize};

/// Who wrote a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the input field.
    User,
    /// The FAQ bot answering from the server.
    Bot,
}

impl Sender {
    /// The style class a rendered message of this sender carries.
    pub fn style_class(self) -> &'static str {
        match self {
            Sender::User => "user-message",
            Sender::Bot => "bot-message",
        }
    }

    /// The lowercase tag for this sender.
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

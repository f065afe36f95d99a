use serde::{Deserialize, Serialize};

/// Body of a successful `send_message` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The bot's reply text.
    pub response: String,
}

impl ChatReply {
    /// Create a new `ChatReply`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

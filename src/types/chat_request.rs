use serde::{Deserialize, Serialize};

/// Body of the outbound `send_message` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The trimmed text the user typed.
    pub message: String,
}

impl ChatRequest {
    /// Create a new `ChatRequest`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

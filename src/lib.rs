//! A chat client for a FAQ bot.
//!
//! Messages are rendered into a scrolling conversation log through a [`Renderer`], and each
//! send goes through a [`Dispatcher`] that performs exactly one request against the bot's
//! `send_message` endpoint.

// Public modules
pub mod chat;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod observability;
pub mod render;
pub mod surface;
pub mod types;

// Re-exports
pub use client::ChatClient;
pub use dispatch::{APOLOGY, DispatchOutcome, DispatchStats, Dispatcher, Key, Transport, UiEvent};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use surface::{
    BotDecoration, ChatPage, ChatSurface, ConversationLog, InputField, RenderedMessage,
    TypingIndicator,
};
pub use types::*;

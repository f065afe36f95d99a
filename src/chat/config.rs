//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{BASE_URL_ENV, ChatClient};
use crate::error::Result;
use crate::render::{DEFAULT_BOT_NAME, DEFAULT_LOGO};

/// Command-line arguments for the chatbox-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the FAQ bot.
    #[arrrg(optional, "Bot base URL (default: $CHATBOX_BASE_URL or http://127.0.0.1:5000/)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Name shown next to bot messages.
    #[arrrg(optional, "Bot name shown next to replies (default: EXCEL Vision)", "NAME")]
    pub bot_name: Option<String>,

    /// Logo shown next to bot messages.
    #[arrrg(optional, "Logo shown next to replies (default: /imgs/logo.png)", "LOGO")]
    pub logo: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL of the bot.  `None` defers to CHATBOX_BASE_URL and then the built-in default.
    pub base_url: Option<String>,

    /// Request timeout.  `None` waits for as long as the request takes.
    pub timeout: Option<Duration>,

    /// Name shown next to bot messages.
    pub bot_name: String,

    /// Logo shown next to bot messages.
    pub logo: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: from the environment, else http://127.0.0.1:5000/
    /// - Timeout: none
    /// - Bot name: EXCEL Vision
    /// - Logo: /imgs/logo.png
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            bot_name: DEFAULT_BOT_NAME.to_string(),
            logo: DEFAULT_LOGO.to_string(),
            use_color: true,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the bot name.
    pub fn with_bot_name(mut self, bot_name: impl Into<String>) -> Self {
        self.bot_name = bot_name.into();
        self
    }

    /// Sets the logo.
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Builds the HTTP client this configuration describes.
    pub fn client(&self) -> Result<ChatClient> {
        let base_url = self
            .base_url
            .clone()
            .or_else(|| env::var(BASE_URL_ENV).ok());
        ChatClient::with_options(base_url, self.timeout)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.base_url,
            timeout: args.timeout_secs.map(Duration::from_secs),
            bot_name: args.bot_name.unwrap_or(defaults.bot_name),
            logo: args.logo.unwrap_or(defaults.logo),
            use_color: !args.no_color,
        }
    }
}

//! Chat application module for interactive conversations with the FAQ bot.
//!
//! This module provides the terminal REPL built on top of the chatbox
//! library. It supports:
//!
//! - A styled conversation log with a typing indicator
//! - Slash commands for session control
//! - Configurable endpoint, timeout and bot decoration
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Dispatcher plus transcript for one REPL run
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, INTERRUPT_NOTICE, SessionStats};

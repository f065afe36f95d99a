//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the bot.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the bot.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Display session statistics.
    Stats,

    /// Print every message rendered so far.
    History,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent to the bot.
///
/// # Examples
///
/// ```
/// # use chatbox::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/stats").is_some());
/// assert!(parse_command("Quels sont vos horaires ?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match (command.as_str(), argument) {
        ("help" | "?", _) => ChatCommand::Help,
        ("quit" | "exit" | "q", _) => ChatCommand::Quit,
        ("stats" | "status", None) => ChatCommand::Stats,
        ("history", None) => ChatCommand::History,
        ("stats" | "status" | "history", Some(_)) => {
            ChatCommand::Invalid(format!("/{command} takes no arguments"))
        }
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /stats                 Show session statistics
  /history               Show the conversation so far
  /help                  Show this help message
  /quit                  Exit the chat
Anything else is sent to the bot; press Enter to send."#
}

//! Interactive chat application for talking to the FAQ bot.
//!
//! This binary provides a REPL that renders a conversation log in the terminal.  Pressing Enter
//! sends the line; a typing indicator is shown until the bot answers.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a bot on the default address (http://127.0.0.1:5000/)
//! chatbox-chat
//!
//! # Point at another deployment and give up after 20 seconds
//! chatbox-chat --base-url http://faq.example.com/ --timeout-secs 20
//!
//! # Disable colors (useful for piping output)
//! chatbox-chat --no-color
//! ```
//!
//! Diagnostics go to stderr and are controlled with RUST_LOG (default: warn).
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/stats` - Show session statistics
//! - `/history` - Show the conversation so far
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{EnvFilter, fmt};

use chatbox::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use chatbox::{ChatClient, Sender};

/// Main entry point for the chatbox-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("chatbox-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    tracing::debug!(?config, "resolved configuration");

    let mut session = ChatSession::new(&config)?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color)
        .with_bot_name(config.bot_name.clone())
        .with_logo(config.logo.clone())
        .with_overwrite_prompt(config.use_color);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C while a request is pending is noted, not acted on
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("{} (endpoint: {})", config.bot_name, session.stats().endpoint);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line.trim());

                // Check for slash commands
                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Au revoir !");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::History => {
                            print_history(&session, &config.bot_name);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the bot and wait for its answer
                session
                    .send_uninterrupted(&line, &mut renderer, &interrupted)
                    .await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nAu revoir !");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats(session: &ChatSession<ChatClient>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Endpoint: {}", stats.endpoint);
    match stats.timeout {
        Some(timeout) => println!("      Timeout: {}s", timeout.as_secs_f64()),
        None => println!("      Timeout: (none)"),
    }
    println!(
        "      Messages: {} from you / {} from the bot",
        stats.user_messages, stats.bot_messages
    );
    println!(
        "      Requests: {} sent, {} answered, {} failed",
        stats.dispatch.sends, stats.dispatch.replies, stats.dispatch.failures
    );
}

fn print_history(session: &ChatSession<ChatClient>, bot_name: &str) {
    let history = session.history();
    if history.is_empty() {
        println!("    (no messages yet)");
        return;
    }
    for message in history {
        let who = match message.sender() {
            Sender::User => "You",
            Sender::Bot => bot_name,
        };
        println!("    {}: {}", who, message.text());
    }
}

//! Output rendering for the chat client.
//!
//! This module provides the renderer trait the dispatcher draws through and a plain-text
//! implementation for terminals.  The in-memory page model lives in [`crate::surface`].

use std::io::{self, Stdout, Write};

use crate::types::Sender;

/// ANSI escape code for dim text (used for the typing indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for the user label).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the bot logo).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the bot status dot).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Move to column zero and erase the whole line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// Move the cursor up one line.
const ANSI_CURSOR_UP: &str = "\x1b[1A";

/// Default bot name shown next to the logo.
pub const DEFAULT_BOT_NAME: &str = "EXCEL Vision";

/// Default logo source attached to every bot message.
pub const DEFAULT_LOGO: &str = "/imgs/logo.png";

/// Glyph used for the bot's status indicator.
pub const STATUS_GLYPH: &str = "●";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - An in-memory page model for embedding and tests
pub trait Renderer: Send {
    /// Append one message block to the end of the conversation log.
    ///
    /// Any string is accepted, including the empty string.  Bot messages carry the logo and
    /// status decoration.  After the append, the newest message must be in view.
    fn render(&mut self, text: &str, sender: Sender);

    /// Show the typing indicator.
    fn show_typing(&mut self);

    /// Hide the typing indicator.
    fn hide_typing(&mut self);

    /// Print an error message outside the conversation log.
    fn print_error(&mut self, error: &str);

    /// Print an informational message outside the conversation log.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// Terminal output always scrolls to the newest line, so appending is all it takes to keep the
/// latest message in view.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    bot_name: String,
    logo: String,
    overwrite_prompt: bool,
    typing_visible: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_writer(io::stdout(), true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            bot_name: DEFAULT_BOT_NAME.to_string(),
            logo: DEFAULT_LOGO.to_string(),
            overwrite_prompt: false,
            typing_visible: false,
        }
    }

    /// Sets the name shown in the bot decoration.
    pub fn with_bot_name(mut self, bot_name: impl Into<String>) -> Self {
        self.bot_name = bot_name.into();
        self
    }

    /// Sets the logo shown in the bot decoration.
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Replace the line the user just typed with the styled user message.
    ///
    /// Only takes effect with color enabled, because it needs cursor movement.
    pub fn with_overwrite_prompt(mut self, overwrite: bool) -> Self {
        self.overwrite_prompt = overwrite;
        self
    }

    /// Returns true while the typing indicator is on screen.
    pub fn typing_visible(&self) -> bool {
        self.typing_visible
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Flushes output to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn decoration(&self) -> String {
        if self.use_color {
            format!(
                "{ANSI_CYAN}[{} {ANSI_GREEN}{STATUS_GLYPH}{ANSI_CYAN}]{ANSI_RESET} {ANSI_BOLD}{}:{ANSI_RESET}",
                self.logo, self.bot_name
            )
        } else {
            format!("[{} {STATUS_GLYPH}] {}:", self.logo, self.bot_name)
        }
    }

    fn clear_typing(&mut self) {
        if self.typing_visible {
            if self.use_color {
                let _ = write!(self.out, "{ANSI_CLEAR_LINE}");
            }
            self.typing_visible = false;
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn render(&mut self, text: &str, sender: Sender) {
        self.clear_typing();
        let line = match sender {
            Sender::User if self.use_color => {
                if self.overwrite_prompt {
                    let _ = write!(self.out, "{ANSI_CURSOR_UP}{ANSI_CLEAR_LINE}");
                }
                format!("{ANSI_BOLD}You:{ANSI_RESET} {text}")
            }
            Sender::User => format!("You: {text}"),
            Sender::Bot => format!("{} {text}", self.decoration()),
        };
        let _ = writeln!(self.out, "{line}");
        self.flush();
    }

    fn show_typing(&mut self) {
        if self.typing_visible {
            return;
        }
        if self.use_color {
            let _ = write!(self.out, "{ANSI_DIM}{} is typing…{ANSI_RESET}", self.bot_name);
        } else {
            let _ = writeln!(self.out, "[{} is typing…]", self.bot_name);
        }
        self.typing_visible = true;
        self.flush();
    }

    fn hide_typing(&mut self) {
        self.clear_typing();
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.clear_typing();
        if self.use_color {
            let _ = writeln!(self.out, "{ANSI_RED}Error:{ANSI_RESET} {error}");
        } else {
            let _ = writeln!(self.out, "Error: {error}");
        }
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        self.clear_typing();
        let _ = writeln!(self.out, "{info}");
        self.flush();
    }
}

//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which pairs a dispatcher with a transcript of
//! everything rendered, so the REPL can answer `/history` and `/stats`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::chat::config::ChatConfig;
use crate::client::ChatClient;
use crate::dispatch::{DispatchOutcome, DispatchStats, Dispatcher, Transport};
use crate::error::Result;
use crate::render::Renderer;
use crate::surface::{ChatSurface, RenderedMessage};
use crate::types::Sender;

/// Shown after a Ctrl+C that arrived while a request was pending.
pub const INTERRUPT_NOTICE: &str = "Requests cannot be cancelled; use /quit to exit.";

/// A chat session: a dispatcher plus the transcript of this session's messages.
pub struct ChatSession<T: Transport = ChatClient> {
    dispatcher: Dispatcher<T>,
    transcript: ChatSurface,
    endpoint: String,
    timeout: Option<Duration>,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Where requests are sent.
    pub endpoint: String,
    /// The request timeout, if any.
    pub timeout: Option<Duration>,
    /// Messages typed by the user.
    pub user_messages: usize,
    /// Messages rendered for the bot, apologies included.
    pub bot_messages: usize,
    /// Dispatcher counters.
    pub dispatch: DispatchStats,
}

impl ChatSession<ChatClient> {
    /// Creates a new chat session talking to the bot `config` points at.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = config.client()?;
        let endpoint = client.endpoint()?.to_string();
        let timeout = client.timeout();
        let transcript = ChatSurface::new().with_logo(config.logo.clone());
        Ok(Self {
            dispatcher: Dispatcher::new(client),
            transcript,
            endpoint,
            timeout,
        })
    }
}

impl<T: Transport> ChatSession<T> {
    /// Creates a session around a custom transport.
    pub fn with_transport(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            transcript: ChatSurface::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Sends one line of user input, rendering to `renderer` and recording the transcript.
    pub async fn send(&mut self, line: &str, renderer: &mut dyn Renderer) -> DispatchOutcome {
        let mut mirror = Mirror {
            primary: renderer,
            transcript: &mut self.transcript,
        };
        self.dispatcher.send_text(line, &mut mirror).await
    }

    /// Sends one line and waits for the bot even if `interrupt` is raised meanwhile.
    ///
    /// Pending requests are never cancelled.  A raised flag is cleared and acknowledged with
    /// [`INTERRUPT_NOTICE`] once the reply (or apology) has been rendered.
    pub async fn send_uninterrupted(
        &mut self,
        line: &str,
        renderer: &mut dyn Renderer,
        interrupt: &AtomicBool,
    ) -> DispatchOutcome {
        let outcome = self.send(line, renderer).await;
        if interrupt.swap(false, Ordering::Relaxed) {
            tracing::info!("interrupt ignored while a request was pending");
            renderer.print_info(INTERRUPT_NOTICE);
        }
        outcome
    }

    /// Every message rendered in this session.
    pub fn history(&self) -> &[RenderedMessage] {
        self.transcript.log().messages()
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let log = self.transcript.log();
        SessionStats {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
            user_messages: log.count(Sender::User),
            bot_messages: log.count(Sender::Bot),
            dispatch: self.dispatcher.stats(),
        }
    }
}

/// Forwards everything to the primary renderer and records messages in the transcript.
struct Mirror<'a> {
    primary: &'a mut dyn Renderer,
    transcript: &'a mut ChatSurface,
}

impl Renderer for Mirror<'_> {
    fn render(&mut self, text: &str, sender: Sender) {
        self.transcript.render(text, sender);
        self.primary.render(text, sender);
    }

    fn show_typing(&mut self) {
        self.transcript.show_typing();
        self.primary.show_typing();
    }

    fn hide_typing(&mut self) {
        self.transcript.hide_typing();
        self.primary.hide_typing();
    }

    fn print_error(&mut self, error: &str) {
        self.primary.print_error(error);
    }

    fn print_info(&mut self, info: &str) {
        self.primary.print_info(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::APOLOGY;
    use crate::error::Error;
    use crate::types::ChatReply;

    struct Echo;

    #[async_trait::async_trait]
    impl Transport for Echo {
        async fn send_message(&self, message: &str) -> Result<ChatReply> {
            if message == "panne" {
                Err(Error::api(500, "internal"))
            } else {
                Ok(ChatReply::new(format!("echo: {message}")))
            }
        }
    }

    #[tokio::test]
    async fn new_session_empty() {
        let session = ChatSession::with_transport(Echo, "test://echo");
        assert!(session.history().is_empty());
        assert_eq!(session.stats().dispatch, DispatchStats::default());
    }

    #[tokio::test]
    async fn send_records_transcript() {
        let mut session = ChatSession::with_transport(Echo, "test://echo");
        let mut screen = ChatSurface::new();

        assert!(session.send("bonjour", &mut screen).await.is_replied());
        assert!(session.send("panne", &mut screen).await.is_failed());
        assert!(session.send("   ", &mut screen).await.is_ignored());

        let texts: Vec<_> = session.history().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["bonjour", "echo: bonjour", "panne", APOLOGY]);
        assert_eq!(screen.log().len(), 4);
        assert!(!screen.typing().is_visible());

        let stats = session.stats();
        assert_eq!(stats.endpoint, "test://echo");
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.bot_messages, 2);
        assert_eq!(stats.dispatch.sends, 2);
        assert_eq!(stats.dispatch.failures, 1);
        assert_eq!(stats.dispatch.ignored, 1);
    }

    struct Slow;

    #[async_trait::async_trait]
    impl Transport for Slow {
        async fn send_message(&self, message: &str) -> Result<ChatReply> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ChatReply::new(format!("enfin: {message}")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reply_survives_interrupt() {
        let mut session = ChatSession::with_transport(Slow, "test://slow");
        let mut screen = ChatSurface::new();
        let interrupt = AtomicBool::new(false);

        let raise = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            interrupt.store(true, Ordering::Relaxed);
        };
        let (outcome, ()) = tokio::join!(
            session.send_uninterrupted("bonjour", &mut screen, &interrupt),
            raise
        );

        assert!(outcome.is_replied());
        assert!(!interrupt.load(Ordering::Relaxed));
        assert_eq!(screen.notices(), &[INTERRUPT_NOTICE.to_string()]);
        assert!(!screen.typing().is_visible());

        let texts: Vec<_> = session.history().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["bonjour", "enfin: bonjour"]);
        let stats = session.stats();
        assert_eq!(stats.dispatch.in_flight(), 0);
        assert_eq!(stats.dispatch.replies, 1);
        assert_eq!(stats.bot_messages, 1);
    }

    #[tokio::test]
    async fn no_notice_without_interrupt() {
        let mut session = ChatSession::with_transport(Echo, "test://echo");
        let mut screen = ChatSurface::new();
        let interrupt = AtomicBool::new(false);

        let outcome = session.send_uninterrupted("salut", &mut screen, &interrupt).await;
        assert!(outcome.is_replied());
        assert!(screen.notices().is_empty());
    }

    #[test]
    fn session_from_config() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:5001/")
            .with_timeout(Some(Duration::from_secs(3)));
        let session = ChatSession::new(&config).unwrap();
        let stats = session.stats();
        assert_eq!(stats.endpoint, "http://localhost:5001/send_message");
        assert_eq!(stats.timeout, Some(Duration::from_secs(3)));
    }
}

//! The dispatcher: turns a send event into one request/response round trip.
//!
//! A send is Idle until the input holds something other than whitespace.  It then renders the
//! user's message, shows the typing indicator and waits on exactly one request.  Whatever the
//! request does, the indicator is hidden and one bot message is rendered before the send returns
//! to Idle.  Failures never escape; they come back as [`DispatchOutcome::Failed`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::observability::{
    DISPATCH_DURATION, DISPATCH_FAILURES, DISPATCH_IGNORED, DISPATCH_REPLIES, DISPATCH_SENDS,
};
use crate::render::Renderer;
use crate::surface::InputField;
use crate::types::{ChatReply, Sender};

/// The bot message shown whenever a request fails.
pub const APOLOGY: &str = "Désolé, une erreur est survenue. Veuillez réessayer plus tard.";

/// Something that can carry one chat message to the bot and bring back its reply.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `message` and wait for the reply.
    async fn send_message(&self, message: &str) -> Result<ChatReply>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_message(&self, message: &str) -> Result<ChatReply> {
        (**self).send_message(message).await
    }
}

/// A key delivered by a keypress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// The Enter key.
    Enter,
    /// A printable character.
    Char(char),
    /// Any other named key.
    Named(String),
}

/// A UI event that may trigger a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The send trigger was clicked.
    Click,
    /// A key was pressed in the input field.
    KeyPress(Key),
}

impl UiEvent {
    /// Returns true if this event should send the input.
    pub fn is_send_trigger(&self) -> bool {
        matches!(self, UiEvent::Click | UiEvent::KeyPress(Key::Enter))
    }
}

/// How a single send ended.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Nothing to send: the event was not a trigger or the input was blank.
    Ignored,
    /// The bot replied and the reply was rendered.
    Replied(ChatReply),
    /// The request failed and the apology was rendered.
    Failed(Error),
}

impl DispatchOutcome {
    /// Returns true if nothing was sent.
    pub fn is_ignored(&self) -> bool {
        matches!(self, DispatchOutcome::Ignored)
    }

    /// Returns true if the bot's reply was rendered.
    pub fn is_replied(&self) -> bool {
        matches!(self, DispatchOutcome::Replied(_))
    }

    /// Returns true if the request failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed(_))
    }
}

/// Counters for the sends a dispatcher has handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Sends that issued a request.
    pub sends: u64,
    /// Sends ignored because the input was blank or the event was not a trigger.
    pub ignored: u64,
    /// Sends whose reply was rendered.
    pub replies: u64,
    /// Sends that ended in the apology.
    pub failures: u64,
}

impl DispatchStats {
    /// Requests that have been issued but not yet completed.
    pub fn in_flight(&self) -> u64 {
        self.sends.saturating_sub(self.replies + self.failures)
    }
}

/// Handles send events and the network round trip behind them.
///
/// The dispatcher keeps no per-send state, so sends take `&self` and may overlap.  Overlapping
/// sends are neither serialized nor deduplicated.
///
/// # Example
///
/// ```rust
/// use chatbox::{ChatReply, ChatSurface, Dispatcher, Result, Transport};
///
/// struct Canned;
///
/// #[async_trait::async_trait]
/// impl Transport for Canned {
///     async fn send_message(&self, _: &str) -> Result<ChatReply> {
///         Ok(ChatReply::new("Hello!"))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let dispatcher = Dispatcher::new(Canned);
/// let mut surface = ChatSurface::new();
/// assert!(dispatcher.send_text("Bonjour", &mut surface).await.is_replied());
/// assert_eq!(surface.log().last().unwrap().text(), "Hello!");
/// # });
/// ```
pub struct Dispatcher<T: Transport> {
    transport: T,
    sends: AtomicU64,
    ignored: AtomicU64,
    replies: AtomicU64,
    failures: AtomicU64,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher sending through `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sends: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            replies: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Delivers a UI event.  Click and Enter send; every other key is ignored.
    pub async fn handle_event(
        &self,
        event: UiEvent,
        input: &mut InputField,
        renderer: &mut dyn Renderer,
    ) -> DispatchOutcome {
        if event.is_send_trigger() {
            self.send(input, renderer).await
        } else {
            DispatchOutcome::Ignored
        }
    }

    /// Sends `text` as if it had been typed into an input field.
    pub async fn send_text(&self, text: &str, renderer: &mut dyn Renderer) -> DispatchOutcome {
        let mut input = InputField::new(text);
        self.send(&mut input, renderer).await
    }

    /// Sends the contents of `input`.
    ///
    /// The input is trimmed; if nothing remains, nothing is rendered, no request is issued and
    /// the input is left as it was.  Otherwise the input is cleared before the user's message is
    /// rendered.
    pub async fn send(&self, input: &mut InputField, renderer: &mut dyn Renderer) -> DispatchOutcome {
        let message = input.value().trim().to_string();
        if message.is_empty() {
            DISPATCH_IGNORED.click();
            self.ignored.fetch_add(1, Ordering::Relaxed);
            return DispatchOutcome::Ignored;
        }
        input.clear();
        renderer.render(&message, Sender::User);

        DISPATCH_SENDS.click();
        self.sends.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        renderer.show_typing();
        let result = self.transport.send_message(&message).await;
        renderer.hide_typing();
        DISPATCH_DURATION.add(start.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                tracing::debug!(chars = reply.response.len(), "bot replied");
                renderer.render(&reply.response, Sender::Bot);
                DISPATCH_REPLIES.click();
                self.replies.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Replied(reply)
            }
            Err(err) => {
                tracing::error!(error = %err, "chat request failed");
                renderer.render(APOLOGY, Sender::Bot);
                DISPATCH_FAILURES.click();
                self.failures.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Failed(err)
            }
        }
    }

    /// A snapshot of this dispatcher's counters.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            sends: self.sends.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            replies: self.replies.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::surface::{ChatPage, ChatSurface};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Render(String, Sender),
        ShowTyping,
        HideTyping,
        Request(String),
    }

    type Events = Arc<Mutex<Vec<Event>>>;

    struct RecordingRenderer {
        events: Events,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, text: &str, sender: Sender) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Render(text.to_string(), sender));
        }

        fn show_typing(&mut self) {
            self.events.lock().unwrap().push(Event::ShowTyping);
        }

        fn hide_typing(&mut self) {
            self.events.lock().unwrap().push(Event::HideTyping);
        }

        fn print_error(&mut self, _: &str) {}

        fn print_info(&mut self, _: &str) {}
    }

    struct FakeTransport {
        events: Events,
        reply: Result<ChatReply>,
    }

    #[async_trait::async_trait]
    impl Transport for FakeTransport {
        async fn send_message(&self, message: &str) -> Result<ChatReply> {
            self.events
                .lock()
                .unwrap()
                .push(Event::Request(message.to_string()));
            self.reply.clone()
        }
    }

    fn harness(reply: Result<ChatReply>) -> (Dispatcher<FakeTransport>, RecordingRenderer, Events) {
        let events = Events::default();
        let dispatcher = Dispatcher::new(FakeTransport {
            events: Arc::clone(&events),
            reply,
        });
        let renderer = RecordingRenderer {
            events: Arc::clone(&events),
        };
        (dispatcher, renderer, events)
    }

    #[tokio::test]
    async fn success_renders_user_then_reply() {
        let (dispatcher, mut renderer, events) = harness(Ok(ChatReply::new("Hello!")));
        let mut input = InputField::new("  Bonjour  ");

        let outcome = dispatcher.send(&mut input, &mut renderer).await;

        assert!(outcome.is_replied());
        assert_eq!(input.value(), "");
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Event::Render("Bonjour".to_string(), Sender::User),
                Event::ShowTyping,
                Event::Request("Bonjour".to_string()),
                Event::HideTyping,
                Event::Render("Hello!".to_string(), Sender::Bot),
            ]
        );
    }

    #[tokio::test]
    async fn failure_renders_apology() {
        let (dispatcher, mut renderer, events) =
            harness(Err(Error::connection("connection refused", None)));
        let mut input = InputField::new("horaires");

        let outcome = dispatcher.send(&mut input, &mut renderer).await;

        assert!(outcome.is_failed());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Event::Render("horaires".to_string(), Sender::User),
                Event::ShowTyping,
                Event::Request("horaires".to_string()),
                Event::HideTyping,
                Event::Render(APOLOGY.to_string(), Sender::Bot),
            ]
        );
    }

    #[tokio::test]
    async fn status_failures_look_like_transport_failures() {
        let (dispatcher, mut renderer, events) = harness(Err(Error::api(500, "")));
        let outcome = dispatcher.send_text("merci", &mut renderer).await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(ref err) if err.status_code() == Some(500)
        ));
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&Event::Render(APOLOGY.to_string(), Sender::Bot))
        );
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (dispatcher, mut renderer, events) = harness(Ok(ChatReply::new("unused")));
        for blank in ["", "   ", "\t\n "] {
            let mut input = InputField::new(blank);
            let outcome = dispatcher.send(&mut input, &mut renderer).await;
            assert!(outcome.is_ignored());
            assert_eq!(input.value(), blank);
        }
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(dispatcher.stats().ignored, 3);
        assert_eq!(dispatcher.stats().sends, 0);
    }

    #[tokio::test]
    async fn other_keys_are_ignored() {
        let (dispatcher, mut renderer, events) = harness(Ok(ChatReply::new("unused")));
        let mut input = InputField::new("bonjour");
        for key in [Key::Char('a'), Key::Named("Tab".to_string())] {
            let outcome = dispatcher
                .handle_event(UiEvent::KeyPress(key), &mut input, &mut renderer)
                .await;
            assert!(outcome.is_ignored());
        }
        assert_eq!(input.value(), "bonjour");
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn enter_and_click_have_the_same_effect() {
        let mut logs = Vec::new();
        for event in [UiEvent::Click, UiEvent::KeyPress(Key::Enter)] {
            let (dispatcher, mut renderer, events) = harness(Ok(ChatReply::new("Au revoir !")));
            let mut input = InputField::new("au revoir");
            dispatcher.handle_event(event, &mut input, &mut renderer).await;
            assert_eq!(input.value(), "");
            logs.push(events.lock().unwrap().clone());
        }
        assert_eq!(logs[0], logs[1]);
    }

    #[tokio::test]
    async fn typing_indicator_hidden_after_each_send() {
        let dispatcher = Dispatcher::new(FakeTransport {
            events: Events::default(),
            reply: Err(Error::timeout("slow", None)),
        });
        let mut page = ChatPage::with_surface(dispatcher, ChatSurface::new());
        page.type_text("bonjour");
        assert!(page.click_send().await.is_failed());
        assert!(!page.surface().typing().is_visible());
        assert_eq!(page.surface().log().count(Sender::Bot), 1);
        assert_eq!(page.surface().log().last().unwrap().text(), APOLOGY);
    }

    #[tokio::test]
    async fn stats_count_outcomes() {
        let (ok, mut renderer, _) = harness(Ok(ChatReply::new("ok")));
        ok.send_text("a", &mut renderer).await;
        ok.send_text("b", &mut renderer).await;
        ok.send_text(" ", &mut renderer).await;
        assert_eq!(
            ok.stats(),
            DispatchStats {
                sends: 2,
                ignored: 1,
                replies: 2,
                failures: 0,
            }
        );
        assert_eq!(ok.stats().in_flight(), 0);

        let (failing, mut renderer, _) = harness(Err(Error::api(502, "bad gateway")));
        failing.send_text("a", &mut renderer).await;
        assert_eq!(failing.stats().failures, 1);
    }
}

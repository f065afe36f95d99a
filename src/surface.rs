//! An in-memory model of the chat page.
//!
//! The page has four collaborators: the conversation log, the text input, the send trigger and
//! the typing indicator.  [`ChatPage`] owns all of them and routes UI events through a
//! [`Dispatcher`]; [`ChatSurface`] is the part the dispatcher renders into.

use crate::dispatch::{DispatchOutcome, Dispatcher, Key, Transport, UiEvent};
use crate::render::{DEFAULT_LOGO, Renderer};
use crate::types::{Message, Sender};

/// Style class of the text block inside every rendered message.
pub const CONTENT_CLASS: &str = "message-content";

/// Style class of the container holding the bot's logo and status indicator.
pub const LOGO_CONTAINER_CLASS: &str = "logo-container";

/// Style class of the bot's status indicator.
pub const STATUS_INDICATOR_CLASS: &str = "status-indicator";

/////////////////////////////////////////// Messages ///////////////////////////////////////////

/// The logo and status decoration attached to bot messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotDecoration {
    /// Source of the logo image.
    pub logo_src: String,
    /// Style class of the status indicator next to the logo.
    pub status_class: &'static str,
}

impl BotDecoration {
    fn new(logo_src: &str) -> Self {
        Self {
            logo_src: logo_src.to_string(),
            status_class: STATUS_INDICATOR_CLASS,
        }
    }
}

/// A message as it sits in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// The message that was rendered.
    pub message: Message,
    /// Style class selected by the sender.
    pub style_class: &'static str,
    /// Style class of the content block.
    pub content_class: &'static str,
    /// Present on bot messages only.
    pub decoration: Option<BotDecoration>,
    /// Height of the block in rows.
    pub height: usize,
}

impl RenderedMessage {
    /// The sender tag of this message.
    pub fn sender(&self) -> Sender {
        self.message.sender
    }

    /// The text content of this message.
    pub fn text(&self) -> &str {
        &self.message.text
    }
}

//////////////////////////////////////// ConversationLog ///////////////////////////////////////

/// Append-only, scrolling log of rendered messages.
///
/// The scroll model counts rows: every message is as tall as its number of lines, and the
/// viewport shows `viewport_height` rows.  The log has no size bound.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Vec<RenderedMessage>,
    scroll_height: usize,
    scroll_top: usize,
    viewport_height: usize,
}

impl ConversationLog {
    /// Creates an empty log with the given viewport height in rows.
    pub fn new(viewport_height: usize) -> Self {
        Self {
            messages: Vec::new(),
            scroll_height: 0,
            scroll_top: 0,
            viewport_height,
        }
    }

    /// Appends a message and scrolls to the newest entry.
    pub fn append(&mut self, message: RenderedMessage) {
        self.scroll_height += message.height;
        self.messages.push(message);
        self.scroll_to_bottom();
    }

    /// All messages in insertion order.
    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&RenderedMessage> {
        self.messages.last()
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been rendered.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages from `sender`.
    pub fn count(&self, sender: Sender) -> usize {
        self.messages.iter().filter(|m| m.sender() == sender).count()
    }

    /// Total height of the log content in rows.
    pub fn scroll_height(&self) -> usize {
        self.scroll_height
    }

    /// Current scroll offset in rows.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll_top(&self) -> usize {
        self.scroll_height.saturating_sub(self.viewport_height)
    }

    /// Returns true when the newest message is in view.
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top == self.max_scroll_top()
    }

    /// Scrolls to `offset`, clamped to the content.
    pub fn scroll_to(&mut self, offset: usize) {
        self.scroll_top = offset.min(self.max_scroll_top());
    }

    /// Scrolls so the newest message is in view.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll_top();
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// Rows visible in a default log.
pub const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

/////////////////////////////////////// TypingIndicator ////////////////////////////////////////

/// The single typing indicator of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingIndicator {
    visible: bool,
}

impl TypingIndicator {
    /// Makes the indicator visible.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hides the indicator.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Returns true while the indicator is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

////////////////////////////////////////// InputField //////////////////////////////////////////

/// The text input the user types into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
}

impl InputField {
    /// Creates an input field holding `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The current contents.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the contents.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Empties the field.
    pub fn clear(&mut self) {
        self.value.clear();
    }
}

////////////////////////////////////////// ChatSurface /////////////////////////////////////////

/// The display half of the page: the conversation log plus the typing indicator.
#[derive(Debug, Clone)]
pub struct ChatSurface {
    log: ConversationLog,
    typing: TypingIndicator,
    logo_src: String,
    notices: Vec<String>,
}

impl ChatSurface {
    /// Creates an empty surface with the default logo and viewport.
    pub fn new() -> Self {
        Self::with_log(ConversationLog::default())
    }

    /// Creates a surface around an existing log.
    pub fn with_log(log: ConversationLog) -> Self {
        Self {
            log,
            typing: TypingIndicator::default(),
            logo_src: DEFAULT_LOGO.to_string(),
            notices: Vec::new(),
        }
    }

    /// Sets the logo attached to bot messages.
    pub fn with_logo(mut self, logo_src: impl Into<String>) -> Self {
        self.logo_src = logo_src.into();
        self
    }

    /// The conversation log.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The conversation log, for scrolling.
    pub fn log_mut(&mut self) -> &mut ConversationLog {
        &mut self.log
    }

    /// The typing indicator.
    pub fn typing(&self) -> &TypingIndicator {
        &self.typing
    }

    /// Info and error notices printed outside the log, oldest first.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Default for ChatSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ChatSurface {
    fn render(&mut self, text: &str, sender: Sender) {
        let decoration = match sender {
            Sender::Bot => Some(BotDecoration::new(&self.logo_src)),
            Sender::User => None,
        };
        self.log.append(RenderedMessage {
            message: Message::new(text, sender),
            style_class: sender.style_class(),
            content_class: CONTENT_CLASS,
            decoration,
            height: text.lines().count().max(1),
        });
    }

    fn show_typing(&mut self) {
        self.typing.show();
    }

    fn hide_typing(&mut self) {
        self.typing.hide();
    }

    fn print_error(&mut self, error: &str) {
        self.notices.push(format!("error: {error}"));
    }

    fn print_info(&mut self, info: &str) {
        self.notices.push(info.to_string());
    }
}

/////////////////////////////////////////// ChatPage ///////////////////////////////////////////

/// The whole page: surface, input field and the send trigger wired to a dispatcher.
pub struct ChatPage<T: Transport> {
    dispatcher: Dispatcher<T>,
    surface: ChatSurface,
    input: InputField,
}

impl<T: Transport> ChatPage<T> {
    /// Creates an empty page dispatching through `dispatcher`.
    pub fn new(dispatcher: Dispatcher<T>) -> Self {
        Self::with_surface(dispatcher, ChatSurface::new())
    }

    /// Creates a page around an existing surface.
    pub fn with_surface(dispatcher: Dispatcher<T>, surface: ChatSurface) -> Self {
        Self {
            dispatcher,
            surface,
            input: InputField::default(),
        }
    }

    /// Replaces the input field's contents, as typing would.
    pub fn type_text(&mut self, text: impl Into<String>) {
        self.input.set_value(text);
    }

    /// Delivers one UI event to the page.
    pub async fn dispatch(&mut self, event: UiEvent) -> DispatchOutcome {
        self.dispatcher
            .handle_event(event, &mut self.input, &mut self.surface)
            .await
    }

    /// Clicks the send trigger.
    pub async fn click_send(&mut self) -> DispatchOutcome {
        self.dispatch(UiEvent::Click).await
    }

    /// Presses Enter in the input field.
    pub async fn press_enter(&mut self) -> DispatchOutcome {
        self.dispatch(UiEvent::KeyPress(Key::Enter)).await
    }

    /// The surface.
    pub fn surface(&self) -> &ChatSurface {
        &self.surface
    }

    /// The surface, for scrolling.
    pub fn surface_mut(&mut self) -> &mut ChatSurface {
        &mut self.surface
    }

    /// The input field.
    pub fn input(&self) -> &InputField {
        &self.input
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_tags_sender_and_decorates_bot() {
        let mut surface = ChatSurface::new();
        surface.render("Bonjour", Sender::User);
        surface.render("Bonjour ! Comment puis-je vous aider ?", Sender::Bot);

        let messages = surface.log().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].style_class, "user-message");
        assert_eq!(messages[0].content_class, CONTENT_CLASS);
        assert!(messages[0].decoration.is_none());
        assert_eq!(messages[1].style_class, "bot-message");
        assert_eq!(
            messages[1].decoration,
            Some(BotDecoration {
                logo_src: "/imgs/logo.png".to_string(),
                status_class: STATUS_INDICATOR_CLASS,
            })
        );
    }

    #[test]
    fn empty_text_is_rendered() {
        let mut surface = ChatSurface::new();
        surface.render("", Sender::Bot);
        assert_eq!(surface.log().len(), 1);
        assert_eq!(surface.log().last().unwrap().text(), "");
        assert_eq!(surface.log().scroll_height(), 1);
    }

    #[test]
    fn every_append_scrolls_to_bottom() {
        let mut surface = ChatSurface::with_log(ConversationLog::new(3));
        for i in 0..10 {
            surface.render(&format!("line {i}\nsecond line"), Sender::User);
            assert!(surface.log().is_scrolled_to_bottom());
            assert_eq!(surface.log().scroll_top(), surface.log().max_scroll_top());
        }
        assert_eq!(surface.log().scroll_height(), 20);
        assert_eq!(surface.log().scroll_top(), 17);
    }

    #[test]
    fn render_after_scrolling_up_returns_to_bottom() {
        let mut surface = ChatSurface::with_log(ConversationLog::new(2));
        for _ in 0..5 {
            surface.render("x", Sender::Bot);
        }
        surface.log_mut().scroll_to(0);
        assert!(!surface.log().is_scrolled_to_bottom());
        surface.render("y", Sender::User);
        assert!(surface.log().is_scrolled_to_bottom());
    }

    #[test]
    fn scroll_is_clamped() {
        let mut log = ConversationLog::new(10);
        log.scroll_to(100);
        assert_eq!(log.scroll_top(), 0);
        assert!(log.is_scrolled_to_bottom());
    }

    #[test]
    fn notices_stay_out_of_the_log() {
        let mut surface = ChatSurface::new();
        surface.print_info("hello");
        surface.print_error("oops");
        assert!(surface.log().is_empty());
        assert_eq!(surface.notices(), &["hello".to_string(), "error: oops".to_string()]);
    }

    #[test]
    fn input_field_operations() {
        let mut input = InputField::new("  hi  ");
        assert_eq!(input.value(), "  hi  ");
        input.clear();
        assert_eq!(input.value(), "");
        input.set_value("again");
        assert_eq!(input.value(), "again");
    }

    #[test]
    fn typing_indicator_starts_hidden() {
        let surface = ChatSurface::new();
        assert!(!surface.typing().is_visible());
    }
}

// Public modules
pub mod chat_reply;
pub mod chat_request;
pub mod message;
pub mod sender;

// Re-exports
pub use chat_reply::ChatReply;
pub use chat_request::ChatRequest;
pub use message::Message;
pub use sender::Sender;

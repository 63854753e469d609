//! Fitcalc stream: line framing and the streaming HTTP client.
mod engine;
mod fetch;
mod framer;
mod types;

pub use engine::EngineHandle;
pub use fetch::{ChannelEventSink, EventSink, EventStreamer, ReqwestStreamer, StreamSettings};
pub use framer::{LineFramer, Lines};
pub use types::{EngineEvent, FailureKind, StreamError, StreamSummary};

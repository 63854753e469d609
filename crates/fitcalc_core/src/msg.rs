use crate::{Generation, StreamMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the fitting text.
    FittingChanged(String),
    /// User toggled the "include hull" checkbox.
    IncludeHullToggled(bool),
    /// User submitted the form.
    Submitted,
    /// Engine event for the submission identified by `generation`.
    Stream {
        generation: Generation,
        event: StreamEvent,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Response headers arrived with a success status.
    Opened,
    Message(StreamMessage),
    /// A framed line that failed to parse; it has been skipped.
    Malformed { reason: String },
    TransportFailed { message: String },
    /// Response body exhausted.
    Ended,
}

use std::fmt;

use fitcalc_core::{Generation, MessageError, StreamMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Response status was a success; body streaming begins.
    Opened { generation: Generation },
    Message {
        generation: Generation,
        message: StreamMessage,
    },
    /// A framed line failed to parse and was skipped.
    Malformed {
        generation: Generation,
        error: MessageError,
    },
    Finished {
        generation: Generation,
        result: Result<StreamSummary, StreamError>,
    },
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        match self {
            EngineEvent::Opened { generation }
            | EngineEvent::Message { generation, .. }
            | EngineEvent::Malformed { generation, .. }
            | EngineEvent::Finished { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    pub bytes: u64,
    pub lines: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StreamError {
    pub kind: FailureKind,
    pub message: String,
}

impl StreamError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

use serde_json::Value;

use crate::{DonePayload, ErrorReport, ProgressUpdate};

/// One line of the server's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Progress(ProgressUpdate),
    Done(DonePayload),
    Error(ErrorReport),
    /// Well-formed message with a `type` this client does not know.
    Unknown { kind: String },
}

impl StreamMessage {
    pub fn kind(&self) -> &str {
        match self {
            StreamMessage::Progress(_) => "progress",
            StreamMessage::Done(_) => "done",
            StreamMessage::Error(_) => "error",
            StreamMessage::Unknown { kind } => kind,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("line is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("message is not a JSON object")]
    NotAnObject,
    #[error("message has no string `type` field")]
    MissingType,
    #[error("invalid `{kind}` message: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

/// Parse a single framed line into a [`StreamMessage`].
pub fn parse_message(line: &str) -> Result<StreamMessage, MessageError> {
    let value: Value =
        serde_json::from_str(line).map_err(|err| MessageError::InvalidJson(err.to_string()))?;
    let Value::Object(object) = &value else {
        return Err(MessageError::NotAnObject);
    };
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingType)?
        .to_owned();

    match kind.as_str() {
        "progress" => payload(&kind, line).map(StreamMessage::Progress),
        "done" => payload(&kind, line).map(StreamMessage::Done),
        "error" => payload(&kind, line).map(StreamMessage::Error),
        _ => Ok(StreamMessage::Unknown { kind }),
    }
}

// Payloads are decoded from the raw line, not the `Value`, so that map
// order survives into `IndexMap`.
fn payload<T: serde::de::DeserializeOwned>(kind: &str, line: &str) -> Result<T, MessageError> {
    serde_json::from_str(line).map_err(|err| MessageError::InvalidPayload {
        kind: kind.to_owned(),
        reason: err.to_string(),
    })
}

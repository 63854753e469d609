use std::io;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use fitcalc_core::{Effect, Msg, StreamEvent};
use fitcalc_stream::{EngineEvent, EngineHandle, FailureKind, StreamSettings};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: StreamSettings) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartStream { generation, form } => {
                    engine_info!(
                        "StartStream generation={} fitting_len={} include_hull={}",
                        generation,
                        form.fitting.len(),
                        form.include_hull
                    );
                    self.engine.start(generation, form);
                }
                Effect::CancelStream { generation } => {
                    self.engine.cancel(generation);
                }
            }
        }
    }

    /// Next engine event as a core message. `Ok(None)` on timeout or for
    /// events the core has no use for.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, RecvTimeoutError> {
        match self.engine.recv_timeout(timeout) {
            Ok(event) => Ok(map_event(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Option<Msg> {
    let generation = event.generation();
    let event = match event {
        EngineEvent::Opened { .. } => StreamEvent::Opened,
        EngineEvent::Message { message, .. } => StreamEvent::Message(message),
        EngineEvent::Malformed { error, .. } => StreamEvent::Malformed {
            reason: error.to_string(),
        },
        EngineEvent::Finished { result: Ok(_), .. } => StreamEvent::Ended,
        EngineEvent::Finished { result: Err(err), .. } if err.kind == FailureKind::Cancelled => {
            engine_debug!("Stream for submission {} cancelled", generation);
            return None;
        }
        EngineEvent::Finished { result: Err(err), .. } => StreamEvent::TransportFailed {
            message: err.to_string(),
        },
    };
    Some(Msg::Stream { generation, event })
}

#[cfg(test)]
mod tests {
    use fitcalc_core::{MessageError, StreamMessage};
    use fitcalc_stream::{StreamError, StreamSummary};

    use super::*;

    fn failed(kind: FailureKind) -> EngineEvent {
        EngineEvent::Finished {
            generation: 3,
            result: Err(StreamError {
                kind,
                message: "Bad Gateway".to_string(),
            }),
        }
    }

    #[test]
    fn finished_maps_to_end_or_failure() {
        let ended = map_event(EngineEvent::Finished {
            generation: 3,
            result: Ok(StreamSummary::default()),
        });
        assert_eq!(
            ended,
            Some(Msg::Stream {
                generation: 3,
                event: StreamEvent::Ended
            })
        );

        assert_eq!(
            map_event(failed(FailureKind::HttpStatus(502))),
            Some(Msg::Stream {
                generation: 3,
                event: StreamEvent::TransportFailed {
                    message: "http status 502: Bad Gateway".to_string()
                }
            })
        );
        assert_eq!(map_event(failed(FailureKind::Cancelled)), None);
    }

    #[test]
    fn messages_and_malformed_lines_pass_through() {
        let message = StreamMessage::Unknown {
            kind: "heartbeat".to_string(),
        };
        assert_eq!(
            map_event(EngineEvent::Message {
                generation: 1,
                message: message.clone()
            }),
            Some(Msg::Stream {
                generation: 1,
                event: StreamEvent::Message(message)
            })
        );
        assert_eq!(
            map_event(EngineEvent::Malformed {
                generation: 1,
                error: MessageError::MissingType
            }),
            Some(Msg::Stream {
                generation: 1,
                event: StreamEvent::Malformed {
                    reason: "message has no string `type` field".to_string()
                }
            })
        );
    }
}

use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_info, engine_trace, engine_warn};
use fitcalc_core::{parse_message, Generation, SubmitForm};
use futures_util::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;

use crate::framer::LineFramer;
use crate::{EngineEvent, FailureKind, StreamError, StreamSummary};

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub base_url: String,
    /// Absolute path of the streaming endpoint on `base_url`.
    pub stream_path: String,
    pub connect_timeout: Duration,
    /// Longest wait for the next body chunk. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5002".to_string(),
            stream_path: "/stream".to_string(),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: None,
        }
    }
}

impl StreamSettings {
    pub fn endpoint(&self) -> Result<reqwest::Url, StreamError> {
        reqwest::Url::parse(&self.base_url)
            .and_then(|base| base.join(&self.stream_path))
            .map_err(|err| StreamError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait EventStreamer: Send + Sync {
    /// Submit `form` and emit one event per framed line until the body ends.
    async fn stream(
        &self,
        generation: Generation,
        form: &SubmitForm,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<StreamSummary, StreamError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStreamer {
    settings: StreamSettings,
}

impl ReqwestStreamer {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, StreamError> {
        // No overall request timeout: the body stays open for the whole computation.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| StreamError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl EventStreamer for ReqwestStreamer {
    async fn stream(
        &self,
        generation: Generation,
        form: &SubmitForm,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<StreamSummary, StreamError> {
        let url = self.settings.endpoint()?;
        let client = self.build_client()?;
        engine_info!("POST {} for submission {}", url, generation);

        let request = client.post(url).form(&form.fields()).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            response = request => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let mut framer = LineFramer::for_content_type(content_type.as_deref());
        sink.emit(EngineEvent::Opened { generation });

        let mut summary = StreamSummary::default();
        let mut stream = std::pin::pin!(response.bytes_stream());
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                next = next_chunk(&mut stream, self.settings.idle_timeout) => next?,
            };
            let Some(chunk) = next else {
                break;
            };
            summary.bytes += chunk.len() as u64;
            let before = summary.lines;
            for line in framer.push(&chunk) {
                emit_line(generation, &line, sink, &mut summary);
            }
            engine_trace!(
                "Chunk of {} byte(s) completed {} line(s)",
                chunk.len(),
                summary.lines - before
            );
        }

        for line in framer.finish() {
            emit_line(generation, &line, sink, &mut summary);
        }

        engine_info!(
            "Stream for submission {} closed: {} byte(s), {} line(s), {} malformed",
            generation,
            summary.bytes,
            summary.lines,
            summary.malformed
        );
        Ok(summary)
    }
}

async fn next_chunk<S>(
    stream: &mut S,
    idle_timeout: Option<Duration>,
) -> Result<Option<Bytes>, StreamError>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.next())
            .await
            .map_err(|_| {
                StreamError::new(FailureKind::Timeout, format!("no data for {limit:?}"))
            })?,
        None => stream.next().await,
    };
    next.transpose().map_err(map_reqwest_error)
}

fn emit_line(generation: Generation, line: &str, sink: &dyn EventSink, summary: &mut StreamSummary) {
    summary.lines += 1;
    match parse_message(line) {
        Ok(message) => sink.emit(EngineEvent::Message {
            generation,
            message,
        }),
        Err(error) => {
            summary.malformed += 1;
            engine_warn!("Malformed line {} ({}): {:.120}", summary.lines, error, line);
            sink.emit(EngineEvent::Malformed { generation, error });
        }
    }
}

fn cancelled() -> StreamError {
    StreamError::new(FailureKind::Cancelled, "submission superseded")
}

fn map_reqwest_error(err: reqwest::Error) -> StreamError {
    if err.is_timeout() {
        return StreamError::new(FailureKind::Timeout, err.to_string());
    }
    StreamError::new(FailureKind::Network, err.to_string())
}

use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use fitcalc_core::{Generation, SubmitForm};
use tokio_util::sync::CancellationToken;

use crate::fetch::{ChannelEventSink, EventStreamer, ReqwestStreamer, StreamSettings};
use crate::EngineEvent;

enum EngineCommand {
    Start {
        generation: Generation,
        form: SubmitForm,
    },
    Cancel {
        generation: Generation,
    },
}

/// Runs streams on a background runtime and hands their events back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: StreamSettings) -> io::Result<Self> {
        Self::with_streamer(Arc::new(ReqwestStreamer::new(settings)))
    }

    pub fn with_streamer(streamer: Arc<dyn EventStreamer>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        // One worker: a stream's chunks are handled strictly in arrival order.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        thread::spawn(move || {
            let mut active: HashMap<Generation, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                // Finished streams cancel their own token on the way out.
                active.retain(|_, token| !token.is_cancelled());
                match command {
                    EngineCommand::Start { generation, form } => {
                        let token = CancellationToken::new();
                        active.insert(generation, token.clone());
                        let streamer = streamer.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_stream(streamer.as_ref(), generation, form, event_tx, token).await;
                        });
                    }
                    EngineCommand::Cancel { generation } => match active.remove(&generation) {
                        Some(token) => {
                            engine_info!("Cancelling stream for submission {}", generation);
                            token.cancel();
                        }
                        None => engine_debug!("No active stream for submission {}", generation),
                    },
                }
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn start(&self, generation: Generation, form: SubmitForm) {
        let _ = self.cmd_tx.send(EngineCommand::Start { generation, form });
    }

    pub fn cancel(&self, generation: Generation) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { generation });
    }

    /// Waits up to `timeout` for the next event. `Disconnected` means the engine thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

async fn run_stream(
    streamer: &dyn EventStreamer,
    generation: Generation,
    form: SubmitForm,
    event_tx: mpsc::Sender<EngineEvent>,
    token: CancellationToken,
) {
    let _done = token.clone().drop_guard();
    let sink = ChannelEventSink::new(event_tx.clone());
    let result = streamer.stream(generation, &form, &sink, &token).await;
    let _ = event_tx.send(EngineEvent::Finished { generation, result });
}

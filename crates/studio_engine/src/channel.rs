//! Progress delivery for one job: push connection plus status polling.
//!
//! Both paths run until the first terminal event, which is forwarded exactly
//! once; everything after it is dropped and both tasks are torn down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use futures_util::StreamExt;
use studio_core::{
    parse_push_frame, ChannelEvent, EventSource, JobId, ProgressEvent, StatusSnapshot,
};
use studio_logging::{studio_debug, studio_info, studio_warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{EngineEvent, ServiceSettings, StudioApi};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Live subscription to one job's progress.
///
/// Dropping the channel closes it.
pub struct ProgressChannel {
    job_id: JobId,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ProgressChannel {
    pub fn open(
        runtime: &Handle,
        job_id: JobId,
        api: Arc<dyn StudioApi>,
        settings: &ServiceSettings,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let gate = Arc::new(Gate {
            job_id: job_id.clone(),
            sink,
            terminal_seen: AtomicBool::new(false),
            cancel: cancel.clone(),
        });
        let mut tasks = Vec::with_capacity(2);

        if settings.push_enabled {
            match settings.ws_url(&job_id) {
                Ok(url) => {
                    let gate = gate.clone();
                    tasks.push(runtime.spawn(async move {
                        tokio::select! {
                            _ = gate.cancel.cancelled() => {}
                            _ = run_push(url, &gate) => {}
                        }
                    }));
                }
                Err(err) => studio_warn!("No push channel for job {}: {}", job_id, err),
            }
        }

        let poll_interval = settings.poll_interval;
        tasks.push(runtime.spawn(async move {
            tokio::select! {
                _ = gate.cancel.cancelled() => {}
                _ = run_poll(api, poll_interval, &gate) => {}
            }
        }));

        studio_info!("Opened progress channel for job {}", job_id);
        Self {
            job_id,
            cancel,
            tasks,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// True once a terminal event went out or the channel was closed.
    pub fn is_finished(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop both paths. Idempotent.
    pub fn close(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ProgressChannel {
    fn drop(&mut self) {
        self.close();
    }
}

struct Gate {
    job_id: JobId,
    sink: Arc<dyn ProgressSink>,
    terminal_seen: AtomicBool,
    cancel: CancellationToken,
}

impl Gate {
    /// Forward one event. Returns false once the channel should stop.
    fn deliver(&self, source: EventSource, event: ProgressEvent) -> bool {
        if event.is_keepalive() {
            return true;
        }
        if self.cancel.is_cancelled() || self.terminal_seen.load(Ordering::SeqCst) {
            studio_debug!(
                "Dropping {:?} event for finished job {}",
                source,
                self.job_id
            );
            return false;
        }
        let terminal = event.is_terminal();
        if terminal && self.terminal_seen.swap(true, Ordering::SeqCst) {
            studio_debug!(
                "Suppressing duplicate terminal event from {:?} for job {}",
                source,
                self.job_id
            );
            return false;
        }
        self.sink.emit(EngineEvent::Progress(ChannelEvent {
            job_id: self.job_id.clone(),
            source,
            event,
        }));
        if terminal {
            self.cancel.cancel();
            return false;
        }
        true
    }
}

async fn run_push(url: Url, gate: &Gate) {
    let (mut stream, _response) = match connect_async(url.as_str()).await {
        Ok(connection) => connection,
        Err(err) => {
            studio_warn!(
                "Push channel for job {} unavailable, polling only: {}",
                gate.job_id,
                err
            );
            return;
        }
    };
    studio_debug!("Push channel connected for job {}", gate.job_id);

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match parse_push_frame(&text) {
                Ok(events) => {
                    for event in events {
                        if !gate.deliver(EventSource::Push, event) {
                            return;
                        }
                    }
                }
                Err(err) => studio_debug!("Skipping unreadable push frame: {}", err),
            },
            Ok(Message::Close(frame)) => {
                studio_warn!(
                    "Push channel for job {} closed ({:?}), polling only",
                    gate.job_id,
                    frame
                );
                return;
            }
            Ok(_) => {}
            Err(err) => {
                studio_warn!(
                    "Push channel for job {} failed, polling only: {}",
                    gate.job_id,
                    err
                );
                return;
            }
        }
    }
}

async fn run_poll(api: Arc<dyn StudioApi>, every: std::time::Duration, gate: &Gate) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let polled = api
            .job_status(&gate.job_id)
            .await
            .and_then(StatusSnapshot::into_events);
        match polled {
            Ok(events) => {
                for event in events {
                    if !gate.deliver(EventSource::Poll, event) {
                        return;
                    }
                }
            }
            Err(err) => studio_debug!("Status poll for job {} failed: {}", gate.job_id, err),
        }
    }
}

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use studio_core::{DeckError, JobId, SubmitOptions};
use studio_logging::{studio_debug, studio_error};

use crate::channel::{ChannelProgressSink, ProgressChannel, ProgressSink};
use crate::{EngineEvent, ReqwestStudioApi, ServiceSettings, StudioApi};

enum EngineCommand {
    FetchEnvConfig,
    FetchTemplates,
    Submit {
        request: u64,
        content: String,
        options: SubmitOptions,
    },
    OpenChannel {
        job_id: JobId,
    },
    CloseChannel {
        job_id: JobId,
    },
    LoadStory {
        job_id: JobId,
    },
    SaveStory {
        job_id: JobId,
        story: Value,
    },
    RegeneratePage {
        job_id: JobId,
        page: u32,
        instruction: Option<String>,
    },
    ApplyStory {
        job_id: JobId,
    },
}

/// Handle to the engine thread. Cloning shares the same thread and event queue.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings) -> Result<Self, DeckError> {
        let api = Arc::new(ReqwestStudioApi::new(settings.clone())?);
        Ok(Self::with_api(api, settings))
    }

    pub fn with_api(api: Arc<dyn StudioApi>, settings: ServiceSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    studio_error!("Engine runtime failed to start: {}", err);
                    return;
                }
            };
            let mut live: Option<ProgressChannel> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::OpenChannel { job_id } => {
                        // One live channel at a time; dropping closes it.
                        live = None;
                        let sink: Arc<dyn ProgressSink> =
                            Arc::new(ChannelProgressSink::new(event_tx.clone()));
                        live = Some(ProgressChannel::open(
                            runtime.handle(),
                            job_id,
                            api.clone(),
                            &settings,
                            sink,
                        ));
                    }
                    EngineCommand::CloseChannel { job_id } => {
                        if let Some(mut channel) =
                            live.take_if(|channel| *channel.job_id() == job_id)
                        {
                            studio_debug!("Closing progress channel for job {}", job_id);
                            channel.close();
                        }
                    }
                    command => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(api.as_ref(), command, event_tx).await;
                        });
                    }
                }
                if live.as_ref().is_some_and(ProgressChannel::is_finished) {
                    live = None;
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn fetch_env_config(&self) {
        self.send(EngineCommand::FetchEnvConfig);
    }

    pub fn fetch_templates(&self) {
        self.send(EngineCommand::FetchTemplates);
    }

    pub fn submit(&self, request: u64, content: String, options: SubmitOptions) {
        self.send(EngineCommand::Submit {
            request,
            content,
            options,
        });
    }

    pub fn open_channel(&self, job_id: JobId) {
        self.send(EngineCommand::OpenChannel { job_id });
    }

    pub fn close_channel(&self, job_id: JobId) {
        self.send(EngineCommand::CloseChannel { job_id });
    }

    pub fn load_story(&self, job_id: JobId) {
        self.send(EngineCommand::LoadStory { job_id });
    }

    pub fn save_story(&self, job_id: JobId, story: Value) {
        self.send(EngineCommand::SaveStory { job_id, story });
    }

    pub fn regenerate_page(&self, job_id: JobId, page: u32, instruction: Option<String>) {
        self.send(EngineCommand::RegeneratePage {
            job_id,
            page,
            instruction,
        });
    }

    pub fn apply_story(&self, job_id: JobId) {
        self.send(EngineCommand::ApplyStory { job_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event. Also waits out the timeout if
    /// the engine thread is gone, so polling loops never spin.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        let result = self.event_rx.lock().ok()?.recv_timeout(timeout);
        match result {
            Ok(event) => Some(event),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                None
            }
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            studio_error!("Engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(
    api: &dyn StudioApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchEnvConfig => EngineEvent::EnvConfigLoaded(api.env_config().await),
        EngineCommand::FetchTemplates => EngineEvent::TemplatesLoaded(api.templates().await),
        EngineCommand::Submit {
            request,
            content,
            options,
        } => EngineEvent::JobSubmitted {
            request,
            result: api.submit_job(&content, &options).await,
        },
        EngineCommand::LoadStory { job_id } => {
            let result = api.load_story(&job_id).await;
            EngineEvent::StoryLoaded { job_id, result }
        }
        EngineCommand::SaveStory { job_id, story } => {
            let result = api.save_story(&job_id, &story).await;
            EngineEvent::StorySaved { job_id, result }
        }
        EngineCommand::RegeneratePage {
            job_id,
            page,
            instruction,
        } => {
            let result = api
                .regenerate_page(&job_id, page, instruction.as_deref())
                .await;
            EngineEvent::PageRegenerated {
                job_id,
                page,
                result,
            }
        }
        EngineCommand::ApplyStory { job_id } => {
            let result = api.apply_story(&job_id).await;
            EngineEvent::StoryApplied { job_id, result }
        }
        EngineCommand::OpenChannel { .. } | EngineCommand::CloseChannel { .. } => return,
    };
    let _ = event_tx.send(event);
}

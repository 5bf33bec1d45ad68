use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use studio_core::{DeckError, Effect, Msg};
use studio_engine::{EngineEvent, EngineHandle, ServiceSettings};
use studio_logging::{studio_info, studio_warn};

use super::commands::Input;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ServiceSettings, input_tx: mpsc::Sender<Input>) -> Result<Self, DeckError> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self { engine };
        runner.spawn_event_loop(input_tx);
        Ok(runner)
    }

    pub fn fetch_env_config(&self) {
        self.engine.fetch_env_config();
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob {
                    request,
                    content,
                    options,
                } => {
                    studio_info!(
                        "SubmitJob request={} content_len={} visual={} tone={}",
                        request,
                        content.len(),
                        options.visual_template,
                        options.tone_template
                    );
                    self.engine.submit(request, content, options);
                }
                Effect::OpenChannel { job_id } => self.engine.open_channel(job_id),
                Effect::CloseChannel { job_id } => self.engine.close_channel(job_id),
                Effect::LoadStory { job_id } => self.engine.load_story(job_id),
                Effect::SaveStory { job_id, story } => {
                    self.engine.save_story(job_id, story.to_value());
                }
                Effect::RegeneratePage {
                    job_id,
                    page,
                    instruction,
                } => self.engine.regenerate_page(job_id, page, instruction),
                Effect::ApplyStory { job_id } => self.engine.apply_story(job_id),
            }
        }
    }

    fn spawn_event_loop(&self, input_tx: mpsc::Sender<Input>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(100)) else {
                continue;
            };
            let Some(msg) = map_event(event) else {
                continue;
            };
            if input_tx.send(Input::Msg(msg)).is_err() {
                break;
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::EnvConfigLoaded(result) => Msg::EnvConfigLoaded {
            has_server_key: match result {
                Ok(env) => env.has_env_key,
                Err(err) => {
                    studio_warn!("Could not read service configuration: {}", err);
                    false
                }
            },
        },
        EngineEvent::TemplatesLoaded(_) => return None,
        EngineEvent::JobSubmitted { request, result } => Msg::JobSubmitted { request, result },
        EngineEvent::Progress(event) => Msg::Channel(event),
        EngineEvent::StoryLoaded { job_id, result } => Msg::StoryLoaded { job_id, result },
        EngineEvent::StorySaved { job_id, result } => Msg::StorySaved { job_id, result },
        EngineEvent::PageRegenerated {
            job_id,
            page,
            result,
        } => Msg::PageRegenerated {
            job_id,
            page,
            result,
        },
        EngineEvent::StoryApplied { job_id, result } => Msg::StoryApplied {
            job_id,
            result: result.map(|outcome| outcome.total_pages),
        },
    };
    Some(msg)
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use studio_core::{DeckError, JobId, RemoteStatus, StatusSnapshot, SubmitOptions};
use studio_engine::{
    ApplyOutcome, EngineEvent, EnvConfig, ProgressSink, StudioApi, TemplateCatalog,
};

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Status endpoint that replays a script, repeating its last entry.
pub struct ScriptedApi {
    statuses: Mutex<VecDeque<Result<StatusSnapshot, DeckError>>>,
    last: Mutex<Option<Result<StatusSnapshot, DeckError>>>,
    pub polls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(script: Vec<Result<StatusSnapshot, DeckError>>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(script.into()),
            last: Mutex::new(None),
            polls: AtomicUsize::new(0),
        })
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StudioApi for ScriptedApi {
    async fn submit_job(&self, _: &str, _: &SubmitOptions) -> Result<JobId, DeckError> {
        Ok(JobId::from("scripted"))
    }

    async fn job_status(&self, _: &JobId) -> Result<StatusSnapshot, DeckError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = next {
            *last = Some(next);
        }
        last.clone()
            .unwrap_or_else(|| Err(DeckError::not_found("no status scripted")))
    }

    async fn load_story(&self, _: &JobId) -> Result<Value, DeckError> {
        Err(DeckError::not_found("story"))
    }

    async fn save_story(&self, _: &JobId, story: &Value) -> Result<Value, DeckError> {
        Ok(story.clone())
    }

    async fn regenerate_page(
        &self,
        _: &JobId,
        _: u32,
        _: Option<&str>,
    ) -> Result<Value, DeckError> {
        Err(DeckError::not_found("page"))
    }

    async fn apply_story(&self, _: &JobId) -> Result<ApplyOutcome, DeckError> {
        Ok(ApplyOutcome {
            total_pages: 1,
            detail: String::new(),
        })
    }

    async fn env_config(&self) -> Result<EnvConfig, DeckError> {
        Ok(EnvConfig::default())
    }

    async fn templates(&self) -> Result<TemplateCatalog, DeckError> {
        Ok(TemplateCatalog::default())
    }
}

pub fn running(progress: f64, completed_pages: u32, total_pages: u32) -> StatusSnapshot {
    StatusSnapshot {
        status: RemoteStatus::Running,
        progress,
        completed_pages,
        total_pages,
        ..StatusSnapshot::default()
    }
}

pub fn completed(total_pages: u32) -> StatusSnapshot {
    StatusSnapshot {
        status: RemoteStatus::Completed,
        progress: 1.0,
        completed_pages: total_pages,
        total_pages,
        ..StatusSnapshot::default()
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

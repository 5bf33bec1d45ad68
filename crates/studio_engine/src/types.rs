use serde_json::Value;
use studio_core::{ChannelEvent, DeckError, JobId};

use crate::{ApplyOutcome, EnvConfig, TemplateCatalog};

/// Results reported back from the engine thread.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    EnvConfigLoaded(Result<EnvConfig, DeckError>),
    TemplatesLoaded(Result<TemplateCatalog, DeckError>),
    JobSubmitted {
        request: u64,
        result: Result<JobId, DeckError>,
    },
    Progress(ChannelEvent),
    StoryLoaded {
        job_id: JobId,
        result: Result<Value, DeckError>,
    },
    StorySaved {
        job_id: JobId,
        result: Result<Value, DeckError>,
    },
    PageRegenerated {
        job_id: JobId,
        page: u32,
        result: Result<Value, DeckError>,
    },
    StoryApplied {
        job_id: JobId,
        result: Result<ApplyOutcome, DeckError>,
    },
}

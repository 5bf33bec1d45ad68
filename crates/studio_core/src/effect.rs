use crate::{EditableStory, JobId, SubmitOptions};

/// Side effects requested by [`crate::update`]; executed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubmitJob {
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
        story: EditableStory,
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

use crate::{ChannelEvent, DeckError, Direction, JobId, Placement, SubmitOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The service reported whether it holds a default credential.
    EnvConfigLoaded { has_server_key: bool },
    /// User asked to convert `content`.
    SubmitRequested {
        content: String,
        options: SubmitOptions,
    },
    /// Response to the submission identified by `request`.
    JobSubmitted {
        request: u64,
        result: Result<JobId, DeckError>,
    },
    /// Normalized event from either delivery path.
    Channel(ChannelEvent),
    /// User reset the UI; drops the current job.
    ResetRequested,
    /// User asked to fetch the story again.
    ReloadStoryRequested,
    StoryLoaded {
        job_id: JobId,
        result: Result<serde_json::Value, DeckError>,
    },
    ToggleLock {
        page: u32,
        block_id: String,
    },
    TogglePageLock {
        page: u32,
    },
    EditText {
        page: u32,
        block_id: String,
        text: String,
    },
    MoveBlock {
        page: u32,
        block_id: String,
        direction: Direction,
    },
    DropBlock {
        page: u32,
        source_id: String,
        target_id: String,
        placement: Placement,
    },
    SaveRequested,
    RegenerateRequested {
        page: u32,
        instruction: Option<String>,
    },
    ApplyRequested,
    StorySaved {
        job_id: JobId,
        result: Result<serde_json::Value, DeckError>,
    },
    PageRegenerated {
        job_id: JobId,
        page: u32,
        result: Result<serde_json::Value, DeckError>,
    },
    StoryApplied {
        job_id: JobId,
        result: Result<u32, DeckError>,
    },
    /// Render tick.
    Tick,
    NoOp,
}

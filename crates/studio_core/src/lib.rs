//! Content studio core: pure state machine, job and story model, view-model helpers.
mod effect;
mod error;
mod event;
mod gallery;
mod job;
mod msg;
mod reorder;
mod session;
mod state;
mod story;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{DeckError, StoryError, GENERIC_FAILURE};
pub use event::{
    parse_push_frame, ChannelEvent, EventSource, ProgressEvent, RemoteStatus, StatusSnapshot,
    MAX_PAGES,
};
pub use gallery::GalleryAccumulator;
pub use job::{
    Job, JobId, JobStatus, SubmitOptions, DEFAULT_TONE_TEMPLATE, DEFAULT_VISUAL_TEMPLATE,
};
pub use msg::Msg;
pub use reorder::{position, reorder, transpose, Direction, Keyed, Placement, ReorderError};
pub use session::Session;
pub use state::{AppState, Notice, NoticeLevel};
pub use story::{check_locked_preserved, Block, EditableStory, Page, TextRole, STORY_VERSION};
pub use update::update;
pub use view_model::{AppViewModel, BlockView, PageView, StoryView};

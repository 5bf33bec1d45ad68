//! Studio engine: service client, progress channel and effect execution.
mod api;
mod channel;
mod engine;
mod persist;
mod settings;
mod types;

pub use api::{
    ApplyOutcome, EnvConfig, ReqwestStudioApi, StudioApi, TemplateCatalog, TemplateDefaults,
    TemplateSummary,
};
pub use channel::{ChannelProgressSink, ProgressChannel, ProgressSink};
pub use engine::EngineHandle;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use settings::ServiceSettings;
pub use types::EngineEvent;

use thiserror::Error;

/// Message used when the service fails without a `detail`.
pub const GENERIC_FAILURE: &str = "request failed";

/// Failures that cross the boundary between the core and the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    /// Required input is missing; raised before any network effect.
    #[error("validation error: {0}")]
    Validation(String),
    /// Network or channel failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx response from the generation service.
    #[error("{detail}")]
    Service { status: u16, detail: String },
    /// Story payload did not match the expected shape.
    #[error("malformed story: {0}")]
    Schema(String),
    /// The requested job, story or page does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl DeckError {
    pub fn service(status: u16, detail: Option<String>) -> Self {
        let detail = detail
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        DeckError::Service { status, detail }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DeckError::Validation(message.into())
    }

    pub fn schema(message: impl Into<String>) -> Self {
        DeckError::Schema(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DeckError::NotFound(message.into())
    }
}

/// Rejections of local story mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("page {0} does not exist")]
    PageNotFound(u32),
    #[error("block {block_id} not found on page {page}")]
    BlockNotFound { page: u32, block_id: String },
    #[error("block {0} is locked")]
    BlockLocked(String),
    #[error("block {0} is not a text block")]
    NotText(String),
    #[error("cannot drop block {0} onto itself")]
    SameBlock(String),
}

impl From<StoryError> for DeckError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::PageNotFound(_) | StoryError::BlockNotFound { .. } => {
                DeckError::NotFound(err.to_string())
            }
            _ => DeckError::Validation(err.to_string()),
        }
    }
}

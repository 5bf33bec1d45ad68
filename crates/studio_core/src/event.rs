//! Progress events as delivered by the push connection and the status poller.
//!
//! Both delivery paths are normalized into [`ProgressEvent`] values so the
//! state machine never needs to know which path an event came from.

use serde::{Deserialize, Serialize};

use crate::{DeckError, JobId};

/// Largest page count or page number accepted from the service.
pub const MAX_PAGES: u32 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Step {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<String>,
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        detail: Option<String>,
    },
    PageDone {
        page: u32,
        #[serde(default, alias = "totalPages")]
        total_pages: Option<u32>,
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        detail: Option<String>,
    },
    Complete {
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        detail: Option<String>,
        #[serde(default, alias = "totalPages")]
        total_pages: Option<u32>,
    },
    Error {
        #[serde(default)]
        detail: Option<String>,
    },
    Ping,
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Complete { .. } | ProgressEvent::Error { .. })
    }

    pub fn is_keepalive(&self) -> bool {
        matches!(self, ProgressEvent::Ping)
    }

    /// Reject page numbers and counts no real deck has.
    pub fn check_bounds(&self) -> Result<(), DeckError> {
        let (page, total) = match self {
            ProgressEvent::PageDone {
                page, total_pages, ..
            } => (Some(*page), *total_pages),
            ProgressEvent::Complete { total_pages, .. } => (None, *total_pages),
            _ => (None, None),
        };
        if let Some(page) = page.filter(|p| *p > MAX_PAGES) {
            return Err(DeckError::schema(format!("page {page} is out of range")));
        }
        if let Some(total) = total.filter(|t| *t > MAX_PAGES) {
            return Err(DeckError::schema(format!("{total} pages is out of range")));
        }
        Ok(())
    }

    /// The generator announces `complete` before the service has recorded the
    /// page count; only the service's own completion carries `total_pages`.
    /// The early announcement is downgraded to a final step.
    fn normalized(self) -> Self {
        match self {
            ProgressEvent::Complete {
                progress,
                detail,
                total_pages: None,
            } => ProgressEvent::Step {
                step: Some("complete".to_string()),
                progress: progress.or(Some(1.0)),
                detail,
            },
            other => other,
        }
    }
}

/// Which delivery path produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Push,
    Poll,
}

/// A normalized event keyed by the job it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub job_id: JobId,
    pub source: EventSource,
    pub event: ProgressEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Job status as returned by the status endpoint (and the first push frame).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub status: RemoteStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub completed_pages: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusSnapshot {
    /// Translate a status snapshot into the events the push path would have sent.
    ///
    /// `completed_pages` is the highest page finished so far, so every page up to
    /// it is reported; the gallery ignores the ones it already holds. It never
    /// runs past `total_pages` once that is known.
    pub fn into_events(self) -> Result<Vec<ProgressEvent>, DeckError> {
        if self.total_pages > MAX_PAGES || self.completed_pages > MAX_PAGES {
            return Err(DeckError::schema(format!(
                "status reports {} of {} pages",
                self.completed_pages, self.total_pages
            )));
        }
        let detail = Some(self.detail).filter(|d| !d.is_empty());
        let events = match self.status {
            RemoteStatus::Pending | RemoteStatus::Running => {
                let total = Some(self.total_pages).filter(|t| *t > 0);
                let completed = total.map_or(self.completed_pages, |t| self.completed_pages.min(t));
                let mut events = Vec::with_capacity(1 + completed as usize);
                events.push(ProgressEvent::Step {
                    step: None,
                    progress: Some(self.progress),
                    detail,
                });
                events.extend((1..=completed).map(|page| ProgressEvent::PageDone {
                    page,
                    total_pages: total,
                    progress: None,
                    detail: None,
                }));
                events
            }
            RemoteStatus::Completed => vec![ProgressEvent::Complete {
                progress: Some(1.0),
                detail,
                total_pages: Some(self.total_pages),
            }],
            RemoteStatus::Failed => vec![ProgressEvent::Error {
                detail: self.error.filter(|e| !e.is_empty()).or(detail),
            }],
            RemoteStatus::Unknown => Vec::new(),
        };
        Ok(events)
    }
}

/// Parse one text frame from the push connection.
///
/// Frames carrying a `type` are progress events; the greeting frame has no
/// `type` and mirrors the status endpoint. Unknown types and out-of-range
/// page counts are a [`DeckError::Schema`] the caller logs and skips.
pub fn parse_push_frame(text: &str) -> Result<Vec<ProgressEvent>, DeckError> {
    let malformed = |err: serde_json::Error| DeckError::schema(format!("push frame: {err}"));
    let value: serde_json::Value = serde_json::from_str(text).map_err(malformed)?;
    if value.get("type").is_some() {
        let event: ProgressEvent = serde_json::from_value(value).map_err(malformed)?;
        event.check_bounds()?;
        Ok(vec![event.normalized()])
    } else {
        let snapshot: StatusSnapshot = serde_json::from_value(value).map_err(malformed)?;
        snapshot.into_events()
    }
}

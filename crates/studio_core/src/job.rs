use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque job token issued by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Submitted,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Submitted | JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Idle => "idle",
            JobStatus::Submitted => "submitted",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Life-cycle state of the current conversion job.
///
/// Status only moves forward (`Submitted -> Running -> Completed | Failed`);
/// a new submission replaces the whole value. While running, `progress`
/// never decreases and always stays within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Job {
    id: Option<JobId>,
    status: JobStatus,
    progress: f64,
    detail: String,
    total_pages: u32,
}

impl Job {
    pub fn submitted() -> Self {
        Self {
            status: JobStatus::Submitted,
            ..Self::default()
        }
    }

    pub fn id(&self) -> Option<&JobId> {
        self.id.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_bound_to(&self, job_id: &JobId) -> bool {
        self.id.as_ref() == Some(job_id)
    }

    /// Attach the service-issued id. Only a freshly submitted job accepts one.
    pub(crate) fn bind(&mut self, job_id: JobId) -> bool {
        if self.status != JobStatus::Submitted || self.id.is_some() {
            return false;
        }
        self.id = Some(job_id);
        true
    }

    /// Record a non-terminal progress sample. Returns whether anything changed.
    pub(crate) fn observe(&mut self, progress: Option<f64>, detail: Option<&str>) -> bool {
        if !self.status.is_active() {
            return false;
        }
        let mut changed = false;
        if self.status == JobStatus::Submitted {
            self.status = JobStatus::Running;
            changed = true;
        }
        if let Some(sample) = progress.filter(|p| !p.is_nan()) {
            let sample = sample.clamp(0.0, 1.0);
            if sample > self.progress {
                self.progress = sample;
                changed = true;
            }
        }
        changed |= self.set_detail(detail);
        changed
    }

    pub(crate) fn set_total_pages(&mut self, total: u32) {
        self.total_pages = total;
    }

    pub(crate) fn complete(&mut self, total_pages: u32, detail: Option<&str>) -> bool {
        if !self.status.is_active() {
            return false;
        }
        self.status = JobStatus::Completed;
        self.progress = 1.0;
        self.total_pages = total_pages;
        self.set_detail(detail);
        true
    }

    pub(crate) fn fail(&mut self, detail: &str) -> bool {
        if !self.status.is_active() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.detail = detail.to_string();
        true
    }

    fn set_detail(&mut self, detail: Option<&str>) -> bool {
        match detail {
            Some(text) if !text.is_empty() && text != self.detail => {
                self.detail = text.to_string();
                true
            }
            _ => false,
        }
    }
}

pub const DEFAULT_VISUAL_TEMPLATE: &str = "minimal_white";
pub const DEFAULT_TONE_TEMPLATE: &str = "casual";

/// Conversion options sent alongside the markdown on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub visual_template: String,
    pub tone_template: String,
    pub use_visual_feedback: bool,
    pub max_iterations: u8,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            visual_template: DEFAULT_VISUAL_TEMPLATE.to_string(),
            tone_template: DEFAULT_TONE_TEMPLATE.to_string(),
            use_visual_feedback: false,
            max_iterations: 2,
        }
    }
}

impl SubmitOptions {
    /// Blank strings count as absent; iterations are kept within 1..=5.
    pub fn normalized(mut self) -> Self {
        self.api_key = non_blank(self.api_key);
        self.base_url = non_blank(self.base_url);
        self.model = non_blank(self.model);
        self.max_iterations = self.max_iterations.clamp(1, 5);
        self
    }

    pub fn has_explicit_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

use std::time::Duration;

use studio_core::{DeckError, JobId};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    /// When false the progress channel relies on polling alone.
    pub push_enabled: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            push_enabled: true,
        }
    }
}

impl ServiceSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Absolute URL for an `/api/...` path, keeping any prefix on `base_url`.
    pub fn endpoint(&self, path: &str) -> Result<Url, DeckError> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = Url::parse(&raw)
            .map_err(|err| DeckError::validation(format!("invalid service url {raw}: {err}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(DeckError::validation(format!(
                "unsupported service scheme {other}"
            ))),
        }
    }

    /// Rendered PNG for one page of a job.
    pub fn page_image_url(&self, job_id: &JobId, page: u32) -> Result<Url, DeckError> {
        self.endpoint(&format!("api/jobs/{job_id}/page/{page}/image"))
    }

    /// Push endpoint for `job_id`, on `ws`/`wss` to match the HTTP scheme.
    pub fn ws_url(&self, job_id: &JobId) -> Result<Url, DeckError> {
        let mut url = self.endpoint(&format!("api/ws/{job_id}"))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| DeckError::validation(format!("cannot derive push url from {url}")))?;
        Ok(url)
    }
}

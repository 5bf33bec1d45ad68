//! HTTP client for the generation service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use studio_core::{DeckError, JobId, StatusSnapshot, SubmitOptions};
use url::Url;

use crate::ServiceSettings;

/// Whether the service holds its own default credential.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EnvConfig {
    #[serde(default)]
    pub has_env_key: bool,
    #[serde(default)]
    pub base_url_hint: String,
    #[serde(default)]
    pub model_hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TemplateDefaults {
    #[serde(default)]
    pub visual: String,
    #[serde(default)]
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    pub visual: Vec<TemplateSummary>,
    #[serde(default)]
    pub tone: Vec<TemplateSummary>,
    #[serde(default)]
    pub defaults: TemplateDefaults,
}

/// Result of re-rendering a job from its story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplyOutcome {
    pub total_pages: u32,
    #[serde(default)]
    pub detail: String,
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    markdown: &'a str,
    #[serde(flatten)]
    options: &'a SubmitOptions,
}

#[derive(Deserialize)]
struct JobCreated {
    job_id: JobId,
}

#[derive(Deserialize)]
struct StoryEnvelope {
    story: Value,
}

/// Every call the studio makes against the service.
#[async_trait]
pub trait StudioApi: Send + Sync {
    async fn submit_job(&self, content: &str, options: &SubmitOptions) -> Result<JobId, DeckError>;

    async fn job_status(&self, job_id: &JobId) -> Result<StatusSnapshot, DeckError>;

    /// Raw story JSON; shape validation happens in the core.
    async fn load_story(&self, job_id: &JobId) -> Result<Value, DeckError>;

    async fn save_story(&self, job_id: &JobId, story: &Value) -> Result<Value, DeckError>;

    async fn regenerate_page(
        &self,
        job_id: &JobId,
        page: u32,
        instruction: Option<&str>,
    ) -> Result<Value, DeckError>;

    async fn apply_story(&self, job_id: &JobId) -> Result<ApplyOutcome, DeckError>;

    async fn env_config(&self) -> Result<EnvConfig, DeckError>;

    async fn templates(&self) -> Result<TemplateCatalog, DeckError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStudioApi {
    client: reqwest::Client,
    settings: ServiceSettings,
}

impl ReqwestStudioApi {
    pub fn new(settings: ServiceSettings) -> Result<Self, DeckError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| DeckError::Transport(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> Result<Url, DeckError> {
        self.settings.endpoint(path)
    }

    fn story_url(&self, job_id: &JobId, suffix: &str) -> Result<Url, DeckError> {
        self.url(&format!("api/jobs/{job_id}/editable-story{suffix}"))
    }
}

#[async_trait]
impl StudioApi for ReqwestStudioApi {
    async fn submit_job(&self, content: &str, options: &SubmitOptions) -> Result<JobId, DeckError> {
        let body = ConvertRequest {
            markdown: content,
            options,
        };
        let response = self
            .client
            .post(self.url("api/convert")?)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let created: JobCreated = read_json(response, Lookup::Plain).await?;
        Ok(created.job_id)
    }

    async fn job_status(&self, job_id: &JobId) -> Result<StatusSnapshot, DeckError> {
        let response = self
            .client
            .get(self.url(&format!("api/jobs/{job_id}/status"))?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response, Lookup::Resource).await
    }

    async fn load_story(&self, job_id: &JobId) -> Result<Value, DeckError> {
        let response = self
            .client
            .get(self.story_url(job_id, "")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let envelope: StoryEnvelope = read_json(response, Lookup::Story).await?;
        Ok(envelope.story)
    }

    async fn save_story(&self, job_id: &JobId, story: &Value) -> Result<Value, DeckError> {
        let response = self
            .client
            .put(self.story_url(job_id, "")?)
            .json(&json!({ "story": story }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let envelope: StoryEnvelope = read_json(response, Lookup::Plain).await?;
        Ok(envelope.story)
    }

    async fn regenerate_page(
        &self,
        job_id: &JobId,
        page: u32,
        instruction: Option<&str>,
    ) -> Result<Value, DeckError> {
        let response = self
            .client
            .post(self.story_url(job_id, "/regenerate")?)
            .json(&json!({ "page_number": page, "instruction": instruction }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let envelope: StoryEnvelope = read_json(response, Lookup::Resource).await?;
        Ok(envelope.story)
    }

    async fn apply_story(&self, job_id: &JobId) -> Result<ApplyOutcome, DeckError> {
        let response = self
            .client
            .post(self.story_url(job_id, "/apply")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response, Lookup::Plain).await
    }

    async fn env_config(&self) -> Result<EnvConfig, DeckError> {
        let response = self
            .client
            .get(self.url("api/env-config")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response, Lookup::Plain).await
    }

    async fn templates(&self) -> Result<TemplateCatalog, DeckError> {
        let response = self
            .client
            .get(self.url("api/templates")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response, Lookup::Plain).await
    }
}

/// Which error statuses mean "not there".
#[derive(Clone, Copy)]
enum Lookup {
    Plain,
    /// 404: the job or page named in the path does not exist.
    Resource,
    /// 404 or 400: the job has no story yet.
    Story,
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    lookup: Lookup,
) -> Result<T, DeckError> {
    let status = response.status();
    if !status.is_success() {
        return Err(failure(response, lookup).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|err| DeckError::schema(format!("unexpected response body: {err}")))
}

async fn failure(response: reqwest::Response, lookup: Lookup) -> DeckError {
    let status = response.status();
    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail").map(detail_text));
    let missing = match lookup {
        Lookup::Plain => false,
        Lookup::Resource => status == StatusCode::NOT_FOUND,
        Lookup::Story => status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST,
    };
    if missing {
        DeckError::not_found(detail.unwrap_or_else(|| status.to_string()))
    } else {
        DeckError::service(status.as_u16(), detail)
    }
}

/// `detail` is usually a string; validation failures send a structured list.
fn detail_text(detail: &Value) -> String {
    match detail {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DeckError {
    if err.is_timeout() {
        return DeckError::Transport(format!("request timed out: {err}"));
    }
    DeckError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_request_flattens_options() {
        let options = SubmitOptions {
            model: Some("gpt-4o".to_string()),
            ..SubmitOptions::default()
        };
        let body = serde_json::to_value(ConvertRequest {
            markdown: "# Hi",
            options: &options,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "markdown": "# Hi",
                "model": "gpt-4o",
                "visual_template": "minimal_white",
                "tone_template": "casual",
                "use_visual_feedback": false,
                "max_iterations": 2
            })
        );
    }

    #[test]
    fn structured_detail_is_kept_readable() {
        assert_eq!(detail_text(&json!("nope")), "nope");
        assert_eq!(detail_text(&json!([{"msg": "x"}])), r#"[{"msg":"x"}]"#);
    }
}

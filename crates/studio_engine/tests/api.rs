use pretty_assertions::assert_eq;
use serde_json::json;
use studio_core::{DeckError, JobId, RemoteStatus, SubmitOptions};
use studio_engine::{ReqwestStudioApi, ServiceSettings, StudioApi};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestStudioApi {
    ReqwestStudioApi::new(ServiceSettings::with_base_url(server.uri())).expect("client")
}

fn story() -> serde_json::Value {
    json!({
        "version": 1,
        "type": "editable_story",
        "pages": [{"page_number": 1, "blocks": [{"id": "b1", "type": "text", "text": "Hi"}]}]
    })
}

#[tokio::test]
async fn submit_posts_markdown_with_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert"))
        .and(body_json(json!({
            "markdown": "# Deck",
            "api_key": "sk-test",
            "visual_template": "minimal_white",
            "tone_template": "casual",
            "use_visual_feedback": true,
            "max_iterations": 3
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_id": "a1b2", "status": "pending"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = SubmitOptions {
        api_key: Some("sk-test".to_string()),
        use_visual_feedback: true,
        max_iterations: 3,
        ..SubmitOptions::default()
    };
    let job_id = api_for(&server)
        .submit_job("# Deck", &options)
        .await
        .expect("submit ok");
    assert_eq!(job_id, JobId::from("a1b2"));
}

#[tokio::test]
async fn service_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "unknown visual template: neon"})),
        )
        .mount(&server)
        .await;

    let err = api_for(&server)
        .submit_job("# Deck", &SubmitOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DeckError::Service {
            status: 400,
            detail: "unknown visual template: neon".to_string()
        }
    );
}

#[tokio::test]
async fn missing_detail_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/env-config"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = api_for(&server).env_config().await.unwrap_err();
    assert_eq!(err.to_string(), "request failed");
}

#[tokio::test]
async fn status_snapshot_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/a1b2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "a1b2",
            "status": "running",
            "progress": 0.42,
            "detail": "rendering",
            "total_pages": 5,
            "completed_pages": 2,
            "error": null
        })))
        .mount(&server)
        .await;

    let snapshot = api_for(&server)
        .job_status(&JobId::from("a1b2"))
        .await
        .expect("status ok");
    assert_eq!(snapshot.status, RemoteStatus::Running);
    assert_eq!(snapshot.completed_pages, 2);
    assert_eq!(snapshot.into_events().expect("plausible counts").len(), 3);
}

#[tokio::test]
async fn story_round_trip_uses_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/a1b2/editable-story"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_id": "a1b2", "story": story()})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/jobs/a1b2/editable-story"))
        .and(body_json(json!({"story": story()})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_id": "a1b2", "story": story()})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let job = JobId::from("a1b2");
    let loaded = api.load_story(&job).await.expect("load ok");
    assert_eq!(loaded, story());
    let saved = api.save_story(&job, &loaded).await.expect("save ok");
    assert_eq!(saved, story());
}

#[tokio::test]
async fn unfinished_job_story_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/a1b2/editable-story"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "job not finished"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/gone/editable-story"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(
        api.load_story(&JobId::from("a1b2")).await,
        Err(DeckError::not_found("job not finished"))
    );
    assert!(matches!(
        api.load_story(&JobId::from("gone")).await,
        Err(DeckError::NotFound(_))
    ));
}

#[tokio::test]
async fn regenerate_sends_page_and_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/a1b2/editable-story/regenerate"))
        .and(body_json(json!({"page_number": 2, "instruction": "shorter"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_id": "a1b2", "story": story()})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/a1b2/editable-story/regenerate"))
        .and(body_json(json!({"page_number": 9, "instruction": null})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "page 9 missing"})))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let job = JobId::from("a1b2");
    assert_eq!(
        api.regenerate_page(&job, 2, Some("shorter")).await,
        Ok(story())
    );
    assert_eq!(
        api.regenerate_page(&job, 9, None).await,
        Err(DeckError::not_found("page 9 missing"))
    );
}

#[tokio::test]
async fn regenerate_refusal_keeps_the_service_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/a1b2/editable-story/regenerate"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "job has no LLM config"})),
        )
        .mount(&server)
        .await;

    let err = api_for(&server)
        .regenerate_page(&JobId::from("a1b2"), 1, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DeckError::Service {
            status: 400,
            detail: "job has no LLM config".to_string()
        }
    );
    assert_eq!(err.to_string(), "job has no LLM config");
}

#[tokio::test]
async fn apply_returns_page_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/a1b2/editable-story/apply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "a1b2",
            "total_pages": 4,
            "detail": "applied"
        })))
        .mount(&server)
        .await;

    let outcome = api_for(&server)
        .apply_story(&JobId::from("a1b2"))
        .await
        .expect("apply ok");
    assert_eq!(outcome.total_pages, 4);
    assert_eq!(outcome.detail, "applied");
}

#[tokio::test]
async fn templates_and_env_config_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "visual": [{"id": "minimal_white", "name": "Minimal", "description": "clean", "card_bg": "#fff"}],
            "tone": [{"id": "casual", "name": "Casual", "emoji_examples": ["ok"]}],
            "defaults": {"visual": "minimal_white", "tone": "casual"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/env-config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "has_env_key": true,
            "base_url_hint": "https://api.example.com",
            "model_hint": "gpt-4o"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let catalog = api.templates().await.expect("templates ok");
    assert_eq!(catalog.visual[0].id, "minimal_white");
    assert_eq!(catalog.tone[0].description, "");
    assert_eq!(catalog.defaults.tone, "casual");
    let env = api.env_config().await.expect("env ok");
    assert!(env.has_env_key);
    assert_eq!(env.model_hint, "gpt-4o");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let api = ReqwestStudioApi::new(ServiceSettings::with_base_url("http://127.0.0.1:9")).unwrap();
    assert!(matches!(
        api.env_config().await,
        Err(DeckError::Transport(_))
    ));
}

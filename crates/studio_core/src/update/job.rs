//! Job life cycle: submission, progress, terminal detection, reset.

use studio_logging::{studio_debug, studio_info, studio_warn};

use crate::state::{NoticeLevel, StoryOp};
use crate::{
    AppState, ChannelEvent, DeckError, Effect, Job, JobId, ProgressEvent, SubmitOptions,
};

const FAILURE_FALLBACK: &str = "conversion failed";

pub(super) fn submit(state: &mut AppState, content: String, options: SubmitOptions) -> Vec<Effect> {
    let options = options.normalized();
    if content.trim().is_empty() {
        reject(state, DeckError::validation("content is empty"));
        return Vec::new();
    }
    if !options.has_explicit_key() && state.server_has_default_key != Some(true) {
        reject(
            state,
            DeckError::validation("no API key given and the service has no default key"),
        );
        return Vec::new();
    }

    // The old channel goes down before any new state exists.
    let mut effects = teardown(state);
    state.submission_seq += 1;
    state.session.reset(Job::submitted());
    state.pending = None;
    state.mark_dirty();
    studio_info!(
        "Submitting conversion request={} content_len={}",
        state.submission_seq,
        content.len()
    );
    effects.push(Effect::SubmitJob {
        request: state.submission_seq,
        content,
        options,
    });
    effects
}

pub(super) fn submitted(
    state: &mut AppState,
    request: u64,
    result: Result<JobId, DeckError>,
) -> Vec<Effect> {
    if request != state.submission_seq {
        studio_debug!(
            "Ignoring response to superseded submission request={} current={}",
            request,
            state.submission_seq
        );
        return Vec::new();
    }
    match result {
        Ok(job_id) => {
            if !state.session.job.bind(job_id.clone()) {
                studio_warn!("Job {} arrived for a session that cannot accept it", job_id);
                return Vec::new();
            }
            studio_info!("Job {} accepted; opening progress channel", job_id);
            state.mark_dirty();
            vec![Effect::OpenChannel { job_id }]
        }
        Err(err) => {
            state.session.job.fail(&err.to_string());
            reject(state, err);
            Vec::new()
        }
    }
}

pub(super) fn channel_event(state: &mut AppState, event: ChannelEvent) -> Vec<Effect> {
    let ChannelEvent {
        job_id,
        source,
        event,
    } = event;
    if !state.session.job.is_bound_to(&job_id) {
        studio_debug!("Discarding {:?} event for stale job {}", source, job_id);
        return Vec::new();
    }
    if let Err(err) = event.check_bounds() {
        studio_warn!("Discarding {:?} event for job {}: {}", source, job_id, err);
        return Vec::new();
    }

    let session = &mut state.session;
    match event {
        ProgressEvent::Ping => Vec::new(),
        ProgressEvent::Step {
            progress, detail, ..
        } => {
            if session.job.observe(progress, detail.as_deref()) {
                state.mark_dirty();
            }
            Vec::new()
        }
        ProgressEvent::PageDone {
            page,
            total_pages,
            progress,
            detail,
        } => {
            let mut changed = session.job.observe(progress, detail.as_deref());
            if !session.job.status().is_active() {
                return Vec::new();
            }
            if let Some(total) = total_pages.filter(|t| *t > 0) {
                session.job.set_total_pages(total);
            }
            changed |= session.gallery.add_page(page, session.job.total_pages());
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        ProgressEvent::Complete {
            detail,
            total_pages,
            ..
        } => {
            let total = total_pages
                .unwrap_or_else(|| session.job.total_pages().max(session.gallery.total()));
            if !session.job.complete(total, detail.as_deref()) {
                studio_debug!("Ignoring repeated completion for job {}", job_id);
                return Vec::new();
            }
            for page in 1..=total {
                session.gallery.add_page(page, total);
            }
            studio_info!("Job {} completed with {} pages", job_id, total);
            state.pending = Some(StoryOp::Loading);
            state.notify(NoticeLevel::Info, format!("conversion finished: {total} pages"));
            vec![
                Effect::CloseChannel {
                    job_id: job_id.clone(),
                },
                Effect::LoadStory { job_id },
            ]
        }
        ProgressEvent::Error { detail } => {
            let detail = detail
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| FAILURE_FALLBACK.to_string());
            if !session.job.fail(&detail) {
                studio_debug!("Ignoring repeated failure for job {}", job_id);
                return Vec::new();
            }
            studio_warn!("Job {} failed: {}", job_id, detail);
            state.notify(NoticeLevel::Error, detail);
            vec![Effect::CloseChannel { job_id }]
        }
    }
}

pub(super) fn reset(state: &mut AppState) -> Vec<Effect> {
    let effects = teardown(state);
    // Invalidates any submission still waiting for its job id.
    state.submission_seq += 1;
    state.session.reset(Job::default());
    state.pending = None;
    state.mark_dirty();
    effects
}

fn teardown(state: &AppState) -> Vec<Effect> {
    match state.session.job.id() {
        Some(job_id) => vec![Effect::CloseChannel {
            job_id: job_id.clone(),
        }],
        None => Vec::new(),
    }
}

pub(super) fn reject(state: &mut AppState, err: DeckError) {
    let level = match err {
        DeckError::Validation(_) | DeckError::Schema(_) => NoticeLevel::Warning,
        _ => NoticeLevel::Error,
    };
    state.notify(level, err.to_string());
}

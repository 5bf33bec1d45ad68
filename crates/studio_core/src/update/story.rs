//! Editable story: loading, local edits and the save-first server operations.

use serde_json::Value;
use studio_logging::{studio_debug, studio_info, studio_warn};

use super::job::reject;
use crate::state::{FollowUp, NoticeLevel, StoryOp};
use crate::story::check_locked_preserved;
use crate::{
    AppState, DeckError, EditableStory, Effect, JobId, JobStatus, StoryError, MAX_PAGES,
};

pub(super) fn reload(state: &mut AppState) -> Vec<Effect> {
    let Some(job_id) = begin(state) else {
        return Vec::new();
    };
    state.pending = Some(StoryOp::Loading);
    state.mark_dirty();
    vec![Effect::LoadStory { job_id }]
}

pub(super) fn loaded(
    state: &mut AppState,
    job_id: JobId,
    result: Result<Value, DeckError>,
) -> Vec<Effect> {
    if !finish(state, &job_id, |op| matches!(op, StoryOp::Loading)) {
        return Vec::new();
    }
    match result.and_then(EditableStory::from_value) {
        Ok(story) => {
            studio_info!("Loaded story for job {} ({} pages)", job_id, story.page_count());
            adopt(state, story);
        }
        Err(err) => {
            studio_warn!("Story for job {} not shown: {}", job_id, err);
            reject(state, err);
        }
    }
    Vec::new()
}

/// Apply a local mutation to the loaded story.
pub(super) fn edit<F>(state: &mut AppState, mutate: F)
where
    F: FnOnce(&mut EditableStory) -> Result<(), StoryError>,
{
    let Some(story) = state.session.story.as_mut() else {
        reject(state, DeckError::validation("no story loaded"));
        return;
    };
    match mutate(story) {
        Ok(()) => state.mark_dirty(),
        Err(err) => reject(state, err.into()),
    }
}

pub(super) fn save(state: &mut AppState) -> Vec<Effect> {
    save_then(state, FollowUp::Nothing)
}

pub(super) fn regenerate(
    state: &mut AppState,
    page: u32,
    instruction: Option<String>,
) -> Vec<Effect> {
    let Some(story) = state.session.story.as_ref() else {
        reject(state, DeckError::validation("no story loaded"));
        return Vec::new();
    };
    let locked = match story.page(page) {
        None => {
            reject(state, StoryError::PageNotFound(page).into());
            return Vec::new();
        }
        Some(p) if p.locked => {
            reject(
                state,
                DeckError::validation(format!("page {page} is locked")),
            );
            return Vec::new();
        }
        Some(p) => p.locked_blocks(),
    };
    let instruction = instruction
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    save_then(
        state,
        FollowUp::Regenerate {
            page,
            instruction,
            locked,
        },
    )
}

pub(super) fn apply(state: &mut AppState) -> Vec<Effect> {
    save_then(state, FollowUp::Apply)
}

/// Every server-side operation persists local edits first.
fn save_then(state: &mut AppState, then: FollowUp) -> Vec<Effect> {
    let Some(story) = state.session.story.clone() else {
        reject(state, DeckError::validation("no story loaded"));
        return Vec::new();
    };
    let Some(job_id) = begin(state) else {
        return Vec::new();
    };
    state.pending = Some(StoryOp::Saving { then });
    state.mark_dirty();
    vec![Effect::SaveStory { job_id, story }]
}

pub(super) fn saved(
    state: &mut AppState,
    job_id: JobId,
    result: Result<Value, DeckError>,
) -> Vec<Effect> {
    let Some(StoryOp::Saving { then }) = state.pending.clone() else {
        studio_debug!("Unexpected save response for job {}", job_id);
        return Vec::new();
    };
    if !finish(state, &job_id, |_| true) {
        return Vec::new();
    }
    let story = match result.and_then(EditableStory::from_value) {
        Ok(story) => story,
        Err(err) => {
            studio_warn!("Saving story for job {} failed: {}", job_id, err);
            reject(state, err);
            return Vec::new();
        }
    };
    adopt(state, story);

    match then {
        FollowUp::Nothing => {
            state.notify(NoticeLevel::Info, "story saved");
            Vec::new()
        }
        FollowUp::Regenerate {
            page,
            instruction,
            locked,
        } => {
            studio_info!("Regenerating page {} of job {}", page, job_id);
            state.pending = Some(StoryOp::Regenerating { page, locked });
            vec![Effect::RegeneratePage {
                job_id,
                page,
                instruction,
            }]
        }
        FollowUp::Apply => {
            studio_info!("Applying story to job {}", job_id);
            state.pending = Some(StoryOp::Applying);
            vec![Effect::ApplyStory { job_id }]
        }
    }
}

pub(super) fn regenerated(
    state: &mut AppState,
    job_id: JobId,
    page: u32,
    result: Result<Value, DeckError>,
) -> Vec<Effect> {
    let Some(StoryOp::Regenerating { locked, .. }) = state.pending.clone() else {
        studio_debug!("Unexpected regenerate response for job {}", job_id);
        return Vec::new();
    };
    if !finish(state, &job_id, |_| true) {
        return Vec::new();
    }
    let outcome = result.and_then(EditableStory::from_value).and_then(|story| {
        check_locked_preserved(&locked, story.page(page))?;
        Ok(story)
    });
    match outcome {
        Ok(story) => {
            adopt(state, story);
            state.notify(NoticeLevel::Info, format!("page {page} regenerated"));
        }
        Err(err) => {
            studio_warn!("Regenerating page {} of job {} rejected: {}", page, job_id, err);
            reject(state, err);
        }
    }
    Vec::new()
}

pub(super) fn applied(
    state: &mut AppState,
    job_id: JobId,
    result: Result<u32, DeckError>,
) -> Vec<Effect> {
    if !finish(state, &job_id, |op| matches!(op, StoryOp::Applying)) {
        return Vec::new();
    }
    let result = result.and_then(|total| {
        if total > MAX_PAGES {
            Err(DeckError::schema(format!("apply reported {total} pages")))
        } else {
            Ok(total)
        }
    });
    match result {
        Ok(total) => {
            let session = &mut state.session;
            session.gallery.reset();
            for page in 1..=total {
                session.gallery.add_page(page, total);
            }
            session.job.set_total_pages(total);
            studio_info!("Story applied to job {}; {} pages rebuilt", job_id, total);
            state.notify(NoticeLevel::Info, format!("slides rebuilt: {total} pages"));
        }
        Err(err) => {
            studio_warn!("Applying story to job {} failed: {}", job_id, err);
            reject(state, err);
        }
    }
    Vec::new()
}

/// Claim the single operation slot. Returns the job the operation targets.
fn begin(state: &mut AppState) -> Option<JobId> {
    if let Some(op) = &state.pending {
        let message = format!("{} in progress; try again when it finishes", op.label());
        state.notify(NoticeLevel::Warning, message);
        return None;
    }
    match state.session.job.id() {
        Some(job_id) if state.session.job.status() == JobStatus::Completed => Some(job_id.clone()),
        _ => {
            reject(state, DeckError::validation("no completed job"));
            None
        }
    }
}

/// Release the operation slot if `job_id` still owns it.
fn finish(state: &mut AppState, job_id: &JobId, expected: impl Fn(&StoryOp) -> bool) -> bool {
    if !state.session.job.is_bound_to(job_id) {
        studio_debug!("Discarding story response for stale job {}", job_id);
        return false;
    }
    match state.pending.take() {
        Some(op) if expected(&op) => {
            state.mark_dirty();
            true
        }
        other => {
            studio_debug!("Story response for job {} does not match {:?}", job_id, other);
            state.pending = other;
            false
        }
    }
}

fn adopt(state: &mut AppState, story: EditableStory) {
    state.session.story = Some(story);
    state.mark_dirty();
}

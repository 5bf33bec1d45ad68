mod job;
mod story;

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::EnvConfigLoaded { has_server_key } => {
            state.server_has_default_key = Some(has_server_key);
            Vec::new()
        }
        Msg::SubmitRequested { content, options } => job::submit(&mut state, content, options),
        Msg::JobSubmitted { request, result } => job::submitted(&mut state, request, result),
        Msg::Channel(event) => job::channel_event(&mut state, event),
        Msg::ResetRequested => job::reset(&mut state),
        Msg::ReloadStoryRequested => story::reload(&mut state),
        Msg::StoryLoaded { job_id, result } => story::loaded(&mut state, job_id, result),
        Msg::ToggleLock { page, block_id } => {
            story::edit(&mut state, |s| s.toggle_lock(page, &block_id).map(drop));
            Vec::new()
        }
        Msg::TogglePageLock { page } => {
            story::edit(&mut state, |s| s.toggle_page_lock(page).map(drop));
            Vec::new()
        }
        Msg::EditText {
            page,
            block_id,
            text,
        } => {
            story::edit(&mut state, |s| s.edit_text(page, &block_id, text));
            Vec::new()
        }
        Msg::MoveBlock {
            page,
            block_id,
            direction,
        } => {
            story::edit(&mut state, |s| {
                s.move_block(page, &block_id, direction).map(drop)
            });
            Vec::new()
        }
        Msg::DropBlock {
            page,
            source_id,
            target_id,
            placement,
        } => {
            story::edit(&mut state, |s| {
                s.move_block_by_drop(page, &source_id, &target_id, placement)
            });
            Vec::new()
        }
        Msg::SaveRequested => story::save(&mut state),
        Msg::RegenerateRequested { page, instruction } => {
            story::regenerate(&mut state, page, instruction)
        }
        Msg::ApplyRequested => story::apply(&mut state),
        Msg::StorySaved { job_id, result } => story::saved(&mut state, job_id, result),
        Msg::PageRegenerated {
            job_id,
            page,
            result,
        } => story::regenerated(&mut state, job_id, page, result),
        Msg::StoryApplied { job_id, result } => story::applied(&mut state, job_id, result),
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

use crate::view_model::{AppViewModel, BlockView, PageView, StoryView};
use crate::{Block, Job, Session, TextRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-visible notification produced by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What runs once a save has been acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FollowUp {
    Nothing,
    Regenerate {
        page: u32,
        instruction: Option<String>,
        locked: Vec<Block>,
    },
    Apply,
}

/// The single story operation allowed in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoryOp {
    Loading,
    Saving { then: FollowUp },
    Regenerating { page: u32, locked: Vec<Block> },
    Applying,
}

impl StoryOp {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            StoryOp::Loading => "loading",
            StoryOp::Saving { .. } => "saving",
            StoryOp::Regenerating { .. } => "regenerating",
            StoryOp::Applying => "applying",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) session: Session,
    pub(crate) server_has_default_key: Option<bool>,
    pub(crate) submission_seq: u64,
    pub(crate) pending: Option<StoryOp>,
    notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn job(&self) -> &Job {
        &self.session.job
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand pending notifications to the caller.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
        self.dirty = true;
    }

    pub fn view(&self) -> AppViewModel {
        let job = &self.session.job;
        let gallery = &self.session.gallery;
        AppViewModel {
            job_id: job.id().map(|id| id.to_string()),
            status: job.status(),
            progress: job.progress(),
            detail: job.detail().to_string(),
            total_pages: job.total_pages(),
            gallery_pages: gallery.page_numbers(),
            gallery_label: gallery.count_label(),
            render_generation: gallery.generation(),
            busy: self.pending.as_ref().map(StoryOp::label),
            story: self.session.story.as_ref().map(|story| StoryView {
                pages: story
                    .pages
                    .iter()
                    .map(|page| PageView {
                        page_number: page.page_number,
                        locked: page.locked,
                        use_title: page.use_title,
                        blocks: page.blocks.iter().map(block_view).collect(),
                    })
                    .collect(),
            }),
            dirty: self.dirty,
        }
    }
}

fn block_view(block: &Block) -> BlockView {
    match block {
        Block::Text {
            id,
            text,
            locked,
            role,
        } => BlockView {
            id: id.clone(),
            kind: match role {
                TextRole::Body => "text",
                TextRole::Title => "title",
            },
            content: text.clone(),
            locked: *locked,
            editable: block.is_editable(),
        },
        Block::Image { id, url, locked } => BlockView {
            id: id.clone(),
            kind: "image",
            content: url.clone(),
            locked: *locked,
            editable: false,
        },
    }
}

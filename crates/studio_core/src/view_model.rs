use crate::JobStatus;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub job_id: Option<String>,
    pub status: JobStatus,
    /// Always within `[0, 1]`.
    pub progress: f64,
    pub detail: String,
    pub total_pages: u32,
    pub gallery_pages: Vec<u32>,
    pub gallery_label: String,
    pub render_generation: u64,
    pub busy: Option<&'static str>,
    pub story: Option<StoryView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryView {
    pub pages: Vec<PageView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page_number: u32,
    pub locked: bool,
    pub use_title: bool,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    pub id: String,
    pub kind: &'static str,
    /// Text for text blocks, url for images.
    pub content: String,
    pub locked: bool,
    /// Whether the editor surface accepts input.
    pub editable: bool,
}

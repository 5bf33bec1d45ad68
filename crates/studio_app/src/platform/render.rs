//! Text rendering of the view model.

use std::fmt::Write;

use studio_core::{AppViewModel, JobStatus, Notice, NoticeLevel, StoryView};
use studio_engine::TemplateCatalog;

const BAR_WIDTH: usize = 24;

pub fn status_line(view: &AppViewModel) -> String {
    let Some(job_id) = view.job_id.as_deref() else {
        return format!("[{}]", view.status);
    };
    let filled = (view.progress * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled.min(BAR_WIDTH)),
        "-".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
    );
    let mut line = format!(
        "[{}] {} {bar} {:>3.0}%  pages {}",
        view.status,
        job_id,
        view.progress * 100.0,
        view.gallery_label
    );
    if !view.detail.is_empty() && view.status != JobStatus::Completed {
        let _ = write!(line, "  {}", view.detail);
    }
    if let Some(op) = view.busy {
        let _ = write!(line, "  ({op}...)");
    }
    line
}

pub fn story(story: &StoryView) -> String {
    let mut out = String::new();
    for page in &story.pages {
        let _ = writeln!(
            out,
            "== page {}{}{}",
            page.page_number,
            if page.locked { " [page locked]" } else { "" },
            if page.use_title { " (title)" } else { "" }
        );
        for block in &page.blocks {
            let lock = if block.locked { "*" } else { " " };
            let content = block.content.replace('\n', "\n              ");
            let _ = writeln!(out, "  {lock} {:<6} {:<5} {}", block.id, block.kind, content);
        }
    }
    out
}

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("{tag}: {}", notice.message)
}

pub fn templates(catalog: &TemplateCatalog) -> String {
    let mut out = String::new();
    for (title, entries, default) in [
        ("visual", &catalog.visual, &catalog.defaults.visual),
        ("tone", &catalog.tone, &catalog.defaults.tone),
    ] {
        let _ = writeln!(out, "{title} templates:");
        for entry in entries {
            let marker = if entry.id == *default { "*" } else { " " };
            let _ = writeln!(
                out,
                " {marker} {:<16} {}  {}",
                entry.id, entry.name, entry.description
            );
        }
    }
    out
}

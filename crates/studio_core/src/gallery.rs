use std::collections::BTreeSet;

/// Idempotent set of materialized pages.
///
/// Duplicate notifications for a page are ignored no matter which path they
/// came from; iteration is always by ascending page number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GalleryAccumulator {
    pages: BTreeSet<u32>,
    total: u32,
    generation: u64,
}

impl GalleryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize `page_number` unless it is already present.
    ///
    /// Returns `true` when the page was new. A non-zero `total` updates the
    /// expected page count even for a duplicate.
    pub fn add_page(&mut self, page_number: u32, total: u32) -> bool {
        if total > 0 {
            self.total = total;
        }
        page_number > 0 && self.pages.insert(page_number)
    }

    /// Drop every materialized page and start a new render generation.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.total = 0;
        self.generation += 1;
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Bumped by every [`reset`](Self::reset); pages rendered under an older
    /// generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().copied().collect()
    }

    /// The "accumulated / total" counter shown next to the gallery.
    pub fn count_label(&self) -> String {
        if self.total > 0 {
            format!("{} / {}", self.pages.len(), self.total)
        } else {
            self.pages.len().to_string()
        }
    }
}

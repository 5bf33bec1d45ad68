use crate::{EditableStory, GalleryAccumulator, Job};

/// Everything scoped to one conversion job. Replaced as a unit by
/// [`Session::reset`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub(crate) job: Job,
    pub(crate) gallery: GalleryAccumulator,
    pub(crate) story: Option<EditableStory>,
}

impl Session {
    pub fn story(&self) -> Option<&EditableStory> {
        self.story.as_ref()
    }

    /// Swap in a fresh session around `job` and hand back the old one.
    ///
    /// The gallery generation keeps counting across sessions.
    pub(crate) fn reset(&mut self, job: Job) -> Session {
        let mut gallery = self.gallery.clone();
        gallery.reset();
        std::mem::replace(
            self,
            Session {
                job,
                gallery,
                story: None,
            },
        )
    }
}

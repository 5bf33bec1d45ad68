use std::path::{Path, PathBuf};

use studio_core::EditableStory;
use studio_engine::{AtomicFileWriter, PersistError};

pub const STORY_FILE: &str = "editable_story.json";

/// Write the story JSON plus one plain-text file per page.
pub fn write_story(dir: &Path, story: &EditableStory) -> Result<Vec<PathBuf>, PersistError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf())?;
    let json = serde_json::to_string_pretty(&story.to_value())
        .map_err(|err| PersistError::Io(err.into()))?;
    let mut written = vec![writer.write(STORY_FILE, &json)?];
    for page in &story.pages {
        let name = format!("page_{}.txt", page.page_number);
        written.push(writer.write(&name, &page.compile_text())?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::{Block, Page};
    use tempfile::TempDir;

    #[test]
    fn export_writes_json_and_page_texts() {
        let temp = TempDir::new().unwrap();
        let story = EditableStory::new(vec![
            Page::new(
                1,
                vec![Block::title("t1", "Hello"), Block::image("i1", "/p.png")],
            ),
            Page::new(2, vec![Block::text("b1", "Bye")]),
        ]);

        let written = write_story(temp.path(), &story).unwrap();
        assert_eq!(written.len(), 3);

        let json = std::fs::read_to_string(temp.path().join(STORY_FILE)).unwrap();
        let reloaded =
            EditableStory::from_value(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(reloaded, story);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("page_1.txt")).unwrap(),
            "Hello"
        );
        assert_eq!(
            std::fs::read_to_string(temp.path().join("page_2.txt")).unwrap(),
            "Bye"
        );
    }
}

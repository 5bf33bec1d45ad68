//! Typed editable story and its local mutations.
//!
//! The wire format is loose JSON; [`EditableStory::from_value`] is the only
//! way in and rejects anything that does not have the expected shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, StoryError};
use crate::reorder::{self, Direction, Keyed, Placement, ReorderError};

pub const STORY_VERSION: u32 = 1;
const STORY_TYPE: &str = "editable_story";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRole {
    #[default]
    Body,
    Title,
}

/// Smallest editable unit of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text {
        id: String,
        text: String,
        locked: bool,
        role: TextRole,
    },
    Image {
        id: String,
        url: String,
        locked: bool,
    },
}

impl Block {
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Block::Text {
            id: id.into(),
            text: text.into(),
            locked: false,
            role: TextRole::Body,
        }
    }

    pub fn title(id: impl Into<String>, text: impl Into<String>) -> Self {
        Block::Text {
            id: id.into(),
            text: text.into(),
            locked: false,
            role: TextRole::Title,
        }
    }

    pub fn image(id: impl Into<String>, url: impl Into<String>) -> Self {
        Block::Image {
            id: id.into(),
            url: url.into(),
            locked: false,
        }
    }

    pub fn with_locked(mut self, value: bool) -> Self {
        match &mut self {
            Block::Text { locked, .. } | Block::Image { locked, .. } => *locked = value,
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            Block::Text { id, .. } | Block::Image { id, .. } => id,
        }
    }

    pub fn is_locked(&self) -> bool {
        match self {
            Block::Text { locked, .. } | Block::Image { locked, .. } => *locked,
        }
    }

    /// Whether an editor surface for this block accepts input.
    pub fn is_editable(&self) -> bool {
        matches!(self, Block::Text { locked: false, .. })
    }

    fn toggle_lock(&mut self) -> bool {
        match self {
            Block::Text { locked, .. } | Block::Image { locked, .. } => {
                *locked = !*locked;
                *locked
            }
        }
    }
}

impl Keyed for Block {
    fn key(&self) -> &str {
        self.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page_number: u32,
    pub use_title: bool,
    pub locked: bool,
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(page_number: u32, blocks: Vec<Block>) -> Self {
        Self {
            page_number,
            use_title: page_number == 1,
            locked: false,
            blocks,
        }
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == block_id)
    }

    pub fn block_ids(&self) -> Vec<&str> {
        self.blocks.iter().map(Block::id).collect()
    }

    pub fn locked_blocks(&self) -> Vec<Block> {
        self.blocks.iter().filter(|b| b.is_locked()).cloned().collect()
    }

    /// Plain-text rendition: title first (when the page shows one), then the
    /// non-empty text blocks, separated by blank lines. Images are skipped.
    pub fn compile_text(&self) -> String {
        let mut title: Option<&str> = None;
        let mut body: Vec<&str> = Vec::new();
        for block in &self.blocks {
            let Block::Text { text, role, .. } = block else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if *role == TextRole::Title && self.use_title && title.is_none() {
                title = Some(text);
            } else {
                body.push(text);
            }
        }
        if self.use_title && title.is_none() && !body.is_empty() {
            title = Some(body.remove(0));
        }
        title
            .into_iter()
            .chain(body)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }

    fn block_index(&self, block_id: &str) -> Result<usize, StoryError> {
        reorder::position(&self.blocks, block_id).ok_or_else(|| StoryError::BlockNotFound {
            page: self.page_number,
            block_id: block_id.to_string(),
        })
    }
}

/// Block-level, user-correctable representation of a completed job's pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditableStory {
    pub updated_at: Option<String>,
    pub pages: Vec<Page>,
}

impl EditableStory {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            updated_at: None,
            pages,
        }
    }

    /// Validate a story payload from the service.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DeckError> {
        let Some(object) = value.as_object() else {
            return Err(DeckError::schema("story is not an object"));
        };
        match object.get("pages") {
            Some(pages) if pages.is_array() => {}
            _ => return Err(DeckError::schema("`pages` is not an array")),
        }
        let wire: WireStory =
            serde_json::from_value(value).map_err(|err| DeckError::schema(err.to_string()))?;
        wire.try_into()
    }

    pub fn to_value(&self) -> serde_json::Value {
        let wire = WireStory {
            version: Some(STORY_VERSION),
            kind: Some(STORY_TYPE.to_string()),
            updated_at: self.updated_at.clone(),
            pages: self.pages.iter().map(WirePage::from).collect(),
        };
        serde_json::to_value(wire).unwrap_or(serde_json::Value::Null)
    }

    pub fn page(&self, page_number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_mut(&mut self, page_number: u32) -> Result<&mut Page, StoryError> {
        self.pages
            .iter_mut()
            .find(|p| p.page_number == page_number)
            .ok_or(StoryError::PageNotFound(page_number))
    }

    /// Flip `locked` on one block; returns the new value.
    pub fn toggle_lock(&mut self, page_number: u32, block_id: &str) -> Result<bool, StoryError> {
        let page = self.page_mut(page_number)?;
        let index = page.block_index(block_id)?;
        Ok(page.blocks[index].toggle_lock())
    }

    pub fn toggle_page_lock(&mut self, page_number: u32) -> Result<bool, StoryError> {
        let page = self.page_mut(page_number)?;
        page.locked = !page.locked;
        Ok(page.locked)
    }

    /// Replace a text block's content verbatim.
    pub fn edit_text(
        &mut self,
        page_number: u32,
        block_id: &str,
        new_text: impl Into<String>,
    ) -> Result<(), StoryError> {
        let page = self.page_mut(page_number)?;
        let index = page.block_index(block_id)?;
        match &mut page.blocks[index] {
            Block::Text { locked: true, .. } => Err(StoryError::BlockLocked(block_id.to_string())),
            Block::Text { text, .. } => {
                *text = new_text.into();
                Ok(())
            }
            Block::Image { .. } => Err(StoryError::NotText(block_id.to_string())),
        }
    }

    /// Swap a block with its neighbour. `Ok(false)` at either end of the page.
    pub fn move_block(
        &mut self,
        page_number: u32,
        block_id: &str,
        direction: Direction,
    ) -> Result<bool, StoryError> {
        let page = self.page_mut(page_number)?;
        let index = page.block_index(block_id)?;
        Ok(reorder::transpose(&mut page.blocks, index, direction))
    }

    pub fn move_block_by_drop(
        &mut self,
        page_number: u32,
        source_id: &str,
        target_id: &str,
        placement: Placement,
    ) -> Result<(), StoryError> {
        let page = self.page_mut(page_number)?;
        page.blocks = reorder::reorder(&page.blocks, source_id, target_id, placement).map_err(
            |err| match err {
                ReorderError::SameId(id) => StoryError::SameBlock(id),
                ReorderError::UnknownId(id) => StoryError::BlockNotFound {
                    page: page_number,
                    block_id: id,
                },
            },
        )?;
        Ok(())
    }
}

/// Check that every block locked at call time survived a regeneration
/// unchanged and in the same relative order.
pub fn check_locked_preserved(locked: &[Block], page: Option<&Page>) -> Result<(), DeckError> {
    if locked.is_empty() {
        return Ok(());
    }
    let Some(page) = page else {
        return Err(DeckError::schema("regenerated page is missing"));
    };
    let wanted: HashSet<&str> = locked.iter().map(Block::id).collect();
    let survivors: Vec<&Block> = page
        .blocks
        .iter()
        .filter(|b| wanted.contains(b.id()))
        .collect();
    if survivors.len() != locked.len() {
        return Err(DeckError::schema(format!(
            "regenerate dropped locked blocks on page {}",
            page.page_number
        )));
    }
    for (before, after) in locked.iter().zip(survivors) {
        if before != after {
            return Err(DeckError::schema(format!(
                "regenerate altered locked block {} on page {}",
                before.id(),
                page.page_number
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct WireStory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    pages: Vec<WirePage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePage {
    page_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_title: Option<bool>,
    #[serde(default)]
    locked: bool,
    blocks: Vec<WireBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireBlock {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default)]
    locked: bool,
}

impl From<&Page> for WirePage {
    fn from(page: &Page) -> Self {
        Self {
            page_number: i64::from(page.page_number),
            use_title: Some(page.use_title),
            locked: page.locked,
            blocks: page.blocks.iter().map(WireBlock::from).collect(),
        }
    }
}

impl From<&Block> for WireBlock {
    fn from(block: &Block) -> Self {
        match block {
            Block::Text {
                id,
                text,
                locked,
                role,
            } => Self {
                id: Some(id.clone()),
                kind: match role {
                    TextRole::Body => "text",
                    TextRole::Title => "title",
                }
                .to_string(),
                text: Some(text.clone()),
                url: None,
                locked: *locked,
            },
            Block::Image { id, url, locked } => Self {
                id: Some(id.clone()),
                kind: "image".to_string(),
                text: None,
                url: Some(url.clone()),
                locked: *locked,
            },
        }
    }
}

impl TryFrom<WireStory> for EditableStory {
    type Error = DeckError;

    fn try_from(wire: WireStory) -> Result<Self, Self::Error> {
        let mut pages = wire
            .pages
            .into_iter()
            .map(Page::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        pages.sort_by_key(|p| p.page_number);
        for (expected, page) in (1u32..).zip(&pages) {
            if page.page_number != expected {
                return Err(DeckError::schema(format!(
                    "page numbers must run 1..={} without gaps or repeats; found {} at position {}",
                    pages.len(),
                    page.page_number,
                    expected
                )));
            }
        }
        Ok(Self {
            updated_at: wire.updated_at,
            pages,
        })
    }
}

impl TryFrom<WirePage> for Page {
    type Error = DeckError;

    fn try_from(wire: WirePage) -> Result<Self, Self::Error> {
        let page_number = u32::try_from(wire.page_number)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                DeckError::schema(format!("invalid page number {}", wire.page_number))
            })?;
        let mut seen = HashSet::new();
        let mut blocks = Vec::with_capacity(wire.blocks.len());
        for raw in wire.blocks {
            let block = block_from_wire(page_number, raw)?;
            if !seen.insert(block.id().to_string()) {
                return Err(DeckError::schema(format!(
                    "duplicate block id {} on page {page_number}",
                    block.id()
                )));
            }
            blocks.push(block);
        }
        Ok(Self {
            page_number,
            use_title: wire.use_title.unwrap_or(page_number == 1),
            locked: wire.locked,
            blocks,
        })
    }
}

fn block_from_wire(page_number: u32, raw: WireBlock) -> Result<Block, DeckError> {
    let id = raw
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DeckError::schema(format!("block without id on page {page_number}")))?;
    match raw.kind.as_str() {
        "text" | "title" => Ok(Block::Text {
            id,
            text: raw.text.unwrap_or_default(),
            locked: raw.locked,
            role: if raw.kind == "title" {
                TextRole::Title
            } else {
                TextRole::Body
            },
        }),
        "image" => {
            let url = raw
                .url
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| DeckError::schema(format!("image block {id} has no url")))?;
            Ok(Block::Image {
                id,
                url,
                locked: raw.locked,
            })
        }
        other => Err(DeckError::schema(format!(
            "unknown block type `{other}` on page {page_number}"
        ))),
    }
}

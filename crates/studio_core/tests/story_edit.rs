use pretty_assertions::assert_eq;
use serde_json::json;
use studio_core::{
    check_locked_preserved, Block, DeckError, Direction, EditableStory, Page, Placement,
    StoryError,
};

fn sample() -> EditableStory {
    EditableStory::new(vec![
        Page::new(
            1,
            vec![
                Block::title("t1", "Why Rust"),
                Block::text("b1", "Memory safety"),
                Block::image("i1", "/files/p1.png"),
                Block::text("b2", "Fearless concurrency"),
            ],
        ),
        Page::new(2, vec![Block::text("c1", "Closing")]),
    ])
}

fn ids(story: &EditableStory, page: u32) -> Vec<String> {
    story
        .page(page)
        .map(|p| p.block_ids().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn lock_toggles_and_blocks_editing() {
    let mut story = sample();
    assert_eq!(story.toggle_lock(1, "b1"), Ok(true));

    let err = story.edit_text(1, "b1", "changed").unwrap_err();
    assert_eq!(err, StoryError::BlockLocked("b1".to_string()));
    assert_eq!(
        story.page(1).and_then(|p| p.block("b1")),
        Some(&Block::text("b1", "Memory safety").with_locked(true))
    );

    assert_eq!(story.toggle_lock(1, "b1"), Ok(false));
    story.edit_text(1, "b1", "  spaced  ").unwrap();
    assert_eq!(
        story.page(1).and_then(|p| p.block("b1")),
        Some(&Block::text("b1", "  spaced  "))
    );
}

#[test]
fn images_are_lockable_but_not_editable() {
    let mut story = sample();
    assert_eq!(story.toggle_lock(1, "i1"), Ok(true));
    assert_eq!(
        story.edit_text(1, "i1", "x"),
        Err(StoryError::NotText("i1".to_string()))
    );
    assert!(!story.page(1).unwrap().block("i1").unwrap().is_editable());
}

#[test]
fn unknown_targets_are_reported() {
    let mut story = sample();
    assert_eq!(story.toggle_lock(9, "b1"), Err(StoryError::PageNotFound(9)));
    assert_eq!(
        story.edit_text(2, "b1", "x"),
        Err(StoryError::BlockNotFound {
            page: 2,
            block_id: "b1".to_string()
        })
    );
    assert_eq!(story, sample());
}

#[test]
fn moves_are_noops_at_the_edges_and_cancel_out() {
    let mut story = sample();
    assert_eq!(story.move_block(1, "t1", Direction::Up), Ok(false));
    assert_eq!(story.move_block(1, "b2", Direction::Down), Ok(false));
    assert_eq!(story, sample());

    assert_eq!(story.move_block(1, "b1", Direction::Down), Ok(true));
    assert_eq!(ids(&story, 1), vec!["t1", "i1", "b1", "b2"]);
    assert_eq!(story.move_block(1, "b1", Direction::Up), Ok(true));
    assert_eq!(story, sample());
}

#[test]
fn drop_places_relative_to_the_target() {
    let mut story = sample();
    story
        .move_block_by_drop(1, "t1", "i1", Placement::After)
        .unwrap();
    assert_eq!(ids(&story, 1), vec!["b1", "i1", "t1", "b2"]);

    story
        .move_block_by_drop(1, "b2", "b1", Placement::Before)
        .unwrap();
    assert_eq!(ids(&story, 1), vec!["b2", "b1", "i1", "t1"]);

    assert_eq!(
        story.move_block_by_drop(1, "b2", "b2", Placement::After),
        Err(StoryError::SameBlock("b2".to_string()))
    );
    assert!(story
        .move_block_by_drop(1, "b2", "zz", Placement::After)
        .is_err());
    assert_eq!(ids(&story, 1), vec!["b2", "b1", "i1", "t1"]);
}

#[test]
fn page_lock_is_independent_of_block_locks() {
    let mut story = sample();
    assert_eq!(story.toggle_page_lock(2), Ok(true));
    assert!(story.page(2).unwrap().locked);
    assert!(story.page(2).unwrap().locked_blocks().is_empty());
    assert_eq!(story.toggle_page_lock(2), Ok(false));
}

#[test]
fn story_json_is_validated() {
    let story = EditableStory::from_value(json!({
        "version": 1,
        "type": "editable_story",
        "updated_at": "2024-01-01T00:00:00Z",
        "pages": [
            {"page_number": 2, "blocks": [{"id": "c1", "type": "text", "text": "Closing"}]},
            {"page_number": 1, "use_title": true, "blocks": [
                {"id": "t1", "type": "title", "text": "Why Rust"},
                {"id": "i1", "type": "image", "url": "/files/p1.png", "locked": true}
            ]}
        ]
    }))
    .unwrap();

    assert_eq!(story.page_count(), 2);
    assert_eq!(story.pages[0].page_number, 1);
    assert!(story.pages[0].use_title);
    assert!(!story.pages[1].use_title);
    assert!(story.pages[0].block("i1").unwrap().is_locked());
    assert_eq!(story.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));

    let again = EditableStory::from_value(story.to_value()).unwrap();
    assert_eq!(again, story);
}

#[test]
fn malformed_story_json_is_a_schema_error() {
    let cases = [
        json!([]),
        json!({"pages": {}}),
        json!({"pages": [{"page_number": 0, "blocks": []}]}),
        json!({"pages": [{"page_number": 1, "blocks": [{"type": "text", "text": "x"}]}]}),
        json!({"pages": [{"page_number": 1, "blocks": [{"id": "a", "type": "video"}]}]}),
        json!({"pages": [{"page_number": 1, "blocks": [{"id": "a", "type": "image"}]}]}),
        json!({"pages": [{"page_number": 1, "blocks": [
            {"id": "a", "type": "text", "text": "x"},
            {"id": "a", "type": "text", "text": "y"}
        ]}]}),
        json!({"pages": [
            {"page_number": 1, "blocks": []},
            {"page_number": 3, "blocks": []}
        ]}),
        json!({"pages": [{"page_number": 1}]}),
    ];
    for case in cases {
        let result = EditableStory::from_value(case.clone());
        assert!(
            matches!(result, Err(DeckError::Schema(_))),
            "expected schema error for {case}, got {result:?}"
        );
    }
}

#[test]
fn compiled_text_puts_the_title_first() {
    let story = sample();
    assert_eq!(
        story.page(1).unwrap().compile_text(),
        "Why Rust\n\nMemory safety\n\nFearless concurrency"
    );

    let mut page = Page::new(
        3,
        vec![
            Block::text("a", "First"),
            Block::text("b", "   "),
            Block::title("c", "Heading"),
        ],
    );
    assert_eq!(page.compile_text(), "First\n\nHeading");
    page.use_title = true;
    assert_eq!(page.compile_text(), "Heading\n\nFirst");
}

#[test]
fn locked_blocks_must_survive_regeneration() {
    let before = sample();
    let mut locked_story = before.clone();
    locked_story.toggle_lock(1, "i1").unwrap();
    locked_story.toggle_lock(1, "b2").unwrap();
    let locked = locked_story.page(1).unwrap().locked_blocks();

    let kept = Page::new(
        1,
        vec![
            Block::title("t9", "New title"),
            Block::image("i1", "/files/p1.png").with_locked(true),
            Block::text("n1", "Fresh"),
            Block::text("b2", "Fearless concurrency").with_locked(true),
        ],
    );
    assert_eq!(check_locked_preserved(&locked, Some(&kept)), Ok(()));

    let reordered = Page::new(
        1,
        vec![
            Block::text("b2", "Fearless concurrency").with_locked(true),
            Block::image("i1", "/files/p1.png").with_locked(true),
        ],
    );
    assert!(check_locked_preserved(&locked, Some(&reordered)).is_err());

    let altered = Page::new(
        1,
        vec![
            Block::image("i1", "/files/other.png").with_locked(true),
            Block::text("b2", "Fearless concurrency").with_locked(true),
        ],
    );
    assert!(check_locked_preserved(&locked, Some(&altered)).is_err());

    let dropped = Page::new(1, vec![Block::image("i1", "/files/p1.png").with_locked(true)]);
    assert!(matches!(
        check_locked_preserved(&locked, Some(&dropped)),
        Err(DeckError::Schema(_))
    ));
    assert!(check_locked_preserved(&locked, None).is_err());
    assert_eq!(check_locked_preserved(&[], None), Ok(()));
}

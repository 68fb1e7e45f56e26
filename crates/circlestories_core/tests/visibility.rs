mod common;

use circlestories_core::{StaticIdentity, StoryError, StoryView, UserId};
use common::{engine, texts};

fn full_texts(view: &StoryView) -> Vec<&str> {
    match view {
        StoryView::Full { blocks, .. } => texts(blocks),
        StoryView::Partial { .. } => panic!("expected full view, got {view:?}"),
    }
}

fn partial_text(view: &StoryView) -> &str {
    match view {
        StoryView::Partial { last_block, .. } => last_block.text.as_str(),
        StoryView::Full { .. } => panic!("expected partial view, got {view:?}"),
    }
}

#[test]
fn alice_bob_carol_scenario() {
    let engine = engine();
    let story = engine
        .create_story("alice", "Title", "Once upon a time")
        .unwrap();

    assert_eq!(
        full_texts(&engine.view(story, "alice").unwrap()),
        vec!["Once upon a time"]
    );
    assert_eq!(
        partial_text(&engine.view(story, "bob").unwrap()),
        "Once upon a time"
    );

    assert_eq!(engine.submit_append(story, "bob", "the end").unwrap(), 1);

    assert_eq!(
        full_texts(&engine.view(story, "bob").unwrap()),
        vec!["Once upon a time", "the end"]
    );
    assert_eq!(partial_text(&engine.view(story, "carol").unwrap()), "the end");
}

#[test]
fn one_contribution_grants_full_view_forever() {
    let engine = engine();
    let story = engine.create_story("alice", "Title", "zero").unwrap();
    engine.submit_append(story, "bob", "one").unwrap();

    for (author, text) in [("carol", "two"), ("dave", "three"), ("alice", "four")] {
        engine.submit_append(story, author, text).unwrap();
        let view = engine.view(story, "bob").unwrap();
        assert!(view.is_full());
        assert_eq!(full_texts(&view).last().copied(), Some(text));
    }

    assert_eq!(
        engine.view(story, "bob").unwrap().assembled_text(),
        "zero\n\none\n\ntwo\n\nthree\n\nfour"
    );
}

#[test]
fn non_contributor_sees_only_the_newest_block() {
    let engine = engine();
    let story = engine.create_story("alice", "Title", "zero").unwrap();
    for (seq, text) in ["one", "two", "three"].into_iter().enumerate() {
        engine.submit_append(story, "bob", text).unwrap();

        let view = engine.view(story, "erin").unwrap();
        match &view {
            StoryView::Partial { story: meta, last_block } => {
                assert_eq!(meta.story_id, story);
                assert_eq!(last_block.seq as usize, seq + 1);
                assert_eq!(last_block.author.as_str(), "bob");
                assert_eq!(last_block.text, text);
            }
            other => panic!("expected partial view, got {other:?}"),
        }
        assert_eq!(view.texts().len(), 1);
    }
}

#[test]
fn viewing_does_not_make_a_contributor() {
    let engine = engine();
    let story = engine.create_story("alice", "Title", "zero").unwrap();

    engine.view(story, "bob").unwrap();
    engine.view(story, "bob").unwrap();

    assert!(!engine.is_contributor(story, "bob").unwrap());
    assert!(!engine.view(story, "bob").unwrap().is_full());
}

#[test]
fn full_view_carries_story_metadata_and_authors() {
    let engine = engine();
    let story = engine.create_story("alice", "The Circle", "zero").unwrap();
    engine.submit_append(story, "bob", "one").unwrap();

    match engine.view(story, "alice").unwrap() {
        StoryView::Full { story: meta, blocks } => {
            assert_eq!(meta.title, "The Circle");
            let authors: Vec<&str> = blocks.iter().map(|block| block.author.as_str()).collect();
            assert_eq!(authors, vec!["alice", "bob"]);
            assert!(blocks[0].is_opening());
        }
        other => panic!("expected full view, got {other:?}"),
    }
}

#[test]
fn identity_aware_entry_points_use_current_user() {
    let engine = engine();
    let alice = StaticIdentity::user(UserId::parse("alice").unwrap());
    let bob = StaticIdentity::user(UserId::parse("bob").unwrap());

    let story = engine.create_story_as(&alice, "Title", "zero").unwrap();
    assert!(!engine.view_as(&bob, story).unwrap().is_full());

    engine.submit_append_as(&bob, story, "one").unwrap();
    assert!(engine.view_as(&bob, story).unwrap().is_full());

    let session_user = || UserId::parse("carol").ok();
    assert!(!engine.view_as(&session_user, story).unwrap().is_full());
}

#[test]
fn anonymous_callers_are_rejected() {
    let engine = engine();
    let story = engine.create_story("alice", "Title", "zero").unwrap();
    let anonymous = StaticIdentity::anonymous();

    assert!(matches!(
        engine.view_as(&anonymous, story),
        Err(StoryError::Unauthenticated)
    ));
    assert!(matches!(
        engine.submit_append_as(&anonymous, story, "text"),
        Err(StoryError::Unauthenticated)
    ));
    assert!(matches!(
        engine.create_story_as(&anonymous, "Title", "text"),
        Err(StoryError::Unauthenticated)
    ));
    assert_eq!(engine.contributors(story).unwrap().len(), 1);
}

#[test]
fn story_without_blocks_surfaces_a_consistency_fault() {
    let engine = engine();
    let story = engine.create_story("alice", "Title", "zero").unwrap();

    // Simulate an earlier atomicity bug by removing block 0 behind the engine.
    let conn = engine.db().acquire().unwrap();
    conn.execute_batch("DROP TRIGGER blocks_reject_delete;").unwrap();
    conn.execute("DELETE FROM blocks WHERE story_id = ?1;", [story.to_string()])
        .unwrap();
    drop(conn);

    let err = engine.view(story, "bob").unwrap_err();
    assert!(matches!(err, StoryError::ConsistencyFault { story_id, .. } if story_id == story));
    assert!(!err.is_caller_error());
    assert!(matches!(
        engine.view(story, "alice"),
        Err(StoryError::ConsistencyFault { .. })
    ));
}

#[test]
fn missing_opening_block_is_a_consistency_fault_for_every_viewer() {
    let engine = engine();
    let story = engine.create_story("alice", "Title", "zero").unwrap();
    engine.submit_append(story, "bob", "one").unwrap();

    let conn = engine.db().acquire().unwrap();
    conn.execute_batch("DROP TRIGGER blocks_reject_delete;").unwrap();
    conn.execute(
        "DELETE FROM blocks WHERE story_id = ?1 AND seq = 0;",
        [story.to_string()],
    )
    .unwrap();
    drop(conn);

    for viewer in ["carol", "bob"] {
        let err = engine.view(story, viewer).unwrap_err();
        assert_eq!(err.code(), "consistency_fault", "viewer {viewer}");
        assert!(matches!(err, StoryError::ConsistencyFault { story_id, .. } if story_id == story));
    }
}

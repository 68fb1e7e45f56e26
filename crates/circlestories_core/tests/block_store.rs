use circlestories_core::db::open_db_in_memory;
use circlestories_core::{
    BlockStore, ContributorIndex, RepoError, SqliteBlockStore, SqliteContributorIndex,
    SqliteStoryRepository, StoryRepository, UserId, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn user(raw: &str) -> UserId {
    UserId::parse(raw).unwrap()
}

fn insert_story(conn: &Connection, creator: &str) -> Uuid {
    let story_id = Uuid::new_v4();
    let repo = SqliteStoryRepository::try_new(conn).unwrap();
    repo.insert_story(story_id, &user(creator), "Title").unwrap();
    story_id
}

#[test]
fn append_assigns_gapless_sequence_from_zero() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();

    assert_eq!(log.append(&user("alice"), "Once upon a time").unwrap(), 0);
    assert_eq!(log.append(&user("bob"), "there was").unwrap(), 1);
    assert_eq!(log.append(&user("bob"), "a dragon").unwrap(), 2);
    assert_eq!(log.block_count().unwrap(), 3);

    let blocks = log.full_text().unwrap();
    let seqs: Vec<u32> = blocks.iter().map(|block| block.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2]);
    assert_eq!(blocks[1].author, user("bob"));
    assert_eq!(blocks[2].text, "a dragon");
    assert!(blocks.iter().all(|block| block.story_id == story_id));
}

#[test]
fn sequences_are_independent_per_story() {
    let conn = open_db_in_memory().unwrap();
    let first = insert_story(&conn, "alice");
    let second = insert_story(&conn, "bob");

    let first_log = SqliteBlockStore::try_new(&conn, first).unwrap();
    let second_log = SqliteBlockStore::try_new(&conn, second).unwrap();
    first_log.append(&user("alice"), "a").unwrap();
    first_log.append(&user("alice"), "b").unwrap();

    assert_eq!(second_log.append(&user("bob"), "x").unwrap(), 0);
}

#[test]
fn last_block_returns_highest_sequence() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();
    log.append(&user("alice"), "first").unwrap();
    log.append(&user("carol"), "second").unwrap();

    let last = log.last_block().unwrap();
    assert_eq!(last.seq, 1);
    assert_eq!(last.author, user("carol"));
    assert_eq!(last.text, "second");
    assert!(!last.is_opening());
}

#[test]
fn empty_text_is_rejected_without_consuming_a_sequence() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();
    log.append(&user("alice"), "first").unwrap();

    let err = log.append(&user("bob"), "   ").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyText)
    ));
    assert_eq!(log.append(&user("bob"), "second").unwrap(), 1);
}

#[test]
fn reading_a_story_without_blocks_is_a_consistency_fault() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();

    assert!(matches!(log.last_block(), Err(RepoError::EmptyStory(id)) if id == story_id));
    assert!(matches!(log.full_text(), Err(RepoError::EmptyStory(id)) if id == story_id));
}

fn insert_raw_block(conn: &Connection, story_id: Uuid, seq: u32, text: &str) {
    conn.execute(
        "INSERT INTO blocks (story_id, seq, author_id, content) VALUES (?1, ?2, 'bob', ?3);",
        rusqlite::params![story_id.to_string(), seq, text],
    )
    .unwrap();
}

#[test]
fn log_without_opening_block_is_a_consistency_fault() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    insert_raw_block(&conn, story_id, 1, "orphan");

    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();
    assert!(matches!(
        log.last_block(),
        Err(RepoError::MissingOpeningBlock(id)) if id == story_id
    ));
    assert!(matches!(
        log.full_text(),
        Err(RepoError::MissingOpeningBlock(id)) if id == story_id
    ));
}

#[test]
fn gap_in_sequence_is_a_consistency_fault() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    insert_raw_block(&conn, story_id, 0, "zero");
    insert_raw_block(&conn, story_id, 2, "two");

    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();
    assert!(matches!(
        log.full_text(),
        Err(RepoError::SequenceGap {
            expected: 1,
            found: 2,
            ..
        })
    ));
    assert_eq!(log.last_block().unwrap().text, "two");
}

#[test]
fn contributor_record_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    let index = SqliteContributorIndex::try_new(&conn).unwrap();

    assert!(!index.is_contributor(story_id, &user("bob")).unwrap());
    assert!(index.record(story_id, &user("bob")).unwrap());
    assert!(!index.record(story_id, &user("bob")).unwrap());
    assert!(index.record(story_id, &user("alice")).unwrap());

    assert!(index.is_contributor(story_id, &user("bob")).unwrap());
    assert_eq!(
        index.list_contributors(story_id).unwrap(),
        vec![user("bob"), user("alice")]
    );
}

#[test]
fn contributor_membership_is_scoped_to_story() {
    let conn = open_db_in_memory().unwrap();
    let first = insert_story(&conn, "alice");
    let second = insert_story(&conn, "alice");
    let index = SqliteContributorIndex::try_new(&conn).unwrap();

    index.record(first, &user("bob")).unwrap();
    assert!(index.is_contributor(first, &user("bob")).unwrap());
    assert!(!index.is_contributor(second, &user("bob")).unwrap());
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteBlockStore::try_new(&conn, Uuid::new_v4()).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn invalid_persisted_author_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let story_id = insert_story(&conn, "alice");
    conn.execute(
        "INSERT INTO blocks (story_id, seq, author_id, content) VALUES (?1, 0, ' padded', 'text');",
        [story_id.to_string()],
    )
    .unwrap();

    let log = SqliteBlockStore::try_new(&conn, story_id).unwrap();
    assert!(matches!(log.last_block(), Err(RepoError::InvalidData(_))));
}

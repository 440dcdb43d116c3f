use super::*;
use chrono::NaiveDate;

fn achievement(title: &str) -> EntryBody {
    EntryBody::Achievement {
        title: title.to_string(),
        description: String::new(),
        year: None,
        featured: false,
        background_image: None,
    }
}

fn news(title: &str, published_on: NaiveDate) -> EntryBody {
    EntryBody::News {
        title: title.to_string(),
        body: "body".to_string(),
        published_on,
        published: true,
        cover_image: None,
    }
}

async fn seed_achievements(storage: &Storage, titles: &[&str]) -> Vec<EntryId> {
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        let entry = storage
            .create_entry(CollectionKind::Achievements, None, &achievement(title))
            .await
            .expect("create entry");
        ids.push(entry.id);
    }
    ids
}

fn positions(entries: &[StoredEntry]) -> Vec<i64> {
    entries.iter().map(|entry| entry.position).collect()
}

fn headlines(entries: &[StoredEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.body.headline()).collect()
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("content_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("content.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn creates_and_lists_entries() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage
        .create_entry(CollectionKind::Achievements, None, &achievement("Science fair"))
        .await
        .expect("create");
    assert!(!created.id.0.is_empty());
    assert_eq!(created.position, 1);

    let entries = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, created.id);
    assert_eq!(entries[0].body.headline(), "Science fair");
}

#[tokio::test]
async fn create_appends_after_existing_entries() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_achievements(&storage, &["First", "Second", "Third"]).await;

    let entries = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("list");
    assert_eq!(positions(&entries), vec![1, 2, 3]);
    assert_eq!(headlines(&entries), vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn create_honors_explicit_position() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_achievements(&storage, &["First"]).await;

    let created = storage
        .create_entry(CollectionKind::Achievements, Some(10), &achievement("Later"))
        .await
        .expect("create");
    assert_eq!(created.position, 10);
}

#[tokio::test]
async fn assigned_ids_are_unique() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["A", "B", "C"]).await;
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[tokio::test]
async fn update_replaces_body_and_keeps_position() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second"]).await;

    let updated = storage
        .update_entry(
            CollectionKind::Achievements,
            &ids[1],
            None,
            &achievement("Renamed"),
        )
        .await
        .expect("update")
        .expect("entry exists");
    assert_eq!(updated.position, 2);
    assert_eq!(updated.body.headline(), "Renamed");

    let entries = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("list");
    assert_eq!(headlines(&entries), vec!["First", "Renamed"]);
}

#[tokio::test]
async fn update_with_explicit_position_moves_entry() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second"]).await;

    let updated = storage
        .update_entry(
            CollectionKind::Achievements,
            &ids[0],
            Some(99),
            &achievement("First"),
        )
        .await
        .expect("update")
        .expect("entry exists");
    assert_eq!(updated.position, 99);

    let entries = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("list");
    assert_eq!(headlines(&entries), vec!["Second", "First"]);
}

#[tokio::test]
async fn update_missing_entry_returns_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let result = storage
        .update_entry(
            CollectionKind::Achievements,
            &EntryId("missing".to_string()),
            None,
            &achievement("Ghost"),
        )
        .await
        .expect("update");
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_removes_exactly_one_entry() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second", "Third"]).await;

    let removed = storage
        .delete_entry(CollectionKind::Achievements, &ids[2])
        .await
        .expect("delete");
    assert!(removed);

    let entries = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("list");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.id != ids[2]));

    let removed_again = storage
        .delete_entry(CollectionKind::Achievements, &ids[2])
        .await
        .expect("delete again");
    assert!(!removed_again);
}

#[tokio::test]
async fn delete_does_not_renumber_remaining_entries() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second", "Third"]).await;

    storage
        .delete_entry(CollectionKind::Achievements, &ids[1])
        .await
        .expect("delete");

    let entries = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("list");
    assert_eq!(positions(&entries), vec![1, 3]);
}

#[tokio::test]
async fn reorder_swaps_with_previous_and_renumbers() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second", "Third"]).await;

    let entries = storage
        .reorder_entry(CollectionKind::Achievements, &ids[1], MoveDirection::Up)
        .await
        .expect("reorder")
        .expect("entry exists");
    assert_eq!(headlines(&entries), vec!["Second", "First", "Third"]);
    assert_eq!(positions(&entries), vec![1, 2, 3]);
}

#[tokio::test]
async fn reorder_up_on_first_entry_is_a_noop() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second"]).await;

    let entries = storage
        .reorder_entry(CollectionKind::Achievements, &ids[0], MoveDirection::Up)
        .await
        .expect("reorder")
        .expect("entry exists");
    assert_eq!(headlines(&entries), vec!["First", "Second"]);
    assert_eq!(positions(&entries), vec![1, 2]);
}

#[tokio::test]
async fn reorder_down_on_last_entry_is_a_noop() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second"]).await;

    let entries = storage
        .reorder_entry(CollectionKind::Achievements, &ids[1], MoveDirection::Down)
        .await
        .expect("reorder")
        .expect("entry exists");
    assert_eq!(headlines(&entries), vec!["First", "Second"]);
    assert_eq!(positions(&entries), vec![1, 2]);
}

#[tokio::test]
async fn reorder_up_then_down_restores_original_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second", "Third"]).await;

    storage
        .reorder_entry(CollectionKind::Achievements, &ids[1], MoveDirection::Up)
        .await
        .expect("reorder up")
        .expect("entry exists");
    let entries = storage
        .reorder_entry(CollectionKind::Achievements, &ids[1], MoveDirection::Down)
        .await
        .expect("reorder down")
        .expect("entry exists");

    assert_eq!(headlines(&entries), vec!["First", "Second", "Third"]);
    assert_eq!(positions(&entries), vec![1, 2, 3]);
}

#[tokio::test]
async fn reorder_renormalizes_positions_left_sparse_by_delete() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ids = seed_achievements(&storage, &["First", "Second", "Third"]).await;

    storage
        .delete_entry(CollectionKind::Achievements, &ids[1])
        .await
        .expect("delete");

    // Positions are [1, 3] here; any successful reorder restores density.
    let entries = storage
        .reorder_entry(CollectionKind::Achievements, &ids[2], MoveDirection::Up)
        .await
        .expect("reorder")
        .expect("entry exists");
    assert_eq!(headlines(&entries), vec!["Third", "First"]);
    assert_eq!(positions(&entries), vec![1, 2]);
}

#[tokio::test]
async fn reorder_missing_entry_returns_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_achievements(&storage, &["First"]).await;

    let result = storage
        .reorder_entry(
            CollectionKind::Achievements,
            &EntryId("missing".to_string()),
            MoveDirection::Up,
        )
        .await
        .expect("reorder");
    assert!(result.is_none());
}

#[tokio::test]
async fn collections_are_isolated() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_achievements(&storage, &["Trophy"]).await;
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).expect("date");
    storage
        .create_entry(CollectionKind::News, None, &news("Term starts", date))
        .await
        .expect("create news");

    let achievements = storage
        .list_entries(CollectionKind::Achievements)
        .await
        .expect("achievements");
    let news_entries = storage.list_entries(CollectionKind::News).await.expect("news");

    assert_eq!(achievements.len(), 1);
    assert_eq!(news_entries.len(), 1);
    // Each collection numbers its own sequence from 1.
    assert_eq!(achievements[0].position, 1);
    assert_eq!(news_entries[0].position, 1);
}

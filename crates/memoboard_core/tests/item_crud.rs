use memoboard_core::db::migrations::latest_version;
use memoboard_core::db::open_db_in_memory;
use memoboard_core::{
    Item, ItemRepository, ItemService, ItemStatus, ItemType, RepoError, SqliteItemRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = Item::new(Uuid::new_v4(), ItemType::Reminder, "water the plants");
    let id = repo.create_item(&item).unwrap();

    let loaded = repo.get_item(id).unwrap().unwrap();
    assert_eq!(loaded.id, item.id);
    assert_eq!(loaded.owner_id, item.owner_id);
    assert_eq!(loaded.kind, ItemType::Reminder);
    assert_eq!(loaded.title, "water the plants");
    assert_eq!(loaded.status, ItemStatus::Active);
}

#[test]
fn update_existing_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new(Uuid::new_v4(), ItemType::Todo, "draft");
    repo.create_item(&item).unwrap();

    item.title = "finished title".to_string();
    item.body = Some("with body".to_string());
    item.sort_order = 7;
    repo.update_item(&item).unwrap();

    let loaded = repo.get_item(item.id).unwrap().unwrap();
    assert_eq!(loaded.title, "finished title");
    assert_eq!(loaded.body.as_deref(), Some("with body"));
    assert_eq!(loaded.sort_order, 7);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = Item::new(Uuid::new_v4(), ItemType::Habit, "missing");
    let err = repo.update_item(&item).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == item.id));
}

#[test]
fn validation_failure_blocks_create() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let invalid = Item::new(Uuid::new_v4(), ItemType::Todo, "   ");
    let err = repo.create_item(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn list_filters_by_owner_type_and_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let service = ItemService::new(repo);
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let todo = Item::new(owner, ItemType::Todo, "todo");
    let habit = Item::new(owner, ItemType::Habit, "habit");
    let mut done = Item::new(owner, ItemType::Reminder, "done reminder");
    done.status = ItemStatus::Completed;
    let foreign = Item::new(stranger, ItemType::Todo, "someone else");

    for item in [&todo, &habit, &done, &foreign] {
        service.create_item(item).unwrap();
    }

    assert_eq!(service.list_items(owner).unwrap().len(), 3);

    let todos = service.list_items_by_type(owner, ItemType::Todo).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, todo.id);

    let completed = service
        .list_items_by_status(owner, ItemStatus::Completed)
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);
}

#[test]
fn list_orders_by_manual_sort_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let service = ItemService::new(repo);
    let owner = Uuid::new_v4();

    let mut third = Item::new(owner, ItemType::Todo, "third");
    third.sort_order = 30;
    let mut first = Item::new(owner, ItemType::Todo, "first");
    first.sort_order = 10;
    let mut second = Item::new(owner, ItemType::Todo, "second");
    second.sort_order = 20;

    for item in [&third, &first, &second] {
        service.create_item(item).unwrap();
    }

    let titles: Vec<_> = service
        .list_items(owner)
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
}

#[test]
fn toggle_status_flips_both_ways() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let service = ItemService::new(repo);

    let item = Item::new(Uuid::new_v4(), ItemType::Todo, "plain todo");
    service.create_item(&item).unwrap();

    let toggled = service.toggle_status(item.id).unwrap();
    assert_eq!(toggled.status, ItemStatus::Completed);

    let toggled_back = service.toggle_status(item.id).unwrap();
    assert_eq!(toggled_back.status, ItemStatus::Active);

    let missing = Uuid::new_v4();
    let err = service.toggle_status(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn delete_removes_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = Item::new(Uuid::new_v4(), ItemType::Todo, "short-lived");
    repo.create_item(&item).unwrap();

    repo.delete_item(item.id).unwrap();
    assert!(repo.get_item(item.id).unwrap().is_none());

    let err = repo.delete_item(item.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_items_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("items"))));
}

#[test]
fn repository_rejects_connection_missing_required_items_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE items (
            uuid TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL,
            type TEXT NOT NULL,
            title TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "items",
            column: "body"
        })
    ));
}

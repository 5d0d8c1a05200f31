//! 図鑑ストアのテスト
//!
//! JSONファイル図鑑の永続化・並び順・名前変更を検証

use chrono::{Duration, TimeZone, Utc};
use trashmon::collection::{CollectionStore, JsonCollectionStore, COLLECTION_FILE_NAME};
use trashmon::error::TrashmonError;
use trashmon_common::{Category, NewCollectionItem, Rank};
use tempfile::tempdir;

fn new_item(category: Category, name: &str, minutes: i64) -> NewCollectionItem {
    let base = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
    NewCollectionItem {
        category,
        monster_name: name.to_string(),
        monster_image: vec![1, 2, 3, 4],
        rank: Rank::B,
        captured_at: base + Duration::minutes(minutes),
    }
}

/// 開き直しても内容が残る
#[test]
fn test_persists_across_reopen() {
    let dir = tempdir().expect("Failed to create temp dir");

    let id = {
        let mut store = JsonCollectionStore::open(dir.path()).unwrap();
        store.append(new_item(Category::Can, "Canny", 0)).unwrap()
    };
    assert!(dir.path().join(COLLECTION_FILE_NAME).exists());

    let store = JsonCollectionStore::open(dir.path()).unwrap();
    assert_eq!(store.len(), 1);
    let item = store.get(id).unwrap().expect("保存したレコードがない");
    assert_eq!(item.monster_name, "Canny");
    assert_eq!(item.category, Category::Can);
    assert_eq!(item.monster_image, vec![1, 2, 3, 4]);
}

/// 撮影日時の新しい順、同時刻はIDの大きい順
#[test]
fn test_get_all_is_newest_first() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonCollectionStore::open(dir.path()).unwrap();

    let old = store.append(new_item(Category::Paper, "Old", 0)).unwrap();
    let newest = store.append(new_item(Category::Glass, "Newest", 30)).unwrap();
    let tie_a = store.append(new_item(Category::Plastic, "TieA", 10)).unwrap();
    let tie_b = store.append(new_item(Category::Can, "TieB", 10)).unwrap();

    let ids: Vec<u64> = store.get_all().unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![newest, tie_b, tie_a, old]);
}

/// 追加は既存レコードを上書きしない
#[test]
fn test_append_never_overwrites() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonCollectionStore::open(dir.path()).unwrap();

    let first = store.append(new_item(Category::Can, "Same", 0)).unwrap();
    let second = store.append(new_item(Category::Can, "Same", 0)).unwrap();
    assert_ne!(first, second);
    assert_eq!(store.len(), 2);
}

/// 名前変更は名前だけを変え、ファイルにも反映される
#[test]
fn test_rename_changes_only_name() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonCollectionStore::open(dir.path()).unwrap();
    let id = store.append(new_item(Category::GeneralWaste, "Trashy", 5)).unwrap();
    let before = store.get(id).unwrap().unwrap();

    store.rename(id, "  Binny ").unwrap();

    let reopened = JsonCollectionStore::open(dir.path()).unwrap();
    let after = reopened.get(id).unwrap().unwrap();
    assert_eq!(after.monster_name, "Binny");
    assert_eq!(after.category, before.category);
    assert_eq!(after.rank, before.rank);
    assert_eq!(after.captured_at, before.captured_at);
    assert_eq!(after.monster_image, before.monster_image);
}

/// 存在しないIDの名前変更は NotFound
#[test]
fn test_rename_unknown_id() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonCollectionStore::open(dir.path()).unwrap();

    let err = store.rename(42, "Ghost").unwrap_err();
    assert!(matches!(err, TrashmonError::NotFound(42)));
    assert!(store.is_empty());
}

/// 保存ファイルは camelCase で画像は Base64
#[test]
fn test_file_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonCollectionStore::open(dir.path()).unwrap();
    store.append(new_item(Category::Can, "Canny", 0)).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(COLLECTION_FILE_NAME)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let item = &value["items"][0];
    assert_eq!(item["monsterName"], "Canny");
    assert_eq!(item["category"], "캔");
    assert_eq!(item["monsterImage"], "AQIDBA==");
    assert!(item["capturedAt"].is_string());
}

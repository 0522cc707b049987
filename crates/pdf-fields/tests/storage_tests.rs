use pdf_fields::geometry::*;
use pdf_fields::*;
use tempfile::TempDir;

fn records() -> Vec<FieldRecord> {
    let mut store = FieldStore::new();
    let n = Normalizer::default();
    let id = store
        .place(FieldType::Text, 1, PagePoint::new(100.0, 100.0), &n)
        .unwrap()
        .id;
    store.set_value(id, "value").unwrap();
    store
        .place(FieldType::Checkbox, 2, PagePoint::new(50.0, 50.0), &n)
        .unwrap();
    store.to_records()
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let storage = JsonDirStorage::new(dir.path().join("fields"));
    let records = records();

    storage.save_fields("contract-1", &records).await.unwrap();
    assert!(dir.path().join("fields/contract-1.json").exists());

    let loaded = storage.load_fields("contract-1").await.unwrap();
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn test_load_missing_document_is_empty() {
    let dir = TempDir::new().unwrap();
    let storage = JsonDirStorage::new(dir.path());
    assert!(storage.load_fields("never-saved").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_replaces_previous_records() {
    let dir = TempDir::new().unwrap();
    let storage = JsonDirStorage::new(dir.path());
    let records = records();

    storage.save_fields("doc", &records).await.unwrap();
    storage.save_fields("doc", &records[..1]).await.unwrap();
    assert_eq!(storage.load_fields("doc").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejects_unsafe_document_ids() {
    let dir = TempDir::new().unwrap();
    let storage = JsonDirStorage::new(dir.path());

    for id in ["", "../escape", "a/b", ".hidden"] {
        assert!(matches!(
            storage.save_fields(id, &[]).await,
            Err(SignError::Persistence { .. })
        ));
    }
}

#[tokio::test]
async fn test_failed_save_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    // A file where the storage directory should be
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"").unwrap();
    let storage = JsonDirStorage::new(&blocker);

    let store = FieldStore::from_records(records()).unwrap();
    let snapshot = store.clone();
    let result = storage.save_fields("doc", &store.to_records()).await;

    assert!(matches!(result, Err(SignError::Persistence { .. })));
    assert_eq!(store, snapshot);
}

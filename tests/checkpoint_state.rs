use ocr_batch::checkpoint::{start_index, Checkpoint, CheckpointFile};
use tempfile::TempDir;

#[test]
fn save_then_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ocr_checkpoint.json");
    let ckpt = CheckpointFile::new(&path);

    ckpt.save(4, 10).unwrap();
    let loaded = ckpt.load().expect("checkpoint present");
    assert_eq!(loaded.last_index, 4);
    assert_eq!(loaded.total_items, 10);
    assert!(!loaded.last_updated.is_empty());
}

#[test]
fn absent_file_means_fresh_start() {
    let dir = TempDir::new().unwrap();
    let ckpt = CheckpointFile::new(&dir.path().join("missing.json"));
    assert!(ckpt.load().is_none());
    assert_eq!(start_index(None), 0);
}

#[test]
fn corrupt_file_treated_as_absent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ocr_checkpoint.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(CheckpointFile::new(&path).load().is_none());
}

#[test]
fn resume_starts_after_last_completed() {
    let ckpt = Checkpoint {
        last_index: 4,
        total_items: 10,
        last_updated: "2026-01-01T00:00:00Z".into(),
    };
    assert_eq!(start_index(Some(&ckpt)), 5);
}

#[test]
fn save_overwrites_previous_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ocr_checkpoint.json");
    let ckpt = CheckpointFile::new(&path);
    ckpt.save(0, 10).unwrap();
    ckpt.save(7, 10).unwrap();
    assert_eq!(ckpt.load().unwrap().last_index, 7);
}

#[test]
fn clear_removes_file_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ocr_checkpoint.json");
    let ckpt = CheckpointFile::new(&path);
    ckpt.save(2, 3).unwrap();
    ckpt.clear().unwrap();
    assert!(!path.exists());
    ckpt.clear().unwrap();
}

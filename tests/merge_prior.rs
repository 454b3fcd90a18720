use ocr_batch::store::{load_items, merge_prior, save_snapshot, Item, OcrLine};
use tempfile::TempDir;

fn item(image: &str) -> Item {
    Item {
        local_image: image.into(),
        ocr_text: None,
        extra: serde_json::Map::new(),
    }
}

fn done(image: &str, text: &str, confidence: f64) -> Item {
    Item {
        ocr_text: Some(vec![OcrLine {
            text: text.into(),
            confidence,
        }]),
        ..item(image)
    }
}

#[test]
fn prior_results_take_precedence_verbatim() {
    let mut fresh = vec![item("a.png"), item("b.png")];
    let prior = vec![done("a.png", "A", 0.9), item("b.png")];

    let merged = merge_prior(&mut fresh, &prior);
    assert_eq!(merged, 1);
    assert_eq!(
        fresh[0].ocr_text,
        Some(vec![OcrLine {
            text: "A".into(),
            confidence: 0.9
        }])
    );
    assert!(fresh[1].ocr_text.is_none());
}

#[test]
fn empty_terminal_results_also_merge() {
    let mut fresh = vec![item("a.png")];
    let prior = vec![Item {
        ocr_text: Some(Vec::new()),
        ..item("a.png")
    }];
    assert_eq!(merge_prior(&mut fresh, &prior), 1);
    assert_eq!(fresh[0].ocr_text, Some(Vec::new()));
}

#[test]
fn shorter_prior_merges_prefix_only() {
    let mut fresh = vec![item("a.png"), item("b.png"), item("c.png")];
    let prior = vec![done("a.png", "A", 0.9)];
    assert_eq!(merge_prior(&mut fresh, &prior), 1);
    assert!(fresh[1].ocr_text.is_none());
    assert!(fresh[2].ocr_text.is_none());
}

#[test]
fn longer_prior_ignores_tail() {
    let mut fresh = vec![item("a.png")];
    let prior = vec![done("a.png", "A", 0.9), done("b.png", "B", 0.8)];
    assert_eq!(merge_prior(&mut fresh, &prior), 1);
    assert_eq!(fresh.len(), 1);
}

#[test]
fn scraper_metadata_survives_snapshot_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metadata_ocr.json");

    let mut it = done("a.png", "Halo", 0.95);
    it.extra
        .insert("title".into(), serde_json::json!("Poster 1"));
    save_snapshot(&path, &[it]).unwrap();

    let loaded = load_items(&path).unwrap();
    assert_eq!(loaded[0].local_image, "a.png");
    assert_eq!(loaded[0].extra["title"], serde_json::json!("Poster 1"));
    assert_eq!(loaded[0].ocr_text.as_ref().unwrap()[0].text, "Halo");
}

#[test]
fn pending_items_serialize_without_ocr_text() {
    let raw = serde_json::to_string(&item("a.png")).unwrap();
    assert!(!raw.contains("ocr_text"));
}

#[test]
fn missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_items(&dir.path().join("missing.json")).is_err());
}

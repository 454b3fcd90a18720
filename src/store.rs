use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f64,
}

/// One scraped record. `ocr_text` is absent until the item has been
/// processed; an explicit empty vec marks a terminal failure (missing image
/// or exhausted retries) so the item is never picked up again. Any other
/// scraper metadata rides along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub local_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<Vec<OcrLine>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    pub fn is_done(&self) -> bool {
        self.ocr_text.is_some()
    }
}

pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading item list: {}", path.display()))?;
    let items: Vec<Item> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing item list: {}", path.display()))?;
    Ok(items)
}

/// Full rewrite of the output snapshot; never appended to.
pub fn save_snapshot(path: &Path, items: &[Item]) -> Result<()> {
    let raw = serde_json::to_string_pretty(items)?;
    std::fs::write(path, raw)
        .with_context(|| format!("writing output snapshot: {}", path.display()))
}

/// Copies `ocr_text` from a prior snapshot onto freshly loaded items, by
/// position only. A prior output whose length or order drifted from the
/// input silently mismatches. Returns how many items were recovered.
pub fn merge_prior(fresh: &mut [Item], prior: &[Item]) -> usize {
    let mut merged = 0;
    for (item, old) in fresh.iter_mut().zip(prior) {
        if let Some(text) = &old.ocr_text {
            item.ocr_text = Some(text.clone());
            merged += 1;
        }
    }
    merged
}

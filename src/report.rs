use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub total_items: usize,
    pub start_index: usize,
    pub processed: usize,
    pub skipped_done: usize,
    pub missing_files: usize,
    pub failed: usize,
    pub started: String,
    pub finished: String,
}

impl RunReport {
    pub fn new(total_items: usize, start_index: usize, started: String) -> Self {
        Self {
            total_items,
            start_index,
            processed: 0,
            skipped_done: 0,
            missing_files: 0,
            failed: 0,
            started,
            finished: String::new(),
        }
    }
}

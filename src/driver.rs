use crate::{
    checkpoint::{self, CheckpointFile},
    config::Config,
    engine::{OcrEngine, RawLine},
    report::RunReport,
    retry::{with_retry, RetryPolicy},
    store::{self, OcrLine},
    util::now_rfc3339,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The control loop: walks items in order from the resume point, invokes the
/// engine through the retry controller, and persists progress after every
/// completed item. Sole writer of the checkpoint and the output snapshot.
pub struct BatchDriver<E: OcrEngine> {
    cfg: Config,
    engine: E,
}

impl<E: OcrEngine> BatchDriver<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    pub fn run(&self) -> Result<RunReport> {
        let input = PathBuf::from(&self.cfg.paths.input_file);
        let output = PathBuf::from(&self.cfg.paths.output_file);

        let mut items = store::load_items(&input)?;
        let total = items.len();

        // Prior results win over freshly loaded items even when the
        // checkpoint is stale or missing.
        if output.exists() {
            match store::load_items(&output) {
                Ok(prior) => {
                    let merged = store::merge_prior(&mut items, &prior);
                    if merged > 0 {
                        info!("recovered {merged} prior results from {}", output.display());
                    }
                }
                Err(err) => warn!("ignoring unreadable prior output: {err:#}"),
            }
        }

        let ckpt = CheckpointFile::new(Path::new(&self.cfg.paths.checkpoint_file));
        let start = checkpoint::start_index(ckpt.load().as_ref());
        let policy = RetryPolicy::from_config(&self.cfg.retry);

        info!("starting at item {} of {}", start + 1, total);
        let mut report = RunReport::new(total, start, now_rfc3339());

        for i in start..total {
            let label = format!("item {}/{}", i + 1, total);

            if items[i].is_done() {
                info!("{label}: already recognized, skipping");
                report.skipped_done += 1;
                continue;
            }

            let image = PathBuf::from(&items[i].local_image);
            if !image.exists() {
                warn!("{label}: image not found: {}", image.display());
                items[i].ocr_text = Some(Vec::new());
                report.missing_files += 1;
            } else {
                info!("{label}: recognizing {}", image.display());
                match with_retry(&policy, &label, || self.engine.recognize(&image)) {
                    Ok(lines) => {
                        items[i].ocr_text = Some(collect_lines(lines));
                        report.processed += 1;
                    }
                    Err(err) => {
                        warn!("{label}: recognition failed, marking empty: {err}");
                        items[i].ocr_text = Some(Vec::new());
                        report.failed += 1;
                    }
                }
            }

            // Every terminal state persists: checkpoint first, then the
            // snapshot the checkpoint index refers into.
            ckpt.save(i, total)?;
            store::save_snapshot(&output, &items)?;
        }

        store::save_snapshot(&output, &items)?;
        ckpt.clear()?;

        report.finished = now_rfc3339();
        info!(
            "run complete: {} items ({} recognized, {} skipped, {} missing, {} failed)",
            total, report.processed, report.skipped_done, report.missing_files, report.failed
        );
        Ok(report)
    }
}

/// The best candidate of each line becomes the stored text; lines with no
/// candidate at all are dropped.
fn collect_lines(lines: Vec<RawLine>) -> Vec<OcrLine> {
    lines
        .into_iter()
        .filter_map(|l| l.candidates.into_iter().next())
        .map(|c| OcrLine {
            text: c.text,
            confidence: c.score,
        })
        .collect()
}

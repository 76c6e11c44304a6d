//! Layout detection stage: candidate list to layout records

use crate::catalog::classifier::ClassifiedSheet;
use crate::catalog::record::{SheetRecord, load_metadata_store};
use crate::io::error::Result;
use crate::io::image::load_sheet;
use crate::io::progress::ProgressManager;
use crate::io::store::{read_json, read_json_or_default, write_json};
use crate::layout::detector::{ConfidenceTier, LayoutRecord, detect_layout};
use crate::pipeline::paths::CorpusPaths;
use crate::pipeline::summary::StageSummary;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Layout detection stage settings
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectOptions {
    /// Keep sheets already in the layout document instead of redoing them
    pub skip_existing: bool,
}

/// Detect the layout of one sheet, `None` if its image is unusable
pub fn detect_sheet(record: &SheetRecord, corpus_root: &Path) -> Option<LayoutRecord> {
    let file = record.resolve_image_path(corpus_root);
    let sheet = match load_sheet(&file) {
        Ok(sheet) => sheet,
        Err(error) => {
            warn!(sheet = %record.id, %error, "skipping unreadable sheet");
            return None;
        }
    };

    let declared = (record.image_width, record.image_height);
    if declared != (0, 0) && declared != sheet.dimensions() {
        debug!(
            sheet = %record.id,
            declared_w = declared.0,
            declared_h = declared.1,
            actual_w = sheet.width(),
            actual_h = sheet.height(),
            "declared size differs from decoded image"
        );
    }

    let decision = detect_layout(&record.layout_text(), &sheet);
    Some(LayoutRecord::new(record, file, &sheet, decision))
}

/// Detect layouts for every candidate not yet in the layout document
///
/// # Errors
///
/// Returns an error if the candidate list, metadata store or existing layout
/// document cannot be read, or the layout document cannot be written
pub fn run(
    paths: &CorpusPaths,
    options: &DetectOptions,
    pool: &ThreadPool,
    progress: &ProgressManager,
) -> Result<StageSummary> {
    let mut summary = StageSummary::new("detect");
    let candidates: Vec<ClassifiedSheet> = read_json(&paths.candidates)?;
    let records: HashMap<String, SheetRecord> = load_metadata_store(&paths.metadata)?
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();
    summary.seen = candidates.len();

    let mut output: Vec<LayoutRecord> = if options.skip_existing {
        read_json_or_default(&paths.layouts)?
    } else {
        Vec::new()
    };
    let done: HashSet<String> = output.iter().map(|r| r.id.clone()).collect();

    let todo: Vec<&ClassifiedSheet> = candidates
        .iter()
        .filter(|candidate| !done.contains(&candidate.id))
        .collect();
    let bar = progress.start_stage("detect", todo.len());
    summary.already_done = candidates.len() - todo.len();

    let detected: Vec<Option<LayoutRecord>> = pool.install(|| {
        todo.par_iter()
            .map(|candidate| {
                let result = match records.get(&candidate.id) {
                    Some(record) => detect_sheet(record, &paths.root),
                    None => {
                        warn!(sheet = %candidate.id, "candidate missing from metadata store");
                        None
                    }
                };
                bar.advance();
                result
            })
            .collect()
    });
    bar.finish("detected");

    for layout in detected {
        match layout {
            Some(layout) => {
                output.push(layout);
                summary.written += 1;
            }
            None => summary.skipped += 1,
        }
    }

    let mut per_tier: BTreeMap<ConfidenceTier, usize> = BTreeMap::new();
    for layout in &output {
        *per_tier.entry(layout.confidence).or_default() += 1;
    }
    summary.reviewed = per_tier.get(&ConfidenceTier::Unknown).copied().unwrap_or(0);
    info!(?per_tier, "layout detection finished");

    write_json(&paths.layouts, &output)?;
    Ok(summary)
}

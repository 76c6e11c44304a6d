//! Classifier stage: metadata store to candidate list

use crate::catalog::classifier::{ClassifiedSheet, ClassifierConfig, classify_all};
use crate::catalog::record::{SheetRecord, load_metadata_store};
use crate::io::error::Result;
use crate::io::progress::ProgressManager;
use crate::io::store::{read_json_or_default, write_json};
use crate::pipeline::paths::CorpusPaths;
use crate::pipeline::summary::StageSummary;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Classifier stage settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Keyword matching switches
    pub config: ClassifierConfig,
    /// Keep sheets already in the candidate list instead of redoing them
    pub skip_existing: bool,
}

/// Classify every record in the metadata store
///
/// # Errors
///
/// Returns an error if the metadata store or existing candidate list cannot
/// be read, or the candidate list cannot be written
pub fn run(
    paths: &CorpusPaths,
    options: &ClassifyOptions,
    progress: &ProgressManager,
) -> Result<StageSummary> {
    let mut summary = StageSummary::new("classify");
    let records = load_metadata_store(&paths.metadata)?;
    summary.seen = records.len();

    let mut output: Vec<ClassifiedSheet> = if options.skip_existing {
        read_json_or_default(&paths.candidates)?
    } else {
        Vec::new()
    };
    let done: HashSet<String> = output.iter().map(|c| c.id.clone()).collect();
    let (recorded, todo): (Vec<SheetRecord>, Vec<SheetRecord>) = records
        .into_iter()
        .partition(|record| done.contains(&record.id));
    summary.already_done = recorded.len();
    let bar = progress.start_stage("classify", todo.len());

    let fresh = classify_all(&todo, options.config);
    bar.advance_by(todo.len());
    bar.finish("classified");
    summary.written = fresh.len();
    output.extend(fresh);

    let mut per_category: BTreeMap<&'static str, usize> = BTreeMap::new();
    for sheet in &output {
        *per_category.entry(sheet.category.as_str()).or_default() += 1;
    }
    info!(candidates = output.len(), ?per_category, "classification finished");

    write_json(&paths.candidates, &output)?;
    Ok(summary)
}

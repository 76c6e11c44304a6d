//! Extraction stage: validated sheets to frames, the rest to review

use crate::extraction::etl::{ProcessedSheet, Routing, route};
use crate::extraction::review::{ReviewItem, ReviewReason, ensure_review_render, render_path};
use crate::extraction::slicer::{slice_frames, write_frames};
use crate::io::error::{Result, file_system_error};
use crate::io::image::load_sheet;
use crate::io::progress::ProgressManager;
use crate::io::store::{read_json, read_json_or_default, write_json};
use crate::layout::detector::{ConfidenceTier, LayoutRecord};
use crate::pipeline::paths::CorpusPaths;
use crate::pipeline::summary::StageSummary;
use crate::validation::validator::ValidationResult;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use tracing::warn;

/// Extraction stage settings
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Lowest layout tier eligible for extraction
    pub min_confidence: ConfidenceTier,
    /// Keep sheets already processed instead of extracting them again
    pub skip_existing: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_confidence: ConfidenceTier::Low,
            skip_existing: true,
        }
    }
}

enum SheetOutcome {
    Processed(ProcessedSheet),
    Review(ReviewItem),
    Pending,
    Skipped,
}

fn review_item(layout: &LayoutRecord, reason: ReviewReason, paths: &CorpusPaths) -> ReviewItem {
    let render = render_path(&paths.review_renders, &layout.id);
    let reference_path = match ensure_review_render(&layout.file, layout.best_guess(), &render) {
        Ok(path) => path,
        Err(error) => {
            warn!(sheet = %layout.id, %error, "cannot render review image, referencing the sheet");
            layout.file.clone()
        }
    };

    ReviewItem {
        sheet_id: layout.id.clone(),
        title: layout.title.clone(),
        reason,
        reference_path,
    }
}

fn extract_sheet(
    layout: &LayoutRecord,
    validation: Option<&ValidationResult>,
    routing: Routing,
    paths: &CorpusPaths,
) -> SheetOutcome {
    match routing {
        Routing::Pending => SheetOutcome::Pending,
        Routing::Review(reason) => SheetOutcome::Review(review_item(layout, reason, paths)),
        Routing::Extract => {
            let (Some(best), Some(validation)) = (layout.best_layout.as_ref(), validation) else {
                return SheetOutcome::Pending;
            };
            let sheet = match load_sheet(&layout.file) {
                Ok(sheet) => sheet,
                Err(error) => {
                    warn!(sheet = %layout.id, %error, "skipping unreadable sheet");
                    return SheetOutcome::Skipped;
                }
            };

            let frames = slice_frames(&sheet, &layout.id, best, &paths.frames);
            if let Err(error) = write_frames(&frames) {
                warn!(sheet = %layout.id, %error, "skipping sheet whose frames cannot be written");
                return SheetOutcome::Skipped;
            }
            SheetOutcome::Processed(ProcessedSheet::new(
                layout,
                best.clone(),
                validation.clone(),
                &frames,
            ))
        }
    }
}

/// Extract validated sheets and queue the rest for review
///
/// Sheets already in the processed document are left alone, so re-running
/// never duplicates frames or records. Review entries are replaced by id.
///
/// # Errors
///
/// Returns an error if an input document cannot be read, the frame directory
/// cannot be created, or an output document cannot be written. A sheet whose
/// frames cannot be written is logged and skipped.
pub fn run(
    paths: &CorpusPaths,
    options: &ExtractOptions,
    pool: &ThreadPool,
    progress: &ProgressManager,
) -> Result<StageSummary> {
    let mut summary = StageSummary::new("extract");
    let layouts: Vec<LayoutRecord> = read_json(&paths.layouts)?;
    let validation_list: Vec<ValidationResult> = read_json_or_default(&paths.validations)?;
    let validations: HashMap<&str, &ValidationResult> = validation_list
        .iter()
        .map(|result| (result.sheet_id.as_str(), result))
        .collect();
    summary.seen = layouts.len();

    let (mut processed, mut queue): (Vec<ProcessedSheet>, Vec<ReviewItem>) =
        if options.skip_existing {
            (
                read_json_or_default(&paths.processed)?,
                read_json_or_default(&paths.review_queue)?,
            )
        } else {
            (Vec::new(), Vec::new())
        };
    let done: HashSet<String> = processed.iter().map(|p| p.id.clone()).collect();

    let todo: Vec<(&LayoutRecord, Option<&ValidationResult>, Routing)> = layouts
        .iter()
        .filter(|layout| !done.contains(&layout.id))
        .map(|layout| {
            let validation = validations.get(layout.id.as_str()).copied();
            (layout, validation, route(layout, validation, options.min_confidence))
        })
        .collect();
    if todo.iter().any(|(_, _, routing)| *routing == Routing::Extract) {
        fs::create_dir_all(&paths.frames)
            .map_err(|e| file_system_error(&paths.frames, "create frame directory", e))?;
    }
    let bar = progress.start_stage("extract", todo.len());
    summary.already_done = layouts.len() - todo.len();

    let outcomes: Vec<SheetOutcome> = pool.install(|| {
        todo.par_iter()
            .map(|&(layout, validation, routing)| {
                let outcome = extract_sheet(layout, validation, routing, paths);
                bar.advance();
                outcome
            })
            .collect()
    });
    bar.finish("extracted");

    for outcome in outcomes {
        match outcome {
            SheetOutcome::Processed(sheet) => {
                queue.retain(|item| item.sheet_id != sheet.id);
                summary.frames += sheet.frames.len();
                summary.written += 1;
                processed.push(sheet);
            }
            SheetOutcome::Review(item) => {
                summary.reviewed += 1;
                match queue.iter_mut().find(|queued| queued.sheet_id == item.sheet_id) {
                    Some(queued) => *queued = item,
                    None => queue.push(item),
                }
            }
            SheetOutcome::Pending => summary.pending += 1,
            SheetOutcome::Skipped => summary.skipped += 1,
        }
    }

    write_json(&paths.processed, &processed)?;
    write_json(&paths.review_queue, &queue)?;
    Ok(summary)
}

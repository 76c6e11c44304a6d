//! Validation stage: layout records to verdicts and review renderings

use crate::extraction::review::{ensure_review_render, render_path, render_review};
use crate::io::error::Result;
use crate::io::image::load_sheet;
use crate::io::progress::ProgressManager;
use crate::io::store::{read_json, read_json_or_default, write_json};
use crate::layout::detector::LayoutRecord;
use crate::pipeline::paths::CorpusPaths;
use crate::pipeline::summary::StageSummary;
use crate::validation::validator::{ValidationResult, Validator};
use rayon::ThreadPool;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::warn;

/// Validation stage settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Keep sheets already in the validation document instead of redoing them
    pub skip_existing: bool,
}

enum SheetOutcome {
    Validated(ValidationResult),
    NoLayout,
    Skipped,
}

fn validate_sheet(layout: &LayoutRecord, validator: &Validator<'_>, paths: &CorpusPaths) -> SheetOutcome {
    let render = render_path(&paths.review_renders, &layout.id);

    let Some(best) = layout.best_layout.as_ref() else {
        if let Err(error) = ensure_review_render(&layout.file, layout.best_guess(), &render) {
            warn!(sheet = %layout.id, %error, "cannot render review image");
        }
        return SheetOutcome::NoLayout;
    };

    let sheet = match load_sheet(&layout.file) {
        Ok(sheet) => sheet,
        Err(error) => {
            warn!(sheet = %layout.id, %error, "skipping unreadable sheet");
            return SheetOutcome::Skipped;
        }
    };

    let result = validator.validate(&layout.id, &sheet, best);
    if !result.is_validated() {
        if let Err(error) = render_review(&sheet, Some(best), &render) {
            warn!(sheet = %layout.id, %error, "cannot render review image");
        }
    }
    SheetOutcome::Validated(result)
}

/// Validate every selected layout not yet in the validation document
///
/// Sheets without a layout get a review rendering but no validation entry.
///
/// # Errors
///
/// Returns an error if the layout document or existing validation document
/// cannot be read, or the validation document cannot be written
pub fn run(
    paths: &CorpusPaths,
    options: &ValidateOptions,
    validator: &Validator<'_>,
    pool: &ThreadPool,
    progress: &ProgressManager,
) -> Result<StageSummary> {
    let mut summary = StageSummary::new("validate");
    let layouts: Vec<LayoutRecord> = read_json(&paths.layouts)?;
    summary.seen = layouts.len();

    let mut output: Vec<ValidationResult> = if options.skip_existing {
        read_json_or_default(&paths.validations)?
    } else {
        Vec::new()
    };
    let done: HashSet<String> = output.iter().map(|r| r.sheet_id.clone()).collect();

    let todo: Vec<&LayoutRecord> = layouts
        .iter()
        .filter(|layout| !done.contains(&layout.id))
        .collect();
    let bar = progress.start_stage("validate", todo.len());
    summary.already_done = layouts.len() - todo.len();

    let outcomes: Vec<SheetOutcome> = pool.install(|| {
        todo.par_iter()
            .map(|layout| {
                let outcome = validate_sheet(layout, validator, paths);
                bar.advance();
                outcome
            })
            .collect()
    });
    bar.finish("validated");

    for outcome in outcomes {
        match outcome {
            SheetOutcome::Validated(result) => {
                if !result.is_validated() {
                    summary.reviewed += 1;
                }
                output.push(result);
                summary.written += 1;
            }
            SheetOutcome::NoLayout => summary.reviewed += 1,
            SheetOutcome::Skipped => summary.skipped += 1,
        }
    }

    write_json(&paths.validations, &output)?;
    Ok(summary)
}

//! Command-line interface for running the pipeline stage by stage

use crate::catalog::classifier::ClassifierConfig;
use crate::io::configuration::{DEFAULT_CORPUS_DIR, DEFAULT_SCORE_TIMEOUT_SECS};
use crate::io::error::{Result, invalid_parameter};
use crate::io::logging::level_for;
use crate::io::progress::ProgressManager;
use crate::layout::detector::ConfidenceTier;
use crate::pipeline::paths::CorpusPaths;
use crate::pipeline::summary::StageSummary;
use crate::pipeline::{classify, detect, extract, validate};
use crate::validation::scorer::ProcessScorer;
use crate::validation::service::ScoringService;
use crate::validation::validator::{Validator, ValidatorConfig};
use clap::{Args, Parser, Subcommand};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{Level, info, warn};

#[derive(Parser, Debug)]
#[command(name = "spritegrid")]
#[command(
    author,
    version,
    about = "Detect, validate and slice animated sprite sheets"
)]
/// Command-line arguments for the sprite sheet pipeline
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Stage to run
    #[command(subcommand)]
    pub command: Command,

    /// Corpus root holding the metadata store and every stage document
    #[arg(short, long, global = true, default_value = DEFAULT_CORPUS_DIR)]
    pub corpus: PathBuf,

    /// Worker threads for per-sheet work (defaults to one per core)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log per-sheet decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Process sheets even if a stage already recorded them
    #[arg(short, long, global = true)]
    pub no_skip: bool,
}

/// Pipeline stages
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter the metadata store down to animated character sheets
    Classify(ClassifyArgs),
    /// Detect the frame grid of every candidate
    Detect,
    /// Score sampled frames of every detected layout
    Validate(ValidateArgs),
    /// Slice validated sheets into frames and queue the rest for review
    Extract(ExtractArgs),
    /// Run all four stages in order
    Run(RunArgs),
}

/// Classifier stage arguments
#[derive(Args, Debug, Clone, Copy)]
pub struct ClassifyArgs {
    /// Accept sheets whose text never mentions animation
    #[arg(long)]
    pub any_sheet: bool,
}

/// Validation stage arguments
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Aggregate confidence a sheet must exceed to validate
    #[arg(short, long, allow_hyphen_values = true)]
    pub threshold: f64,

    /// Scoring program speaking the line protocol on stdin/stdout
    #[arg(long, value_name = "PROGRAM")]
    pub scorer_cmd: Option<PathBuf>,

    /// Argument passed to the scoring program (repeatable)
    #[arg(long = "scorer-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub scorer_args: Vec<String>,

    /// Scoring budget per sheet in seconds
    #[arg(long, default_value_t = DEFAULT_SCORE_TIMEOUT_SECS)]
    pub score_timeout: u64,
}

/// Extraction stage arguments
#[derive(Args, Debug, Clone, Copy)]
pub struct ExtractArgs {
    /// Lowest layout tier eligible for extraction
    #[arg(long, value_enum, default_value_t = ConfidenceTier::Low)]
    pub min_confidence: ConfidenceTier,
}

/// Arguments of the full pipeline run
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Classifier stage arguments
    #[command(flatten)]
    pub classify: ClassifyArgs,

    /// Validation stage arguments
    #[command(flatten)]
    pub validate: ValidateArgs,

    /// Extraction stage arguments
    #[command(flatten)]
    pub extract: ExtractArgs,
}

impl Cli {
    /// Check if sheets already recorded by a stage should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log level implied by the verbosity flags
    pub const fn log_level(&self) -> Level {
        level_for(self.quiet, self.verbose)
    }
}

/// Load the scoring model once for a run, `None` when it cannot be used
///
/// Without a model every layout is still recorded, failing with
/// `validation_unavailable` so it lands in the review queue.
pub fn load_scoring_service(args: &ValidateArgs) -> Option<ScoringService> {
    let Some(program) = args.scorer_cmd.as_deref() else {
        warn!("no scoring program configured, layouts will go to review");
        return None;
    };

    let service = ProcessScorer::launch(program, &args.scorer_args)
        .and_then(|scorer| ScoringService::spawn(Box::new(scorer)));
    match service {
        Ok(service) => {
            info!(model = service.model_version(), "scoring model loaded");
            Some(service)
        }
        Err(error) => {
            warn!(%error, "scoring model unavailable, layouts will go to review");
            None
        }
    }
}

/// Runs the stages a command asks for against one corpus
pub struct PipelineRunner {
    cli: Cli,
    paths: CorpusPaths,
    progress: ProgressManager,
}

impl PipelineRunner {
    /// Create a runner for the parsed command line
    pub fn new(cli: Cli) -> Self {
        let paths = CorpusPaths::new(&cli.corpus);
        let progress = ProgressManager::new(cli.should_show_progress());
        Self {
            cli,
            paths,
            progress,
        }
    }

    /// Run the requested stages, returning one summary per stage
    ///
    /// # Errors
    ///
    /// Returns an error if arguments are invalid, or a stage cannot read its
    /// input or write its output
    pub fn run(&self) -> Result<Vec<StageSummary>> {
        let start = Instant::now();
        let mut summaries = Vec::new();

        match &self.cli.command {
            Command::Classify(args) => summaries.push(self.classify(*args)?),
            Command::Detect => summaries.push(self.detect(&self.thread_pool()?)?),
            Command::Validate(args) => {
                summaries.push(self.validate(args, &self.thread_pool()?)?);
            }
            Command::Extract(args) => summaries.push(self.extract(*args, &self.thread_pool()?)?),
            Command::Run(args) => {
                let pool = self.thread_pool()?;
                summaries.push(self.classify(args.classify)?);
                summaries.push(self.detect(&pool)?);
                summaries.push(self.validate(&args.validate, &pool)?);
                summaries.push(self.extract(args.extract, &pool)?);
            }
        }

        self.progress.finish();
        for summary in &summaries {
            summary.log();
        }
        info!(elapsed = ?start.elapsed(), "pipeline finished");
        Ok(summaries)
    }

    fn thread_pool(&self) -> Result<ThreadPool> {
        let jobs = self.cli.jobs.unwrap_or(0);
        if self.cli.jobs == Some(0) {
            return Err(invalid_parameter("jobs", &jobs, &"must be at least 1"));
        }
        ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|index| format!("sheet-worker-{index}"))
            .build()
            .map_err(|e| invalid_parameter("jobs", &jobs, &e))
    }

    fn classify(&self, args: ClassifyArgs) -> Result<StageSummary> {
        let options = classify::ClassifyOptions {
            config: ClassifierConfig {
                require_animation_hint: !args.any_sheet,
            },
            skip_existing: self.cli.skip_existing(),
        };
        classify::run(&self.paths, &options, &self.progress)
    }

    fn detect(&self, pool: &ThreadPool) -> Result<StageSummary> {
        let options = detect::DetectOptions {
            skip_existing: self.cli.skip_existing(),
        };
        detect::run(&self.paths, &options, pool, &self.progress)
    }

    fn validate(&self, args: &ValidateArgs, pool: &ThreadPool) -> Result<StageSummary> {
        let config = ValidatorConfig::new(args.threshold, Duration::from_secs(args.score_timeout))?;
        let service = load_scoring_service(args);
        let validator = Validator::new(config, service.as_ref());
        let options = validate::ValidateOptions {
            skip_existing: self.cli.skip_existing(),
        };
        validate::run(&self.paths, &options, &validator, pool, &self.progress)
    }

    fn extract(&self, args: ExtractArgs, pool: &ThreadPool) -> Result<StageSummary> {
        let options = extract::ExtractOptions {
            min_confidence: args.min_confidence,
            skip_existing: self.cli.skip_existing(),
        };
        extract::run(&self.paths, &options, pool, &self.progress)
    }
}

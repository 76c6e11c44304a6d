//! Pipeline constants and runtime configuration defaults

// Corpus layout, relative to the corpus root
/// Default corpus root directory
pub const DEFAULT_CORPUS_DIR: &str = "corpus";
/// Metadata store written by the acquisition component
pub const METADATA_STORE: &str = "metadata";
/// Classifier output document
pub const CANDIDATES_FILE: &str = "animated_character_sheets.json";
/// Layout detector output document
pub const LAYOUTS_FILE: &str = "sprite_layouts.json";
/// Validator output document
pub const VALIDATIONS_FILE: &str = "validated_layouts.json";
/// Directory of grid-overlay renderings for sheets needing review
pub const REVIEW_RENDER_DIR: &str = "review_renders";
/// Directory of extracted frame images
pub const FRAMES_DIR: &str = "extracted_sprites";
/// Processed metadata document
pub const PROCESSED_FILE: &str = "processed/processed_sprites.json";
/// Review queue document
pub const REVIEW_QUEUE_FILE: &str = "needs_review/review_queue.json";

// File names stay well under the 255-byte limit of common file systems
/// Longest sanitized sheet id used verbatim in a file name
pub const MAX_FILE_STEM_ID_LEN: usize = 120;
/// Bytes of the id digest appended to shortened ids
pub const FILE_STEM_DIGEST_BYTES: usize = 8;

// Text extraction bounds on declared frame sizes
/// Smallest frame edge accepted from free text
pub const MIN_TEXT_FRAME_SIZE: u32 = 8;
/// Largest frame edge accepted from free text
pub const MAX_TEXT_FRAME_SIZE: u32 = 512;

/// Frame edges tried by the brute-force strategy, combined as width x height
pub const CANONICAL_FRAME_SIZES: [u32; 8] = [8, 16, 24, 32, 48, 64, 96, 128];

// Separator pitches below this are treated as noise inside a single sprite
/// Minimum frame pitch accepted from boundary analysis
pub const MIN_BOUNDARY_PITCH: u32 = 4;

/// Waste accepted for a boundary-derived layout (exclusive)
pub const VISION_WASTE_TOLERANCE: f64 = 0.05;
/// Waste accepted for a brute-force layout (exclusive)
pub const HEURISTIC_WASTE_TOLERANCE: f64 = 0.15;

/// Sampled positions expressed in quarters of the frame count
pub const SAMPLE_QUARTERS: [u32; 4] = [0, 1, 2, 3];

/// Descriptions of a correctly framed subject
pub const POSITIVE_PROMPTS: [&str; 2] = [
    "a complete character centered in frame",
    "a character sprite centered in frame",
];

/// Descriptions of a wrongly framed cell
pub const NEGATIVE_PROMPTS: [&str; 3] = [
    "a cropped character at the edge",
    "an empty frame",
    "partial sprite cut off at frame boundary",
];

/// Default per-sheet scoring budget in seconds
pub const DEFAULT_SCORE_TIMEOUT_SECS: u64 = 30;
/// Longest per-sheet scoring budget accepted, in seconds
pub const MAX_SCORE_TIMEOUT_SECS: u64 = 86_400;

// First line a scoring process prints once its weights are loaded
/// Handshake prefix of the scoring process
pub const SCORER_READY_PREFIX: &str = "ready";
/// How often the watchdog checks the call in flight, in milliseconds
pub const SCORER_WATCHDOG_POLL_MS: u64 = 25;
/// Time a call may run past its sheet deadline before it is killed, in milliseconds
pub const SCORER_INTERRUPT_GRACE_MS: u64 = 250;

/// Grid line colour used in review renderings
pub const REVIEW_GRID_COLOR: [u8; 4] = [255, 0, 255, 255];

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

//! Frame sizes and frame counts declared in free text
//!
//! Titles like "Knight 16x16, 8 frames" declare the frame size and sometimes
//! the frame count. A declared size is only trusted when it tiles the image
//! exactly and agrees with the declared count.

use crate::io::configuration::{MAX_TEXT_FRAME_SIZE, MIN_TEXT_FRAME_SIZE};
use crate::layout::candidate::{DetectionMethod, LayoutCandidate};
use regex::Regex;
use std::sync::LazyLock;

static SIZE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{1,4})\s*[x×]\s*(\d{1,4})").ok());

// The leading class keeps the height of "16x16 frames" from reading as a count
static COUNT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[^0-9x×])(\d{1,5})\s*(?:total\s+)?(?:animation\s+)?(?:frames?|sprites?|poses?)\b",
    )
    .ok()
});

/// Every in-range `WxH` size mentioned in the text, in order of appearance
pub fn parse_frame_sizes(text: &str) -> Vec<(u32, u32)> {
    let Some(pattern) = SIZE_PATTERN.as_ref() else {
        return Vec::new();
    };
    let lowered = text.to_lowercase();
    let allowed = MIN_TEXT_FRAME_SIZE..=MAX_TEXT_FRAME_SIZE;

    pattern
        .captures_iter(&lowered)
        .filter_map(|caps| {
            let w = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let h = caps.get(2)?.as_str().parse::<u32>().ok()?;
            (allowed.contains(&w) && allowed.contains(&h)).then_some((w, h))
        })
        .collect()
}

/// First frame count declared in the text, if any
pub fn parse_frame_count(text: &str) -> Option<u32> {
    let pattern = COUNT_PATTERN.as_ref()?;
    let lowered = text.to_lowercase();
    pattern
        .captures_iter(&lowered)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .find(|&count| count > 0)
}

/// Whether a declared count fits a grid
///
/// The count must fill every row but the last, leaving at most a partially
/// used final row.
pub const fn count_is_plausible(count: u32, cols: u32, rows: u32) -> bool {
    let cells = cols * rows;
    count <= cells && count > cells.saturating_sub(cols)
}

/// Propose a layout from sizes declared in the sheet's text
///
/// Sizes are tried in order of appearance; the first one that divides both
/// image dimensions and agrees with any declared count wins. A size equal to
/// the whole image loses to any later dividing size.
pub fn propose(text: &str, image_w: u32, image_h: u32) -> Option<LayoutCandidate> {
    let count_hint = parse_frame_count(text);

    let mut fits = parse_frame_sizes(text).into_iter().filter_map(|(w, h)| {
        if image_w % w != 0 || image_h % h != 0 {
            return None;
        }
        let candidate = LayoutCandidate::fit(image_w, image_h, w, h, DetectionMethod::Text)?;
        match count_hint {
            Some(count) if count_is_plausible(count, candidate.cols, candidate.rows) => {
                candidate.with_total_frames(count)
            }
            Some(_) => None,
            None => Some(candidate),
        }
    });

    let first = fits.next()?;
    if (first.frame_w, first.frame_h) != (image_w, image_h) {
        return Some(first);
    }
    fits.next().or(Some(first))
}

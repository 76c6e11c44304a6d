//! Slicing a validated sheet into frame images

use crate::io::configuration::{FILE_STEM_DIGEST_BYTES, MAX_FILE_STEM_ID_LEN};
use crate::io::error::Result;
use crate::io::image::{crop_region, save_png};
use crate::layout::candidate::LayoutCandidate;
use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// One frame cut from a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFrame {
    /// Sheet the frame came from
    pub sheet_id: String,
    /// Row-major frame index
    pub index: u32,
    /// Zero-based grid row
    pub row: u32,
    /// Zero-based grid column
    pub col: u32,
    /// Left edge in the sheet
    pub x: u32,
    /// Top edge in the sheet
    pub y: u32,
    /// Frame pixels
    pub pixels: RgbaImage,
    /// Destination file
    pub output_path: PathBuf,
}

/// Make a sheet id safe to embed in a file name
///
/// Anything other than ASCII letters, digits, `-`, `_` and `.` becomes `_`.
pub fn sanitize_id(sheet_id: &str) -> String {
    sheet_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File-name stem for a sheet's outputs
///
/// Long ids are cut to [`MAX_FILE_STEM_ID_LEN`] characters and suffixed with
/// a digest of the full id, so distinct ids keep distinct names.
pub fn file_stem(sheet_id: &str) -> String {
    let clean = sanitize_id(sheet_id);
    if clean.len() <= MAX_FILE_STEM_ID_LEN {
        return clean;
    }
    let digest: String = Sha256::digest(sheet_id.as_bytes())
        .iter()
        .take(FILE_STEM_DIGEST_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect();
    let head: String = clean.chars().take(MAX_FILE_STEM_ID_LEN).collect();
    format!("{head}-{digest}")
}

/// File name of a frame, `{sheet_id}_{row}_{col}.png`
pub fn frame_file_name(sheet_id: &str, row: u32, col: u32) -> String {
    format!("{}_{row}_{col}.png", file_stem(sheet_id))
}

/// Cut every used cell of a layout out of the sheet
///
/// Cells past `total_frames` are left out.
pub fn slice_frames(
    sheet: &RgbaImage,
    sheet_id: &str,
    layout: &LayoutCandidate,
    frames_dir: &Path,
) -> Vec<ExtractedFrame> {
    layout
        .cells()
        .map(|cell| ExtractedFrame {
            sheet_id: sheet_id.to_string(),
            index: cell.index,
            row: cell.row,
            col: cell.col,
            x: cell.x,
            y: cell.y,
            pixels: crop_region(sheet, cell.x, cell.y, layout.frame_w, layout.frame_h),
            output_path: frames_dir.join(frame_file_name(sheet_id, cell.row, cell.col)),
        })
        .collect()
}

/// Write every frame to its output path
///
/// On failure the frames already written for the sheet are removed again.
///
/// # Errors
///
/// Returns the first write failure
pub fn write_frames(frames: &[ExtractedFrame]) -> Result<()> {
    let written = frames
        .iter()
        .try_for_each(|frame| save_png(&frame.pixels, &frame.output_path));
    if written.is_err() {
        for frame in frames {
            let _ = fs::remove_file(&frame.output_path);
        }
    }
    written
}

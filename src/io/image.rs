//! Sprite sheet decoding, cell cropping and PNG export

use crate::io::configuration::REVIEW_GRID_COLOR;
use crate::io::error::{PipelineError, Result, file_system_error};
use crate::layout::candidate::LayoutCandidate;
use image::{Rgba, RgbaImage, imageops};
use std::path::Path;

/// Decode a sprite sheet into RGBA pixels
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or is not a decodable image
/// - The decoded image has a zero width or height
pub fn load_sheet(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| PipelineError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rgba = img.to_rgba8();

    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(PipelineError::InvalidSourceData {
            reason: format!("'{}' has no pixels", path.display()),
        });
    }

    Ok(rgba)
}

/// Copy one rectangular region out of a sheet
///
/// Regions extending past the sheet are clamped to its bounds.
pub fn crop_region(sheet: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    imageops::crop_imm(sheet, x, y, width, height).to_image()
}

/// Save an image as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the
/// image cannot be encoded to the given path
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| file_system_error(parent, "create directory", e))?;
    }

    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PipelineError::ImageExport {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Draw a layout's cell borders over a copy of the sheet
///
/// Each cell gets a 1-px outline on its top and left edge; the right and
/// bottom edges of the grid close it off. Without a layout the sheet is
/// returned unchanged.
pub fn render_grid_overlay(sheet: &RgbaImage, layout: Option<&LayoutCandidate>) -> RgbaImage {
    let mut canvas = sheet.clone();
    let Some(layout) = layout else {
        return canvas;
    };
    if layout.frame_w == 0 || layout.frame_h == 0 {
        return canvas;
    }

    let grid_w = (layout.cols * layout.frame_w).min(canvas.width());
    let grid_h = (layout.rows * layout.frame_h).min(canvas.height());
    let color = Rgba(REVIEW_GRID_COLOR);

    for col in 0..=layout.cols {
        let x = (col * layout.frame_w).min(grid_w.saturating_sub(1));
        for y in 0..grid_h {
            canvas.put_pixel(x, y, color);
        }
    }

    for row in 0..=layout.rows {
        let y = (row * layout.frame_h).min(grid_h.saturating_sub(1));
        for x in 0..grid_w {
            canvas.put_pixel(x, y, color);
        }
    }

    canvas
}

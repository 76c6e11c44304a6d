//! Layout candidates and the grid geometry they describe

use serde::{Deserialize, Serialize};

/// Strategy that produced a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Frame size declared in the sheet's text
    Text,
    /// Frame pitch inferred from empty separator rows and columns
    VisionBoundary,
    /// Best fit among canonical frame sizes
    Heuristic,
}

/// A uniform rectangular grid proposed for one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCandidate {
    /// Frame width in pixels
    #[serde(rename = "sprite_w")]
    pub frame_w: u32,
    /// Frame height in pixels
    #[serde(rename = "sprite_h")]
    pub frame_h: u32,
    /// Grid columns
    pub cols: u32,
    /// Grid rows
    pub rows: u32,
    /// Frames in use, counted row-major from the top-left cell
    pub total_frames: u32,
    /// Grid covers the image exactly
    pub perfect_fit: bool,
    /// Fraction of image area outside the grid, in `[0, 1)`
    pub waste_percentage: f64,
    /// Producing strategy
    pub method: DetectionMethod,
}

/// One cell of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Row-major frame index
    pub index: u32,
    /// Zero-based row
    pub row: u32,
    /// Zero-based column
    pub col: u32,
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
}

impl LayoutCandidate {
    /// Tile an image with as many whole frames as fit
    ///
    /// All cells count as frames. Returns `None` for zero-sized frames or
    /// frames larger than the image.
    pub fn fit(
        image_w: u32,
        image_h: u32,
        frame_w: u32,
        frame_h: u32,
        method: DetectionMethod,
    ) -> Option<Self> {
        if frame_w == 0 || frame_h == 0 || frame_w > image_w || frame_h > image_h {
            return None;
        }

        let cols = image_w / frame_w;
        let rows = image_h / frame_h;
        let perfect_fit = cols * frame_w == image_w && rows * frame_h == image_h;
        let waste_percentage = if perfect_fit {
            0.0
        } else {
            waste_fraction(image_w, image_h, frame_w, frame_h, cols, rows)
        };

        Some(Self {
            frame_w,
            frame_h,
            cols,
            rows,
            total_frames: cols * rows,
            perfect_fit,
            waste_percentage,
            method,
        })
    }

    /// Restrict the frame count to a number of leading cells
    ///
    /// Returns `None` unless `1 <= total_frames <= cols * rows`.
    #[must_use]
    pub fn with_total_frames(self, total_frames: u32) -> Option<Self> {
        (1..=self.cell_count())
            .contains(&total_frames)
            .then_some(Self {
                total_frames,
                ..self
            })
    }

    /// Number of grid cells, used or not
    pub const fn cell_count(&self) -> u32 {
        self.cols * self.rows
    }

    /// Pixels covered by the grid's cells
    pub fn used_area(&self) -> u64 {
        u64::from(self.frame_w)
            * u64::from(self.frame_h)
            * u64::from(self.cols)
            * u64::from(self.rows)
    }

    /// Geometry of one frame, `None` past `total_frames`
    pub const fn cell(&self, index: u32) -> Option<GridCell> {
        if index >= self.total_frames || self.cols == 0 {
            return None;
        }
        let row = index / self.cols;
        let col = index % self.cols;
        Some(GridCell {
            index,
            row,
            col,
            x: col * self.frame_w,
            y: row * self.frame_h,
        })
    }

    /// Every used cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.total_frames).filter_map(|index| self.cell(index))
    }
}

/// Fraction of the image area left uncovered by a grid
///
/// `1 - (frame_w * frame_h * cols * rows) / (image_w * image_h)`, clamped to
/// `[0, 1]` for grids larger than the image.
pub fn waste_fraction(
    image_w: u32,
    image_h: u32,
    frame_w: u32,
    frame_h: u32,
    cols: u32,
    rows: u32,
) -> f64 {
    let image_area = u64::from(image_w) * u64::from(image_h);
    if image_area == 0 {
        return 1.0;
    }
    let used = u64::from(frame_w) * u64::from(frame_h) * u64::from(cols) * u64::from(rows);
    let covered = used.min(image_area);
    (image_area - covered) as f64 / image_area as f64
}

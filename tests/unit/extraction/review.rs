//! Tests for review entries and overlay renderings

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use spritegrid::PipelineError;
    use spritegrid::extraction::review::{
        ReviewItem, ReviewReason, ensure_review_render, render_path, render_review,
    };
    use spritegrid::io::configuration::REVIEW_GRID_COLOR;
    use spritegrid::io::image::{load_sheet, save_png};
    use spritegrid::layout::candidate::{DetectionMethod, LayoutCandidate};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // Tests reason labels in documents
    // Verified by changing a serde rename
    #[test]
    fn test_reason_labels() {
        let reasons = [
            ReviewReason::NoLayout,
            ReviewReason::LowConfidence,
            ReviewReason::ValidationFailed,
            ReviewReason::ValidationUnavailable,
        ];
        for reason in reasons {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
        }
        assert_eq!(ReviewReason::NoLayout.as_str(), "no_layout");
    }

    // Tests render paths use the sanitized id
    // Verified by joining the raw id
    #[test]
    fn test_render_path() {
        assert_eq!(
            render_path(Path::new("renders"), "a/b"),
            PathBuf::from("renders/a_b.png")
        );
    }

    // Tests a rendering carries the grid
    // Verified by saving the sheet without the overlay
    #[test]
    fn test_render_review() {
        let dir = TempDir::new().unwrap();
        let sheet = RgbaImage::from_pixel(32, 16, Rgba([1, 2, 3, 255]));
        let layout = LayoutCandidate::fit(32, 16, 16, 16, DetectionMethod::Heuristic).unwrap();
        let output = dir.path().join("r/s.png");

        render_review(&sheet, Some(&layout), &output).unwrap();

        let rendered = load_sheet(&output).unwrap();
        assert_eq!(*rendered.get_pixel(16, 8), Rgba(REVIEW_GRID_COLOR));
        assert_eq!(*rendered.get_pixel(8, 8), Rgba([1, 2, 3, 255]));
    }

    // Tests an existing rendering is reused without reading the sheet
    // Verified by always re-rendering
    #[test]
    fn test_ensure_reuses_existing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("s.png");
        save_png(&RgbaImage::new(2, 2), &output).unwrap();

        let path = ensure_review_render(&dir.path().join("missing.png"), None, &output).unwrap();

        assert_eq!(path, output);
    }

    // Tests a missing rendering is created from the sheet file
    // Verified by returning the path without writing it
    #[test]
    fn test_ensure_creates_missing() {
        let dir = TempDir::new().unwrap();
        let sheet_path = dir.path().join("sheet.png");
        save_png(&RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255])), &sheet_path).unwrap();
        let output = dir.path().join("renders/s.png");

        let path = ensure_review_render(&sheet_path, None, &output).unwrap();

        assert_eq!(load_sheet(&path).unwrap().dimensions(), (8, 8));
    }

    // Tests an unreadable sheet cannot be rendered
    // Verified by writing a blank rendering on load failure
    #[test]
    fn test_ensure_unreadable_sheet() {
        let dir = TempDir::new().unwrap();

        let result = ensure_review_render(
            &dir.path().join("missing.png"),
            None,
            &dir.path().join("out.png"),
        );

        assert!(matches!(result, Err(PipelineError::ImageLoad { .. })));
    }

    // Tests review items round-trip through their document form
    // Verified by renaming the reason field
    #[test]
    fn test_review_item_document() {
        let item = ReviewItem {
            sheet_id: "7".to_string(),
            title: "Knight".to_string(),
            reason: ReviewReason::ValidationFailed,
            reference_path: PathBuf::from("review_renders/7.png"),
        };

        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["reason"], "validation_failed");
        assert_eq!(serde_json::from_value::<ReviewItem>(json).unwrap(), item);
    }
}

//! Tests for sheet decoding, cropping, PNG export and grid overlays

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use spritegrid::PipelineError;
    use spritegrid::io::configuration::REVIEW_GRID_COLOR;
    use spritegrid::io::image::{crop_region, load_sheet, render_grid_overlay, save_png};
    use spritegrid::layout::candidate::{DetectionMethod, LayoutCandidate};
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 40, 255])
        })
    }

    // Tests saved sheets load back pixel for pixel into nested directories
    // Verified by skipping parent directory creation
    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/sheet.png");
        let img = gradient(20, 12);

        save_png(&img, &path).unwrap();
        let loaded = load_sheet(&path).unwrap();

        assert_eq!(loaded, img);
    }

    // Tests missing and undecodable files fail with ImageLoad
    // Verified by mapping decode errors to InvalidSourceData
    #[test]
    fn test_load_failures() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(matches!(
            load_sheet(&missing),
            Err(PipelineError::ImageLoad { .. })
        ));

        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").unwrap();
        assert!(matches!(
            load_sheet(&junk),
            Err(PipelineError::ImageLoad { .. })
        ));
    }

    // Tests crops copy the exact region and clamp at the edges
    // Verified by swapping x and y offsets
    #[test]
    fn test_crop_region() {
        let img = gradient(20, 12);

        let crop = crop_region(&img, 5, 3, 4, 2);
        assert_eq!(crop.dimensions(), (4, 2));
        assert_eq!(crop.get_pixel(0, 0), img.get_pixel(5, 3));
        assert_eq!(crop.get_pixel(3, 1), img.get_pixel(8, 4));

        let clamped = crop_region(&img, 18, 10, 8, 8);
        assert_eq!(clamped.dimensions(), (2, 2));
    }

    // Tests the overlay draws cell borders and leaves cell interiors alone
    // Verified by drawing only the outer border
    #[test]
    fn test_render_grid_overlay() {
        let img = gradient(16, 8);
        let layout = LayoutCandidate::fit(16, 8, 8, 8, DetectionMethod::Heuristic).unwrap();
        let grid = Rgba(REVIEW_GRID_COLOR);

        let overlay = render_grid_overlay(&img, Some(&layout));

        assert_eq!(overlay.dimensions(), img.dimensions());
        assert_eq!(*overlay.get_pixel(0, 4), grid);
        assert_eq!(*overlay.get_pixel(8, 4), grid);
        assert_eq!(*overlay.get_pixel(15, 4), grid);
        assert_eq!(*overlay.get_pixel(4, 0), grid);
        assert_eq!(*overlay.get_pixel(4, 7), grid);
        assert_eq!(overlay.get_pixel(4, 4), img.get_pixel(4, 4));
        assert_eq!(overlay.get_pixel(12, 3), img.get_pixel(12, 3));
    }

    // Tests the overlay without a layout is a plain copy
    // Verified by drawing a default grid when none is given
    #[test]
    fn test_render_without_layout() {
        let img = gradient(10, 10);

        assert_eq!(render_grid_overlay(&img, None), img);
    }
}

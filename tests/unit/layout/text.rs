//! Tests for frame size and count extraction from free text

#[cfg(test)]
mod tests {
    use spritegrid::layout::candidate::DetectionMethod;
    use spritegrid::layout::text::{
        count_is_plausible, parse_frame_count, parse_frame_sizes, propose,
    };

    // Tests sizes in several spellings, in order of appearance
    // Verified by requiring no whitespace around the separator
    #[test]
    fn test_parse_frame_sizes() {
        assert_eq!(
            parse_frame_sizes("Knight 32x32 and 64 X 48, also 16×24"),
            vec![(32, 32), (64, 48), (16, 24)]
        );
        assert!(parse_frame_sizes("no sizes here").is_empty());
    }

    // Tests sizes outside the accepted bounds are ignored
    // Verified by dropping the lower bound
    #[test]
    fn test_parse_frame_sizes_bounds() {
        assert!(parse_frame_sizes("4x4 icons").is_empty());
        assert!(parse_frame_sizes("1024x1024 sheet").is_empty());
        assert_eq!(parse_frame_sizes("8x512"), vec![(8, 512)]);
    }

    // Tests counts with and without qualifiers
    // Verified by removing the optional animation qualifier
    #[test]
    fn test_parse_frame_count() {
        assert_eq!(parse_frame_count("walk cycle, 8 frames"), Some(8));
        assert_eq!(parse_frame_count("12 animation frames"), Some(12));
        assert_eq!(parse_frame_count("40 total sprites"), Some(40));
        assert_eq!(parse_frame_count("6 Poses"), Some(6));
        assert_eq!(parse_frame_count("1 frame"), Some(1));
        assert_eq!(parse_frame_count("frames galore"), None);
    }

    // Tests a size immediately followed by a frame word is not a count
    // Verified by dropping the leading character class
    #[test]
    fn test_size_is_not_count() {
        assert_eq!(parse_frame_count("16x16 frames"), None);
        assert_eq!(parse_frame_count("16x16 frames, 4 frames"), Some(4));
    }

    // Tests plausibility admits only a partially filled last row
    // Verified by accepting any count up to the cell total
    #[test]
    fn test_count_is_plausible() {
        assert!(count_is_plausible(8, 4, 2));
        assert!(count_is_plausible(5, 4, 2));
        assert!(!count_is_plausible(4, 4, 2));
        assert!(!count_is_plausible(9, 4, 2));
        assert!(count_is_plausible(1, 1, 1));
    }

    // Tests a dividing size with an agreeing count
    // Verified by ignoring the declared count
    #[test]
    fn test_propose_with_count() {
        let layout = propose("Slime 16x16, 6 frames", 64, 32).unwrap();

        assert_eq!((layout.frame_w, layout.frame_h), (16, 16));
        assert_eq!(layout.total_frames, 6);
        assert!(layout.perfect_fit);
        assert_eq!(layout.method, DetectionMethod::Text);
    }

    // Tests non-dividing sizes fall through to later mentions
    // Verified by stopping at the first mention
    #[test]
    fn test_propose_skips_non_dividing() {
        let layout = propose("24x24 upscaled to 32x32", 128, 64).unwrap();

        assert_eq!((layout.frame_w, layout.frame_h), (32, 32));
        assert_eq!(layout.total_frames, 8);
    }

    // Tests the sheet's own size gives way to a frame size mentioned later
    // Verified by taking the first dividing size
    #[test]
    fn test_propose_prefers_frame_over_sheet_size() {
        let layout = propose("Hero sheet 256x128 with 16x16 walk cycle", 256, 128).unwrap();

        assert_eq!((layout.frame_w, layout.frame_h), (16, 16));
        assert_eq!((layout.cols, layout.rows), (16, 8));

        let whole = propose("Boss portrait 64x64", 64, 64).unwrap();
        assert_eq!((whole.cols, whole.rows), (1, 1));
    }

    // Tests a contradicting count rejects an otherwise dividing size
    // Verified by falling back to the full grid on disagreement
    #[test]
    fn test_propose_rejects_contradicting_count() {
        assert!(propose("16x16, 3 frames", 64, 32).is_none());
        assert!(propose("16x16, 20 frames", 64, 32).is_none());
    }

    // Tests text without a size proposes nothing
    // Verified by defaulting to a canonical size
    #[test]
    fn test_propose_without_size() {
        assert!(propose("Knight walk cycle", 64, 64).is_none());
    }
}

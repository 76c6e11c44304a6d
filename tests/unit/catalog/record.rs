//! Tests for metadata store records and loading

#[cfg(test)]
mod tests {
    use spritegrid::PipelineError;
    use spritegrid::catalog::record::{SheetRecord, load_metadata_store};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> SheetRecord {
        SheetRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: "Walk cycle for a Knight".to_string(),
            tags: vec!["Pixel Art".to_string(), "RPG".to_string()],
            image_path: PathBuf::from(format!("sheets/{id}.png")),
            image_width: 0,
            image_height: 0,
        }
    }

    // Tests search text covers every field and is lowercased
    // Verified by dropping the tags from the search text
    #[test]
    fn test_search_text_joins_and_lowercases() {
        let text = record("a", "Hero SHEET").search_text();

        assert!(text.contains("hero sheet"));
        assert!(text.contains("knight"));
        assert!(text.contains("pixel art"));
        assert!(text.contains("rpg"));
        assert_eq!(text, text.to_lowercase());
    }

    // Tests layout text leaves tags out and keeps case
    // Verified by reusing the search text for layout hints
    #[test]
    fn test_layout_text_excludes_tags() {
        let text = record("a", "32x32 Hero").layout_text();

        assert!(text.contains("32x32 Hero"));
        assert!(text.contains("Walk cycle"));
        assert!(!text.contains("RPG"));
    }

    // Tests relative paths prefer the corpus root when the file exists there
    // Verified by always joining with the corpus root
    #[test]
    fn test_resolve_image_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sheets")).unwrap();
        fs::write(dir.path().join("sheets/a.png"), b"png").unwrap();

        let present = record("a", "t");
        assert_eq!(
            present.resolve_image_path(dir.path()),
            dir.path().join("sheets/a.png")
        );

        let missing = record("b", "t");
        assert_eq!(
            missing.resolve_image_path(dir.path()),
            PathBuf::from("sheets/b.png")
        );

        let mut absolute = record("c", "t");
        absolute.image_path = dir.path().join("elsewhere.png");
        assert_eq!(
            absolute.resolve_image_path(Path::new("unused")),
            dir.path().join("elsewhere.png")
        );
    }

    // Tests optional fields default and the local_path alias
    // Verified by removing the serde alias
    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"id": "7", "title": "Slime", "local_path": "img/7.png"}"#;
        let parsed: SheetRecord = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.image_path, PathBuf::from("img/7.png"));
        assert!(parsed.description.is_empty());
        assert!(parsed.tags.is_empty());
        assert_eq!((parsed.image_width, parsed.image_height), (0, 0));
    }

    // Tests a directory store loads every json file sorted by id
    // Verified by skipping the sort
    #[test]
    fn test_load_directory_store() {
        let dir = TempDir::new().unwrap();
        for id in ["c", "a", "b"] {
            let json = serde_json::to_string(&record(id, id)).unwrap();
            fs::write(dir.path().join(format!("{id}.json")), json).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = load_metadata_store(dir.path()).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    // Tests a single array document loads the same way
    // Verified by only accepting directories
    #[test]
    fn test_load_array_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        let json = serde_json::to_string(&vec![record("b", "b"), record("a", "a")]).unwrap();
        fs::write(&path, json).unwrap();

        let records = load_metadata_store(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
    }

    // Tests duplicate ids are rejected
    // Verified by removing the duplicate check
    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        let json = serde_json::to_string(&vec![record("a", "x"), record("a", "y")]).unwrap();
        fs::write(&path, json).unwrap();

        let result = load_metadata_store(&path);

        assert!(matches!(result, Err(PipelineError::InvalidSourceData { .. })));
    }

    // Tests a missing store is an error rather than an empty corpus
    // Verified by returning an empty list for missing paths
    #[test]
    fn test_load_missing_store() {
        let dir = TempDir::new().unwrap();

        let result = load_metadata_store(&dir.path().join("nothing"));

        assert!(matches!(result, Err(PipelineError::InvalidSourceData { .. })));
    }

    // Tests a malformed record file is skipped and the rest still load
    // Verified by failing the whole load on one bad file
    #[test]
    fn test_load_skips_malformed_record() {
        let dir = TempDir::new().unwrap();
        let json = serde_json::to_string(&record("a", "a")).unwrap();
        fs::write(dir.path().join("a.json"), json).unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let records = load_metadata_store(dir.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    // Tests a malformed array store fails the load
    // Verified by treating a broken array as an empty store
    #[test]
    fn test_load_malformed_array_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, "[{ not json").unwrap();

        let result = load_metadata_store(&path);

        assert!(matches!(result, Err(PipelineError::Artifact { .. })));
    }
}

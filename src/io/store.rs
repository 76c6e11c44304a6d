//! JSON stage documents acting as pipeline checkpoints

use crate::io::error::{Result, artifact_error, file_system_error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read a whole JSON document
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not hold a
/// document of the expected shape
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path).map_err(|e| file_system_error(path, "open", e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| artifact_error(path, "read", e))
}

/// Read a JSON document, treating a missing file as an empty one
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if path.exists() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}

/// Write a JSON document, replacing any previous version
///
/// The document is written next to its destination and renamed into place,
/// so an interrupted run never leaves a truncated checkpoint behind.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the
/// document cannot be serialized, written or renamed
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| file_system_error(parent, "create directory", e))?;
    }

    let mut staging_name = path.file_name().unwrap_or_default().to_os_string();
    staging_name.push(".partial");
    let staging = path.with_file_name(staging_name);

    {
        let file = fs::File::create(&staging).map_err(|e| file_system_error(&staging, "create", e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|e| artifact_error(&staging, "write", e))?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| file_system_error(&staging, "write", e))?;
    }

    fs::rename(&staging, path).map_err(|e| file_system_error(path, "rename", e))
}

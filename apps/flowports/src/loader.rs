//! # Snapshot Loader
//!
//! File I/O for snapshots. Decoding itself is delegated to `flowports-core`.
//!
//! The format is inferred from content: binary if the data starts with the
//! snapshot magic bytes, JSON otherwise.

use flowports_core::{FlowError, Snapshot, is_binary_snapshot, snapshot_from_bytes, snapshot_to_bytes};
use std::path::{Path, PathBuf};

/// Encoding used when writing a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Binary,
}

impl SnapshotFormat {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Binary => "binary",
        }
    }
}

impl std::str::FromStr for SnapshotFormat {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(SnapshotFormat::Json),
            "binary" | "bin" => Ok(SnapshotFormat::Binary),
            other => Err(FlowError::InvalidArgument(format!(
                "unknown snapshot format '{}' (expected json or binary)",
                other
            ))),
        }
    }
}

/// Validate that `path` is an existing regular file no larger than `max_size`.
fn validate_input_file(path: &Path, max_size: u64) -> Result<PathBuf, FlowError> {
    let canonical = path.canonicalize().map_err(|e| {
        FlowError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FlowError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| FlowError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(FlowError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }

    Ok(canonical)
}

/// Decode a snapshot from JSON or binary bytes.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, FlowError> {
    if is_binary_snapshot(bytes) {
        return snapshot_from_bytes(bytes);
    }
    serde_json::from_slice(bytes).map_err(|e| FlowError::DeserializationError(e.to_string()))
}

/// Encode a snapshot in the requested format.
pub fn encode_snapshot(snapshot: &Snapshot, format: SnapshotFormat) -> Result<Vec<u8>, FlowError> {
    match format {
        SnapshotFormat::Binary => snapshot_to_bytes(snapshot),
        SnapshotFormat::Json => serde_json::to_vec_pretty(snapshot)
            .map_err(|e| FlowError::SerializationError(e.to_string())),
    }
}

/// Read and decode the snapshot at `path`.
pub fn load_snapshot(path: &Path, max_size: u64) -> Result<Snapshot, FlowError> {
    let validated = validate_input_file(path, max_size)?;
    let bytes = std::fs::read(&validated)
        .map_err(|e| FlowError::IoError(format!("Read file: {}", e)))?;

    let snapshot = decode_snapshot(&bytes)?;
    tracing::info!(path = %validated.display(), bytes = bytes.len(), "snapshot loaded");
    Ok(snapshot)
}

/// Encode `snapshot` and write it to `path`.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path, format: SnapshotFormat) -> Result<(), FlowError> {
    let bytes = encode_snapshot(snapshot, format)?;
    std::fs::write(path, &bytes)
        .map_err(|e| FlowError::IoError(format!("Write file '{}': {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), ?format, "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowports_core::{Node, Port};

    fn sample() -> Snapshot {
        Snapshot::from_parts([Node::new("n")], [Port::sink("p", "n")], [])
    }

    #[test]
    fn decode_detects_both_formats() {
        for format in [SnapshotFormat::Json, SnapshotFormat::Binary] {
            let bytes = encode_snapshot(&sample(), format).expect("encode");
            assert_eq!(decode_snapshot(&bytes).expect("decode"), sample());
        }
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        assert!(matches!(
            decode_snapshot(b"{not json"),
            Err(FlowError::DeserializationError(_))
        ));
    }

    #[test]
    fn format_names() {
        assert_eq!("json".parse::<SnapshotFormat>().ok(), Some(SnapshotFormat::Json));
        assert_eq!("bin".parse::<SnapshotFormat>().ok(), Some(SnapshotFormat::Binary));
        assert!(matches!(
            "yaml".parse::<SnapshotFormat>(),
            Err(FlowError::InvalidArgument(_))
        ));
        assert_eq!(SnapshotFormat::Binary.name(), "binary");
    }
}

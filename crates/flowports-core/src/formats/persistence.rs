//! # Snapshot Binary Format
//!
//! Format: Header (5 bytes) + postcard-serialized [`SerializableSnapshot`].
//! - 4 bytes: Magic ("FLWP")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is decoded, so corrupt
//! or oversized input is rejected without allocating for it.

use crate::primitives::{FORMAT_VERSION, HEADER_LEN, MAGIC_BYTES, MAX_SNAPSHOT_PAYLOAD_SIZE};
use crate::{FlowError, SerializableSnapshot, Snapshot};

// =============================================================================
// HEADER
// =============================================================================

/// The header preceding every binary snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Validate magic bytes and version.
    pub fn validate(&self) -> Result<(), FlowError> {
        if &self.magic != MAGIC_BYTES {
            return Err(FlowError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(FlowError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FlowError> {
        if bytes.len() < HEADER_LEN {
            return Err(FlowError::DeserializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `bytes` starts with the binary snapshot magic.
#[must_use]
pub fn is_binary_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC_BYTES)
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a snapshot to bytes (header + payload).
pub fn snapshot_to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>, FlowError> {
    let serializable = SerializableSnapshot::from(snapshot);
    let payload = postcard::to_stdvec(&serializable)
        .map_err(|e| FlowError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(&SnapshotHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a snapshot from bytes.
///
/// Rejects, in order: data shorter than the header, data larger than
/// `MAX_SNAPSHOT_PAYLOAD_SIZE`, a bad header, then a malformed payload.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<Snapshot, FlowError> {
    if bytes.len() < HEADER_LEN {
        return Err(FlowError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_LEN
        )));
    }

    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(FlowError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    SnapshotHeader::from_bytes(bytes)?.validate()?;

    let serializable: SerializableSnapshot =
        postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
            FlowError::DeserializationError(format!("Failed to decode snapshot: {}", e))
        })?;

    Ok(Snapshot::from(serializable))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Link, Node, Port};

    fn sample() -> Snapshot {
        Snapshot::from_parts(
            [Node::new("n1")],
            [
                Port::source("p1", "n1"),
                Port::sink("p2", "n1").with_access_key("k1"),
            ],
            [Link::new("p1", "p2")],
        )
    }

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let bytes1 = snapshot_to_bytes(&sample()).expect("first serialize");
        let restored = snapshot_from_bytes(&bytes1).expect("deserialize");
        let bytes2 = snapshot_to_bytes(&restored).expect("second serialize");

        assert_eq!(restored, sample());
        assert_eq!(bytes1, bytes2);
    }

    #[test]
    fn encoded_snapshot_is_detected_as_binary() {
        let bytes = snapshot_to_bytes(&sample()).expect("serialize");
        assert!(is_binary_snapshot(&bytes));
        assert!(!is_binary_snapshot(b"{\"nodes\":[]}"));
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(matches!(
            snapshot_from_bytes(&bytes),
            Err(FlowError::DeserializationError(_))
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = snapshot_to_bytes(&sample()).expect("serialize");
        bytes[4] = FORMAT_VERSION + 1;
        assert!(snapshot_from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncated_data_rejected() {
        assert!(snapshot_from_bytes(b"FLW").is_err());

        let bytes = snapshot_to_bytes(&sample()).expect("serialize");
        assert!(snapshot_from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }
}

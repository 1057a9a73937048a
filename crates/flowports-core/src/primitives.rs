//! # Primitives
//!
//! Fixed constants of the snapshot interchange format.

/// Magic bytes for the flowports binary snapshot header.
///
/// - Header = Magic Bytes ("FLWP") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"FLWP";

/// Current binary snapshot format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the binary header in bytes.
pub const HEADER_LEN: usize = 5;

/// Maximum accepted binary snapshot size (256 MB).
///
/// Checked BEFORE decoding the payload.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"FLWP");
    }

    #[test]
    fn header_len_covers_magic_and_version() {
        assert_eq!(HEADER_LEN, MAGIC_BYTES.len() + 1);
    }
}

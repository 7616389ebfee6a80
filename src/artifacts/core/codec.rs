//! Hashing and compression primitives
//!
//! Objects are identified by the SHA-1 digest of their framed bytes and
//! persisted zlib-compressed. Both operations work on the whole buffer.

use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

/// Size of a raw SHA-1 digest in bytes
pub const DIGEST_SIZE: usize = 20;

/// Compute the SHA-1 digest of the exact input bytes.
pub fn digest(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha1::new();
    hasher.update(data);

    let mut output = [0u8; DIGEST_SIZE];
    output.copy_from_slice(&hasher.finalize());
    output
}

pub fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(data)
        .context("Unable to compress object content")?;

    encoder
        .finish()
        .map(Bytes::from)
        .context("Unable to finish compressing object content")
}

/// Inflate a zlib stream.
///
/// A bad stream header, truncated data or a checksum mismatch is reported
/// as `CorruptObject` tagged with `label`.
pub fn decompress(data: &[u8], label: &str) -> anyhow::Result<Bytes> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut decompressed_content = Vec::new();
    decoder
        .read_to_end(&mut decompressed_content)
        .map_err(|e| TwigError::corrupt(label, format!("unable to decompress: {e}")))?;

    Ok(Bytes::from(decompressed_content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn to_hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn digest_matches_known_blob_hash() {
        assert_eq!(
            to_hex(&digest(b"blob 2\0hi")),
            "32f95c0d1244a78b2be1bab8de17906fabb2c4a8"
        );
    }

    #[test]
    fn decompress_inverts_compress() {
        let data = b"commit 5\0hello".to_vec();
        let packed = compress(&data).unwrap();

        assert_eq!(decompress(&packed, "test").unwrap().to_vec(), data);
    }

    #[test]
    fn decompress_rejects_bad_header() {
        let err = decompress(b"definitely not zlib", "deadbeef").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TwigError>(),
            Some(TwigError::CorruptObject { oid, .. }) if oid == "deadbeef"
        ));
    }
}

//! Decompression algorithms for ZIM clusters.
//!
//! ZIM clusters support multiple compression formats:
//! - None (tags 0 and 1): stored verbatim
//! - Zlib (tag 2): deflate via flate2
//! - LZMA2 (tag 4): xz container via xz2
//! - Zstd (tag 5): via zstd
//!
//! bzip2 (tag 3) was dropped from the format long ago and is rejected.

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::trace;
use xz2::read::XzDecoder;

use crate::zim::types::error::{Result, ZimError};
use crate::zim::types::models::CompressionType;

/// Decompresses a whole cluster payload.
///
/// The payload is the cluster region after the compression tag, bounded
/// by the start of the next cluster.
pub fn decompress_payload(payload: &[u8], compression_type: CompressionType) -> Result<Vec<u8>> {
    match compression_type {
        CompressionType::NoCompression | CompressionType::None => {
            trace!("No compression, copying {} bytes", payload.len());
            Ok(payload.to_vec())
        }
        CompressionType::Zlib => {
            trace!("Decompressing {} bytes with Zlib", payload.len());
            let mut output = Vec::new();
            ZlibDecoder::new(payload)
                .read_to_end(&mut output)
                .map_err(|e| ZimError::Decompression(format!("Zlib decompression failed: {}", e)))?;
            Ok(output)
        }
        CompressionType::Lzma2 => {
            trace!("Decompressing {} bytes with LZMA2 (xz)", payload.len());
            let mut output = Vec::new();
            XzDecoder::new(payload)
                .read_to_end(&mut output)
                .map_err(|e| ZimError::Decompression(format!("LZMA2 decompression failed: {}", e)))?;
            Ok(output)
        }
        CompressionType::Zstd => {
            trace!("Decompressing {} bytes with Zstd", payload.len());
            zstd::stream::decode_all(payload)
                .map_err(|e| ZimError::Decompression(format!("Zstd decompression failed: {}", e)))
        }
        CompressionType::Bzip2 => Err(ZimError::Decompression(
            "bzip2 clusters are not supported".to_string(),
        )),
    }
}

//! Codec layer for cluster decompression.
//!
//! # Submodules
//!
//! - [`compression`][]: Decompression algorithms (Zlib, LZMA2/xz, Zstd)

pub mod compression;

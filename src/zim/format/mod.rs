//! File format parsing layer for ZIM archives.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw stream I/O and the high-level [`ZimReader`](crate::zim::reader::ZimReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the fixed 80-byte header
//! - [`mime`]: Parses the MIME type list
//! - [`pointers`]: Loads the pointer tables and seeds the sampled index
//! - [`dirent`]: Decodes directory entries
//! - [`cluster`]: Decompresses clusters and splits them into blobs
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌──────────────────┐
//! │  Header          │ ← header::parse()
//! ├──────────────────┤
//! │  MIME list       │ ← mime::parse()
//! ├──────────────────┤
//! │  URL pointers    │
//! │  Title pointers  │ ← pointers::load()
//! │  Cluster pointers│
//! ├──────────────────┤
//! │  Dir entries     │ ← dirent::decode()
//! ├──────────────────┤
//! │  Clusters        │ ← cluster::read()
//! ├──────────────────┤
//! │  Checksum        │
//! └──────────────────┘
//! ```

pub mod cluster;
pub mod dirent;
pub mod header;
pub mod mime;
pub mod pointers;

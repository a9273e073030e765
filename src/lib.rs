//! # zim-reader
//!
//! A read-only reader for ZIM archives, the container format used for
//! offline encyclopedias. Parses the header and pointer tables, decodes
//! directory entries, decompresses clusters and resolves URLs to article
//! content through a sampled index and binary search.
//!
//! Title search and prefix search are not implemented.
pub mod zim;

// Re-export the main types for convenience
pub use zim::{
    ZimReader,
    format::cluster::Cluster,
    index::SampledIndex,
    iter::ArticleUrls,
    types::{
        error::{Result, ZimError},
        models::{
            Article,
            CompressionType,
            DirectoryEntry,
            EntryKind,
            EntryType,
            UrlNamespace,
            ZimHeader,
        },
    },
};

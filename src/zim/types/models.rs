//! Core data structures for ZIM format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The fixed archive header
//! - Directory entries and their variants
//! - Namespace and compression enumerations

use std::fmt;

use super::error::{Result, ZimError};

/// `"ZIM\x04"` read as a little-endian u32.
pub const ZIM_MAGIC: u32 = 0x044D_495A;

/// Oldest major version this reader accepts (Zeno <= 3, Zim/4 = 4).
pub const MIN_MAJOR_VERSION: u16 = 5;

/// Size in bytes of the fixed header.
pub const HEADER_SIZE: u64 = 80;

/// Sentinel used by the header for "no main page" / "no layout page".
pub const NO_PAGE: u32 = 0xFFFF_FFFF;

/// Parsed fixed-size header of a ZIM archive.
///
/// Optional page references have already been converted from the
/// all-ones sentinel into `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZimHeader {
    pub major_version: u16,
    pub minor_version: u16,
    pub uuid: [u8; 16],
    pub article_count: u32,
    pub cluster_count: u32,
    pub url_ptr_pos: u64,
    pub title_ptr_pos: u64,
    pub cluster_ptr_pos: u64,
    pub mime_list_pos: u64,
    pub main_page: Option<u32>,
    pub layout_page: Option<u32>,
    /// Position of the MD5 checksum. Also taken as the end of the last cluster.
    pub checksum_pos: u64,
}

impl ZimHeader {
    /// Returns the format version as a decimal, e.g. `5.0` or `5.12`.
    ///
    /// The minor version is appended as decimal digits after the point,
    /// so minor `1` gives `5.1` and minor `12` gives `5.12`. Trailing zeros
    /// are lost: minors `1`, `10` and `100` all give `5.1`. Use
    /// [`ZimHeader::version`] when the exact minor matters.
    pub fn file_version(&self) -> f64 {
        let major = f64::from(self.major_version);
        if self.minor_version == 0 {
            return major;
        }
        let digits = self.minor_version.ilog10() + 1;
        major + f64::from(self.minor_version) / 10f64.powi(digits as i32)
    }

    /// The exact `(major, minor)` version pair.
    pub fn version(&self) -> (u16, u16) {
        (self.major_version, self.minor_version)
    }

    /// Returns the UUID as a lowercase hex string.
    pub fn uuid_hex(&self) -> String {
        hex::encode(self.uuid)
    }
}

/// Namespace byte partitioning the URL/title key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrlNamespace {
    None,
    Layout,
    Articles,
    ArticleMetaData,
    ImageFiles,
    ImageText,
    ZimMetadata,
    CategoryText,
    CategoryArticleList,
    CategoryList,
    FullTextIndex,
    /// Any namespace byte without a well-known meaning.
    Other(u8),
}

impl From<u8> for UrlNamespace {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::None,
            b'-' => Self::Layout,
            b'A' => Self::Articles,
            b'B' => Self::ArticleMetaData,
            b'I' => Self::ImageFiles,
            b'J' => Self::ImageText,
            b'M' => Self::ZimMetadata,
            b'U' => Self::CategoryText,
            b'V' => Self::CategoryArticleList,
            b'W' => Self::CategoryList,
            b'X' => Self::FullTextIndex,
            other => Self::Other(other),
        }
    }
}

impl From<UrlNamespace> for u8 {
    fn from(value: UrlNamespace) -> Self {
        match value {
            UrlNamespace::None => 0x00,
            UrlNamespace::Layout => b'-',
            UrlNamespace::Articles => b'A',
            UrlNamespace::ArticleMetaData => b'B',
            UrlNamespace::ImageFiles => b'I',
            UrlNamespace::ImageText => b'J',
            UrlNamespace::ZimMetadata => b'M',
            UrlNamespace::CategoryText => b'U',
            UrlNamespace::CategoryArticleList => b'V',
            UrlNamespace::CategoryList => b'W',
            UrlNamespace::FullTextIndex => b'X',
            UrlNamespace::Other(byte) => byte,
        }
    }
}

impl fmt::Display for UrlNamespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let byte = u8::from(*self);
        if byte.is_ascii_graphic() {
            write!(f, "{}", byte as char)
        } else {
            write!(f, "{:#04x}", byte)
        }
    }
}

/// Discriminant of a directory entry, derived from its mimetype field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Article,
    Redirect,
    DeletedArticle,
    LinkTarget,
}

impl EntryType {
    pub const REDIRECT_MIME: u16 = 0xFFFF;
    pub const DELETED_MIME: u16 = 0xFFFE;
    pub const LINK_TARGET_MIME: u16 = 0xFFFD;

    /// Maps the mimetype field to its entry type. Every value outside the
    /// three reserved ones denotes an article.
    pub fn from_mime_type(mime_type: u16) -> Self {
        match mime_type {
            Self::REDIRECT_MIME => Self::Redirect,
            Self::DELETED_MIME => Self::DeletedArticle,
            Self::LINK_TARGET_MIME => Self::LinkTarget,
            _ => Self::Article,
        }
    }
}

/// Variant-specific payload of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Article { cluster: u32, blob: u32 },
    /// `target` is an index into the URL pointer table.
    Redirect { target: u32 },
    DeletedArticle,
    LinkTarget,
}

impl EntryKind {
    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryKind::Article { .. } => EntryType::Article,
            EntryKind::Redirect { .. } => EntryType::Redirect,
            EntryKind::DeletedArticle => EntryType::DeletedArticle,
            EntryKind::LinkTarget => EntryType::LinkTarget,
        }
    }
}

/// A decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Index into the MIME type list, or one of the reserved variant markers.
    pub mime_type: u16,
    pub namespace: UrlNamespace,
    pub revision: u32,
    pub kind: EntryKind,
    pub url: String,
    title: String,
    pub parameters: Vec<u8>,
}

impl DirectoryEntry {
    pub fn new(
        mime_type: u16,
        namespace: UrlNamespace,
        revision: u32,
        kind: EntryKind,
        url: String,
        title: String,
        parameters: Vec<u8>,
    ) -> Self {
        Self {
            mime_type,
            namespace,
            revision,
            kind,
            url,
            title,
            parameters,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.kind.entry_type()
    }

    /// The title, falling back to the URL when none is stored.
    pub fn title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// The title exactly as stored, possibly empty.
    pub fn raw_title(&self) -> &str {
        &self.title
    }

    /// Length of the parameter blob as stored in the one-byte length field.
    ///
    /// Entries built with more than 255 parameter bytes cannot be encoded.
    pub fn parameter_length(&self) -> Result<u8> {
        u8::try_from(self.parameters.len()).map_err(|_| {
            ZimError::InvalidFormat(format!(
                "Parameter blob of {} bytes exceeds the 255-byte limit",
                self.parameters.len()
            ))
        })
    }

    /// The URL-table index this redirect points at.
    ///
    /// Only redirects carry a target; any other variant is a contract
    /// violation reported as [`ZimError::InvalidVariantAccess`].
    pub fn redirect_index(&self) -> Result<u32> {
        match self.kind {
            EntryKind::Redirect { target } => Ok(target),
            _ => Err(ZimError::InvalidVariantAccess {
                expected: EntryType::Redirect,
                found: self.entry_type(),
            }),
        }
    }
}

/// Compression tag stored in the first byte of every cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// Tag 0, the historical "no compression" value.
    NoCompression,
    /// Tag 1.
    None,
    Zlib,
    Bzip2,
    Lzma2,
    Zstd,
}

impl TryFrom<u8> for CompressionType {
    type Error = ZimError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::NoCompression),
            1 => Ok(Self::None),
            2 => Ok(Self::Zlib),
            3 => Ok(Self::Bzip2),
            4 => Ok(Self::Lzma2),
            5 => Ok(Self::Zstd),
            _ => Err(ZimError::InvalidFormat(format!("Unknown compression type: {}", value))),
        }
    }
}

/// A resolved article: its directory entry and the blob it refers to.
#[derive(Debug, Clone)]
pub struct Article {
    pub entry: DirectoryEntry,
    pub body: Vec<u8>,
}

impl Article {
    /// Interprets the body as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

//! Directory entry decoding.
//!
//! Every entry starts with the same 8-byte prefix, followed by a
//! variant-specific block selected by the mimetype field:
//!
//! ```text
//! [0] u16  mimetype (0xFFFF redirect, 0xFFFE deleted, 0xFFFD link target)
//! [2] u8   parameter length
//! [3] u8   namespace
//! [4] u32  revision
//! [8] ...  article:   u32 cluster, u32 blob
//!          redirect:  u32 target index
//!          deleted / link target: 8 reserved bytes
//!     ...  url (null-terminated), title (null-terminated), parameters
//! ```
//!
//! Besides the full decoder this module offers lightweight readers that pull
//! out just the namespace, URL or title. The sampled index and the binary
//! search only ever need the key, so they skip the rest of the record.

use std::io::{Read, Seek, SeekFrom};
use byteorder::{LittleEndian, ReadBytesExt};
use log::trace;

use crate::zim::types::error::Result;
use crate::zim::types::models::{DirectoryEntry, EntryKind, EntryType, UrlNamespace};
use crate::zim::utils;

/// Offset of the namespace byte from the start of an entry.
const NAMESPACE_OFFSET: u64 = 3;
/// Offset of the URL in a redirect entry.
const REDIRECT_URL_OFFSET: u64 = 12;
/// Offset of the URL in every other entry.
const URL_OFFSET: u64 = 16;
/// Reserved bytes in deleted and link-target entries.
const RESERVED_LEN: i64 = 8;

/// Decodes the full entry at `offset`.
pub fn decode<R: Read + Seek>(stream: &mut R, offset: u64) -> Result<DirectoryEntry> {
    stream.seek(SeekFrom::Start(offset))?;

    let mime_type = stream.read_u16::<LittleEndian>()?;
    let parameter_length = stream.read_u8()?;
    let namespace = UrlNamespace::from(stream.read_u8()?);
    let revision = stream.read_u32::<LittleEndian>()?;

    let kind = match EntryType::from_mime_type(mime_type) {
        EntryType::Article => {
            let cluster = stream.read_u32::<LittleEndian>()?;
            let blob = stream.read_u32::<LittleEndian>()?;
            EntryKind::Article { cluster, blob }
        }
        EntryType::Redirect => EntryKind::Redirect {
            target: stream.read_u32::<LittleEndian>()?,
        },
        EntryType::DeletedArticle => {
            stream.seek(SeekFrom::Current(RESERVED_LEN))?;
            EntryKind::DeletedArticle
        }
        EntryType::LinkTarget => {
            stream.seek(SeekFrom::Current(RESERVED_LEN))?;
            EntryKind::LinkTarget
        }
    };

    let url = utils::read_null_terminated_string(stream)?;
    let title = utils::read_null_terminated_string(stream)?;
    let mut parameters = vec![0u8; parameter_length as usize];
    stream.read_exact(&mut parameters)?;

    trace!("Decoded {:?} entry at {:#x}: {}/{}", kind.entry_type(), offset, namespace, url);

    Ok(DirectoryEntry::new(mime_type, namespace, revision, kind, url, title, parameters))
}

/// Reads only the namespace byte of the entry at `offset`.
pub fn read_entry_namespace<R: Read + Seek>(stream: &mut R, offset: u64) -> Result<UrlNamespace> {
    stream.seek(SeekFrom::Start(offset + NAMESPACE_OFFSET))?;
    Ok(UrlNamespace::from(stream.read_u8()?))
}

/// Reads only the URL of the entry at `offset`.
///
/// Leaves the stream positioned at the start of the title.
pub fn read_entry_url<R: Read + Seek>(stream: &mut R, offset: u64) -> Result<String> {
    stream.seek(SeekFrom::Start(offset))?;
    let url_offset = match stream.read_u16::<LittleEndian>()? {
        EntryType::REDIRECT_MIME => REDIRECT_URL_OFFSET,
        _ => URL_OFFSET,
    };
    stream.seek(SeekFrom::Start(offset + url_offset))?;
    utils::read_null_terminated_string(stream)
}

/// Reads only the title of the entry at `offset`, falling back to the URL
/// when the stored title is empty.
pub fn read_entry_title<R: Read + Seek>(stream: &mut R, offset: u64) -> Result<String> {
    let url = read_entry_url(stream, offset)?;
    let title = utils::read_null_terminated_string(stream)?;
    Ok(if title.is_empty() { url } else { title })
}

//! Cluster decoding.
//!
//! ```text
//! [1 byte]   compression tag
//! [payload]  compressed or raw, up to the start of the next cluster
//! ```
//!
//! Once decoded, the payload is a blob offset table followed by blob bytes.
//! The first offset points just past the table, so it also gives the
//! number of entries: `blob_count = first_offset / 4 - 1`.

use std::io::{Read, Seek, SeekFrom};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, trace};

use crate::zim::codec::compression;
use crate::zim::format::pointers::PointerTables;
use crate::zim::types::error::{Result, ZimError};
use crate::zim::types::models::CompressionType;

/// A decoded cluster, split into addressable blobs.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub compression: CompressionType,
    /// `blob_count + 1` offsets into `data`; blob `i` spans `offsets[i]..offsets[i + 1]`.
    offsets: Vec<u32>,
    data: Vec<u8>,
}

impl Cluster {
    /// Splits a decoded payload into blobs.
    pub fn parse(compression: CompressionType, data: Vec<u8>) -> Result<Self> {
        if data.len() < 4 {
            return Err(ZimError::InvalidFormat(format!(
                "Cluster payload of {} bytes has no blob offset table",
                data.len()
            )));
        }

        let first = LittleEndian::read_u32(&data[0..4]);
        if first < 4 || first % 4 != 0 {
            return Err(ZimError::InvalidFormat(format!(
                "Invalid first blob offset {} in cluster",
                first
            )));
        }
        let blob_count = (first / 4 - 1) as usize;
        let table_len = first as usize;
        if table_len > data.len() {
            return Err(ZimError::InvalidFormat(format!(
                "Blob offset table ({} bytes) exceeds cluster payload ({} bytes)",
                table_len,
                data.len()
            )));
        }

        let mut reader = &data[..table_len];
        let mut offsets = Vec::with_capacity(blob_count + 1);
        while !reader.is_empty() {
            offsets.push(reader.read_u32::<LittleEndian>()?);
        }

        if let Some(pair) = offsets.windows(2).find(|pair| pair[0] > pair[1]) {
            return Err(ZimError::InvalidFormat(format!(
                "Blob offsets are decreasing: {} > {}",
                pair[0], pair[1]
            )));
        }
        let last = *offsets.last().unwrap_or(&first) as usize;
        if last > data.len() {
            return Err(ZimError::InvalidFormat(format!(
                "Last blob offset {} exceeds cluster payload ({} bytes)",
                last,
                data.len()
            )));
        }

        trace!("Cluster split into {} blobs", blob_count);
        Ok(Self { compression, offsets, data })
    }

    pub fn blob_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn blob(&self, index: usize) -> Option<&[u8]> {
        let start = *self.offsets.get(index)? as usize;
        let end = *self.offsets.get(index + 1)? as usize;
        Some(&self.data[start..end])
    }

    pub fn blobs(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.offsets
            .windows(2)
            .map(|pair| &self.data[pair[0] as usize..pair[1] as usize])
    }

    /// Raw blob offsets, including the leading table-end offset.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

/// Reads and decodes cluster `index`.
///
/// The cluster's extent runs to the next pointer; for the last cluster
/// that is the checksum position.
pub fn read<R: Read + Seek>(stream: &mut R, tables: &PointerTables, index: usize) -> Result<Cluster> {
    let (start, end) = tables.cluster_bounds(index).ok_or_else(|| {
        ZimError::InvalidFormat(format!(
            "Cluster index {} is out of range ({} clusters)",
            index,
            tables.cluster_count()
        ))
    })?;
    if end <= start {
        return Err(ZimError::InvalidFormat(format!(
            "Cluster {} has an empty or negative extent [{:#x}..{:#x}]",
            index, start, end
        )));
    }

    stream.seek(SeekFrom::Start(start))?;
    let compression = CompressionType::try_from(stream.read_u8()?)?;

    let len = end - start - 1;
    let mut raw = Vec::new();
    stream.by_ref().take(len).read_to_end(&mut raw)?;
    if raw.len() as u64 != len {
        return Err(ZimError::TruncatedStream);
    }

    debug!(
        "Decoding cluster {}: {:?}, {} bytes on disk",
        index,
        compression,
        raw.len()
    );
    let data = compression::decompress_payload(&raw, compression)?;
    Cluster::parse(compression, data)
}

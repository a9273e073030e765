//! Pointer table loading and sampled index construction.
//!
//! Three tables are read once at open time:
//! - cluster pointers: `cluster_count` u64 file offsets
//! - URL pointers: `article_count` u64 entry offsets, sorted by (namespace, URL)
//! - title pointers: `article_count` u32 URL-table indices, sorted by (namespace, title)
//!
//! The URL table is immediately followed by the title table in the file.

use std::io::{Read, Seek, SeekFrom};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, trace};

use crate::zim::format::dirent;
use crate::zim::index::SampledIndex;
use crate::zim::types::error::{Result, ZimError};
use crate::zim::types::models::ZimHeader;

/// Upper bound on the number of entries sampled into the index at open time.
pub const MAX_INDEX_SAMPLES: u32 = 40;

/// The three pointer tables of an archive.
#[derive(Debug, Clone)]
pub struct PointerTables {
    /// Cluster start offsets, followed by one sentinel marking the end of the last cluster.
    pub clusters: Vec<u64>,
    pub urls: Vec<u64>,
    pub titles: Vec<u32>,
}

impl PointerTables {
    /// Number of real clusters, not counting the sentinel.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len().saturating_sub(1)
    }

    /// Returns `(start, end)` file offsets of a cluster.
    pub fn cluster_bounds(&self, cluster: usize) -> Option<(u64, u64)> {
        let start = *self.clusters.get(cluster)?;
        let end = *self.clusters.get(cluster + 1)?;
        Some((start, end))
    }

    pub fn url_offset(&self, index: u32) -> Option<u64> {
        self.urls.get(index as usize).copied()
    }

    /// Entry offset for a position in the title-ordered table.
    pub fn title_offset(&self, position: u32) -> Option<u64> {
        let index = *self.titles.get(position as usize)?;
        self.url_offset(index)
    }
}

/// Reads the cluster, URL and title pointer tables.
///
/// The cluster table gets the checksum position appended as its end marker.
/// That the last cluster really ends at the checksum is an assumption about
/// the writer, not something the header states.
pub fn load<R: Read + Seek>(stream: &mut R, header: &ZimHeader) -> Result<PointerTables> {
    info!("Loading pointer tables");

    let stream_len = stream.seek(SeekFrom::End(0))?;
    ensure_table_fits(stream_len, header.cluster_ptr_pos, 8, header.cluster_count)?;
    ensure_table_fits(stream_len, header.url_ptr_pos, 8, header.article_count)?;
    ensure_table_fits(stream_len, header.title_ptr_pos, 4, header.article_count)?;

    stream.seek(SeekFrom::Start(header.cluster_ptr_pos))?;
    let mut clusters = Vec::with_capacity(header.cluster_count as usize + 1);
    for _ in 0..header.cluster_count {
        clusters.push(stream.read_u64::<LittleEndian>()?);
    }
    clusters.push(header.checksum_pos);

    stream.seek(SeekFrom::Start(header.url_ptr_pos))?;
    let mut urls = Vec::with_capacity(header.article_count as usize);
    for _ in 0..header.article_count {
        urls.push(stream.read_u64::<LittleEndian>()?);
    }

    let position = stream.stream_position()?;
    if position != header.title_ptr_pos {
        return Err(ZimError::InvalidFormat(format!(
            "URL pointer table ends at {:#x}, but title pointer table starts at {:#x}",
            position, header.title_ptr_pos
        )));
    }

    let mut titles = Vec::with_capacity(header.article_count as usize);
    for _ in 0..header.article_count {
        let index = stream.read_u32::<LittleEndian>()?;
        if index >= header.article_count {
            return Err(ZimError::InvalidFormat(format!(
                "Title pointer {} is out of range for {} articles",
                index, header.article_count
            )));
        }
        titles.push(index);
    }

    debug!(
        "Pointer tables: {} clusters (+1 sentinel), {} urls, {} titles",
        header.cluster_count,
        urls.len(),
        titles.len()
    );

    Ok(PointerTables { clusters, urls, titles })
}

/// Fails with [`ZimError::TruncatedStream`] when a table of `count` entries
/// of `width` bytes at `pos` would run past the end of the stream.
fn ensure_table_fits(stream_len: u64, pos: u64, width: u64, count: u32) -> Result<()> {
    let end = pos.checked_add(width * u64::from(count));
    match end {
        Some(end) if end <= stream_len => Ok(()),
        _ => Err(ZimError::TruncatedStream),
    }
}

/// Evenly spaced sample positions across `[0, article_count - 1]`.
///
/// Uses `min(article_count, 40)` samples, always including both ends.
pub fn sample_positions(article_count: u32) -> Vec<u32> {
    let samples = article_count.min(MAX_INDEX_SAMPLES);
    match samples {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let last = u64::from(article_count - 1);
            let steps = u64::from(samples - 1);
            (0..u64::from(samples))
                .map(|k| (last * k / steps) as u32)
                .collect()
        }
    }
}

/// Seeds the URL and title indexes from evenly spaced samples.
///
/// URL keys map to their URL-table index; title keys map to their position
/// in the title table.
pub fn build_indexes<R: Read + Seek>(
    stream: &mut R,
    tables: &PointerTables,
) -> Result<(SampledIndex, SampledIndex)> {
    let mut url_index = SampledIndex::new();
    let mut title_index = SampledIndex::new();

    let positions = sample_positions(tables.urls.len() as u32);
    debug!("Sampling {} entries into the lookup index", positions.len());

    for position in positions {
        let offset = tables.urls[position as usize];
        let url = dirent::read_entry_url(stream, offset)?;
        let namespace = dirent::read_entry_namespace(stream, offset)?;
        trace!("Sample {}: {}/{}", position, namespace, url);
        url_index.insert(namespace, url, position);

        let offset = tables.title_offset(position).ok_or_else(|| {
            ZimError::InvalidFormat(format!("Title pointer {} has no URL entry", position))
        })?;
        let title = dirent::read_entry_title(stream, offset)?;
        let namespace = dirent::read_entry_namespace(stream, offset)?;
        title_index.insert(namespace, title, position);
    }

    Ok((url_index, title_index))
}

//! Test-only encoder for synthetic ZIM archives.
#![allow(dead_code)]

use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use xz2::write::XzEncoder;
use zim_reader::{DirectoryEntry, EntryKind, UrlNamespace};

pub const MAGIC: u32 = 0x044D_495A;
pub const HEADER_LEN: usize = 80;

/// Encodes a directory entry exactly as it is laid out on disk.
pub fn encode_entry(entry: &DirectoryEntry) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<LittleEndian>(entry.mime_type).unwrap();
    out.write_u8(entry.parameter_length().unwrap()).unwrap();
    out.write_u8(u8::from(entry.namespace)).unwrap();
    out.write_u32::<LittleEndian>(entry.revision).unwrap();
    match entry.kind {
        EntryKind::Article { cluster, blob } => {
            out.write_u32::<LittleEndian>(cluster).unwrap();
            out.write_u32::<LittleEndian>(blob).unwrap();
        }
        EntryKind::Redirect { target } => out.write_u32::<LittleEndian>(target).unwrap(),
        EntryKind::DeletedArticle | EntryKind::LinkTarget => out.extend_from_slice(&[0u8; 8]),
    }
    out.extend_from_slice(entry.url.as_bytes());
    out.push(0);
    out.extend_from_slice(entry.raw_title().as_bytes());
    out.push(0);
    out.extend_from_slice(&entry.parameters);
    out
}

pub fn article(ns: u8, url: &str, title: &str, mime: u16, cluster: u32, blob: u32) -> DirectoryEntry {
    DirectoryEntry::new(
        mime,
        UrlNamespace::from(ns),
        0,
        EntryKind::Article { cluster, blob },
        url.to_string(),
        title.to_string(),
        Vec::new(),
    )
}

pub fn redirect(ns: u8, url: &str, title: &str, target: u32) -> DirectoryEntry {
    DirectoryEntry::new(
        0xFFFF,
        UrlNamespace::from(ns),
        0,
        EntryKind::Redirect { target },
        url.to_string(),
        title.to_string(),
        Vec::new(),
    )
}

pub fn placeholder(ns: u8, url: &str, kind: EntryKind) -> DirectoryEntry {
    let mime = match kind {
        EntryKind::DeletedArticle => 0xFFFE,
        _ => 0xFFFD,
    };
    DirectoryEntry::new(mime, UrlNamespace::from(ns), 0, kind, url.to_string(), String::new(), Vec::new())
}

/// Builds the decoded cluster body: offset table followed by blob bytes.
pub fn cluster_body(blobs: &[&[u8]]) -> Vec<u8> {
    let table_len = (blobs.len() + 1) * 4;
    let mut offsets = Vec::with_capacity(blobs.len() + 1);
    let mut offset = table_len as u32;
    offsets.push(offset);
    for blob in blobs {
        offset += blob.len() as u32;
        offsets.push(offset);
    }
    let mut out = Vec::new();
    for offset in offsets {
        out.write_u32::<LittleEndian>(offset).unwrap();
    }
    for blob in blobs {
        out.extend_from_slice(blob);
    }
    out
}

/// Encodes a cluster with the given compression tag.
pub fn encode_cluster(tag: u8, blobs: &[&[u8]]) -> Vec<u8> {
    let body = cluster_body(blobs);
    let payload = match tag {
        0 | 1 => body,
        2 => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&body).unwrap();
            encoder.finish().unwrap()
        }
        4 => {
            let mut encoder = XzEncoder::new(Vec::new(), 6);
            encoder.write_all(&body).unwrap();
            encoder.finish().unwrap()
        }
        5 => zstd::stream::encode_all(&body[..], 3).unwrap(),
        other => panic!("no test encoder for compression tag {}", other),
    };
    let mut out = vec![tag];
    out.extend_from_slice(&payload);
    out
}

/// Assembles a complete archive.
///
/// Entries must already be sorted by (namespace, url); the title table is
/// derived by sorting on (namespace, title).
pub struct ArchiveBuilder {
    pub magic: u32,
    pub major: u16,
    pub minor: u16,
    pub uuid: [u8; 16],
    pub mime_types: Vec<String>,
    pub entries: Vec<DirectoryEntry>,
    /// Already-encoded clusters, including their compression tag.
    pub clusters: Vec<Vec<u8>>,
    pub main_page: Option<u32>,
    pub layout_page: Option<u32>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            major: 5,
            minor: 0,
            uuid: *b"0123456789abcdef",
            mime_types: vec!["text/html".to_string()],
            entries: Vec::new(),
            clusters: Vec::new(),
            main_page: None,
            layout_page: None,
        }
    }
}

/// Positions of the regions written by [`ArchiveBuilder::build`].
#[derive(Debug, Clone)]
pub struct Layout {
    pub mime_list_pos: u64,
    pub url_ptr_pos: u64,
    pub title_ptr_pos: u64,
    pub cluster_ptr_pos: u64,
    pub entry_offsets: Vec<u64>,
    pub cluster_offsets: Vec<u64>,
    pub checksum_pos: u64,
}

impl ArchiveBuilder {
    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }

    pub fn build_with_layout(&self) -> (Vec<u8>, Layout) {
        let key = |e: &DirectoryEntry| (u8::from(e.namespace), e.url.clone());
        assert!(
            self.entries.windows(2).all(|w| key(&w[0]) <= key(&w[1])),
            "test entries must be sorted by (namespace, url)"
        );

        let n = self.entries.len();
        let mut mime_list = Vec::new();
        for mime in &self.mime_types {
            mime_list.extend_from_slice(mime.as_bytes());
            mime_list.push(0);
        }
        mime_list.push(0);

        let mime_list_pos = HEADER_LEN as u64;
        let url_ptr_pos = mime_list_pos + mime_list.len() as u64;
        let title_ptr_pos = url_ptr_pos + 8 * n as u64;
        let cluster_ptr_pos = title_ptr_pos + 4 * n as u64;
        let entries_pos = cluster_ptr_pos + 8 * self.clusters.len() as u64;

        let encoded: Vec<Vec<u8>> = self.entries.iter().map(encode_entry).collect();
        let mut entry_offsets = Vec::with_capacity(n);
        let mut pos = entries_pos;
        for bytes in &encoded {
            entry_offsets.push(pos);
            pos += bytes.len() as u64;
        }
        let mut cluster_offsets = Vec::with_capacity(self.clusters.len());
        for cluster in &self.clusters {
            cluster_offsets.push(pos);
            pos += cluster.len() as u64;
        }
        let checksum_pos = pos;

        let mut title_order: Vec<u32> = (0..n as u32).collect();
        title_order.sort_by_key(|&i| {
            let e = &self.entries[i as usize];
            (u8::from(e.namespace), e.title().to_string())
        });

        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(self.magic).unwrap();
        out.write_u16::<LittleEndian>(self.major).unwrap();
        out.write_u16::<LittleEndian>(self.minor).unwrap();
        out.extend_from_slice(&self.uuid);
        out.write_u32::<LittleEndian>(n as u32).unwrap();
        out.write_u32::<LittleEndian>(self.clusters.len() as u32).unwrap();
        out.write_u64::<LittleEndian>(url_ptr_pos).unwrap();
        out.write_u64::<LittleEndian>(title_ptr_pos).unwrap();
        out.write_u64::<LittleEndian>(cluster_ptr_pos).unwrap();
        out.write_u64::<LittleEndian>(mime_list_pos).unwrap();
        out.write_u32::<LittleEndian>(self.main_page.unwrap_or(0xFFFF_FFFF)).unwrap();
        out.write_u32::<LittleEndian>(self.layout_page.unwrap_or(0xFFFF_FFFF)).unwrap();
        out.write_u64::<LittleEndian>(checksum_pos).unwrap();
        assert_eq!(out.len(), HEADER_LEN);

        out.extend_from_slice(&mime_list);
        for offset in &entry_offsets {
            out.write_u64::<LittleEndian>(*offset).unwrap();
        }
        for index in &title_order {
            out.write_u32::<LittleEndian>(*index).unwrap();
        }
        for offset in &cluster_offsets {
            out.write_u64::<LittleEndian>(*offset).unwrap();
        }
        for bytes in &encoded {
            out.extend_from_slice(bytes);
        }
        for cluster in &self.clusters {
            out.extend_from_slice(cluster);
        }
        out.extend_from_slice(&[0u8; 16]);

        let layout = Layout {
            mime_list_pos,
            url_ptr_pos,
            title_ptr_pos,
            cluster_ptr_pos,
            entry_offsets,
            cluster_offsets,
            checksum_pos,
        };
        (out, layout)
    }
}

/// Overwrites a little-endian u64 inside an encoded archive.
pub fn patch_u64(bytes: &mut [u8], at: usize, value: u64) {
    bytes[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

/// A small archive covering every entry variant and several codecs.
///
/// URL order (= title order):
/// ```text
/// 0  -/style.css   article  cluster 0 blob 0  (raw, tag 0)
/// 1  A/Main_Page   article  cluster 1 blob 0  (zlib), title "Main Page"
/// 2  A/Moon        article  cluster 1 blob 1  (zlib), empty title
/// 3  A/Old_Page    deleted
/// 4  A/Sun         redirect -> 2
/// 5  A/Target      link target
/// 6  M/Title       article  cluster 2 blob 0  (zstd)
/// ```
pub fn small_archive() -> ArchiveBuilder {
    ArchiveBuilder {
        mime_types: vec![
            "text/html".to_string(),
            "text/css".to_string(),
            "text/plain".to_string(),
        ],
        entries: vec![
            article(b'-', "style.css", "", 1, 0, 0),
            article(b'A', "Main_Page", "Main Page", 0, 1, 0),
            article(b'A', "Moon", "", 0, 1, 1),
            placeholder(b'A', "Old_Page", EntryKind::DeletedArticle),
            redirect(b'A', "Sun", "", 2),
            placeholder(b'A', "Target", EntryKind::LinkTarget),
            article(b'M', "Title", "", 2, 2, 0),
        ],
        clusters: vec![
            encode_cluster(0, &[b"body{}"]),
            encode_cluster(2, &[b"<h1>Main</h1>", b"<p>Moon</p>"]),
            encode_cluster(5, &[b"Small test archive"]),
        ],
        main_page: Some(1),
        layout_page: None,
        ..ArchiveBuilder::default()
    }
}

/// Two articles whose title order is the reverse of their URL order.
///
/// ```text
/// url index  url  title   title position
/// 0          A/a  Zeta    1
/// 1          A/b  Alpha   0
/// ```
pub fn reversed_titles_archive() -> ArchiveBuilder {
    ArchiveBuilder {
        entries: vec![
            article(b'A', "a", "Zeta", 0, 0, 0),
            article(b'A', "b", "Alpha", 0, 0, 1),
        ],
        clusters: vec![encode_cluster(1, &[b"zeta", b"alpha"])],
        ..ArchiveBuilder::default()
    }
}

pub fn numbered_url(i: u32) -> String {
    format!("Article_{:03}", i)
}

pub fn numbered_body(i: u32) -> String {
    format!("<p>Body of article {}</p>", i)
}

/// `count` articles in namespace A, all stored in one xz cluster.
pub fn numbered_archive(count: u32) -> ArchiveBuilder {
    let bodies: Vec<String> = (0..count).map(numbered_body).collect();
    let blobs: Vec<&[u8]> = bodies.iter().map(|b| b.as_bytes()).collect();
    ArchiveBuilder {
        entries: (0..count)
            .map(|i| article(b'A', &numbered_url(i), &format!("Title {:03}", i), 0, 0, i))
            .collect(),
        clusters: vec![encode_cluster(4, &blobs)],
        ..ArchiveBuilder::default()
    }
}

/// An in-memory stream that counts read calls.
pub struct CountingStream {
    inner: Cursor<Vec<u8>>,
    reads: Arc<AtomicUsize>,
}

impl CountingStream {
    pub fn new(bytes: Vec<u8>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let stream = Self {
            inner: Cursor::new(bytes),
            reads: Arc::clone(&reads),
        };
        (stream, reads)
    }
}

impl Read for CountingStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(buf)
    }
}

impl Seek for CountingStream {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

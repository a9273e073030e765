use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use log::info;

use super::format::{cluster, dirent, header, mime, pointers};
use super::format::cluster::Cluster;
use super::format::pointers::PointerTables;
use super::index::{self, SampledIndex};
use super::iter::ArticleUrls;
use super::types::error::{Result, ZimError};
use super::types::models::*;

/// The main reader for ZIM archives.
///
/// Owns one seekable stream exclusively. The pointer tables are loaded once
/// at open time and never change; the sampled URL index grows as lookups
/// resolve new URLs. Both the stream and the index sit behind mutexes, so
/// lookups take `&self`.
#[derive(Debug)]
pub struct ZimReader<R: Read + Seek> {
    stream: Mutex<R>,
    pub header: ZimHeader,
    mime_types: Vec<String>,
    tables: PointerTables,
    url_index: Mutex<SampledIndex>,
    title_index: SampledIndex,
}

impl ZimReader<BufReader<File>> {
    /// Opens a ZIM archive from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - Magic number does not match
    /// - Unsupported version (major < 5)
    /// - Pointer tables are truncated or misaligned
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening ZIM file: {}", path.display());
        let file = File::open(path)?;
        Self::from_stream(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZimReader<R> {
    /// Opens a ZIM archive from any seekable stream.
    pub fn from_stream(mut stream: R) -> Result<Self> {
        let header = header::parse(&mut stream)?;
        let mime_types = mime::parse(&mut stream, header.mime_list_pos)?;
        let tables = pointers::load(&mut stream, &header)?;
        let (url_index, title_index) = pointers::build_indexes(&mut stream, &tables)?;

        info!(
            "ZIM archive opened: {} articles, {} clusters, {} MIME types, {} sampled keys",
            header.article_count,
            header.cluster_count,
            mime_types.len(),
            url_index.len()
        );

        Ok(Self {
            stream: Mutex::new(stream),
            header,
            mime_types,
            tables,
            url_index: Mutex::new(url_index),
            title_index,
        })
    }

    pub fn file_version(&self) -> f64 {
        self.header.file_version()
    }

    pub fn article_count(&self) -> u32 {
        self.header.article_count
    }

    pub fn cluster_count(&self) -> u32 {
        self.header.cluster_count
    }

    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// MIME string of an article entry. Redirects and placeholders have none.
    pub fn mime_type_of(&self, entry: &DirectoryEntry) -> Option<&str> {
        match entry.kind {
            EntryKind::Article { .. } => self.mime_types.get(entry.mime_type as usize).map(String::as_str),
            _ => None,
        }
    }

    pub fn pointer_tables(&self) -> &PointerTables {
        &self.tables
    }

    /// A snapshot of the sampled URL index.
    pub fn url_index(&self) -> Result<SampledIndex> {
        Ok(self.lock_url_index()?.clone())
    }

    /// The title index seeded at open time.
    pub fn title_index(&self) -> &SampledIndex {
        &self.title_index
    }

    /// Decodes the directory entry at a URL-table index.
    pub fn entry_at(&self, index: u32) -> Result<DirectoryEntry> {
        let offset = self.tables.url_offset(index).ok_or_else(|| {
            ZimError::InvalidFormat(format!(
                "URL index {} is out of range ({} articles)",
                index, self.header.article_count
            ))
        })?;
        let mut stream = self.lock_stream()?;
        dirent::decode(&mut *stream, offset)
    }

    /// Decodes the directory entry at a position in the title-ordered table.
    pub fn entry_at_title_position(&self, position: u32) -> Result<DirectoryEntry> {
        let index = *self.tables.titles.get(position as usize).ok_or_else(|| {
            ZimError::InvalidFormat(format!("Title position {} is out of range", position))
        })?;
        self.entry_at(index)
    }

    /// Reads and decodes a cluster by index.
    pub fn read_cluster(&self, index: u32) -> Result<Cluster> {
        let mut stream = self.lock_stream()?;
        cluster::read(&mut *stream, &self.tables, index as usize)
    }

    /// Resolves a URL within a namespace to its URL-table index.
    pub fn resolve_url(&self, namespace: UrlNamespace, url: &str) -> Result<u32> {
        let mut url_index = self.lock_url_index()?;
        let mut stream = self.lock_stream()?;
        index::resolve_url(&mut *stream, &self.tables.urls, &mut *url_index, namespace, url)
    }

    /// Looks up an article by URL and returns its content.
    ///
    /// Redirects are not followed; a redirect entry fails with
    /// [`ZimError::InvalidVariantAccess`]. Use [`ZimReader::resolve_url`],
    /// [`ZimReader::entry_at`] and [`DirectoryEntry::redirect_index`] to
    /// follow one manually.
    pub fn get_article_by_url(&self, namespace: UrlNamespace, url: &str) -> Result<Article> {
        let index = self.resolve_url(namespace, url)?;
        self.article_at(index)
    }

    /// Returns the content of the article at a URL-table index.
    pub fn article_at(&self, index: u32) -> Result<Article> {
        let entry = self.entry_at(index)?;
        self.get_article(entry)
    }

    /// Fetches the blob an article entry refers to.
    pub fn get_article(&self, entry: DirectoryEntry) -> Result<Article> {
        let (cluster_index, blob_index) = match entry.kind {
            EntryKind::Article { cluster, blob } => (cluster, blob),
            _ => {
                return Err(ZimError::InvalidVariantAccess {
                    expected: EntryType::Article,
                    found: entry.entry_type(),
                });
            }
        };

        let cluster = self.read_cluster(cluster_index)?;
        let body = cluster
            .blob(blob_index as usize)
            .ok_or_else(|| {
                ZimError::InvalidFormat(format!(
                    "Blob {} is out of range in cluster {} ({} blobs)",
                    blob_index,
                    cluster_index,
                    cluster.blob_count()
                ))
            })?
            .to_vec();

        Ok(Article { entry, body })
    }

    /// The archive's main page, if one is declared.
    pub fn main_page(&self) -> Result<Option<DirectoryEntry>> {
        self.header.main_page.map(|index| self.entry_at(index)).transpose()
    }

    /// The archive's layout page, if one is declared.
    pub fn layout_page(&self) -> Result<Option<DirectoryEntry>> {
        self.header.layout_page.map(|index| self.entry_at(index)).transpose()
    }

    /// Iterates over the URLs of all article entries, in URL order.
    ///
    /// Redirects, deleted entries and link targets are skipped.
    pub fn article_urls(&self) -> ArticleUrls<'_, R> {
        ArticleUrls::new(self)
    }

    fn lock_stream(&self) -> Result<MutexGuard<'_, R>> {
        self.stream.lock().map_err(|_| ZimError::LockPoisoned)
    }

    fn lock_url_index(&self) -> Result<MutexGuard<'_, SampledIndex>> {
        self.url_index.lock().map_err(|_| ZimError::LockPoisoned)
    }
}

impl<R: Read + Seek> fmt::Display for ZimReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[ZimReader: FileVersion={}.{}, FileUuid={}, ArticleCount={}]",
            self.header.major_version,
            self.header.minor_version,
            self.header.uuid_hex(),
            self.header.article_count
        )
    }
}

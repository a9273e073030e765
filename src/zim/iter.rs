//! Iterators for sequential access to archive entries.

use std::io::{Read, Seek};

use super::reader::ZimReader;
use super::types::error::Result;
use super::types::models::EntryKind;

/// Iterator over the URLs of article entries, in URL-table order.
///
/// Decodes each directory entry in turn and skips redirects, deleted
/// articles and link targets. Yields `Result<String>`; a decode error is
/// yielded once and iteration continues with the next entry.
///
/// Created by [`ZimReader::article_urls()`](crate::ZimReader::article_urls).
pub struct ArticleUrls<'a, R: Read + Seek> {
    reader: &'a ZimReader<R>,
    next_index: u32,
}

impl<'a, R: Read + Seek> ArticleUrls<'a, R> {
    pub(super) fn new(reader: &'a ZimReader<R>) -> Self {
        Self { reader, next_index: 0 }
    }
}

impl<'a, R: Read + Seek> Iterator for ArticleUrls<'a, R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.reader.article_count() {
            let index = self.next_index;
            self.next_index += 1;

            match self.reader.entry_at(index) {
                Ok(entry) => {
                    if let EntryKind::Article { .. } = entry.kind {
                        return Some(Ok(entry.url));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.reader.article_count() - self.next_index) as usize;
        (0, Some(remaining))
    }
}

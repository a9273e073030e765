//! MIME type list parsing.
//!
//! The list is a run of null-terminated strings closed by an empty string.
//! A directory entry's mimetype field indexes into it.

use std::io::{Read, Seek, SeekFrom};
use log::debug;

use crate::zim::types::error::Result;
use crate::zim::utils;

pub fn parse<R: Read + Seek>(stream: &mut R, mime_list_pos: u64) -> Result<Vec<String>> {
    stream.seek(SeekFrom::Start(mime_list_pos))?;

    let mut mime_types = Vec::new();
    loop {
        let mime_type = utils::read_null_terminated_string(stream)?;
        if mime_type.is_empty() {
            break;
        }
        mime_types.push(mime_type);
    }

    debug!("MIME list: {} types", mime_types.len());
    Ok(mime_types)
}

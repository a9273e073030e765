//! Low-level byte reading utilities

use std::io::Read;
use byteorder::ReadBytesExt;

use super::types::error::{Result, ZimError};

/// Read a null-terminated UTF-8 string and consume the terminator.
///
/// Strings in directory entries and the MIME list are stored this way.
/// The reader should be buffered, since bytes are pulled one at a time.
pub fn read_null_terminated_string(reader: &mut impl Read) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        match reader.read_u8()? {
            0 => break,
            byte => bytes.push(byte),
        }
    }
    String::from_utf8(bytes)
        .map_err(|e| ZimError::InvalidFormat(format!("String is not valid UTF-8: {}", e)))
}

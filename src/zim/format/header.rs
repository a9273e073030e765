//! ZIM file header parsing.
//!
//! The header is a fixed 80-byte little-endian structure at offset 0:
//!
//! ```text
//! [ 0] u32      magic ("ZIM\x04")
//! [ 4] u16      major version (>= 5)
//! [ 6] u16      minor version
//! [ 8] [u8;16]  uuid
//! [24] u32      article count
//! [28] u32      cluster count
//! [32] u64      URL pointer table position
//! [40] u64      title pointer table position
//! [48] u64      cluster pointer table position
//! [56] u64      MIME list position
//! [64] u32      main page (0xFFFFFFFF = none)
//! [68] u32      layout page (0xFFFFFFFF = none)
//! [72] u64      checksum position
//! ```

use std::io::{Read, Seek, SeekFrom};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, trace};

use crate::zim::types::{
    error::{Result, ZimError},
    models::{ZimHeader, MIN_MAJOR_VERSION, NO_PAGE, ZIM_MAGIC},
};

/// Parses the header from the start of the stream.
///
/// Magic and version are validated before anything else is read, so a
/// foreign or outdated file is rejected without touching its tables.
pub fn parse<R: Read + Seek>(stream: &mut R) -> Result<ZimHeader> {
    info!("Parsing ZIM header");
    stream.seek(SeekFrom::Start(0))?;

    let magic = stream.read_u32::<LittleEndian>()?;
    trace!("Magic: {:#010x}", magic);
    if magic != ZIM_MAGIC {
        return Err(ZimError::BadMagic(magic));
    }

    let major_version = stream.read_u16::<LittleEndian>()?;
    let minor_version = stream.read_u16::<LittleEndian>()?;
    if major_version < MIN_MAJOR_VERSION {
        return Err(ZimError::UnsupportedVersion {
            major: major_version,
            minor: minor_version,
        });
    }

    let mut uuid = [0u8; 16];
    stream.read_exact(&mut uuid)?;

    let article_count = stream.read_u32::<LittleEndian>()?;
    let cluster_count = stream.read_u32::<LittleEndian>()?;
    let url_ptr_pos = stream.read_u64::<LittleEndian>()?;
    let title_ptr_pos = stream.read_u64::<LittleEndian>()?;
    let cluster_ptr_pos = stream.read_u64::<LittleEndian>()?;
    let mime_list_pos = stream.read_u64::<LittleEndian>()?;
    let main_page = optional_page(stream.read_u32::<LittleEndian>()?);
    let layout_page = optional_page(stream.read_u32::<LittleEndian>()?);
    let checksum_pos = stream.read_u64::<LittleEndian>()?;

    debug!(
        "Table positions: url={:#x}, title={:#x}, cluster={:#x}, mime={:#x}, checksum={:#x}",
        url_ptr_pos, title_ptr_pos, cluster_ptr_pos, mime_list_pos, checksum_pos
    );

    let header = ZimHeader {
        major_version,
        minor_version,
        uuid,
        article_count,
        cluster_count,
        url_ptr_pos,
        title_ptr_pos,
        cluster_ptr_pos,
        mime_list_pos,
        main_page,
        layout_page,
        checksum_pos,
    };

    info!(
        "Header parsed successfully: version={}, uuid={}, articles={}, clusters={}",
        header.file_version(),
        header.uuid_hex(),
        article_count,
        cluster_count
    );

    Ok(header)
}

fn optional_page(raw: u32) -> Option<u32> {
    (raw != NO_PAGE).then_some(raw)
}

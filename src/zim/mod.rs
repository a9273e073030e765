//! Core ZIM reader module

pub mod codec;
pub mod format;
pub mod index;
pub mod iter;
pub mod reader;
pub mod types;
mod utils;

pub use reader::ZimReader;
pub use types::error::{Result, ZimError};

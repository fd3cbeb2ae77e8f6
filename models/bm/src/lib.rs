//! Reader and writer for the `bmfile` mesh container.
//!
//! A container is a small header (magic, version and nine stream totals)
//! followed by ten packed arrays of fixed-size records. Each stream's
//! capacity is fixed when the file is created; records are accessed by
//! absolute index, so streams may be read or written in any order.

pub mod file;
pub mod layout;
pub mod records;

pub use file::{
	BmError,
	BmFile,
	Handle,
	Header
};
pub use layout::{
	Stream,
	Totals
};
pub use records::*;

/// File identifier, stored without a terminator
pub const MAGIC: [u8; 6] = *b"bmfile";
/// The only supported format version
pub const VERSION: u32 = 1;
/// Offset of the first stream: magic, version and the nine totals
pub const HEADER_SIZE: u64 = MAGIC.len() as u64 + 4 + Totals::SIZE;

pub const OPEN_READ: u32 = 0;
pub const OPEN_READ_WRITE: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
	/// Existing file, no writes allowed
	Read,
	/// Create-or-open, never truncating existing content
	ReadWrite,
}

impl TryFrom<u32> for OpenMode {
	type Error = BmError;

	fn try_from(mode: u32) -> Result<OpenMode, BmError> {
		match mode {
			OPEN_READ => Ok(OpenMode::Read),
			OPEN_READ_WRITE => Ok(OpenMode::ReadWrite),
			_ => Err(BmError::InvalidArgument(format!("unknown open mode {}", mode))),
		}
	}
}

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use log::{
	debug,
	trace,
	warn
};

use std::{
	fs::{
		File,
		OpenOptions
	},
	io::{
		Cursor,
		ErrorKind,
		Read,
		Seek,
		SeekFrom,
		self,
		Write
	},
	path::{
		Path,
		PathBuf
	}
};

use thiserror::Error;

use bmkit_core::io_ext::ReadBinExt;

use crate::{
	HEADER_SIZE,
	layout::{
		self,
		Stream,
		Totals
	},
	MAGIC,
	OpenMode,
	records::*,
	VERSION
};

/// Storage a container can live on
pub trait Handle: Read + Write + Seek {
	/// Pushes pending writes down to the underlying storage
	fn sync(&mut self) -> io::Result<()> {
		self.flush()
	}
}

impl Handle for File {
	fn sync(&mut self) -> io::Result<()> {
		self.flush()?;
		self.sync_all()
	}
}

impl Handle for Cursor<Vec<u8>> {}
impl Handle for Cursor<&mut Vec<u8>> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
	pub magic: [u8; 6],
	pub version: u32,
	pub totals: Totals,
}

impl Header {
	pub fn new(totals: Totals) -> Header {
		Header {
			magic: MAGIC,
			version: VERSION,
			totals: totals,
		}
	}

	fn read<R>(buf: &mut R) -> Result<Header, BmError>
	where
		R: ReadBytesExt,
	{
		// a file shorter than the magic is foreign, not truncated
		let magic = buf.read_tag(MAGIC.len())?;
		if magic != MAGIC {
			return Err(BmError::Magic(magic));
		}

		let version = buf.read_u32::<LE>().map_err(|e| header_error("version", e))?;
		if version != VERSION {
			return Err(BmError::Version(version));
		}

		Ok(Header {
			magic: MAGIC,
			version: version,
			totals: Totals::read(buf).map_err(|(field, e)| header_error(field, e))?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_all(&self.magic)?;
		buf.write_u32::<LE>(self.version)?;
		self.totals.write(buf)
	}

	/// Writes the whole header at the start of the handle in a single transfer
	fn store<W>(&self, handle: &mut W) -> io::Result<()>
	where
		W: Write + Seek,
	{
		let mut raw = Vec::with_capacity(HEADER_SIZE as usize);
		self.write(&mut raw)?;

		handle.seek(SeekFrom::Start(0))?;
		handle.write_all(&raw)
	}
}

fn header_error(field: &'static str, e: io::Error) -> BmError {
	match e.kind() {
		ErrorKind::UnexpectedEof => BmError::CorruptHeader(field),
		_ => BmError::from(e),
	}
}

/// An open mesh container.
///
/// Stream capacities come from the header and never change while the
/// container is open. Record access always seeks to an absolute position, so
/// calls for different streams and indices may be interleaved freely.
#[derive(Debug)]
pub struct BmFile<F = File> {
	handle: F,
	mode: OpenMode,
	header: Header,
}

impl BmFile<File> {
	/// Opens a container on disk.
	///
	/// [`OpenMode::Read`] requires an existing, valid file. [`OpenMode::ReadWrite`]
	/// creates the file if needed and keeps any existing content; a zero-length
	/// file receives a fresh header with every total set to zero.
	pub fn open<P>(path: P, mode: OpenMode) -> Result<BmFile, BmError>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		let handle = match mode {
			OpenMode::Read => File::open(path),
			OpenMode::ReadWrite => OpenOptions::new().read(true).write(true).create(true).truncate(false).open(path),
		}.map_err(|e| BmError::FileOpen {
			path: path.to_path_buf(),
			source: e,
		})?;

		debug!("Opening {} ({:?})", path.display(), mode);
		BmFile::from_handle(handle, mode)
	}

	/// Creates (or truncates) a container on disk with the given stream capacities
	#[cfg(feature = "export")]
	pub fn create<P>(path: P, totals: Totals) -> Result<BmFile, BmError>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		let handle = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)
			.map_err(|e| BmError::FileOpen {
				path: path.to_path_buf(),
				source: e,
			})?;

		debug!("Creating {}", path.display());
		BmFile::new(handle, totals)
	}
}

impl<F> BmFile<F>
where
	F: Handle,
{
	/// Loads (or, for an empty read-write handle, initializes) the header.
	/// The handle is dropped if the header is rejected.
	pub fn from_handle(mut handle: F, mode: OpenMode) -> Result<BmFile<F>, BmError> {
		let len = handle.seek(SeekFrom::End(0))?;
		handle.seek(SeekFrom::Start(0))?;

		let header = if len == 0 && mode == OpenMode::ReadWrite {
			let header = Header::new(Totals::default());
			header.store(&mut handle)?;
			debug!("Initialized empty container");
			header
		} else {
			Header::read(&mut handle).map_err(|e| {
				warn!("Rejected container header: {}", e);
				e
			})?
		};

		debug!("Loaded container v{} with {:?}", header.version, header.totals);

		Ok(BmFile {
			handle: handle,
			mode: mode,
			header: header,
		})
	}

	/// Writes a fresh header with the given stream capacities and returns a
	/// read-write container over the handle
	#[cfg(feature = "export")]
	pub fn new(mut handle: F, totals: Totals) -> Result<BmFile<F>, BmError> {
		let header = Header::new(totals);
		header.store(&mut handle)?;
		debug!("Created container with {:?}", totals);

		Ok(BmFile {
			handle: handle,
			mode: OpenMode::ReadWrite,
			header: header,
		})
	}

	pub fn mode(&self) -> OpenMode {
		self.mode
	}

	pub fn version(&self) -> u32 {
		self.header.version
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn totals(&self) -> &Totals {
		&self.header.totals
	}

	/// Byte offset at which a stream starts in this container
	pub fn offset(&self, stream: Stream) -> u64 {
		layout::offset(stream, &self.header.totals)
	}

	/// Flushes pending writes and releases the handle
	pub fn close(mut self) -> Result<(), BmError> {
		if self.mode == OpenMode::ReadWrite {
			self.handle.sync().map_err(BmError::Close)?;
		}

		debug!("Closed container");
		Ok(())
	}

	/// Releases the container without syncing, returning the handle
	pub fn into_inner(self) -> F {
		self.handle
	}

	/// Checks `first + count` against the stream's total and returns the
	/// absolute offset of record `first`
	fn locate(&self, stream: Stream, first: u32, count: usize) -> Result<u64, BmError> {
		let total = self.header.totals.total(stream);
		if first as u64 + count as u64 > total as u64 {
			return Err(BmError::OutOfBounds {
				stream: stream,
				first: first,
				count: count,
				total: total,
			});
		}

		Ok(layout::record_offset(stream, first, &self.header.totals))
	}

	#[cfg(feature = "export")]
	fn write_stream<T>(&mut self, stream: Stream, first: u32, records: &[T]) -> Result<(), BmError>
	where
		T: Record,
	{
		if self.mode == OpenMode::Read {
			return Err(BmError::InvalidArgument(format!("cannot write {} records to a read-only container",
				stream)));
		}

		let pos = self.locate(stream, first, records.len())?;

		let mut raw = Vec::with_capacity(records.len() * T::SIZE as usize);
		for rec in records.iter() {
			rec.write(&mut raw)?;
		}

		trace!("Writing {} {} records at index {} (offset {})", records.len(), stream, first, pos);
		self.handle.seek(SeekFrom::Start(pos))?;
		self.handle.write_all(&raw).map_err(|e| BmError::ShortTransfer {
			stream: stream,
			source: e,
		})
	}

	#[cfg(feature = "import")]
	fn read_raw(&mut self, stream: Stream, first: u32, count: usize) -> Result<Vec<u8>, BmError> {
		let pos = self.locate(stream, first, count)?;

		trace!("Reading {} {} records at index {} (offset {})", count, stream, first, pos);
		self.handle.seek(SeekFrom::Start(pos))?;

		let mut raw = vec![0; count * stream.record_size() as usize];
		self.handle.read_exact(&mut raw).map_err(|e| BmError::ShortTransfer {
			stream: stream,
			source: e,
		})?;

		Ok(raw)
	}

	#[cfg(feature = "import")]
	fn read_stream<T>(&mut self, stream: Stream, first: u32, count: usize) -> Result<Vec<T>, BmError>
	where
		T: Record,
	{
		let raw = self.read_raw(stream, first, count)?;
		let mut buf = raw.as_slice();

		(0..count).map(|_| T::read(&mut buf).map_err(BmError::from)).collect()
	}

	#[cfg(feature = "import")]
	fn read_stream_into<T>(&mut self, stream: Stream, first: u32, out: &mut [T]) -> Result<(), BmError>
	where
		T: Record,
	{
		let raw = self.read_raw(stream, first, out.len())?;
		let mut buf = raw.as_slice();

		for slot in out.iter_mut() {
			*slot = T::read(&mut buf)?;
		}

		Ok(())
	}
}

macro_rules! stream_accessors {
	($($stream: ident: $rec: ty, $name: literal => $write: ident, $read: ident, $read_into: ident;)*) => {
		impl<F> BmFile<F>
		where
			F: Handle,
		{
			$(
				#[doc = concat!("Writes consecutive ", $name, " records starting at index `first`.")]
				#[cfg(feature = "export")]
				pub fn $write(&mut self, first: u32, records: &[$rec]) -> Result<(), BmError> {
					self.write_stream(Stream::$stream, first, records)
				}

				#[doc = concat!("Reads `count` ", $name, " records starting at index `first`.")]
				#[cfg(feature = "import")]
				pub fn $read(&mut self, first: u32, count: usize) -> Result<Vec<$rec>, BmError> {
					self.read_stream(Stream::$stream, first, count)
				}

				#[doc = concat!("Fills `out` with ", $name, " records starting at index `first`.")]
				#[cfg(feature = "import")]
				pub fn $read_into(&mut self, first: u32, out: &mut [$rec]) -> Result<(), BmError> {
					self.read_stream_into(Stream::$stream, first, out)
				}
			)*
		}
	};
}

stream_accessors! {
	Vertex: Vertex, "vertex" => write_vertices, read_vertices, read_vertices_into;
	VertexTextured: VertexTextured, "textured vertex" =>
		write_vertices_textured, read_vertices_textured, read_vertices_textured_into;
	Element: Element, "element" => write_elements, read_elements, read_elements_into;
	Color: Color, "color" => write_colors, read_colors, read_colors_into;
	DrawArrays: DrawArrays, "draw arrays" => write_draw_arrays, read_draw_arrays, read_draw_arrays_into;
	DrawElements: DrawElements, "draw elements" =>
		write_draw_elements, read_draw_elements, read_draw_elements_into;
	DrawArraysTextured: DrawArraysTextured, "textured draw arrays" =>
		write_draw_arrays_textured, read_draw_arrays_textured, read_draw_arrays_textured_into;
	DrawElementsTextured: DrawElementsTextured, "textured draw elements" =>
		write_draw_elements_textured, read_draw_elements_textured, read_draw_elements_textured_into;
	TextureSize: TextureSize, "texture size" =>
		write_texture_sizes, read_texture_sizes, read_texture_sizes_into;
	Texel: Color, "texel" => write_texels, read_texels, read_texels_into;
}

#[derive(Error, Debug)]
pub enum BmError {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Unable to open {}", .path.display())]
	FileOpen {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("Not a bm file: {0:02X?}")]
	Magic(Vec<u8>),
	#[error("Unknown/unsupported format version: {0}")]
	Version(u32),
	#[error("Header truncated at the {0} field")]
	CorruptHeader(&'static str),
	#[error("Out of bounds {stream} access: {first} + {count} exceeds total of {total}")]
	OutOfBounds {
		stream: Stream,
		first: u32,
		count: usize,
		total: u32,
	},
	#[error("Short {stream} transfer")]
	ShortTransfer {
		stream: Stream,
		#[source]
		source: io::Error,
	},
	#[error("Unable to close file")]
	Close(#[source] io::Error),
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
}

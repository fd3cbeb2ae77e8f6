//! Stream order and offset computation.
//!
//! Streams are packed back to back after the header, so a stream's start is
//! the header size plus the byte length of every stream before it. Offsets
//! are always derived from the totals and never cached.

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::{
	fmt::{
		Display,
		Formatter,
		self
	},
	io
};

use crate::{
	HEADER_SIZE,
	records::*
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
	Vertex,
	VertexTextured,
	Element,
	Color,
	DrawArrays,
	DrawElements,
	DrawArraysTextured,
	DrawElementsTextured,
	TextureSize,
	Texel,
}

impl Stream {
	/// Every stream, in on-disk order
	pub const ALL: [Stream; 10] = [
		Stream::Vertex,
		Stream::VertexTextured,
		Stream::Element,
		Stream::Color,
		Stream::DrawArrays,
		Stream::DrawElements,
		Stream::DrawArraysTextured,
		Stream::DrawElementsTextured,
		Stream::TextureSize,
		Stream::Texel,
	];

	/// Size in bytes of a single record of this stream
	pub const fn record_size(self) -> u64 {
		match self {
			Stream::Vertex => Vertex::SIZE,
			Stream::VertexTextured => VertexTextured::SIZE,
			Stream::Element => Element::SIZE,
			Stream::Color | Stream::Texel => Color::SIZE,
			Stream::DrawArrays => DrawArrays::SIZE,
			Stream::DrawElements => DrawElements::SIZE,
			Stream::DrawArraysTextured => DrawArraysTextured::SIZE,
			Stream::DrawElementsTextured => DrawElementsTextured::SIZE,
			Stream::TextureSize => TextureSize::SIZE,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			Stream::Vertex => "vertex",
			Stream::VertexTextured => "textured vertex",
			Stream::Element => "element",
			Stream::Color => "color",
			Stream::DrawArrays => "draw arrays",
			Stream::DrawElements => "draw elements",
			Stream::DrawArraysTextured => "textured draw arrays",
			Stream::DrawElementsTextured => "textured draw elements",
			Stream::TextureSize => "texture size",
			Stream::Texel => "texel",
		}
	}
}

impl Display for Stream {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Record capacity of every stream, fixed when the file is created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
	pub vertex: u32,
	pub vertex_textured: u32,
	pub element: u32,
	pub color: u32,
	pub draw_arrays: u32,
	pub draw_elements: u32,
	pub draw_arrays_textured: u32,
	pub draw_elements_textured: u32,
	/// Bounds both the texture size and the texel streams
	pub texture: u32,
}

impl Totals {
	/// Encoded size of the nine header counts
	pub const SIZE: u64 = 9 * 4;

	/// Header field names, in on-disk order
	pub const FIELDS: [&'static str; 9] = [
		"vertex",
		"textured vertex",
		"element",
		"color",
		"draw arrays",
		"draw elements",
		"textured draw arrays",
		"textured draw elements",
		"texture",
	];

	/// Returns the declared record count of a stream
	pub const fn total(&self, stream: Stream) -> u32 {
		match stream {
			Stream::Vertex => self.vertex,
			Stream::VertexTextured => self.vertex_textured,
			Stream::Element => self.element,
			Stream::Color => self.color,
			Stream::DrawArrays => self.draw_arrays,
			Stream::DrawElements => self.draw_elements,
			Stream::DrawArraysTextured => self.draw_arrays_textured,
			Stream::DrawElementsTextured => self.draw_elements_textured,
			Stream::TextureSize | Stream::Texel => self.texture,
		}
	}

	fn as_array(&self) -> [u32; 9] {
		[self.vertex, self.vertex_textured, self.element, self.color, self.draw_arrays,
			self.draw_elements, self.draw_arrays_textured, self.draw_elements_textured, self.texture]
	}

	/// Reads the counts in header order.
	/// Returns the failing field's name alongside the error on a short read.
	pub(crate) fn read<R>(buf: &mut R) -> Result<Totals, (&'static str, io::Error)>
	where
		R: ReadBytesExt,
	{
		let mut counts = [0; 9];
		for (count, field) in counts.iter_mut().zip(Totals::FIELDS) {
			*count = buf.read_u32::<LE>().map_err(|e| (field, e))?;
		}

		let [vertex, vertex_textured, element, color, draw_arrays, draw_elements,
			draw_arrays_textured, draw_elements_textured, texture] = counts;

		Ok(Totals {
			vertex: vertex,
			vertex_textured: vertex_textured,
			element: element,
			color: color,
			draw_arrays: draw_arrays,
			draw_elements: draw_elements,
			draw_arrays_textured: draw_arrays_textured,
			draw_elements_textured: draw_elements_textured,
			texture: texture,
		})
	}

	pub(crate) fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		for count in self.as_array() {
			buf.write_u32::<LE>(count)?;
		}

		Ok(())
	}
}

/// Byte length of a whole stream
pub fn stream_len(stream: Stream, totals: &Totals) -> u64 {
	totals.total(stream) as u64 * stream.record_size()
}

/// Absolute byte offset at which the stream's first record starts
pub fn offset(stream: Stream, totals: &Totals) -> u64 {
	Stream::ALL.iter()
		.take_while(|s| **s != stream)
		.fold(HEADER_SIZE, |offs, s| offs + stream_len(*s, totals))
}

/// Absolute byte offset of a record within its stream
pub fn record_offset(stream: Stream, index: u32, totals: &Totals) -> u64 {
	offset(stream, totals) + index as u64 * stream.record_size()
}

/// Expected size of a fully written file
pub fn file_size(totals: &Totals) -> u64 {
	offset(Stream::Texel, totals) + stream_len(Stream::Texel, totals)
}

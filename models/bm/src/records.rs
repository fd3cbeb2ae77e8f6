//! Fixed-size records stored in the container streams.
//!
//! Every record is encoded field by field in declaration order, little endian,
//! with no padding between fields or between consecutive records.

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io;

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use bmkit_core::{
	io_ext::{
		ReadBinExt,
		WriteBinExt
	},
	texture
};

/// A fixed-size record with an explicit packed encoding
pub trait Record: Sized {
	/// Encoded size in bytes
	const SIZE: u64;

	fn read<R>(buf: &mut R) -> io::Result<Self>
	where
		R: ReadBytesExt;

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
	pub position: Vec3,
	pub normal: Vec3,
}

impl Vertex {
	pub fn new(position: Vec3, normal: Vec3) -> Vertex {
		Vertex {
			position: position,
			normal: normal,
		}
	}
}

impl Record for Vertex {
	const SIZE: u64 = 24;

	fn read<R>(buf: &mut R) -> io::Result<Vertex>
	where
		R: ReadBytesExt,
	{
		Ok(Vertex {
			position: buf.read_vec3_le()?,
			normal: buf.read_vec3_le()?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_vec3_le(self.position)?;
		buf.write_vec3_le(self.normal)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexTextured {
	pub position: Vec3,
	pub normal: Vec3,
	pub texcoord: Vec2,
}

impl VertexTextured {
	pub fn new(position: Vec3, normal: Vec3, texcoord: Vec2) -> VertexTextured {
		VertexTextured {
			position: position,
			normal: normal,
			texcoord: texcoord,
		}
	}
}

impl From<VertexTextured> for Vertex {
	/// Drops the texture coordinates
	fn from(v: VertexTextured) -> Vertex {
		Vertex::new(v.position, v.normal)
	}
}

impl Record for VertexTextured {
	const SIZE: u64 = 32;

	fn read<R>(buf: &mut R) -> io::Result<VertexTextured>
	where
		R: ReadBytesExt,
	{
		Ok(VertexTextured {
			position: buf.read_vec3_le()?,
			normal: buf.read_vec3_le()?,
			texcoord: buf.read_vec2_le()?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_vec3_le(self.position)?;
		buf.write_vec3_le(self.normal)?;
		buf.write_vec2_le(self.texcoord)
	}
}

/// Index into the vertex streams
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Element(pub u32);

impl Record for Element {
	const SIZE: u64 = 4;

	fn read<R>(buf: &mut R) -> io::Result<Element>
	where
		R: ReadBytesExt,
	{
		Ok(Element(buf.read_u32::<LE>()?))
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.0)
	}
}

/// 8 bit RGBA color, used by both the color and the texel streams
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
	pub rgba: [u8; 4],
}

impl Color {
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Color {
		Color {
			rgba: [r, g, b, a],
		}
	}
}

impl From<texture::Color> for Color {
	fn from(c: texture::Color) -> Color {
		Color {
			rgba: c.to_rgba8(),
		}
	}
}

impl From<Color> for texture::Color {
	fn from(c: Color) -> texture::Color {
		texture::Color::from_rgba8(c.rgba)
	}
}

impl Record for Color {
	const SIZE: u64 = 4;

	fn read<R>(buf: &mut R) -> io::Result<Color>
	where
		R: ReadBytesExt,
	{
		let mut rgba = [0; 4];
		buf.read_exact(&mut rgba)?;

		Ok(Color {
			rgba: rgba,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_all(&self.rgba)
	}
}

/// Non-indexed draw range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawArrays {
	pub vertex_count: u32,
	pub first_vertex: u32,
}

impl Record for DrawArrays {
	const SIZE: u64 = 8;

	fn read<R>(buf: &mut R) -> io::Result<DrawArrays>
	where
		R: ReadBytesExt,
	{
		Ok(DrawArrays {
			vertex_count: buf.read_u32::<LE>()?,
			first_vertex: buf.read_u32::<LE>()?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.vertex_count)?;
		buf.write_u32::<LE>(self.first_vertex)
	}
}

/// Indexed draw range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawElements {
	pub elem_count: u32,
	pub first_elem: u32,
	pub base_vertex: u32,
}

impl Record for DrawElements {
	const SIZE: u64 = 12;

	fn read<R>(buf: &mut R) -> io::Result<DrawElements>
	where
		R: ReadBytesExt,
	{
		Ok(DrawElements {
			elem_count: buf.read_u32::<LE>()?,
			first_elem: buf.read_u32::<LE>()?,
			base_vertex: buf.read_u32::<LE>()?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.elem_count)?;
		buf.write_u32::<LE>(self.first_elem)?;
		buf.write_u32::<LE>(self.base_vertex)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawArraysTextured {
	pub texture_id: u32,
	pub draw_arrays: DrawArrays,
}

impl Record for DrawArraysTextured {
	const SIZE: u64 = 4 + DrawArrays::SIZE;

	fn read<R>(buf: &mut R) -> io::Result<DrawArraysTextured>
	where
		R: ReadBytesExt,
	{
		Ok(DrawArraysTextured {
			texture_id: buf.read_u32::<LE>()?,
			draw_arrays: DrawArrays::read(buf)?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.texture_id)?;
		self.draw_arrays.write(buf)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawElementsTextured {
	pub texture_id: u32,
	pub draw_elements: DrawElements,
}

impl Record for DrawElementsTextured {
	const SIZE: u64 = 4 + DrawElements::SIZE;

	fn read<R>(buf: &mut R) -> io::Result<DrawElementsTextured>
	where
		R: ReadBytesExt,
	{
		Ok(DrawElementsTextured {
			texture_id: buf.read_u32::<LE>()?,
			draw_elements: DrawElements::read(buf)?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.texture_id)?;
		self.draw_elements.write(buf)
	}
}

/// Texture dimensions, paired by position with the texel stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureSize {
	pub width: u32,
	pub height: u32,
}

impl Record for TextureSize {
	const SIZE: u64 = 8;

	fn read<R>(buf: &mut R) -> io::Result<TextureSize>
	where
		R: ReadBytesExt,
	{
		Ok(TextureSize {
			width: buf.read_u32::<LE>()?,
			height: buf.read_u32::<LE>()?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.width)?;
		buf.write_u32::<LE>(self.height)
	}
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	use bmkit_core::texture;
	use super::*;

	/// Encodes a record, checking that the written length matches its declared size
	fn encode<T: Record>(rec: &T) -> Vec<u8> {
		let mut out = vec![];
		rec.write(&mut out).unwrap();
		assert_eq!(T::SIZE as usize, out.len());
		out
	}

	#[test]
	fn test_vertex_layout() {
		let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 1.0, 0.0));
		let raw = encode(&v);
		assert_eq!(&1.0f32.to_le_bytes()[..], &raw[0..4]);
		assert_eq!(&1.0f32.to_le_bytes()[..], &raw[16..20]);
		assert_eq!(v, Vertex::read(&mut raw.as_slice()).unwrap());
	}

	#[test]
	fn test_vertex_textured_layout() {
		let v = VertexTextured::new(Vec3::new(-1.0, 0.5, 2.0), Vec3::new(0.0, 0.0, 1.0),
			Vec2::new(0.25, 0.75));
		let raw = encode(&v);
		assert_eq!(&0.25f32.to_le_bytes()[..], &raw[24..28]);
		assert_eq!(&0.75f32.to_le_bytes()[..], &raw[28..32]);
		assert_eq!(Vertex::new(v.position, v.normal), Vertex::from(v));
	}

	#[test]
	fn test_draw_record_layout() {
		let d = DrawElementsTextured {
			texture_id: 7,
			draw_elements: DrawElements {
				elem_count: 36,
				first_elem: 12,
				base_vertex: 0x01020304,
			},
		};
		let raw = encode(&d);
		assert_eq!(vec![7, 0, 0, 0, 36, 0, 0, 0, 12, 0, 0, 0, 4, 3, 2, 1], raw);
		assert_eq!(d, DrawElementsTextured::read(&mut raw.as_slice()).unwrap());

		let a = DrawArraysTextured {
			texture_id: 1,
			draw_arrays: DrawArrays {
				vertex_count: 3,
				first_vertex: 9,
			},
		};
		assert_eq!(vec![1, 0, 0, 0, 3, 0, 0, 0, 9, 0, 0, 0], encode(&a));
	}

	#[test]
	fn test_small_records() {
		assert_eq!(vec![0xEF, 0xBE, 0xAD, 0xDE], encode(&Element(0xDEADBEEF)));
		assert_eq!(vec![1, 2, 3, 4], encode(&Color::new(1, 2, 3, 4)));
		assert_eq!(vec![0, 1, 0, 0, 0, 2, 0, 0], encode(&TextureSize {
			width: 256,
			height: 512,
		}));
	}

	#[test]
	fn test_short_record() {
		let raw = [0u8; 10];
		assert!(Vertex::read(&mut &raw[..]).is_err());
	}

	#[test]
	fn test_color_conversion() {
		let c = Color::new(255, 0, 51, 255);
		let f = texture::Color::from(c);
		assert_eq!(texture::Color::new(1.0, 0.0, 0.2, 1.0), f);
		assert_eq!(c, Color::from(f));
	}
}

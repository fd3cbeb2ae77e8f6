use crate::{
	u8_to_unit,
	unit_to_u8
};

/// Normalized RGBA color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub red: f32,
	pub green: f32,
	pub blue: f32,
	pub alpha: f32,
}

impl Color {
	pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Color {
		Color {
			red: red,
			green: green,
			blue: blue,
			alpha: alpha,
		}
	}

	pub fn from_rgba8(rgba: [u8; 4]) -> Color {
		Color {
			red: u8_to_unit(rgba[0]),
			green: u8_to_unit(rgba[1]),
			blue: u8_to_unit(rgba[2]),
			alpha: u8_to_unit(rgba[3]),
		}
	}

	pub fn to_rgba8(&self) -> [u8; 4] {
		[unit_to_u8(self.red), unit_to_u8(self.green), unit_to_u8(self.blue), unit_to_u8(self.alpha)]
	}
}

#[cfg(test)]
mod tests {
	use super::Color;

	#[test]
	fn test_rgba8() {
		let c = Color::from_rgba8([255, 0, 51, 255]);
		assert_eq!(Color::new(1.0, 0.0, 0.2, 1.0), c);
		assert_eq!([255, 0, 51, 255], c.to_rgba8());
	}
}

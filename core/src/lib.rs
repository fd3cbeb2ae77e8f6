#[cfg(feature = "io_ext")]
pub mod io_ext;

pub mod texture;

/// Scales a normalized float channel to 8 bits, clamping out of range input
pub fn unit_to_u8(v: f32) -> u8 {
	(v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scales an 8 bit channel to a normalized float
pub fn u8_to_unit(b: u8) -> f32 {
	(b as f32) / 255.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_channel_scaling() {
		assert_eq!(0, unit_to_u8(-1.0));
		assert_eq!(255, unit_to_u8(2.0));
		assert_eq!(128, unit_to_u8(0.5));

		for b in 0..=255u8 {
			assert_eq!(b, unit_to_u8(u8_to_unit(b)));
		}
	}
}

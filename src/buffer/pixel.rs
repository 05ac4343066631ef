//! RGBA pixel value type.

/// One 8-bit RGBA pixel, channels in buffer order R, G, B, A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a pixel from the first four bytes of `bytes`.
    ///
    /// Panics when fewer than four bytes are available. Slices produced by
    /// row and stride arithmetic always satisfy this; anything shorter means
    /// the caller handed in the wrong buffer.
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Self {
        assert!(
            bytes.len() >= 4,
            "pixel slice holds {} bytes, need 4",
            bytes.len()
        );
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Store the pixel into the first four bytes of `bytes`.
    #[inline]
    pub fn write_to(self, bytes: &mut [u8]) {
        assert!(
            bytes.len() >= 4,
            "pixel slice holds {} bytes, need 4",
            bytes.len()
        );
        bytes[0] = self.r;
        bytes[1] = self.g;
        bytes[2] = self.b;
        bytes[3] = self.a;
    }

    /// Channel values in buffer order.
    #[inline]
    pub const fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_reads_channels_in_buffer_order() {
        let px = Pixel::from_slice(&[10, 20, 30, 40, 99, 99]);
        assert_eq!(px, Pixel::new(10, 20, 30, 40));
        assert_eq!(px.channels(), [10, 20, 30, 40]);
    }

    #[test]
    #[should_panic(expected = "need 4")]
    fn from_slice_rejects_short_input() {
        let _ = Pixel::from_slice(&[1, 2, 3]);
    }

    #[test]
    fn write_to_stores_channels_in_buffer_order() {
        let mut bytes = [0u8; 4];
        Pixel::new(1, 2, 3, 4).write_to(&mut bytes);
        assert_eq!(bytes, [1, 2, 3, 4]);
    }

    #[test]
    fn opacity_check() {
        assert!(Pixel::WHITE.is_opaque());
        assert!(!Pixel::TRANSPARENT.is_opaque());
        assert!(!Pixel::new(0, 0, 0, 254).is_opaque());
    }
}

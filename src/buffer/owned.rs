//! Owned RGBA bitmap with stride and borrowed view conversion.

use super::view::{BYTES_PER_PIXEL, PixelBufferView};
use image::RgbaImage;

/// Owned RGBA8 buffer with row stride.
///
/// Owning the backing `Vec` is what keeps views alive: a
/// [`PixelBufferView`] borrowed through [`as_view`](Self::as_view) cannot
/// outlive the buffer, and dropping the buffer releases the allocation
/// exactly once.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Construct a tightly packed buffer from raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self::with_stride(width, height, width * BYTES_PER_PIXEL, data)
    }

    /// Construct a buffer whose rows are `bytes_per_row` bytes apart.
    ///
    /// Panics on the same geometry violations as [`PixelBufferView::new`].
    pub fn with_stride(width: usize, height: usize, bytes_per_row: usize, data: Vec<u8>) -> Self {
        let min_row = width
            .checked_mul(BYTES_PER_PIXEL)
            .expect("width overflows the addressable byte range");
        assert!(
            bytes_per_row >= min_row,
            "bytes_per_row {bytes_per_row} too small for width {width}"
        );
        let required = height
            .checked_mul(bytes_per_row)
            .expect("height overflows the addressable byte range");
        assert!(
            data.len() >= required,
            "buffer holds {} bytes, geometry needs {required}",
            data.len()
        );
        Self {
            width,
            height,
            bytes_per_row,
            data,
        }
    }

    /// Take ownership of a decoded image's pixels without copying.
    pub fn from_image(image: RgbaImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        Self::new(width, height, image.into_raw())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// Borrow as a read-only pixel view.
    pub fn as_view(&self) -> PixelBufferView<'_> {
        PixelBufferView::new(&self.data, self.width, self.height, self.bytes_per_row)
    }

    /// Copy into a tightly packed image, dropping any stride padding.
    pub fn to_image(&self) -> RgbaImage {
        self.as_view().to_image()
    }

    /// Consume the buffer, returning the backing bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn from_image_keeps_pixels_addressable() {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(2, 1, Rgba([9, 8, 7, 6]));
        let buffer = PixelBuffer::from_image(img);
        let view = buffer.as_view();
        assert!(view.is_tight());
        assert_eq!(view.pixel(2, 1).channels(), [9, 8, 7, 6]);
    }

    #[test]
    fn into_vec_returns_backing_bytes() {
        let data: Vec<u8> = (0..32).collect();
        let buffer = PixelBuffer::with_stride(3, 2, 16, data.clone());
        assert_eq!(buffer.bytes_per_row(), 16);
        assert_eq!(buffer.into_vec(), data);
    }

    #[test]
    #[should_panic(expected = "geometry needs")]
    fn rejects_undersized_backing() {
        let _ = PixelBuffer::new(4, 4, vec![0u8; 15]);
    }
}

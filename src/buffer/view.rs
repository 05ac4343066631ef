//! Zero-copy pixel views over raw RGBA bitmaps.
//!
//! [`PixelBufferView`] borrows a flat byte buffer together with its geometry
//! and exposes it as rows of [`Pixel`]s:
//!
//! - nothing is decoded up front; row and pixel accessors compute byte
//!   offsets on demand (`y * bytes_per_row` for rows, `x * 4` within a row),
//! - iterating a view twice re-reads the same backing bytes,
//! - stride padding past `width * 4` per row is never handed out.
//!
//! Geometry is validated once at construction and malformed geometry panics
//! immediately rather than clamping.

use super::pixel::Pixel;
use crate::PixelSize;
use image::RgbaImage;

/// Bytes occupied by one RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Borrowed view of an RGBA8 bitmap with row stride.
#[derive(Clone, Copy, Debug)]
pub struct PixelBufferView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    bytes_per_row: usize,
}

impl<'a> PixelBufferView<'a> {
    /// Wrap a raw buffer.
    ///
    /// Panics unless `bytes_per_row >= width * 4` and `data` holds at least
    /// `height * bytes_per_row` bytes.
    pub fn new(data: &'a [u8], width: usize, height: usize, bytes_per_row: usize) -> Self {
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
            data,
            width,
            height,
            bytes_per_row,
        }
    }

    /// Borrow a decoded image's pixels as a tightly packed view.
    pub fn from_image(image: &'a RgbaImage) -> Self {
        let width = image.width() as usize;
        Self::new(
            image.as_raw(),
            width,
            image.height() as usize,
            width * BYTES_PER_PIXEL,
        )
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

    /// View dimensions as an integer size.
    #[inline]
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width as u32, self.height as u32)
    }

    /// True when rows are packed back to back with no stride padding.
    #[inline]
    pub fn is_tight(&self) -> bool {
        self.bytes_per_row == self.width * BYTES_PER_PIXEL
    }

    /// The `width * 4` payload bytes of row `y`, padding excluded.
    #[inline]
    pub fn row_bytes(&self, y: usize) -> &'a [u8] {
        assert!(
            y < self.height,
            "row {y} out of bounds for height {}",
            self.height
        );
        let start = y * self.bytes_per_row;
        &self.data[start..start + self.width * BYTES_PER_PIXEL]
    }

    /// Row `y` as a lazily decoded run of pixels.
    #[inline]
    pub fn row(&self, y: usize) -> PixelRow<'a> {
        PixelRow {
            bytes: self.row_bytes(y),
        }
    }

    /// Decode the pixel at column `x` of row `y`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        let start = y * self.bytes_per_row + x * BYTES_PER_PIXEL;
        Pixel::from_slice(&self.data[start..start + BYTES_PER_PIXEL])
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> Rows<'a> {
        Rows { view: *self, y: 0 }
    }

    /// All payload bytes as one slice when the layout is tight.
    pub fn as_contiguous(&self) -> Option<&'a [u8]> {
        self.is_tight()
            .then(|| &self.data[..self.height * self.bytes_per_row])
    }

    /// Copy the view into a tightly packed image, padding dropped.
    pub fn to_image(&self) -> RgbaImage {
        let mut data = Vec::with_capacity(self.width * self.height * BYTES_PER_PIXEL);
        for y in 0..self.height {
            data.extend_from_slice(self.row_bytes(y));
        }
        RgbaImage::from_raw(self.width as u32, self.height as u32, data)
            .expect("tight byte count matches dimensions")
    }
}

/// One decoded-on-demand row of pixels.
#[derive(Clone, Copy, Debug)]
pub struct PixelRow<'a> {
    bytes: &'a [u8],
}

impl<'a> PixelRow<'a> {
    /// Number of pixels in the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / BYTES_PER_PIXEL
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel at column `x`.
    #[inline]
    pub fn get(&self, x: usize) -> Pixel {
        let start = x * BYTES_PER_PIXEL;
        Pixel::from_slice(&self.bytes[start..start + BYTES_PER_PIXEL])
    }

    /// Raw payload bytes of this row.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Iterate the row's pixels left to right.
    pub fn pixels(&self) -> RowPixels<'a> {
        RowPixels { bytes: self.bytes }
    }
}

impl<'a> IntoIterator for PixelRow<'a> {
    type Item = Pixel;
    type IntoIter = RowPixels<'a>;

    fn into_iter(self) -> RowPixels<'a> {
        self.pixels()
    }
}

/// Iterator over the pixels of one row.
pub struct RowPixels<'a> {
    bytes: &'a [u8],
}

impl Iterator for RowPixels<'_> {
    type Item = Pixel;

    fn next(&mut self) -> Option<Pixel> {
        if self.bytes.len() < BYTES_PER_PIXEL {
            return None;
        }
        let (head, tail) = self.bytes.split_at(BYTES_PER_PIXEL);
        self.bytes = tail;
        Some(Pixel::from_slice(head))
    }
}

/// Iterator over the rows of a view, top to bottom.
pub struct Rows<'a> {
    view: PixelBufferView<'a>,
    y: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = PixelRow<'a>;

    fn next(&mut self) -> Option<PixelRow<'a>> {
        if self.y >= self.view.height() {
            return None;
        }
        let y = self.y;
        self.y += 1;
        Some(self.view.row(y))
    }
}

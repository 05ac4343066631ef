//! Offscreen RGBA8 drawing surface with deterministic compositing.
//!
//! [`BitmapContext`] owns a zero-initialized premultiplied RGBA8 buffer
//! whose rows are padded to [`ROW_ALIGNMENT`] bytes. Draw calls composite
//! with the current blend mode and global alpha; geometry passes through a
//! uniform user-space scale and is snapped to whole device pixels. There is
//! no anti-aliasing anywhere, which keeps output byte-reproducible.

pub mod blend;

use crate::buffer::{BYTES_PER_PIXEL, Pixel, PixelBuffer, PixelBufferView};
use crate::{DrawRect, PixelSize};
use blend::{composite, premultiply, unpremultiply, with_alpha};
use image::RgbaImage;
use thiserror::Error;

pub use blend::BlendMode;

/// Row stride alignment in bytes.
pub const ROW_ALIGNMENT: usize = 16;

/// Failure to allocate a drawing surface.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("cannot create a {width}x{height} context, both dimensions must be non-zero")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("a {width}x{height} context overflows the addressable byte range")]
    CanvasTooLarge { width: u32, height: u32 },
}

/// Offscreen drawing surface.
#[derive(Debug)]
pub struct BitmapContext {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    data: Vec<u8>,
    blend: BlendMode,
    alpha: f64,
    scale: f64,
}

impl BitmapContext {
    /// Allocate a fully transparent surface of `size` pixels.
    ///
    /// Rows are padded to the next multiple of [`ROW_ALIGNMENT`], so a
    /// 3-pixel-wide surface carries 16-byte rows.
    pub fn new(size: PixelSize) -> Result<Self, ContextError> {
        if size.width == 0 || size.height == 0 {
            return Err(ContextError::EmptyCanvas {
                width: size.width,
                height: size.height,
            });
        }
        let width = size.width as usize;
        let height = size.height as usize;
        let row = width
            .checked_mul(BYTES_PER_PIXEL)
            .and_then(|b| b.checked_next_multiple_of(ROW_ALIGNMENT));
        let len = row.and_then(|bpr| bpr.checked_mul(height));
        let (Some(bytes_per_row), Some(len)) = (row, len) else {
            return Err(ContextError::CanvasTooLarge {
                width: size.width,
                height: size.height,
            });
        };
        Ok(Self {
            width,
            height,
            bytes_per_row,
            data: vec![0u8; len],
            blend: BlendMode::SourceOver,
            alpha: 1.0,
            scale: 1.0,
        })
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

    /// Surface dimensions in pixels.
    #[inline]
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width as u32, self.height as u32)
    }

    /// Select the compositing operator for subsequent draws.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Set the global alpha applied to subsequent draws.
    ///
    /// Values are clamped to [0, 1]; NaN collapses to fully opaque.
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.min(1.0).max(0.0);
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Set the uniform user-space scale. Must be finite and positive.
    pub fn set_scale(&mut self, scale: f64) {
        assert!(
            scale.is_finite() && scale > 0.0,
            "scale must be finite and positive, got {scale}"
        );
        self.scale = scale;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Fill a user-space rectangle with `color` using the current state.
    ///
    /// The rectangle is scaled, rounded to whole device pixels and clipped
    /// to the surface. Degenerate or fully clipped rectangles draw nothing.
    pub fn fill_rect(&mut self, rect: DrawRect, color: Pixel) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else {
            return;
        };
        let src = with_alpha(premultiply(color), self.alpha);
        let blend = self.blend;
        for y in y0..y1 {
            let start = y * self.bytes_per_row + x0 * BYTES_PER_PIXEL;
            let end = y * self.bytes_per_row + x1 * BYTES_PER_PIXEL;
            for px in self.data[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
                composite(blend, px, src);
            }
        }
    }

    /// Draw `image` into the user-space rectangle `rect`.
    ///
    /// Sampling is nearest-neighbor against the unclipped target rectangle;
    /// when the device rectangle matches the image dimensions every source
    /// pixel lands unresampled.
    pub fn draw_image(&mut self, image: &RgbaImage, rect: DrawRect) {
        let (iw, ih) = (image.width() as usize, image.height() as usize);
        if iw == 0 || ih == 0 {
            return;
        }
        let rx0 = (rect.min_x() * self.scale).round();
        let ry0 = (rect.min_y() * self.scale).round();
        let rx1 = (rect.max_x() * self.scale).round();
        let ry1 = (rect.max_y() * self.scale).round();
        if !(rx0.is_finite() && ry0.is_finite() && rx1.is_finite() && ry1.is_finite()) {
            return;
        }
        let (dest_w, dest_h) = (rx1 - rx0, ry1 - ry0);
        if dest_w <= 0.0 || dest_h <= 0.0 {
            return;
        }
        let x0 = rx0.max(0.0) as usize;
        let y0 = ry0.max(0.0) as usize;
        let x1 = rx1.min(self.width as f64).max(0.0) as usize;
        let y1 = ry1.min(self.height as f64).max(0.0) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = image.as_raw();
        let blend = self.blend;
        let alpha = self.alpha;
        for y in y0..y1 {
            // Map the destination pixel center back into source space.
            let v = (y as f64 + 0.5 - ry0) * ih as f64 / dest_h;
            let sy = (v as usize).min(ih - 1);
            let src_row = &src[sy * iw * BYTES_PER_PIXEL..(sy + 1) * iw * BYTES_PER_PIXEL];
            let start = y * self.bytes_per_row + x0 * BYTES_PER_PIXEL;
            let row = &mut self.data[start..start + (x1 - x0) * BYTES_PER_PIXEL];
            for (i, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let u = ((x0 + i) as f64 + 0.5 - rx0) * iw as f64 / dest_w;
                let sx = (u as usize).min(iw - 1);
                let off = sx * BYTES_PER_PIXEL;
                let p = Pixel::from_slice(&src_row[off..off + BYTES_PER_PIXEL]);
                composite(blend, px, with_alpha(premultiply(p), alpha));
            }
        }
    }

    /// Payload bytes of row `y`, stride padding excluded.
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(
            y < self.height,
            "row {y} out of bounds for height {}",
            self.height
        );
        let start = y * self.bytes_per_row;
        &self.data[start..start + self.width * BYTES_PER_PIXEL]
    }

    /// Mutable payload bytes of row `y`, stride padding excluded.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(
            y < self.height,
            "row {y} out of bounds for height {}",
            self.height
        );
        let start = y * self.bytes_per_row;
        &mut self.data[start..start + self.width * BYTES_PER_PIXEL]
    }

    /// Zero-copy view of the surface, row padding included in the stride.
    ///
    /// Bytes are premultiplied; opaque content reads the same either way.
    pub fn as_view(&self) -> PixelBufferView<'_> {
        PixelBufferView::new(&self.data, self.width, self.height, self.bytes_per_row)
    }

    /// Copy the surface into a tightly packed straight-alpha image.
    pub fn make_image(&self) -> RgbaImage {
        let mut data = Vec::with_capacity(self.width * self.height * BYTES_PER_PIXEL);
        for y in 0..self.height {
            for px in self.row(y).chunks_exact(BYTES_PER_PIXEL) {
                data.extend_from_slice(&unpremultiply([px[0], px[1], px[2], px[3]]));
            }
        }
        RgbaImage::from_raw(self.width as u32, self.height as u32, data)
            .expect("tight byte count matches context dimensions")
    }

    /// Hand the backing allocation to an owned buffer, stride preserved.
    ///
    /// Bytes stay premultiplied; use [`make_image`](Self::make_image) for
    /// straight alpha.
    pub fn into_pixel_buffer(self) -> PixelBuffer {
        PixelBuffer::with_stride(self.width, self.height, self.bytes_per_row, self.data)
    }

    fn device_bounds(&self, rect: DrawRect) -> Option<(usize, usize, usize, usize)> {
        let x0 = (rect.min_x() * self.scale).round();
        let y0 = (rect.min_y() * self.scale).round();
        let x1 = (rect.max_x() * self.scale).round();
        let y1 = (rect.max_y() * self.scale).round();
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return None;
        }
        let x0 = x0.max(0.0) as usize;
        let y0 = y0.max(0.0) as usize;
        let x1 = x1.min(self.width as f64).max(0.0) as usize;
        let y1 = y1.min(self.height as f64).max(0.0) as usize;
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::rect;
    use image::Rgba;

    #[test]
    fn rows_are_padded_to_alignment() {
        let ctx = BitmapContext::new(PixelSize::new(3, 2)).unwrap();
        assert_eq!(ctx.bytes_per_row(), 16);
        let view = ctx.as_view();
        assert_eq!(view.bytes_per_row(), 16);
        assert!(!view.is_tight());
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = BitmapContext::new(PixelSize::new(0, 4)).unwrap_err();
        assert!(matches!(err, ContextError::EmptyCanvas { .. }));
    }

    #[test]
    fn new_surface_is_transparent() {
        let ctx = BitmapContext::new(PixelSize::new(4, 4)).unwrap();
        assert!(ctx.row(0).iter().all(|&b| b == 0));
        let img = ctx.make_image();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut ctx = BitmapContext::new(PixelSize::new(4, 4)).unwrap();
        ctx.fill_rect(rect(-2.0, 1.0, 4.0, 2.0), Pixel::new(10, 20, 30, 255));
        let img = ctx.make_image();
        assert_eq!(img.get_pixel(0, 1).0, [10, 20, 30, 255]);
        assert_eq!(img.get_pixel(1, 2).0, [10, 20, 30, 255]);
        assert_eq!(img.get_pixel(2, 1).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(0, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_honors_scale() {
        let mut ctx = BitmapContext::new(PixelSize::new(8, 8)).unwrap();
        ctx.set_scale(2.0);
        ctx.fill_rect(rect(1.0, 1.0, 2.0, 1.0), Pixel::WHITE);
        let img = ctx.make_image();
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(5, 3).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(6, 2).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(2, 4).0, [0, 0, 0, 0]);
    }

    #[test]
    fn global_alpha_scales_fill() {
        let mut ctx = BitmapContext::new(PixelSize::new(2, 1)).unwrap();
        ctx.set_alpha(0.5);
        ctx.fill_rect(rect(0.0, 0.0, 2.0, 1.0), Pixel::new(255, 0, 0, 255));
        let img = ctx.make_image();
        let [r, g, b, a] = img.get_pixel(0, 0).0;
        assert_eq!(a, 128);
        assert_eq!((g, b), (0, 0));
        assert!(r >= 254, "r={r}");
    }

    #[test]
    fn draw_image_at_native_size_is_exact() {
        let mut src = RgbaImage::new(5, 3);
        for (x, y, px) in src.enumerate_pixels_mut() {
            *px = Rgba([x as u8 * 40, y as u8 * 70, 200, 255]);
        }
        let mut ctx = BitmapContext::new(PixelSize::new(5, 3)).unwrap();
        ctx.draw_image(&src, rect(0.0, 0.0, 5.0, 3.0));
        assert_eq!(ctx.make_image(), src);
    }

    #[test]
    fn draw_image_scales_with_nearest_neighbor() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let mut ctx = BitmapContext::new(PixelSize::new(4, 2)).unwrap();
        ctx.draw_image(&src, rect(0.0, 0.0, 4.0, 2.0));
        let img = ctx.make_image();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(3, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn difference_blend_cancels_identical_fills() {
        let mut ctx = BitmapContext::new(PixelSize::new(2, 2)).unwrap();
        ctx.fill_rect(rect(0.0, 0.0, 2.0, 2.0), Pixel::WHITE);
        ctx.set_blend_mode(BlendMode::Difference);
        ctx.fill_rect(rect(0.0, 0.0, 2.0, 2.0), Pixel::WHITE);
        let img = ctx.make_image();
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn into_pixel_buffer_keeps_stride() {
        let mut ctx = BitmapContext::new(PixelSize::new(3, 2)).unwrap();
        ctx.fill_rect(rect(0.0, 0.0, 3.0, 2.0), Pixel::new(5, 6, 7, 255));
        let buffer = ctx.into_pixel_buffer();
        assert_eq!(buffer.bytes_per_row(), 16);
        assert_eq!(buffer.as_view().pixel(2, 1).channels(), [5, 6, 7, 255]);
    }

    #[test]
    #[should_panic(expected = "finite and positive")]
    fn rejects_zero_scale() {
        let mut ctx = BitmapContext::new(PixelSize::new(1, 1)).unwrap();
        ctx.set_scale(0.0);
    }
}

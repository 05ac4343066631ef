//! Vector page rasterization.
//!
//! The drawing backend stays outside the crate: anything that can report a
//! media box and paint itself into a [`BitmapContext`] is a page. The
//! functions here only orchestrate sizing, scaling and finalization, and
//! they are best-effort per page: a page that cannot produce a bitmap
//! yields `None` instead of aborting the batch it belongs to.

use crate::context::BitmapContext;
use crate::{PageSize, PixelSize};
use image::RgbaImage;
use log::debug;

/// A page of vector content that can paint itself into a bitmap context.
pub trait VectorPage {
    /// Page extent in points (1/72 inch).
    fn media_box(&self) -> PageSize;

    /// Paint the page. Coordinates are in page points; the context arrives
    /// with its scale transform already set.
    fn draw(&self, ctx: &mut BitmapContext);
}

/// Render one page at `scale` device pixels per point.
///
/// Returns `None` when no bitmap can be produced: a non-finite or
/// non-positive scale, a media box that maps to an empty or oversized
/// bitmap, or a surface that cannot be allocated. The reason is traced at
/// debug level.
pub fn rasterize_page<P: VectorPage + ?Sized>(page: &P, scale: f64) -> Option<RgbaImage> {
    if !scale.is_finite() || scale <= 0.0 {
        debug!("rasterize: rejecting scale {scale}");
        return None;
    }
    let media = page.media_box();
    let size = device_size(media, scale)?;
    let mut ctx = match BitmapContext::new(size) {
        Ok(ctx) => ctx,
        Err(err) => {
            debug!("rasterize: {err}");
            return None;
        }
    };
    ctx.set_scale(scale);
    page.draw(&mut ctx);
    debug!(
        "rasterize: page {:.1}x{:.1}pt at {scale} -> {}x{}px",
        media.width, media.height, size.width, size.height
    );
    Some(ctx.make_image())
}

/// Render every page of a document at `scale`, keeping per-page slots.
///
/// Pages that fail to render are `None` in the returned vector, so callers
/// can flag or skip them without losing page numbering.
pub fn rasterize_document<P: VectorPage>(pages: &[P], scale: f64) -> Vec<Option<RgbaImage>> {
    pages
        .iter()
        .map(|page| rasterize_page(page, scale))
        .collect()
}

fn device_size(media: PageSize, scale: f64) -> Option<PixelSize> {
    if !(media.width.is_finite() && media.height.is_finite()) {
        debug!("rasterize: media box {media:?} is not finite");
        return None;
    }
    let w = (media.width * scale).round();
    let h = (media.height * scale).round();
    if w < 1.0 || h < 1.0 || w > u32::MAX as f64 || h > u32::MAX as f64 {
        debug!(
            "rasterize: media box {:.1}x{:.1}pt at {scale} maps to an empty or oversized bitmap",
            media.width, media.height
        );
        return None;
    }
    Some(PixelSize::new(w as u32, h as u32))
}

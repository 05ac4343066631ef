//! Visual diff composites between two renderings.
//!
//! The diff canvas is the union of both input sizes, so neither rendering
//! is cropped. Every canvas pixel is classified by coverage:
//!
//! - covered by both: inverted half-strength difference over white, so
//!   identical pixels come out white and a full-range change lands mid-gray
//!   in the changed channels,
//! - covered by exactly one input: that input composited over white,
//! - covered by neither: white.
//!
//! The output is always opaque, which makes it both human-readable and
//! stable under golden-file comparison.

use crate::PixelSize;
use crate::buffer::{BYTES_PER_PIXEL, Pixel, PixelBufferView};
use crate::context::BitmapContext;
use crate::context::blend::over_backdrop;
use image::RgbaImage;
use log::debug;
use serde::Serialize;
use std::time::Instant;

/// Machine-readable summary of one diff run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Pixels inside the overlap of both inputs.
    pub compared_pixels: u64,
    /// Overlap pixels where any of the four channels differs.
    pub differing_pixels: u64,
    /// Largest single-channel delta seen in the overlap.
    pub max_channel_delta: u8,
    pub elapsed_ms: f64,
}

impl DiffReport {
    /// True when the compared area is pixel-identical.
    pub fn is_identical(&self) -> bool {
        self.differing_pixels == 0
    }
}

/// Produce the visual diff image of two renderings.
///
/// Panics when both inputs are empty, since no canvas can be allocated.
pub fn diff(before: &RgbaImage, after: &RgbaImage) -> RgbaImage {
    diff_with_report(before, after).0
}

/// Like [`diff`], also returning counters for harness logs.
pub fn diff_with_report(before: &RgbaImage, after: &RgbaImage) -> (RgbaImage, DiffReport) {
    let t0 = Instant::now();
    let size = canvas_size(before, after);
    let mut ctx =
        BitmapContext::new(size).expect("diff canvas requires at least one non-empty input");

    let a = PixelBufferView::from_image(before);
    let b = PixelBufferView::from_image(after);
    let mut differing = 0u64;
    let mut max_delta = 0u8;

    for y in 0..size.height as usize {
        let row = ctx.row_mut(y);
        for (x, out) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            let px = match (sample(&a, x, y), sample(&b, x, y)) {
                (Some(pa), Some(pb)) => {
                    let delta = channel_delta(pa, pb);
                    if delta > 0 {
                        differing += 1;
                        max_delta = max_delta.max(delta);
                    }
                    difference_over_white(pa, pb)
                }
                (Some(p), None) | (None, Some(p)) => over_backdrop(p, Pixel::WHITE),
                (None, None) => Pixel::WHITE,
            };
            px.write_to(out);
        }
    }

    let overlap_w = before.width().min(after.width()) as u64;
    let overlap_h = before.height().min(after.height()) as u64;
    let report = DiffReport {
        canvas_width: size.width,
        canvas_height: size.height,
        compared_pixels: overlap_w * overlap_h,
        differing_pixels: differing,
        max_channel_delta: max_delta,
        elapsed_ms: t0.elapsed().as_secs_f64() * 1000.0,
    };
    debug!(
        "diff: canvas {}x{} compared {} differing {} max_delta {}",
        size.width, size.height, report.compared_pixels, differing, max_delta
    );
    (ctx.make_image(), report)
}

fn canvas_size(before: &RgbaImage, after: &RgbaImage) -> PixelSize {
    let a = PixelSize::new(before.width(), before.height());
    let b = PixelSize::new(after.width(), after.height());
    a.max(b)
}

fn sample(view: &PixelBufferView<'_>, x: usize, y: usize) -> Option<Pixel> {
    (x < view.width() && y < view.height()).then(|| view.pixel(x, y))
}

fn channel_delta(a: Pixel, b: Pixel) -> u8 {
    a.r.abs_diff(b.r)
        .max(a.g.abs_diff(b.g))
        .max(a.b.abs_diff(b.b))
        .max(a.a.abs_diff(b.a))
}

/// Half-strength channel difference inverted over white; equal inputs map
/// to pure white.
fn difference_over_white(a: Pixel, b: Pixel) -> Pixel {
    Pixel::new(
        255 - a.r.abs_diff(b.r) / 2,
        255 - a.g.abs_diff(b.g) / 2,
        255 - a.b.abs_diff(b.b) / 2,
        255,
    )
}

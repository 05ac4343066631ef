//! Premultiplied-alpha compositing primitives.
//!
//! All math is 8-bit integer with fixed rounding, so composites are
//! byte-reproducible run to run. Surfaces store premultiplied RGBA;
//! straight-alpha sources are premultiplied on entry and opaque values
//! pass through untouched.

use crate::buffer::Pixel;

/// Compositing operator applied by context draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Porter-Duff source-over.
    #[default]
    SourceOver,
    /// Per-channel difference; alpha composes as the union of coverage.
    Difference,
}

/// Multiply two channel bytes as [0, 1] fractions, rounding to nearest.
#[inline]
pub(crate) fn mul255(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// Premultiply a straight-alpha pixel.
#[inline]
pub(crate) fn premultiply(px: Pixel) -> [u8; 4] {
    if px.a == 255 {
        return px.channels();
    }
    [
        mul255(px.r, px.a),
        mul255(px.g, px.a),
        mul255(px.b, px.a),
        px.a,
    ]
}

/// Scale a premultiplied pixel by a global alpha in [0, 1].
#[inline]
pub(crate) fn with_alpha(src: [u8; 4], alpha: f64) -> [u8; 4] {
    if alpha >= 1.0 {
        return src;
    }
    let mut out = [0u8; 4];
    for (o, &s) in out.iter_mut().zip(src.iter()) {
        *o = (s as f64 * alpha + 0.5) as u8;
    }
    out
}

/// Undo premultiplication; zero alpha maps to transparent black.
#[inline]
pub(crate) fn unpremultiply(px: [u8; 4]) -> [u8; 4] {
    match px[3] {
        0 => [0, 0, 0, 0],
        255 => px,
        a => {
            let a32 = a as u32;
            let undo = |c: u8| (((c as u32 * 255) + a32 / 2) / a32).min(255) as u8;
            [undo(px[0]), undo(px[1]), undo(px[2]), a]
        }
    }
}

/// Composite one premultiplied source pixel onto a premultiplied
/// destination slice in place.
#[inline]
pub(crate) fn composite(mode: BlendMode, dst: &mut [u8], src: [u8; 4]) {
    match mode {
        BlendMode::SourceOver => source_over(dst, src),
        BlendMode::Difference => difference(dst, src),
    }
}

// Dca' = Sca + Dca.(1 - Sa), Da' = Sa + Da.(1 - Sa)
#[inline]
fn source_over(dst: &mut [u8], src: [u8; 4]) {
    if src[3] == 255 {
        dst[..4].copy_from_slice(&src);
        return;
    }
    let inv = 255 - src[3];
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = s.saturating_add(mul255(*d, inv));
    }
}

// Dca' = Sca + Dca - 2.min(Sca.Da, Dca.Sa), Da' = Sa + Da - Sa.Da
#[inline]
fn difference(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3];
    let da = dst[3];
    for k in 0..3 {
        let both = 2 * mul255(src[k], da).min(mul255(dst[k], sa)) as i32;
        let v = src[k] as i32 + dst[k] as i32 - both;
        dst[k] = v.clamp(0, 255) as u8;
    }
    dst[3] = (sa as u16 + da as u16 - mul255(sa, da) as u16).min(255) as u8;
}

/// Composite a straight-alpha pixel over an opaque backdrop color.
///
/// The result is always opaque; an already opaque `px` passes through
/// with its exact bytes.
#[inline]
pub fn over_backdrop(px: Pixel, backdrop: Pixel) -> Pixel {
    if px.a == 255 {
        return Pixel::new(px.r, px.g, px.b, 255);
    }
    let inv = 255 - px.a;
    Pixel::new(
        mul255(px.r, px.a).saturating_add(mul255(backdrop.r, inv)),
        mul255(px.g, px.a).saturating_add(mul255(backdrop.g, inv)),
        mul255(px.b, px.a).saturating_add(mul255(backdrop.b, inv)),
        255,
    )
}

#![doc = include_str!("../README.md")]

pub mod buffer;
pub mod context;
pub mod diff;
pub mod io;
pub mod raster;

// --- Geometry aliases ------------------------------------------------------

/// Integer pixel dimensions of an image, view or context.
pub type PixelSize = euclid::default::Size2D<u32>;

/// Page extent in points (1/72 inch).
pub type PageSize = euclid::default::Size2D<f64>;

/// User-space rectangle for context draw calls.
pub type DrawRect = euclid::default::Rect<f64>;

// --- High-level re-exports -------------------------------------------------

// Pixel access: the value type, the borrowed view and the owned buffer.
pub use crate::buffer::{Pixel, PixelBuffer, PixelBufferView};

// Drawing surface and its state.
pub use crate::context::{BitmapContext, BlendMode, ContextError};

// Main entry points: diffing, rasterization, PNG io.
pub use crate::diff::{DiffReport, diff, diff_with_report};
pub use crate::io::{ReadError, WriteError, read_png, write_png};
pub use crate::raster::{VectorPage, rasterize_document, rasterize_page};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for harness code.
///
/// ```no_run
/// use snapdiff::prelude::*;
/// use std::path::Path;
///
/// # fn main() {
/// let before = read_png(Path::new("before.png")).expect("baseline");
/// let after = read_png(Path::new("after.png")).expect("candidate");
///
/// let (image, report) = diff_with_report(&before, &after);
/// if !report.is_identical() {
///     write_png(&image, Path::new("diff.png")).expect("write diff");
/// }
/// # }
/// ```
pub mod prelude {
    pub use crate::buffer::{Pixel, PixelBuffer, PixelBufferView};
    pub use crate::context::{BitmapContext, BlendMode};
    pub use crate::diff::{DiffReport, diff, diff_with_report};
    pub use crate::io::{read_png, write_png};
    pub use crate::raster::{VectorPage, rasterize_document, rasterize_page};
    pub use crate::{DrawRect, PageSize, PixelSize};
}

pub mod owned;
pub mod pixel;
pub mod view;

pub use self::owned::PixelBuffer;
pub use self::pixel::Pixel;
pub use self::view::{BYTES_PER_PIXEL, PixelBufferView, PixelRow, RowPixels, Rows};

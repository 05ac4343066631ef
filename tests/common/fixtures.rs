use euclid::rect;
use image::{Rgba, RgbaImage};
use snapdiff::{BitmapContext, PageSize, Pixel, VectorPage};

/// Generates a uniformly colored image.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Generates a deterministic opaque gradient so every pixel is distinct
/// from its neighbors.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = RgbaImage::new(width, height);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
    }
    img
}

/// High-contrast checkerboard page for rasterizer tests: a white sheet
/// with dark cells on the even diagonals.
pub struct CheckerPage {
    pub size: PageSize,
    pub cell: f64,
}

impl VectorPage for CheckerPage {
    fn media_box(&self) -> PageSize {
        self.size
    }

    fn draw(&self, ctx: &mut BitmapContext) {
        assert!(self.cell > 0.0, "cell size must be positive");
        ctx.fill_rect(
            rect(0.0, 0.0, self.size.width, self.size.height),
            Pixel::WHITE,
        );
        let dark = Pixel::new(32, 32, 32, 255);
        let mut row = 0usize;
        let mut y = 0.0;
        while y < self.size.height {
            let mut col = 0usize;
            let mut x = 0.0;
            while x < self.size.width {
                if (row + col) % 2 == 0 {
                    ctx.fill_rect(rect(x, y, self.cell, self.cell), dark);
                }
                col += 1;
                x += self.cell;
            }
            row += 1;
            y += self.cell;
        }
    }
}

//! PNG input/output.
//!
//! - `write_png`: encode an image to disk, creating parent directories.
//! - `encode_png`: encode into any writer, for in-memory consumers.
//! - `read_png`: decode a file back into an RGBA8 image.
//!
//! Write failures keep destination-creation problems and encode/flush
//! problems apart, so a harness can tell a bad output directory from a
//! failed encode.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbaImage};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while writing a PNG to disk.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The destination file or one of its parent directories could not be
    /// created.
    #[error("failed to create {}: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The destination existed but encoding into it or flushing it failed.
    #[error("failed to finalize {}: {source}", path.display())]
    FinalizeOutput {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// Failure while reading a PNG from disk.
#[derive(Debug, Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: ImageError,
}

/// Encode `image` as an RGBA8 PNG into `writer`.
pub fn encode_png<W: Write>(image: &RgbaImage, writer: W) -> Result<(), ImageError> {
    PngEncoder::new(writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )
}

/// Write `image` to `path` as a PNG, creating parent directories.
///
/// RGBA8 PNG is lossless, so reading the file back yields pixel-identical
/// data.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), WriteError> {
    let file = create_destination(path)?;
    write_png_to(image, BufWriter::new(file), path)
}

/// Read an RGBA8 image from the PNG at `path`.
pub fn read_png(path: &Path) -> Result<RgbaImage, ReadError> {
    let img = image::open(path).map_err(|source| ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.into_rgba8())
}

fn create_destination(path: &Path) -> Result<File, WriteError> {
    ensure_parent_dir(path)
        .and_then(|()| File::create(path))
        .map_err(|source| WriteError::CreateDestination {
            path: path.to_path_buf(),
            source,
        })
}

fn write_png_to<W: Write>(image: &RgbaImage, mut writer: W, path: &Path) -> Result<(), WriteError> {
    encode_png(image, &mut writer).map_err(|source| WriteError::FinalizeOutput {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| WriteError::FinalizeOutput {
        path: path.to_path_buf(),
        source: ImageError::IoError(e),
    })
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample_image() -> RgbaImage {
        let mut img = RgbaImage::new(5, 4);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([x as u8 * 50, y as u8 * 60, 77, 255]);
        }
        img
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink is broken"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("sink is broken"))
        }
    }

    #[test]
    fn png_round_trip_is_pixel_identical() {
        let dir = std::env::temp_dir().join("snapdiff_io_round_trip");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("out.png");

        let img = sample_image();
        write_png(&img, &path).expect("write");
        let back = read_png(&path).expect("read");
        assert_eq!(back, img);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn encode_png_produces_a_png_signature() {
        let mut bytes = Vec::new();
        encode_png(&sample_image(), &mut bytes).expect("encode");
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn unwritable_destination_reports_create_kind() {
        let dir = std::env::temp_dir().join("snapdiff_io_create_error");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("temp dir");
        // Occupy the parent slot with a plain file so create_dir_all fails.
        let blocker = dir.join("blocker");
        fs::write(&blocker, b"not a directory").expect("blocker file");

        let err = write_png(&sample_image(), &blocker.join("out.png")).unwrap_err();
        assert!(matches!(err, WriteError::CreateDestination { .. }), "{err}");
        assert!(err.to_string().contains("out.png"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn broken_sink_reports_finalize_kind() {
        let err =
            write_png_to(&sample_image(), BrokenWriter, Path::new("broken.png")).unwrap_err();
        assert!(matches!(err, WriteError::FinalizeOutput { .. }), "{err}");
        assert!(err.to_string().contains("finalize"));
    }

    #[test]
    fn missing_file_reports_path_in_error() {
        let path = std::env::temp_dir().join("snapdiff_io_missing").join("nope.png");
        let err = read_png(&path).unwrap_err();
        assert!(err.to_string().contains("nope.png"));
    }
}

//! Image loader: any supported image file to a grayscale [`Raster`].

use std::path::Path;

use forgemesh::Raster;
use image::ImageReader;

use crate::error::{IoError, IoResult};

/// Loads `path` and converts it to 8-bit luminance.
///
/// The format is sniffed from the file contents, so a misnamed extension
/// still decodes.
///
/// # Errors
///
/// [`IoError::FileNotFound`] for a missing file, [`IoError::Decode`] when
/// the bytes are not a decodable image.
pub fn load_raster(path: impl AsRef<Path>) -> IoResult<Raster> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)
        .map_err(|e| IoError::opening(path, e))?
        .with_guessed_format()
        .map_err(|e| IoError::opening(path, e))?;

    let image = reader.decode().map_err(|e| IoError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let raster = Raster::from_gray_image(&image.to_luma8());
    tracing::debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        "loaded raster"
    );
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        GrayImage::from_fn(8, 4, |x, _| Luma([(x * 32) as u8]))
            .save(&path)
            .unwrap();

        let raster = load_raster(&path).unwrap();
        assert_eq!(raster.width(), 8);
        assert_eq!(raster.height(), 4);
        assert_eq!(raster.get(0, 0), 0.0);
        assert_eq!(raster.get(3, 7), 224.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_raster("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(load_raster(&path), Err(IoError::Decode { .. })));
    }
}

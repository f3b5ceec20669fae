//! # Raster
//!
//! Grayscale intensity grids and the preprocessing applied before
//! synthesis: inversion, Gaussian smoothing, Lanczos resampling and
//! thresholding to a binary mask.
//!
//! Intensities are stored on the 0..=255 scale, row-major, origin top-left.
//! Every operation returns a new raster; inputs are never modified.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};

use crate::error::{MeshError, MeshResult};

type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Full-scale intensity value.
pub const MAX_INTENSITY: f64 = 255.0;

/// A 2-D grayscale intensity array.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Raster {
    /// Creates a raster from row-major intensities in `0..=255`.
    ///
    /// # Errors
    ///
    /// Fails when the buffer length does not match the dimensions or a
    /// value lies outside `0..=255`.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> MeshResult<Self> {
        if width == 0 || height == 0 {
            return Err(MeshError::InsufficientResolution { width, height });
        }
        if data.len() != width * height {
            return Err(MeshError::invalid_parameter(
                "raster",
                data.len() as f64,
                "buffer length must equal width * height",
            ));
        }
        if let Some(bad) = data
            .iter()
            .find(|v| !(v.is_finite() && (0.0..=MAX_INTENSITY).contains(*v)))
        {
            return Err(MeshError::invalid_parameter(
                "intensity",
                *bad,
                "must lie within 0..=255",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a raster from row-major intensities normalized to `0..=1`.
    pub fn from_normalized(width: usize, height: usize, data: Vec<f64>) -> MeshResult<Self> {
        Self::new(
            width,
            height,
            data.into_iter().map(|v| v * MAX_INTENSITY).collect(),
        )
    }

    /// Creates a raster by evaluating `f(row, column)` for every cell.
    ///
    /// Values are clamped to `0..=255`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use forgemesh::Raster;
    ///
    /// let gradient = Raster::from_fn(4, 2, |_, col| col as f64 * 85.0);
    /// assert_eq!(gradient.get(1, 3), 255.0);
    /// ```
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let value = f(row, col);
                data.push(if value.is_nan() {
                    0.0
                } else {
                    value.clamp(0.0, MAX_INTENSITY)
                });
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wraps an 8-bit grayscale image.
    pub fn from_gray_image(image: &GrayImage) -> Self {
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            data: image.as_raw().iter().map(|&v| f64::from(v)).collect(),
        }
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Intensity at `(row, column)`.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.width + column]
    }

    /// Row-major intensities.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns `255 - value` for every cell.
    pub fn inverted(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|v| MAX_INTENSITY - v).collect(),
        }
    }

    /// Gaussian blur whose standard deviation equals `radius` pixels, the
    /// convention of photo editors' "Gaussian blur radius". A radius of
    /// zero returns an unchanged copy.
    pub fn blurred(&self, radius: u32) -> MeshResult<Raster> {
        if radius == 0 {
            return Ok(self.clone());
        }
        let sigma = radius as f32;
        let blurred = imageops::blur(&self.to_float_image()?, sigma);
        Ok(Self::from_float_image(&blurred))
    }

    /// Lanczos resampling to exactly `width` by `height`.
    pub fn resized(&self, width: usize, height: usize) -> MeshResult<Raster> {
        if width == 0 || height == 0 {
            return Err(MeshError::InsufficientResolution { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let resized = imageops::resize(
            &self.to_float_image()?,
            width as u32,
            height as u32,
            FilterType::Lanczos3,
        );
        Ok(Self::from_float_image(&resized))
    }

    /// Resamples to `width` columns keeping the aspect ratio.
    ///
    /// The row count is truncated and never drops below one.
    pub fn resized_to_width(&self, width: usize) -> MeshResult<Raster> {
        let aspect = self.height as f64 / self.width as f64;
        let height = ((width as f64 * aspect) as usize).max(1);
        self.resized(width, height)
    }

    /// Binarizes the raster: cells strictly brighter than `threshold` are
    /// foreground, unless `invert` swaps the two classes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use forgemesh::Raster;
    ///
    /// let raster = Raster::from_fn(3, 1, |_, col| [0.0, 127.0, 128.0][col]);
    /// let mask = raster.threshold(127, false);
    /// assert!(!mask.get(0, 1));
    /// assert!(mask.get(0, 2));
    /// ```
    pub fn threshold(&self, threshold: u8, invert: bool) -> BinaryMask {
        let limit = f64::from(threshold);
        BinaryMask {
            width: self.width,
            height: self.height,
            cells: self.data.iter().map(|&v| (v > limit) != invert).collect(),
        }
    }

    fn to_float_image(&self) -> MeshResult<FloatImage> {
        let normalized: Vec<f32> = self
            .data
            .iter()
            .map(|v| (v / MAX_INTENSITY) as f32)
            .collect();
        FloatImage::from_raw(self.width as u32, self.height as u32, normalized)
            .ok_or_else(|| MeshError::degenerate("raster buffer does not match its dimensions"))
    }

    fn from_float_image(image: &FloatImage) -> Raster {
        Raster {
            width: image.width() as usize,
            height: image.height() as usize,
            data: image
                .as_raw()
                .iter()
                .map(|&v| (f64::from(v) * MAX_INTENSITY).clamp(0.0, MAX_INTENSITY))
                .collect(),
        }
    }
}

/// A thresholded raster: `true` marks foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl BinaryMask {
    /// Creates a mask by evaluating `f(row, column)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                cells.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Foreground test; cells outside the mask are background.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> bool {
        row < self.height && column < self.width && self.cells[row * self.width + column]
    }

    /// Signed-coordinate variant of [`BinaryMask::get`].
    #[inline]
    pub(crate) fn get_signed(&self, row: i64, column: i64) -> bool {
        row >= 0 && column >= 0 && self.get(row as usize, column as usize)
    }

    /// Number of foreground cells.
    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

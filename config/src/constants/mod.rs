//! # Configuration Constants
//!
//! Centralized constants for the print pipeline. Geometry tolerances, raster
//! resolution defaults, lithophane limits and repair thresholds live here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Printer**: Default build envelope
//! - **Raster**: Pixel density and thresholding defaults
//! - **Lithophane**: Resolution caps and panel dimensions
//! - **Repair**: Floating-piece and orientation thresholds

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Area below which a 2D loop or a triangle is treated as degenerate.
pub const AREA_EPSILON: f64 = 1e-9;

/// Minimum area (in square pixels) of a traced polygon to be extruded.
///
/// Anything smaller is noise from thresholding or simplification.
pub const MIN_POLYGON_AREA: f64 = 1.0;

// =============================================================================
// PRINTER CONSTANTS
// =============================================================================

/// Default printer envelope in millimeters as `[width, depth, height]`.
///
/// Matches a 220 mm cube class desktop printer.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_BUILD_VOLUME_MM;
///
/// assert_eq!(DEFAULT_BUILD_VOLUME_MM, [220.0, 220.0, 220.0]);
/// ```
pub const DEFAULT_BUILD_VOLUME_MM: [f64; 3] = [220.0, 220.0, 220.0];

// =============================================================================
// RASTER CONSTANTS
// =============================================================================

/// Default raster density for heightmap extrusion.
///
/// Two pixels per millimeter gives a 0.5 mm grid spacing at scale 1.0.
pub const DEFAULT_PIXELS_PER_MM: f64 = 2.0;

/// Default binarization threshold for contour extraction.
///
/// Pixels strictly brighter than this value are foreground.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Default contour simplification tolerance.
///
/// Expressed as a percentage of each loop's perimeter.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Default maximum relief height for heightmap conversion (mm).
pub const DEFAULT_MAX_HEIGHT_MM: f64 = 10.0;

/// Default base thickness under a heightmap relief (mm).
pub const DEFAULT_HEIGHTMAP_BASE_MM: f64 = 2.0;

/// Default extrusion height for contour conversion (mm).
pub const DEFAULT_EXTRUDE_HEIGHT_MM: f64 = 5.0;

// =============================================================================
// LITHOPHANE CONSTANTS
// =============================================================================

/// Maximum lithophane grid width in pixels.
///
/// Bounds the triangle count: a 400 pixel wide panel is already around
/// 640k triangles for a square image.
///
/// # Example
///
/// ```rust
/// use config::constants::LITHOPHANE_MAX_PIXELS;
///
/// let requested = 1200;
/// assert_eq!(requested.min(LITHOPHANE_MAX_PIXELS), 400);
/// ```
pub const LITHOPHANE_MAX_PIXELS: u32 = 400;

/// Target physical size of one lithophane grid cell (mm).
pub const LITHOPHANE_MM_PER_PIXEL: f64 = 0.5;

/// Thinnest lithophane wall that still holds together (mm).
pub const LITHOPHANE_MIN_THICKNESS_MM: f64 = 0.8;

/// Default thickest lithophane wall (mm).
pub const LITHOPHANE_MAX_THICKNESS_MM: f64 = 3.0;

/// Default lithophane panel width (mm).
pub const LITHOPHANE_WIDTH_MM: f64 = 100.0;

/// Width of each bar of the optional lithophane frame (mm).
pub const LITHOPHANE_FRAME_WIDTH_MM: f64 = 5.0;

/// How much taller the frame stands than the thickest panel cell (mm).
pub const LITHOPHANE_FRAME_MARGIN_MM: f64 = 1.0;

// =============================================================================
// REPAIR CONSTANTS
// =============================================================================

/// Default ratio of a body's volume to the largest body's volume below
/// which the body is considered a floating piece.
pub const DEFAULT_MIN_BODY_RATIO: f64 = 0.01;

/// Cosine between the dominant axis and +Z above which a model is already
/// considered upright (about 25 degrees).
pub const UPRIGHT_ALIGNMENT_COSINE: f64 = 0.9;

/// Default target height for model repair (mm).
pub const DEFAULT_TARGET_HEIGHT_MM: f64 = 80.0;

/// Default base plate padding around a repaired model's footprint (mm).
pub const DEFAULT_BASE_PADDING_MM: f64 = 3.0;

/// Base plate padding used by contour conversions (mm).
pub const CONTOUR_BASE_PADDING_MM: f64 = 2.0;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Number of lithophane grid columns for a panel of `width_mm`.
///
/// Aims for [`LITHOPHANE_MM_PER_PIXEL`] per cell and never exceeds
/// [`LITHOPHANE_MAX_PIXELS`]. Always at least 2 so a grid can be built.
///
/// # Example
///
/// ```rust
/// use config::constants::lithophane_columns;
///
/// assert_eq!(lithophane_columns(100.0), 200);
/// assert_eq!(lithophane_columns(1000.0), 400);
/// assert_eq!(lithophane_columns(0.1), 2);
/// ```
pub fn lithophane_columns(width_mm: f64) -> u32 {
    let wanted = (width_mm / LITHOPHANE_MM_PER_PIXEL).floor();
    if !wanted.is_finite() || wanted < 2.0 {
        return 2;
    }
    (wanted as u32).min(LITHOPHANE_MAX_PIXELS)
}

//! # Config Crate
//!
//! Centralized configuration for the forgemesh print pipeline. All magic
//! numbers and tunable parameters are defined here so the synthesis, repair
//! and export crates agree on the same defaults.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_PIXELS_PER_MM, LITHOPHANE_MAX_PIXELS};
//! use config::BuildVolume;
//!
//! let volume = BuildVolume::default();
//! assert!(volume.fits([100.0, 100.0, 100.0]));
//! assert!(!volume.fits([300.0, 10.0, 10.0]));
//!
//! let spacing = 1.0 / DEFAULT_PIXELS_PER_MM;
//! assert_eq!(spacing, 0.5);
//! assert!(LITHOPHANE_MAX_PIXELS >= 100);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: constants defined once, used everywhere
//! - **Explicit Printer Profiles**: the build volume is a value, not a global
//! - **Well-Documented**: every constant has clear documentation

pub mod constants;
pub mod profile;

pub use profile::{BuildVolume, ConfigError};

#[cfg(test)]
mod tests;

//! Error types for file loading, export and pipelines.

use std::path::{Path, PathBuf};

use forgemesh::MeshError;
use thiserror::Error;

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors raised at the file boundary.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but its contents could not be decoded.
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("unsupported file format: .{extension}")]
    UnsupportedFormat { extension: String },

    /// Parse error inside a mesh file.
    #[error("invalid file content: {message}")]
    InvalidContent { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    /// Creates an `InvalidContent` error.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// `UnsupportedFormat` for the extension of `path`, empty when it has
    /// none.
    pub fn unsupported(path: &Path) -> Self {
        Self::UnsupportedFormat {
            extension: extension_of(path),
        }
    }

    /// Maps an open failure to `FileNotFound` when the file is missing.
    pub(crate) fn opening(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}

/// Lowercased extension of `path`.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("missing.png"),
        };
        assert_eq!(err.to_string(), "file not found: missing.png");

        let err = IoError::unsupported(Path::new("model.FBX"));
        assert_eq!(err.to_string(), "unsupported file format: .fbx");
    }

    #[test]
    fn test_mesh_errors_pass_through() {
        let err: IoError = MeshError::NoExtractableShape { loops: 0 }.into();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_opening_not_found() {
        let err = IoError::opening(
            Path::new("x.stl"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}

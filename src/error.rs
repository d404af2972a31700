//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the storefront crate.
#[derive(Debug)]
pub enum StorefrontError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Failed to fetch or parse a model asset.
    AssetLoad {
        /// Path (or URL) of the asset that failed.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// WGSL shader composition failure.
    Shader(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl StorefrontError {
    /// Build an [`AssetLoad`](Self::AssetLoad) error.
    pub fn asset_load(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for StorefrontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::AssetLoad { path, reason } => {
                write!(f, "failed to load {path}: {reason}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for StorefrontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for StorefrontError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for StorefrontError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_load_message_names_the_path() {
        let err = StorefrontError::asset_load("models/a.glb", "bad magic");
        assert_eq!(err.to_string(), "failed to load models/a.glb: bad magic");
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error as _;
        let err = StorefrontError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(err.source().is_some());
    }
}

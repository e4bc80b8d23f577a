pub mod fingerprint;
pub mod fingerprint_builder;
mod raw_dct_ops;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error that prevented a fingerprint from being created or compared.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashError {
    /// The image or video frame could not be opened or decoded.
    #[error("Image could not be decoded: {0}")]
    Decode(String),

    /// The [`crate::HashOptions`] are zero or too large to hash with.
    #[error("Invalid hash options: {0}")]
    InvalidOptions(String),

    /// Two fingerprints of different bit lengths were compared. This means fingerprints
    /// were built with different [`crate::HashOptions`].
    #[error("Cannot compare fingerprints of different sizes ({left} bits vs {right} bits)")]
    ShapeMismatch { left: usize, right: usize },
}

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, GrayImage, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{
    fingerprint::Fingerprint,
    raw_dct_ops::{dct_2d, lowfreq_block, median},
    HashError,
};
use crate::definitions::{DEFAULT_HASH_SIZE, DEFAULT_HIGHFREQ_FACTOR, MAX_RESIZE_DIM};

/// Options controlling how fingerprints are generated. Fingerprints are only comparable
/// with fingerprints generated from the same options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashOptions {
    /// Side length of the block of low DCT frequencies that is kept. The fingerprint
    /// has `hash_size * hash_size` bits.
    ///
    /// Recommended range: 6-16.
    pub hash_size: u32,

    /// Images are resized to `hash_size * highfreq_factor` pixels square before the DCT.
    /// Higher values let the DCT see more detail before the high frequencies are
    /// thrown away.
    pub highfreq_factor: u32,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            hash_size: DEFAULT_HASH_SIZE,
            highfreq_factor: DEFAULT_HIGHFREQ_FACTOR,
        }
    }
}

impl HashOptions {
    /// Number of bits in fingerprints produced with these options.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        let side = self.hash_size as usize;
        side.saturating_mul(side)
    }

    /// Both values must be nonzero, and the resized image (`hash_size * highfreq_factor`
    /// pixels square) may be at most [`crate::MAX_RESIZE_DIM`] pixels wide.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.hash_size > 0
            && self.highfreq_factor > 0
            && self
                .resize_dim()
                .is_some_and(|dim| dim <= MAX_RESIZE_DIM)
    }

    fn resize_dim(&self) -> Option<u32> {
        self.hash_size.checked_mul(self.highfreq_factor)
    }
}

/// A factory for [`Fingerprint`]s.
///
/// The image is converted to grayscale, resized down to a small square, and the signs
/// of its lowest DCT frequencies relative to their median become the bits of the
/// fingerprint. The process is deterministic: identical pixels always give an
/// identical fingerprint.
#[derive(Debug, Clone, Default)]
pub struct FingerprintBuilder {
    options: HashOptions,
}

impl FingerprintBuilder {
    /// Create a fingerprint builder with the selected [`HashOptions`]
    #[must_use]
    pub fn from_options(options: HashOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> HashOptions {
        self.options
    }

    /// Fingerprint the image file at `src_path`.
    ///
    /// # Errors
    /// Returns [`HashError::Decode`] if the file cannot be read or is not a supported image.
    pub fn fingerprint_path(&self, src_path: impl AsRef<Path>) -> Result<Fingerprint, HashError> {
        let src_path = src_path.as_ref();
        let img = image::open(src_path)
            .map_err(|e| HashError::Decode(format!("{}: {e}", src_path.display())))?;

        self.fingerprint_image(&img)
    }

    /// Fingerprint an already decoded image.
    ///
    /// # Errors
    /// * [`HashError::InvalidOptions`] if the builder's [`HashOptions`] are out of range
    /// * [`HashError::Decode`] if the image contains no pixels
    pub fn fingerprint_image(&self, img: &DynamicImage) -> Result<Fingerprint, HashError> {
        let dim = match self.options.resize_dim() {
            Some(dim) if self.options.is_valid() => dim,
            _ => return Err(HashError::InvalidOptions(format!("{:?}", self.options))),
        };

        if img.width() == 0 || img.height() == 0 {
            return Err(HashError::Decode("image has no pixels".to_string()));
        }

        Ok(self.fingerprint_gray(&img.to_luma8(), dim))
    }

    /// Fingerprint a decoded rgb video frame.
    ///
    /// # Errors
    /// See [`FingerprintBuilder::fingerprint_image`].
    pub fn fingerprint_rgb(&self, frame: RgbImage) -> Result<Fingerprint, HashError> {
        self.fingerprint_image(&DynamicImage::ImageRgb8(frame))
    }

    fn fingerprint_gray(&self, frame: &GrayImage, dim: u32) -> Fingerprint {
        let small = image::imageops::resize(frame, dim, dim, FilterType::Lanczos3);

        let pixels = Array2::from_shape_fn((dim as usize, dim as usize), |(y, x)| {
            f64::from(small.get_pixel(x as u32, y as u32).0[0])
        });

        let dct = dct_2d(&pixels);
        let lowfreq = lowfreq_block(&dct, self.options.hash_size as usize);
        let med = median(lowfreq.iter().copied());

        Fingerprint::from_bits(lowfreq.iter().map(|&coeff| coeff > med))
    }
}

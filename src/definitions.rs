/// The default time between two sampled video frames.
/// Lower values locate slide transitions more precisely but every sampled frame
/// costs one seek and one decode.
///
/// Unit: Seconds
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 1.0;

/// The default maximum hamming distance (exclusive) between a sampled frame and a
/// reference slide for the frame to be considered a showing of that slide.
/// Out of a 64 bit fingerprint, values of 10-15 are usually a good match.
/// Lower values drop more frames as "no match", higher values risk matching the
/// wrong slide.
pub const DEFAULT_MATCH_THRESHOLD: u32 = 15;

/// Side length of the low frequency DCT block that becomes the fingerprint.
/// A fingerprint contains `DEFAULT_HASH_SIZE * DEFAULT_HASH_SIZE` bits.
pub const DEFAULT_HASH_SIZE: u32 = 8;

//tweakable. Images are resized to (HASH_SIZE * HIGHFREQ_FACTOR) square before the DCT is
//taken. Only the lowest HASH_SIZE frequencies in each direction are kept.
pub const DEFAULT_HIGHFREQ_FACTOR: u32 = 4;

/// Largest side length that images are resized to before the DCT
/// (`hash_size * highfreq_factor`).
pub const MAX_RESIZE_DIM: u32 = 1024;

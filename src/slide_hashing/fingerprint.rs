use std::fmt;

use bitvec::prelude::*;

use super::HashError;

/// A perceptual hash of a still image or video frame. Fingerprints of similar looking
/// images differ in only a few bits, even when one has been rescaled or heavily
/// compressed.
///
/// Compare fingerprints with [`Fingerprint::distance`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Fingerprint {
    bits: BitVec<usize, Lsb0>,
}

impl Fingerprint {
    pub(crate) fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// The number of bits in the fingerprint.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// The bits of the fingerprint, lowest DCT frequencies first (row-major).
    #[must_use]
    pub fn bits(&self) -> &BitSlice<usize, Lsb0> {
        &self.bits
    }

    /// The hamming distance (number of differing bits) from this fingerprint to another.
    ///
    /// # Errors
    /// Returns [`HashError::ShapeMismatch`] if the fingerprints have different bit lengths.
    pub fn distance(&self, other: &Self) -> Result<u32, HashError> {
        if self.bit_len() != other.bit_len() {
            return Err(HashError::ShapeMismatch {
                left: self.bit_len(),
                right: other.bit_len(),
            });
        }

        let differing = self
            .bits
            .iter()
            .by_vals()
            .zip(other.bits.iter().by_vals())
            .filter(|(x, y)| x != y)
            .count();

        Ok(differing as u32)
    }

    /// Hexadecimal form of the fingerprint with the first bit as the most significant,
    /// zero padded to `ceil(bit_len / 4)` digits.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let padding = (4 - self.bit_len() % 4) % 4;
        let padded = std::iter::repeat(false)
            .take(padding)
            .chain(self.bits.iter().by_vals())
            .collect::<Vec<_>>();

        padded
            .chunks(4)
            .map(|nibble| {
                let val = nibble.iter().fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit));
                char::from_digit(val, 16).unwrap_or('0')
            })
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

//Utilities for testing
#[doc(hidden)]
pub mod test_util {
    use rand::prelude::*;

    use super::Fingerprint;

    #[doc(hidden)]
    impl Fingerprint {
        pub fn random_fingerprint(bit_len: usize, rng: &mut StdRng) -> Self {
            Self::from_bits((0..bit_len).map(|_| rng.gen_bool(0.5)))
        }

        pub fn empty_fingerprint(bit_len: usize) -> Self {
            Self::from_bits(std::iter::repeat(false).take(bit_len))
        }

        pub fn full_fingerprint(bit_len: usize) -> Self {
            Self::from_bits(std::iter::repeat(true).take(bit_len))
        }

        //flip randomly chosen bits until the fingerprint is exactly `target_distance` away.
        #[must_use]
        pub fn with_distance(&self, target_distance: u32, rng: &mut StdRng) -> Self {
            assert!(target_distance as usize <= self.bit_len());

            let mut ret = self.clone();
            let mut indices = (0..self.bit_len()).collect::<Vec<_>>();
            indices.shuffle(rng);
            for idx in indices.into_iter().take(target_distance as usize) {
                let old = ret.bits[idx];
                ret.bits.set(idx, !old);
            }
            ret
        }
    }
}

#[cfg(test)]
mod test {
    use rand::prelude::*;

    use super::*;

    #[test]
    fn test_triangle_inequality() {
        let mut rng = StdRng::seed_from_u64(1);
        for _i in 0..1_000 {
            let f1 = Fingerprint::random_fingerprint(64, &mut rng);
            let f2 = Fingerprint::random_fingerprint(64, &mut rng);
            let f3 = Fingerprint::random_fingerprint(64, &mut rng);

            let d12 = f1.distance(&f2).unwrap();
            let d13 = f1.distance(&f3).unwrap();
            let d23 = f2.distance(&f3).unwrap();

            assert!(d12 <= d13 + d23);
        }
    }

    #[test]
    fn test_symmetry() {
        let mut rng = StdRng::seed_from_u64(2);
        for _i in 0..1_000 {
            let f1 = Fingerprint::random_fingerprint(64, &mut rng);
            let f2 = Fingerprint::random_fingerprint(64, &mut rng);

            assert_eq!(f1.distance(&f2).unwrap(), f2.distance(&f1).unwrap());
        }
    }

    #[test]
    fn test_distance_to_self_is_0() {
        let mut rng = StdRng::seed_from_u64(3);
        for _i in 0..100 {
            let f = Fingerprint::random_fingerprint(64, &mut rng);
            assert_eq!(0, f.distance(&f).unwrap());
        }
    }

    #[test]
    fn test_distance_between_empty_and_full_is_bit_len() {
        let empty = Fingerprint::empty_fingerprint(64);
        let full = Fingerprint::full_fingerprint(64);
        assert_eq!(64, empty.distance(&full).unwrap());
    }

    #[test]
    fn test_with_distance() {
        let mut rng = StdRng::seed_from_u64(4);
        let start = Fingerprint::random_fingerprint(64, &mut rng);
        for target in [0, 1, 15, 20, 64] {
            let moved = start.with_distance(target, &mut rng);
            assert_eq!(target, start.distance(&moved).unwrap());
        }
    }

    #[test]
    fn test_different_sizes_do_not_compare() {
        let small = Fingerprint::empty_fingerprint(36);
        let large = Fingerprint::empty_fingerprint(64);

        assert_eq!(
            small.distance(&large),
            Err(HashError::ShapeMismatch {
                left: 36,
                right: 64
            })
        );
    }

    #[test]
    fn test_bits_count_matches_distance_from_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let fp = Fingerprint::random_fingerprint(64, &mut rng);
            let empty = Fingerprint::empty_fingerprint(64);
            assert_eq!(fp.bits().len(), fp.bit_len());
            assert_eq!(fp.bits().count_ones() as u32, fp.distance(&empty).unwrap());
        }

        let fp = Fingerprint::from_bits([true, false, false, true]);
        assert_eq!(fp.bits().iter_ones().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Fingerprint::empty_fingerprint(64).to_hex(), "0000000000000000");
        assert_eq!(Fingerprint::full_fingerprint(64).to_hex(), "ffffffffffffffff");

        let bits = [true, false, false, false, false, false, false, true];
        assert_eq!(Fingerprint::from_bits(bits).to_hex(), "81");

        //36 bits is exactly 9 digits, 6 bits needs padding at the front.
        assert_eq!(Fingerprint::full_fingerprint(36).to_string().len(), 9);
        assert_eq!(Fingerprint::full_fingerprint(6).to_hex(), "3f");
    }
}

use std::path::{Path, PathBuf};

use log::debug;
#[cfg(feature = "parallel_loading")]
use rayon::prelude::*;

use super::DetectError;
use crate::{Fingerprint, FingerprintBuilder, HashError};

/// One slide of the deck, fingerprinted once per detection run.
#[derive(Debug, Clone)]
pub(crate) struct ReferenceSlide {
    pub index: usize,
    pub fingerprint: Fingerprint,
    pub src_path: PathBuf,
}

/// Fingerprint every slide, keeping deck order. If any slide fails, the failure with the
/// lowest index is returned and no reference set is produced.
pub(crate) fn build_reference_set<P>(
    builder: &FingerprintBuilder,
    slides: &[P],
) -> Result<Vec<ReferenceSlide>, DetectError>
where
    P: AsRef<Path> + Sync,
{
    let hash_one = |(index, src_path): (usize, &P)| {
        let src_path = src_path.as_ref();
        builder
            .fingerprint_path(src_path)
            .map(|fingerprint| ReferenceSlide {
                index,
                fingerprint,
                src_path: src_path.to_path_buf(),
            })
            .map_err(|e| (index, src_path.to_path_buf(), e))
    };

    #[cfg(feature = "parallel_loading")]
    let results: Vec<Result<ReferenceSlide, (usize, PathBuf, HashError)>> =
        slides.par_iter().enumerate().map(hash_one).collect();

    #[cfg(not(feature = "parallel_loading"))]
    let results: Vec<Result<ReferenceSlide, (usize, PathBuf, HashError)>> =
        slides.iter().enumerate().map(hash_one).collect();

    let refs = results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|(index, src_path, source)| DetectError::ReferenceBuild {
            index,
            src_path,
            source,
        })?;

    debug!("Built reference set of {} slides", refs.len());
    for slide in &refs {
        debug!("  slide {}: {} ({})", slide.index, slide.fingerprint, slide.src_path.display());
    }

    Ok(refs)
}

/// The reference slide closest to `fingerprint` and its distance. Ties go to the lowest index.
pub(crate) fn nearest<'a>(
    refs: &'a [ReferenceSlide],
    fingerprint: &Fingerprint,
) -> Result<Option<(&'a ReferenceSlide, u32)>, HashError> {
    let mut best: Option<(&ReferenceSlide, u32)> = None;
    for slide in refs {
        let dist = slide.fingerprint.distance(fingerprint)?;
        match best {
            Some((_, best_dist)) if best_dist <= dist => {}
            _ => best = Some((slide, dist)),
        }
    }
    Ok(best)
}

#[cfg(test)]
mod test {
    use rand::prelude::*;

    use super::*;

    fn refs_from(fingerprints: Vec<Fingerprint>) -> Vec<ReferenceSlide> {
        fingerprints
            .into_iter()
            .enumerate()
            .map(|(index, fingerprint)| ReferenceSlide {
                index,
                fingerprint,
                src_path: PathBuf::from(format!("slide_{index}.png")),
            })
            .collect()
    }

    #[test]
    fn test_nearest_picks_minimum_distance() {
        let mut rng = StdRng::seed_from_u64(10);
        let base = Fingerprint::random_fingerprint(64, &mut rng);
        let refs = refs_from(vec![
            base.with_distance(30, &mut rng),
            base.with_distance(3, &mut rng),
            base.with_distance(12, &mut rng),
        ]);

        let (slide, dist) = nearest(&refs, &base).unwrap().unwrap();
        assert_eq!(slide.index, 1);
        assert_eq!(dist, 3);
    }

    #[test]
    fn test_nearest_ties_go_to_lowest_index() {
        let mut rng = StdRng::seed_from_u64(11);
        let base = Fingerprint::random_fingerprint(64, &mut rng);
        let refs = refs_from(vec![
            base.with_distance(9, &mut rng),
            base.with_distance(4, &mut rng),
            base.with_distance(4, &mut rng),
            base.clone(),
            base.clone(),
        ]);

        let (slide, dist) = nearest(&refs, &base).unwrap().unwrap();
        assert_eq!((slide.index, dist), (3, 0));

        let (slide, _) = nearest(&refs[..3], &base).unwrap().unwrap();
        assert_eq!(slide.index, 1);
    }

    #[test]
    fn test_nearest_of_empty_set_is_none() {
        let fp = Fingerprint::empty_fingerprint(64);
        assert!(nearest(&[], &fp).unwrap().is_none());
    }

    #[test]
    fn test_nearest_rejects_mismatched_sizes() {
        let refs = refs_from(vec![Fingerprint::empty_fingerprint(36)]);
        let res = nearest(&refs, &Fingerprint::empty_fingerprint(64));
        assert!(matches!(res, Err(HashError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_unreadable_slide_reports_lowest_failing_index() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        image::RgbImage::from_pixel(16, 16, image::Rgb([10, 200, 30]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"definitely not a png").unwrap();

        let slides = vec![good.clone(), bad.clone(), bad.clone(), good];
        let res = build_reference_set(&FingerprintBuilder::default(), &slides);

        match res {
            Err(DetectError::ReferenceBuild { index, src_path, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(src_path, bad);
            }
            other => panic!("expected a reference build failure, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_set_matches_one_by_one_hashing() {
        let dir = tempfile::tempdir().unwrap();
        let slides = (0..6u8)
            .map(|i| {
                let path = dir.path().join(format!("slide_{i}.png"));
                image::RgbImage::from_fn(48, 32, |x, y| {
                    let v = (x * 5 + y * 3 * (u32::from(i) + 1)) as u8;
                    image::Rgb([v.wrapping_mul(i + 1), v, 255 - v])
                })
                .save(&path)
                .unwrap();
                path
            })
            .collect::<Vec<_>>();

        let builder = FingerprintBuilder::default();
        let refs = build_reference_set(&builder, &slides).unwrap();

        let expected = slides
            .iter()
            .enumerate()
            .map(|(i, path)| (i, path.clone(), builder.fingerprint_path(path).unwrap()))
            .collect::<Vec<_>>();
        let actual = refs
            .into_iter()
            .map(|slide| (slide.index, slide.src_path, slide.fingerprint))
            .collect::<Vec<_>>();

        assert_eq!(actual, expected);
    }
}

use crate::error::AppError;
use crate::models::fruit_types::FruitClass;
use crate::models::split_types::{Split, SplitAssignment, SplitCount, SplitRatios, SplitReport};
use crate::services::fs_service;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

// Absorbs float noise such as 0.3 * 10 = 3.0000000000000004.
const CEIL_EPSILON: f64 = 1e-9;

/// Number of items held out for a fraction: `ceil(fraction * n)`, clamped to `n`.
pub fn holdout_count(n: usize, fraction: f64) -> usize {
    if n == 0 || fraction <= 0.0 {
        return 0;
    }
    let raw = (fraction * n as f64 - CEIL_EPSILON).ceil();
    (raw.max(0.0) as usize).min(n)
}

/// Shuffles `items` with a generator seeded from `seed` and splits off the
/// held-out part. Returns `(rest, held_out)`.
pub fn train_test_split<T>(items: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let n_test = holdout_count(items.len(), test_fraction);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shuffled = items;
    shuffled.shuffle(&mut rng);
    let held_out = shuffled.split_off(shuffled.len() - n_test);
    (shuffled, held_out)
}

/// Two-stage partition: split off validation+test, then divide that
/// remainder by `test / (validation + test)`. Both stages reuse `seed`.
pub fn assign_split(images: Vec<PathBuf>, ratios: &SplitRatios, seed: u64) -> SplitAssignment {
    let (train, holdout) = train_test_split(images, ratios.validation + ratios.test, seed);
    let (validation, test) = train_test_split(holdout, ratios.test_share_of_holdout(), seed);
    SplitAssignment {
        train,
        validation,
        test,
    }
}

/// Copies every class under `raw_root` into
/// `output_root/<split>/<class>/`, then recounts the output tree.
pub fn split_dataset(
    raw_root: &Path,
    output_root: &Path,
    ratios: &SplitRatios,
    seed: u64,
) -> Result<SplitReport, AppError> {
    ratios.validate()?;

    let mut report = SplitReport::default();

    for class in FruitClass::DATASET_ORDER {
        let class_dir = raw_root.join(class.dir_name());
        if !class_dir.is_dir() {
            tracing::warn!("Folder {} not found, skipping", class_dir.display());
            report.missing.push(class);
            continue;
        }

        let images = fs_service::list_image_files(&class_dir)?;
        tracing::info!("Processing {}: {} images", class.dir_name(), images.len());

        let assignment = assign_split(images, ratios, seed);

        for split in Split::ALL {
            let files = assignment.get(split);
            let dest_dir = output_root.join(split.dir_name()).join(class.dir_name());
            std::fs::create_dir_all(&dest_dir).map_err(|e| AppError {
                message: format!("Failed to create directory {}: {}", dest_dir.display(), e),
            })?;
            for src in files {
                fs_service::copy_into(src, &dest_dir)?;
            }
            tracing::info!("  - {}: {} images", split, files.len());
        }
    }

    for split in Split::ALL {
        for class in FruitClass::DATASET_ORDER {
            let dir = output_root.join(split.dir_name()).join(class.dir_name());
            if dir.is_dir() {
                report.counts.push(SplitCount {
                    split,
                    class,
                    files: fs_service::count_files(&dir),
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("img_{:03}.jpg", i))).collect()
    }

    #[test]
    fn holdout_uses_ceiling() {
        assert_eq!(holdout_count(10, 0.3), 3);
        assert_eq!(holdout_count(10, 0.25), 3);
        assert_eq!(holdout_count(3, 0.5), 2);
        assert_eq!(holdout_count(0, 0.3), 0);
        assert_eq!(holdout_count(5, 0.0), 0);
        assert_eq!(holdout_count(5, 1.0), 5);
    }

    #[test]
    fn default_ratios_on_hundred_images() {
        let assignment = assign_split(paths(100), &SplitRatios::default(), 42);
        assert_eq!(assignment.train.len(), 70);
        assert_eq!(assignment.validation.len(), 15);
        assert_eq!(assignment.test.len(), 15);
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        for n in 0..60 {
            let input = paths(n);
            let assignment = assign_split(input.clone(), &SplitRatios::default(), 7);
            assert_eq!(assignment.len(), n);

            let mut seen = HashSet::new();
            for split in Split::ALL {
                for p in assignment.get(split) {
                    assert!(seen.insert(p.clone()), "{} assigned twice", p.display());
                }
            }
            let expected: HashSet<_> = input.into_iter().collect();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn same_seed_same_assignment() {
        let ratios = SplitRatios::default();
        let a = assign_split(paths(37), &ratios, 42);
        let b = assign_split(paths(37), &ratios, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_changes_assignment() {
        let ratios = SplitRatios::default();
        let a = assign_split(paths(50), &ratios, 1);
        let b = assign_split(paths(50), &ratios, 2);
        assert_ne!(a.train, b.train);
    }

    #[test]
    fn all_train_ratio_keeps_everything_in_train() {
        let ratios = SplitRatios { train: 1.0, validation: 0.0, test: 0.0 };
        let assignment = assign_split(paths(9), &ratios, 42);
        assert_eq!(assignment.train.len(), 9);
        assert!(assignment.validation.is_empty());
        assert!(assignment.test.is_empty());
    }

    #[test]
    fn invalid_ratios_abort_before_copying() {
        let tmp = tempfile::tempdir().unwrap();
        let ratios = SplitRatios { train: 0.5, validation: 0.1, test: 0.1 };
        let result = split_dataset(tmp.path(), &tmp.path().join("out"), &ratios, 42);
        assert!(result.is_err());
        assert!(!tmp.path().join("out").exists());
    }
}

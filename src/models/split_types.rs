use crate::error::AppError;
use crate::models::fruit_types::FruitClass;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

const RATIO_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitRatios {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.70,
            validation: 0.15,
            test: 0.15,
        }
    }
}

impl SplitRatios {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("train", self.train),
            ("validation", self.validation),
            ("test", self.test),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ratio must be within [0, 1], got {}", name, value).into());
            }
        }
        let sum = self.train + self.validation + self.test;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(format!("Split ratios must sum to 1.0, got {:.6}", sum).into());
        }
        Ok(())
    }

    /// Fraction of the held-out remainder that goes to the test split.
    pub fn test_share_of_holdout(&self) -> f64 {
        let holdout = self.validation + self.test;
        if holdout <= 0.0 {
            0.0
        } else {
            self.test / holdout
        }
    }
}

/// Disjoint train/validation/test partition of one class's images.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SplitAssignment {
    pub train: Vec<PathBuf>,
    pub validation: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

impl SplitAssignment {
    pub fn get(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// File counts recounted from the output tree.
#[derive(Debug, Clone, Serialize)]
pub struct SplitCount {
    pub split: Split,
    pub class: FruitClass,
    pub files: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub counts: Vec<SplitCount>,
    pub missing: Vec<FruitClass>,
}

impl SplitReport {
    pub fn total(&self, split: Split) -> usize {
        self.counts
            .iter()
            .filter(|c| c.split == split)
            .map(|c| c.files)
            .sum()
    }

    pub fn count(&self, split: Split, class: FruitClass) -> usize {
        self.counts
            .iter()
            .find(|c| c.split == split && c.class == class)
            .map(|c| c.files)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ratios_are_valid() {
        assert!(SplitRatios::default().validate().is_ok());
    }

    #[test]
    fn ratios_must_sum_to_one() {
        let ratios = SplitRatios { train: 0.8, validation: 0.15, test: 0.15 };
        let err = ratios.validate().unwrap_err();
        assert!(err.message.contains("sum to 1.0"));
    }

    #[test]
    fn negative_ratio_rejected() {
        let ratios = SplitRatios { train: 1.2, validation: -0.1, test: -0.1 };
        assert!(ratios.validate().is_err());
    }

    #[test]
    fn holdout_share() {
        assert!((SplitRatios::default().test_share_of_holdout() - 0.5).abs() < 1e-12);
        let all_train = SplitRatios { train: 1.0, validation: 0.0, test: 0.0 };
        assert_eq!(all_train.test_share_of_holdout(), 0.0);
    }
}

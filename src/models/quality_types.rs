use crate::models::fruit_types::FruitClass;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub const MIN_RESOLUTION: u32 = 200;
pub const MIN_LAPLACIAN_VARIANCE: f64 = 20.0;
pub const MIN_BRIGHTNESS: f64 = 30.0;
pub const MAX_BRIGHTNESS: f64 = 225.0;

/// Why an image failed quality control.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityIssue {
    Corrupted,
    Unreadable { message: String },
    LowResolution { width: u32, height: u32 },
    Blurry { laplacian_variance: f64 },
    TooDark { brightness: f64 },
    TooBright { brightness: f64 },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::Corrupted => write!(f, "File corrupted"),
            QualityIssue::Unreadable { message } => write!(f, "Error: {}", message),
            QualityIssue::LowResolution { width, height } => {
                write!(f, "Resolution too low: {}x{}", width, height)
            }
            QualityIssue::Blurry { laplacian_variance } => {
                write!(f, "Too blurry: {:.2}", laplacian_variance)
            }
            QualityIssue::TooDark { brightness } => write!(f, "Too dark: {:.2}", brightness),
            QualityIssue::TooBright { brightness } => write!(f, "Too bright: {:.2}", brightness),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityVerdict {
    pub path: PathBuf,
    pub issue: Option<QualityIssue>,
}

impl QualityVerdict {
    pub fn is_valid(&self) -> bool {
        self.issue.is_none()
    }

    pub fn reason(&self) -> String {
        match &self.issue {
            Some(issue) => issue.to_string(),
            None => "OK".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassQuality {
    pub class: FruitClass,
    pub checked: usize,
    pub rejected: usize,
}

impl ClassQuality {
    pub fn accepted(&self) -> usize {
        self.checked - self.rejected
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub classes: Vec<ClassQuality>,
    pub missing: Vec<FruitClass>,
}

impl QualityReport {
    pub fn total_checked(&self) -> usize {
        self.classes.iter().map(|c| c.checked).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.classes.iter().map(|c| c.rejected).sum()
    }

    pub fn total_accepted(&self) -> usize {
        self.total_checked() - self.total_rejected()
    }

    /// `None` when no images were checked.
    pub fn rejection_percentage(&self) -> Option<f64> {
        let total = self.total_checked();
        if total == 0 {
            return None;
        }
        Some(self.total_rejected() as f64 / total as f64 * 100.0)
    }
}

/// Journal entries come in pairs: `planned` is written before the file is
/// moved, `moved` once it has landed. A `planned` entry without its `moved`
/// partner marks a move interrupted mid-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStage {
    Planned,
    Moved,
}

/// One line of the rejection journal.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct RejectionRecord {
    pub stage: MoveStage,
    pub class: FruitClass,
    pub file_name: String,
    pub from: PathBuf,
    pub to: PathBuf,
    pub reason: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_match_report_format() {
        assert_eq!(QualityIssue::Corrupted.to_string(), "File corrupted");
        assert_eq!(
            QualityIssue::LowResolution { width: 150, height: 300 }.to_string(),
            "Resolution too low: 150x300"
        );
        assert_eq!(
            QualityIssue::Blurry { laplacian_variance: 3.14159 }.to_string(),
            "Too blurry: 3.14"
        );
        assert_eq!(QualityIssue::TooDark { brightness: 12.0 }.to_string(), "Too dark: 12.00");
        assert_eq!(
            QualityIssue::TooBright { brightness: 250.5 }.to_string(),
            "Too bright: 250.50"
        );
    }

    #[test]
    fn empty_report_has_no_percentage() {
        let report = QualityReport::default();
        assert_eq!(report.total_checked(), 0);
        assert!(report.rejection_percentage().is_none());
    }

    #[test]
    fn report_totals() {
        let report = QualityReport {
            classes: vec![
                ClassQuality { class: FruitClass::Kupa, checked: 10, rejected: 2 },
                ClassQuality { class: FruitClass::Matoa, checked: 6, rejected: 0 },
            ],
            missing: vec![FruitClass::Namnam],
        };
        assert_eq!(report.total_checked(), 16);
        assert_eq!(report.total_accepted(), 14);
        assert_eq!(report.rejection_percentage(), Some(12.5));
    }
}

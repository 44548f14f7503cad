use crate::error::AppError;
use crate::models::fruit_types::FruitClass;
use crate::models::quality_types::{
    ClassQuality, MoveStage, QualityIssue, QualityReport, QualityVerdict, RejectionRecord,
    MAX_BRIGHTNESS, MIN_BRIGHTNESS, MIN_LAPLACIAN_VARIANCE, MIN_RESOLUTION,
};
use crate::services::fs_service;
use image::{DynamicImage, GenericImageView, GrayImage, ImageReader};
use rayon::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const JOURNAL_FILE: &str = "rejections.jsonl";

/// Runs the four quality checks on one file, stopping at the first failure.
pub fn check_image_quality(path: &Path) -> QualityVerdict {
    let issue = match open_image(path) {
        Ok(img) => evaluate_image(&img),
        Err(issue) => Some(issue),
    };
    QualityVerdict {
        path: path.to_path_buf(),
        issue,
    }
}

fn open_image(path: &Path) -> Result<DynamicImage, QualityIssue> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| QualityIssue::Unreadable {
            message: e.to_string(),
        })?;
    reader.decode().map_err(|_| QualityIssue::Corrupted)
}

/// Resolution, blur and brightness checks on an already decoded image.
pub fn evaluate_image(img: &DynamicImage) -> Option<QualityIssue> {
    let (width, height) = img.dimensions();
    if width < MIN_RESOLUTION || height < MIN_RESOLUTION {
        return Some(QualityIssue::LowResolution { width, height });
    }

    let gray = to_gray(img);

    let laplacian_variance = laplacian_variance(&gray);
    if laplacian_variance < MIN_LAPLACIAN_VARIANCE {
        return Some(QualityIssue::Blurry { laplacian_variance });
    }

    let brightness = mean_brightness(&gray);
    if brightness < MIN_BRIGHTNESS {
        return Some(QualityIssue::TooDark { brightness });
    }
    if brightness > MAX_BRIGHTNESS {
        return Some(QualityIssue::TooBright { brightness });
    }

    None
}

/// Grayscale with BT.601 luma weights, the convention the thresholds were tuned on.
pub fn to_gray(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let data: Vec<u8> = rgb
        .as_raw()
        .chunks_exact(3)
        .map(|p| {
            let y = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
            y.round().clamp(0.0, 255.0) as u8
        })
        .collect();
    GrayImage::from_raw(w, h, data).unwrap_or_else(|| GrayImage::new(w, h))
}

/// Reflect-101 border index (`gfedcb|abcdefgh|gfedcba`).
fn reflect101(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}

/// Population variance of the 4-neighbour Laplacian over every pixel.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let (wi, hi) = (w as i64, h as i64);
    let raw = gray.as_raw();
    let at = |x: i64, y: i64| raw[reflect101(y, hi) * w as usize + reflect101(x, wi)] as i64;

    // Laplacian values of a u8 image are integers; running sums stay exact
    // and no per-pixel buffer is kept.
    let mut sum = 0i64;
    let mut sum_sq = 0i64;
    for y in 0..hi {
        for x in 0..wi {
            let lap = at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4 * at(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let n = (w as u64 * h as u64) as f64;
    let mean = sum as f64 / n;
    (sum_sq as f64 / n - mean * mean).max(0.0)
}

pub fn mean_brightness(gray: &GrayImage) -> f64 {
    let raw = gray.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    raw.iter().map(|&v| v as u64).sum::<u64>() as f64 / raw.len() as f64
}

/// Append-only JSON-lines record of every file moved out of the raw tree.
struct RejectionJournal {
    file: File,
}

impl RejectionJournal {
    fn open(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AppError {
                message: format!("Failed to open rejection journal {}: {}", path.display(), e),
            })?;
        Ok(Self { file })
    }

    fn record(&mut self, record: &RejectionRecord) -> Result<(), AppError> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }
}

/// Default rejected tree: a `rejected` directory next to the raw root.
pub fn default_rejected_root(raw_root: &Path) -> PathBuf {
    raw_root
        .parent()
        .map(|p| p.join("rejected"))
        .unwrap_or_else(|| PathBuf::from("rejected"))
}

/// Checks every class directory under `raw_root` and moves rejects into
/// `rejected_root/<class>/`. Verdicts for a class are all computed before
/// any file is moved, and each move is journaled as it happens.
pub fn quality_control_dataset(
    raw_root: &Path,
    rejected_root: &Path,
) -> Result<QualityReport, AppError> {
    std::fs::create_dir_all(rejected_root).map_err(|e| AppError {
        message: format!("Failed to create {}: {}", rejected_root.display(), e),
    })?;
    let mut journal = RejectionJournal::open(&rejected_root.join(JOURNAL_FILE))?;

    let mut report = QualityReport::default();

    for class in FruitClass::DATASET_ORDER {
        let class_dir = raw_root.join(class.dir_name());
        if !class_dir.is_dir() {
            tracing::warn!("Folder {} not found, skipping", class_dir.display());
            report.missing.push(class);
            continue;
        }

        tracing::info!("Checking: {}", class.dir_name());
        let images = fs_service::list_image_files(&class_dir)?;

        let verdicts: Vec<QualityVerdict> = images
            .par_iter()
            .map(|path| check_image_quality(path))
            .collect();

        let dest_dir = rejected_root.join(class.dir_name());
        let mut rejected = 0;

        for verdict in verdicts.iter().filter(|v| !v.is_valid()) {
            let reason = verdict.reason();
            let file_name = fs_service::file_name_of(&verdict.path);
            let mut record = RejectionRecord {
                stage: MoveStage::Planned,
                class,
                file_name: file_name.clone(),
                from: verdict.path.clone(),
                to: dest_dir.join(&file_name),
                reason: reason.clone(),
                at: chrono::Utc::now(),
            };
            journal.record(&record)?;

            record.to = fs_service::move_into(&verdict.path, &dest_dir)?;
            record.stage = MoveStage::Moved;
            record.at = chrono::Utc::now();
            journal.record(&record)?;

            tracing::warn!("REJECTED: {} - {}", file_name, reason);
            rejected += 1;
        }

        let summary = ClassQuality {
            class,
            checked: verdicts.len(),
            rejected,
        };
        tracing::info!(
            "{}: {} OK, {} rejected",
            class.dir_name(),
            summary.accepted(),
            summary.rejected
        );
        report.classes.push(summary);
    }

    Ok(report)
}

use crate::error::AppError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up from the raw dataset tree.
pub const DATASET_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Extensions accepted by the upload endpoint.
pub const UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn is_dataset_image(path: &Path) -> bool {
    has_extension(path, DATASET_EXTENSIONS)
}

/// Lists dataset images directly inside `dir` (non-recursive), sorted by
/// lowercase file name so runs are reproducible across filesystems.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.is_dir() {
        return Err(format!("Path does not exist: {}", dir.display()).into());
    }

    let read_dir = std::fs::read_dir(dir).map_err(|e| AppError {
        message: format!("Cannot read directory {}: {}", dir.display(), e),
    })?;

    let mut images = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let ft = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if !ft.is_file() {
            continue;
        }

        let path = entry.path();
        if is_dataset_image(&path) {
            images.push(path);
        }
    }

    images.sort_by_key(|p| file_name_of(p).to_lowercase());

    Ok(images)
}

/// Number of regular files directly inside `dir`; zero when it does not exist.
pub fn count_files(dir: &Path) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Moves `src` into `dest_dir`, keeping its file name. Falls back to
/// copy-then-delete when a rename is not possible (e.g. across devices).
pub fn move_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dest_dir).map_err(|e| AppError {
        message: format!("Failed to create directory {}: {}", dest_dir.display(), e),
    })?;

    let dest = dest_dir.join(file_name_of(src));

    if std::fs::rename(src, &dest).is_err() {
        std::fs::copy(src, &dest).map_err(|e| AppError {
            message: format!("Failed to move {} to {}: {}", src.display(), dest.display(), e),
        })?;
        std::fs::remove_file(src).map_err(|e| AppError {
            message: format!("Copied but failed to remove {}: {}", src.display(), e),
        })?;
    }

    Ok(dest)
}

/// Copies `src` into `dest_dir`, keeping its file name.
pub fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dest_dir).map_err(|e| AppError {
        message: format!("Failed to create directory {}: {}", dest_dir.display(), e),
    })?;

    let dest = dest_dir.join(file_name_of(src));
    std::fs::copy(src, &dest).map_err(|e| AppError {
        message: format!("Failed to copy {} to {}: {}", src.display(), dest.display(), e),
    })?;

    Ok(dest)
}

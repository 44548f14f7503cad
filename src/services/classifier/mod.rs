pub mod inference;
pub mod model_manager;

use crate::error::AppError;
use ndarray::Array4;

/// A loaded image classifier. Shared read-only across requests.
pub trait Classifier: Send + Sync {
    /// Returns one score per manifest label for a `[1, H, W, 3]` input.
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, AppError>;

    fn is_loaded(&self) -> bool {
        true
    }
}

pub mod catalog_service;
pub mod classifier;
pub mod fs_service;
pub mod prediction_service;
pub mod quality_service;
pub mod split_service;

pub mod classify_types;
pub mod fruit_types;
pub mod quality_types;
pub mod split_types;

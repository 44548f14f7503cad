use crate::error::AppError;
use crate::models::fruit_types::FruitClass;
use crate::services::catalog_service::FruitCatalog;
use crate::services::classifier::model_manager::LabelManifest;
use crate::services::classifier::Classifier;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Every label the model can emit needs a catalog profile.
pub fn check_catalog(labels: &LabelManifest, catalog: &FruitCatalog) -> Result<(), AppError> {
    match labels.labels().iter().find(|c| catalog.get(**c).is_none()) {
        Some(class) => Err(format!("No fruit profile for label {}", class).into()),
        None => Ok(()),
    }
}

/// Everything a request handler needs, built once at startup.
pub struct AppContext {
    classifier: Arc<dyn Classifier>,
    labels: LabelManifest,
    catalog: FruitCatalog,
    model_path: PathBuf,
}

impl AppContext {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        labels: LabelManifest,
        catalog: FruitCatalog,
        model_path: PathBuf,
    ) -> Result<Self, AppError> {
        check_catalog(&labels, &catalog)?;
        Ok(Self {
            classifier,
            labels,
            catalog,
            model_path,
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &[FruitClass] {
        self.labels.labels()
    }

    pub fn catalog(&self) -> &FruitCatalog {
        &self.catalog
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_loaded()
    }

    pub fn class_names(&self) -> Vec<&'static str> {
        self.labels().iter().map(|c| c.label()).collect()
    }
}

use crate::error::AppError;
use crate::models::fruit_types::{FruitClass, FruitProfile};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../../data/fruit_profiles.json");

/// Immutable lookup of the reference profile for each fruit class. Coverage
/// of the model's labels is checked when the app context is built.
#[derive(Debug, Clone)]
pub struct FruitCatalog {
    profiles: HashMap<FruitClass, FruitProfile>,
}

impl FruitCatalog {
    /// Catalog from `path`, or the built-in one when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| AppError {
                    message: format!("Failed to read fruit catalog {}: {}", path.display(), e),
                })?;
                Self::from_json(&content)
            }
            None => Self::embedded(),
        }
    }

    pub fn embedded() -> Result<Self, AppError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let raw: BTreeMap<String, FruitProfile> = serde_json::from_str(content).map_err(|e| AppError {
            message: format!("Failed to parse fruit catalog: {}", e),
        })?;

        let mut profiles = HashMap::new();
        for (label, profile) in raw {
            let class = FruitClass::from_label(&label).ok_or_else(|| AppError {
                message: format!("Fruit catalog names unknown class '{}'", label),
            })?;
            profiles.insert(class, profile);
        }

        Ok(Self { profiles })
    }

    pub fn get(&self, class: FruitClass) -> Option<&FruitProfile> {
        self.profiles.get(&class)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

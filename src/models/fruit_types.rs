use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of fruit classes. Declaration order is the training order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FruitClass {
    Kupa,
    Matoa,
    Namnam,
}

impl FruitClass {
    pub const ALL: [FruitClass; 3] = [FruitClass::Kupa, FruitClass::Matoa, FruitClass::Namnam];

    /// Order the dataset tools walk the class directories in.
    pub const DATASET_ORDER: [FruitClass; 3] =
        [FruitClass::Matoa, FruitClass::Namnam, FruitClass::Kupa];

    /// Label used by the model manifest and the HTTP API.
    pub fn label(&self) -> &'static str {
        match self {
            FruitClass::Kupa => "Kupa",
            FruitClass::Matoa => "Matoa",
            FruitClass::Namnam => "Namnam",
        }
    }

    /// Directory name used in the raw/processed dataset trees.
    pub fn dir_name(&self) -> &'static str {
        match self {
            FruitClass::Kupa => "kupa",
            FruitClass::Matoa => "matoa",
            FruitClass::Namnam => "namnam",
        }
    }

    pub fn from_label(label: &str) -> Option<FruitClass> {
        FruitClass::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for FruitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static reference data shown alongside a prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FruitProfile {
    pub origin: String,
    pub nutrition: BTreeMap<String, String>,
    pub fun_facts: Vec<String>,
    /// `[latitude, longitude]`
    pub coordinates: [f64; 2],
    pub description: String,
}

//! JSON export document consumed by the blood test viewer.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::biomarker::BiomarkerReading;

/// Version written to `schemaVersion`.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub schema_version: u32,
    pub tests: Vec<ExportTest>,
    #[serde(skip_serializing_if = "Categories::is_empty")]
    pub categories: Categories,
}

impl ExportDocument {
    pub fn new(tests: Vec<ExportTest>, categories: Categories) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            tests,
            categories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTest {
    /// ISO-8601 `YYYY-MM-DD`.
    pub date: String,
    pub lab_name: String,
    pub biomarkers: Vec<BiomarkerReading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub biomarkers: Vec<String>,
}

/// Biomarker groupings, serialized as a JSON object in sheet order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Categories(Vec<Category>);

impl Categories {
    /// Insert or replace a category; a replaced category keeps its position.
    pub fn insert(&mut self, name: String, biomarkers: Vec<String>) {
        if let Some(existing) = self.0.iter_mut().find(|c| c.name == name) {
            existing.biomarkers = biomarkers;
        } else {
            self.0.push(Category { name, biomarkers });
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.biomarkers.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.biomarkers)?;
        }
        map.end()
    }
}

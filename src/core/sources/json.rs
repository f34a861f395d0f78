//! Snapshot reader over a directory of JSON exports.
//!
//! Each dataset is one file holding a JSON array. A missing or malformed
//! file fails the whole snapshot; an empty dataset must be written as `[]`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::{Snapshot, SourceReader};
use crate::core::error::{Error, Result};

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const CERTIFICATIONS_FILE: &str = "certifications.json";
pub const DEVELOPMENT_PLANS_FILE: &str = "development_plans.json";
pub const ONE_ON_ONES_FILE: &str = "one_on_ones.json";

pub struct JsonSourceDir {
    data_dir: PathBuf,
}

impl JsonSourceDir {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read_dataset<T: DeserializeOwned>(&self, dataset: &'static str, file: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file);
        let content = fs::read_to_string(&path).map_err(|source| Error::SourceRead {
            dataset,
            path: path.clone(),
            source,
        })?;
        let rows: Vec<T> = serde_json::from_str(&content)
            .map_err(|source| Error::SourceDecode { dataset, path, source })?;
        log::debug!("Read {} {} rows", rows.len(), dataset);
        Ok(rows)
    }

    /// Write a snapshot out as the four dataset files.
    pub fn export(&self, snapshot: &Snapshot) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(
            self.data_dir.join(EMPLOYEES_FILE),
            serde_json::to_string_pretty(&snapshot.employees)?,
        )?;
        fs::write(
            self.data_dir.join(CERTIFICATIONS_FILE),
            serde_json::to_string_pretty(&snapshot.certifications)?,
        )?;
        fs::write(
            self.data_dir.join(DEVELOPMENT_PLANS_FILE),
            serde_json::to_string_pretty(&snapshot.development_plans)?,
        )?;
        fs::write(
            self.data_dir.join(ONE_ON_ONES_FILE),
            serde_json::to_string_pretty(&snapshot.one_on_ones)?,
        )?;
        Ok(())
    }
}

impl SourceReader for JsonSourceDir {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            employees: self.read_dataset("employees", EMPLOYEES_FILE)?,
            certifications: self.read_dataset("certifications", CERTIFICATIONS_FILE)?,
            development_plans: self.read_dataset("development plans", DEVELOPMENT_PLANS_FILE)?,
            one_on_ones: self.read_dataset("one-on-ones", ONE_ON_ONES_FILE)?,
        })
    }
}

//! Read-only access to the upstream HR datasets.
//!
//! A refresh pass works on one [`Snapshot`] taken up front, so every rule
//! sees the same data and a failed read aborts the pass before anything is
//! reconciled.

pub mod json;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::model::{CertificationLink, DevelopmentPlanEntry, Employee, EmployeeId, OneOnOneEntry};

/// Point-in-time copy of the four upstream datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub certifications: Vec<CertificationLink>,
    #[serde(default)]
    pub development_plans: Vec<DevelopmentPlanEntry>,
    #[serde(default)]
    pub one_on_ones: Vec<OneOnOneEntry>,
}

impl Snapshot {
    /// Active employees by id. Records pointing anywhere else are ignored
    /// by every rule.
    pub fn active_employees(&self) -> HashMap<EmployeeId, &Employee> {
        self.employees
            .iter()
            .filter(|employee| employee.is_active())
            .map(|employee| (employee.id, employee))
            .collect()
    }
}

/// Source of snapshots. Implementations must either return every dataset
/// or fail as a whole.
pub trait SourceReader {
    fn snapshot(&self) -> Result<Snapshot>;
}

impl SourceReader for Snapshot {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.clone())
    }
}

//! Upstream records the alert rules read.
//!
//! These mirror the rows owned by the employee, knowledge, development-plan
//! and one-on-one modules. The engine never writes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EmployeeId = Uuid;
pub type KnowledgeId = i64;
pub type PlanEntryId = Uuid;
pub type MeetingId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
    OnVacation,
    Terminated,
    /// Any status this crate does not know; such employees are not active.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub status: EmployeeStatus,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Managers and coordinators; one-on-ones are mandatory for them.
    #[serde(default)]
    pub is_leader: bool,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificationStatus {
    Desired,
    InProgress,
    Obtained,
    Expired,
    #[serde(other)]
    Other,
}

/// Link between an employee and a knowledge item (course or certification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationLink {
    pub employee_id: EmployeeId,
    pub knowledge_id: KnowledgeId,
    pub knowledge_name: String,
    pub status: CertificationStatus,
    #[serde(default)]
    pub obtained_on: Option<NaiveDate>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    /// Validity of the knowledge item; 0 means it never expires.
    #[serde(default)]
    pub validity_months: Option<u32>,
}

impl CertificationLink {
    /// The date this certification lapses, if it lapses at all.
    ///
    /// An explicit expiry date wins. Otherwise the date is derived from the
    /// obtained date and the validity period of the knowledge item.
    pub fn effective_expiry(&self) -> Option<NaiveDate> {
        if let Some(expires_on) = self.expires_on {
            return Some(expires_on);
        }
        let obtained_on = self.obtained_on?;
        match self.validity_months {
            Some(months) if months > 0 => super::dates::add_months(obtained_on, months),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Planned,
    InProgress,
    Overdue,
    Completed,
    Cancelled,
    /// Unknown upstream status; still open until marked completed.
    #[serde(other)]
    Other,
}

/// One action of an employee's individual development plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentPlanEntry {
    pub id: PlanEntryId,
    pub employee_id: EmployeeId,
    pub title: String,
    pub status: PlanStatus,
    #[serde(default)]
    pub planned_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    Scheduled,
    Overdue,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneOnOneEntry {
    pub id: MeetingId,
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub scheduled_on: Option<NaiveDate>,
    pub status: MeetingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(expires_on: Option<NaiveDate>, validity_months: Option<u32>) -> CertificationLink {
        CertificationLink {
            employee_id: Uuid::nil(),
            knowledge_id: 7,
            knowledge_name: "AWS Solutions Architect".to_string(),
            status: CertificationStatus::Obtained,
            obtained_on: NaiveDate::from_ymd_opt(2024, 1, 31),
            expires_on,
            validity_months,
        }
    }

    #[test]
    fn test_explicit_expiry_wins() {
        let explicit = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert_eq!(link(explicit, Some(12)).effective_expiry(), explicit);
    }

    #[test]
    fn test_expiry_derived_from_validity() {
        assert_eq!(
            link(None, Some(1)).effective_expiry(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            link(None, Some(13)).effective_expiry(),
            NaiveDate::from_ymd_opt(2025, 2, 28)
        );
    }

    #[test]
    fn test_zero_validity_never_expires() {
        assert_eq!(link(None, Some(0)).effective_expiry(), None);
        assert_eq!(link(None, None).effective_expiry(), None);
    }

    #[test]
    fn test_employee_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "6f1c1f1e-2d0a-4c55-8d41-0a4f3f5f2b11",
            "name": "Maria Santos",
            "status": "ACTIVE"
        }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert!(employee.is_active());
        assert_eq!(employee.birth_date, None);
        assert!(!employee.is_leader);
    }

    #[test]
    fn test_unknown_statuses_decode() {
        let employee: Employee = serde_json::from_str(
            r#"{"id": "6f1c1f1e-2d0a-4c55-8d41-0a4f3f5f2b11", "name": "Rita", "status": "ON_VACATION"}"#,
        )
        .unwrap();
        assert_eq!(employee.status, EmployeeStatus::OnVacation);
        assert!(!employee.is_active());

        let status: EmployeeStatus = serde_json::from_str(r#""SABBATICAL""#).unwrap();
        assert_eq!(status, EmployeeStatus::Other);

        let meeting: OneOnOneEntry = serde_json::from_str(
            r#"{
                "id": "0b7a4d2e-9f61-4c1a-a8c3-52e6f0d1b9a4",
                "employee_id": "6f1c1f1e-2d0a-4c55-8d41-0a4f3f5f2b11",
                "scheduled_on": "2025-05-20",
                "status": "OVERDUE"
            }"#,
        )
        .unwrap();
        assert_eq!(meeting.status, MeetingStatus::Overdue);

        let plan: PlanStatus = serde_json::from_str(r#""ON_HOLD""#).unwrap();
        assert_eq!(plan, PlanStatus::Other);
        let certification: CertificationStatus = serde_json::from_str(r#""RENEWING""#).unwrap();
        assert_eq!(certification, CertificationStatus::Other);
    }
}

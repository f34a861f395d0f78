// Alert model types: kinds, priorities, the persisted alert row and the
// candidates the rules produce each pass.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::{EmployeeId, KnowledgeId, MeetingId, PlanEntryId};

/// Store-assigned row identifier
pub type AlertId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Birthday,
    WorkAnniversary,
    CertificationExpiring,
    CertificationExpired,
    DevelopmentPlanDeadline,
    OneOnOneSchedule,
    /// Created by hand from the documents screen
    DocumentMissing,
    /// Created by hand by administrators
    System,
}

/// Kinds whose whole lifecycle belongs to the reconciliation engine.
/// Everything else is written by other code paths and never touched here.
pub const MANAGED_KINDS: [AlertKind; 6] = [
    AlertKind::Birthday,
    AlertKind::WorkAnniversary,
    AlertKind::CertificationExpiring,
    AlertKind::CertificationExpired,
    AlertKind::DevelopmentPlanDeadline,
    AlertKind::OneOnOneSchedule,
];

impl AlertKind {
    pub fn is_managed(&self) -> bool {
        MANAGED_KINDS.contains(self)
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birthday => "birthday",
            Self::WorkAnniversary => "work_anniversary",
            Self::CertificationExpiring => "certification_expiring",
            Self::CertificationExpired => "certification_expired",
            Self::DevelopmentPlanDeadline => "development_plan_deadline",
            Self::OneOnOneSchedule => "one_on_one_schedule",
            Self::DocumentMissing => "document_missing",
            Self::System => "system",
        }
    }

    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Birthday => "Birthday",
            Self::WorkAnniversary => "Work Anniversary",
            Self::CertificationExpiring => "Certification Expiring",
            Self::CertificationExpired => "Certification Expired",
            Self::DevelopmentPlanDeadline => "Development Plan Deadline",
            Self::OneOnOneSchedule => "One-on-One",
            Self::DocumentMissing => "Missing Document",
            Self::System => "System",
        }
    }

    pub fn all() -> &'static [AlertKind] {
        &[
            Self::Birthday,
            Self::WorkAnniversary,
            Self::CertificationExpiring,
            Self::CertificationExpired,
            Self::DevelopmentPlanDeadline,
            Self::OneOnOneSchedule,
            Self::DocumentMissing,
            Self::System,
        ]
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown alert kind {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown alert priority {other:?}")),
        }
    }
}

/// Per-rule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Look-ahead window in days; the rule's own default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
}

fn default_enabled() -> bool {
    true
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_days: None,
        }
    }
}

impl RuleConfig {
    /// Effective look-ahead window for `kind`.
    pub fn window(&self, kind: AlertKind) -> i64 {
        self.window_days
            .map(i64::from)
            .unwrap_or_else(|| default_window(kind))
    }
}

/// Default look-ahead window per kind, in days
pub fn default_window(kind: AlertKind) -> i64 {
    match kind {
        AlertKind::Birthday | AlertKind::WorkAnniversary => 30,
        AlertKind::CertificationExpiring => 60,
        AlertKind::DevelopmentPlanDeadline => 15,
        AlertKind::OneOnOneSchedule => 7,
        AlertKind::CertificationExpired | AlertKind::DocumentMissing | AlertKind::System => 0,
    }
}

/// Where a dated obligation stands relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineState {
    Overdue,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingState {
    Overdue,
    Upcoming,
    /// Leader without any one-on-one on record
    Pending,
}

/// Rule-specific facts carried by an alert. Never displayed; the title and
/// message are rendered from these at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertDetail {
    Birthday {
        target_date: NaiveDate,
        days_until: i64,
    },
    WorkAnniversary {
        target_date: NaiveDate,
        years: i32,
        days_until: i64,
    },
    CertificationExpiring {
        knowledge_id: KnowledgeId,
        knowledge_name: String,
        expires_on: NaiveDate,
        days_until: i64,
    },
    CertificationExpired {
        knowledge_id: KnowledgeId,
        knowledge_name: String,
        expired_on: NaiveDate,
        days_expired: i64,
    },
    DevelopmentPlanDeadline {
        entry_id: PlanEntryId,
        state: DeadlineState,
        planned_on: NaiveDate,
        /// Negative once overdue
        days_until: i64,
    },
    OneOnOneSchedule {
        entry_id: Option<MeetingId>,
        state: MeetingState,
        scheduled_on: Option<NaiveDate>,
        days_until: Option<i64>,
    },
    /// Free-form payload of hand-written alerts
    Manual {
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl AlertDetail {
    /// The managed kind this payload belongs to, `None` for manual payloads.
    pub fn managed_kind(&self) -> Option<AlertKind> {
        match self {
            Self::Birthday { .. } => Some(AlertKind::Birthday),
            Self::WorkAnniversary { .. } => Some(AlertKind::WorkAnniversary),
            Self::CertificationExpiring { .. } => Some(AlertKind::CertificationExpiring),
            Self::CertificationExpired { .. } => Some(AlertKind::CertificationExpired),
            Self::DevelopmentPlanDeadline { .. } => Some(AlertKind::DevelopmentPlanDeadline),
            Self::OneOnOneSchedule { .. } => Some(AlertKind::OneOnOneSchedule),
            Self::Manual { .. } => None,
        }
    }
}

/// Reconciliation identity of an alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertKey {
    pub kind: AlertKind,
    pub subject: Option<EmployeeId>,
    pub identity_key: String,
}

/// What an alert should look like right now, before it is compared
/// against stored state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCandidate {
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub title: String,
    pub message: String,
    pub subject_employee_id: Option<EmployeeId>,
    pub subject_employee_name: Option<String>,
    pub expires_at: Option<NaiveDateTime>,
    pub identity_key: String,
    pub detail: AlertDetail,
}

impl AlertCandidate {
    /// Candidate for a managed kind; the kind always follows the detail.
    /// Manual payloads go through [`AlertCandidate::manual`] instead.
    pub fn new(
        detail: AlertDetail,
        priority: AlertPriority,
        title: String,
        message: String,
        identity_key: String,
    ) -> Self {
        let kind = detail.managed_kind().unwrap_or(AlertKind::System);
        Self {
            kind,
            priority,
            title,
            message,
            subject_employee_id: None,
            subject_employee_name: None,
            expires_at: None,
            identity_key,
            detail,
        }
    }

    /// A hand-written alert, as created by the documents screen or admins.
    pub fn manual(kind: AlertKind, priority: AlertPriority, title: String, message: String) -> Self {
        Self {
            kind,
            priority,
            title,
            message,
            subject_employee_id: None,
            subject_employee_name: None,
            expires_at: None,
            identity_key: String::new(),
            detail: AlertDetail::Manual {
                data: serde_json::Value::Null,
            },
        }
    }

    pub fn with_subject(mut self, id: EmployeeId, name: &str) -> Self {
        self.subject_employee_id = Some(id);
        self.subject_employee_name = Some(name.to_string());
        self
    }

    pub fn with_expiry(mut self, expires_at: NaiveDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn key(&self) -> AlertKey {
        AlertKey {
            kind: self.kind,
            subject: self.subject_employee_id,
            identity_key: self.identity_key.clone(),
        }
    }
}

/// A persisted alert row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub title: String,
    pub message: String,
    pub subject_employee_id: Option<EmployeeId>,
    pub subject_employee_name: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub identity_key: String,
    #[serde(skip)]
    pub detail: AlertDetail,
}

impl Alert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            kind: self.kind,
            subject: self.subject_employee_id,
            identity_key: self.identity_key.clone(),
        }
    }

    /// True when writing `candidate` over this row would change nothing.
    pub fn is_current(&self, candidate: &AlertCandidate) -> bool {
        !self.read
            && self.priority == candidate.priority
            && self.title == candidate.title
            && self.message == candidate.message
            && self.subject_employee_name == candidate.subject_employee_name
            && self.expires_at == candidate.expires_at
            && self.detail == candidate.detail
    }

    /// Row that `candidate` becomes once inserted.
    pub fn from_candidate(id: AlertId, created_at: DateTime<Utc>, candidate: &AlertCandidate) -> Self {
        Self {
            id,
            kind: candidate.kind,
            priority: candidate.priority,
            title: candidate.title.clone(),
            message: candidate.message.clone(),
            subject_employee_id: candidate.subject_employee_id,
            subject_employee_name: candidate.subject_employee_name.clone(),
            read: false,
            created_at,
            expires_at: candidate.expires_at,
            identity_key: candidate.identity_key.clone(),
            detail: candidate.detail.clone(),
        }
    }

    /// Overwrites the generated fields and re-surfaces the alert.
    pub fn refresh_from(&mut self, candidate: &AlertCandidate) {
        self.priority = candidate.priority;
        self.title = candidate.title.clone();
        self.message = candidate.message.clone();
        self.subject_employee_name = candidate.subject_employee_name.clone();
        self.expires_at = candidate.expires_at;
        self.detail = candidate.detail.clone();
        self.read = false;
    }
}

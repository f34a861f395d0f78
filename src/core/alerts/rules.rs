// Alert rules: one generator per managed kind.
//
// Each generator reads the snapshot as of `today` and returns the alerts
// that should exist right now. Generators never read a clock and skip
// records that lack the dates they need.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use super::model::{
    AlertCandidate, AlertDetail, AlertKind, AlertPriority, DeadlineState, MeetingState, RuleConfig,
};
use crate::core::dates;
use crate::core::model::{
    CertificationStatus, Employee, EmployeeId, MeetingStatus, OneOnOneEntry, PlanStatus,
};
use crate::core::sources::Snapshot;

/// Birthdays this close are HIGH priority.
const BIRTHDAY_URGENT_DAYS: i64 = 7;
/// Certifications expiring in fewer days than this are HIGH priority.
const CERTIFICATION_URGENT_DAYS: i64 = 15;

/// Context shared by all rules during one pass
pub struct RuleContext<'a> {
    pub snapshot: &'a Snapshot,
    pub today: NaiveDate,
    /// Active employees only; everyone else is invisible to the rules
    employees: HashMap<EmployeeId, &'a Employee>,
}

impl<'a> RuleContext<'a> {
    pub fn new(snapshot: &'a Snapshot, today: NaiveDate) -> Self {
        Self {
            snapshot,
            today,
            employees: snapshot.active_employees(),
        }
    }

    fn employee(&self, id: &EmployeeId) -> Option<&'a Employee> {
        self.employees.get(id).copied()
    }

    fn active_employees(&self) -> impl Iterator<Item = &'a Employee> + '_ {
        self.snapshot.employees.iter().filter(|e| e.is_active())
    }
}

/// Evaluate the rule behind `kind`. Unmanaged kinds have no rule.
pub fn evaluate_rule(kind: AlertKind, ctx: &RuleContext, config: &RuleConfig) -> Vec<AlertCandidate> {
    let window = config.window(kind);
    match kind {
        AlertKind::Birthday => birthdays(ctx, window),
        AlertKind::WorkAnniversary => work_anniversaries(ctx, window),
        AlertKind::CertificationExpiring => certifications_expiring(ctx, window),
        AlertKind::CertificationExpired => certifications_expired(ctx),
        AlertKind::DevelopmentPlanDeadline => development_plan_deadlines(ctx, window),
        AlertKind::OneOnOneSchedule => one_on_ones(ctx, window),
        AlertKind::DocumentMissing | AlertKind::System => Vec::new(),
    }
}

fn days_phrase(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        n => format!("in {n} days"),
    }
}

/// Upcoming birthdays of active employees
fn birthdays(ctx: &RuleContext, window: i64) -> Vec<AlertCandidate> {
    let mut alerts = Vec::new();
    for employee in ctx.active_employees() {
        let Some(birth_date) = employee.birth_date else {
            continue;
        };
        let Some(next_birthday) = dates::next_occurrence(birth_date, ctx.today) else {
            continue;
        };
        let days = dates::days_between(ctx.today, next_birthday);
        if days > window {
            continue;
        }

        let priority = if days <= BIRTHDAY_URGENT_DAYS {
            AlertPriority::High
        } else {
            AlertPriority::Medium
        };
        alerts.push(
            AlertCandidate::new(
                AlertDetail::Birthday {
                    target_date: next_birthday,
                    days_until: days,
                },
                priority,
                format!("Birthday of {}", employee.name),
                format!(
                    "{}'s birthday is {} ({}).",
                    employee.name,
                    days_phrase(days),
                    dates::display(next_birthday)
                ),
                format!("{}-{}", employee.id, next_birthday),
            )
            .with_subject(employee.id, &employee.name)
            .with_expiry(dates::start_of_day(next_birthday)),
        );
    }
    alerts
}

/// Upcoming hire anniversaries of active employees
fn work_anniversaries(ctx: &RuleContext, window: i64) -> Vec<AlertCandidate> {
    let mut alerts = Vec::new();
    for employee in ctx.active_employees() {
        let Some(hire_date) = employee.hire_date else {
            continue;
        };
        if hire_date > ctx.today {
            continue;
        }
        let Some(anniversary) = dates::next_occurrence(hire_date, ctx.today) else {
            continue;
        };
        let years = anniversary.year() - hire_date.year();
        if years < 1 {
            // Hired today.
            continue;
        }
        let days = dates::days_between(ctx.today, anniversary);
        if days > window {
            continue;
        }

        let plural = if years == 1 { "year" } else { "years" };
        alerts.push(
            AlertCandidate::new(
                AlertDetail::WorkAnniversary {
                    target_date: anniversary,
                    years,
                    days_until: days,
                },
                AlertPriority::Medium,
                format!("Work anniversary of {}", employee.name),
                format!(
                    "{} completes {} {} at the company {} ({}).",
                    employee.name,
                    years,
                    plural,
                    days_phrase(days),
                    dates::display(anniversary)
                ),
                format!("{}-{}", employee.id, anniversary),
            )
            .with_subject(employee.id, &employee.name)
            .with_expiry(dates::start_of_day(anniversary)),
        );
    }
    alerts
}

/// Obtained certifications that lapse within the window, today included
fn certifications_expiring(ctx: &RuleContext, window: i64) -> Vec<AlertCandidate> {
    let mut alerts = Vec::new();
    for link in &ctx.snapshot.certifications {
        if link.status != CertificationStatus::Obtained {
            continue;
        }
        let Some(expires_on) = link.effective_expiry() else {
            continue;
        };
        let Some(employee) = ctx.employee(&link.employee_id) else {
            continue;
        };
        let days = dates::days_between(ctx.today, expires_on);
        if !(0..=window).contains(&days) {
            continue;
        }

        let priority = if days < CERTIFICATION_URGENT_DAYS {
            AlertPriority::High
        } else {
            AlertPriority::Medium
        };
        alerts.push(
            AlertCandidate::new(
                AlertDetail::CertificationExpiring {
                    knowledge_id: link.knowledge_id,
                    knowledge_name: link.knowledge_name.clone(),
                    expires_on,
                    days_until: days,
                },
                priority,
                format!("Certification '{}' expiring", link.knowledge_name),
                format!(
                    "{}'s certification expires {} ({}).",
                    employee.name,
                    days_phrase(days),
                    dates::display(expires_on)
                ),
                format!("{}-{}", employee.id, link.knowledge_id),
            )
            .with_subject(employee.id, &employee.name),
        );
    }
    alerts
}

/// Obtained certifications whose expiry date is strictly in the past
fn certifications_expired(ctx: &RuleContext) -> Vec<AlertCandidate> {
    let mut alerts = Vec::new();
    for link in &ctx.snapshot.certifications {
        if link.status != CertificationStatus::Obtained {
            continue;
        }
        let Some(expired_on) = link.effective_expiry() else {
            continue;
        };
        let Some(employee) = ctx.employee(&link.employee_id) else {
            continue;
        };
        let days_expired = dates::days_between(expired_on, ctx.today);
        if days_expired <= 0 {
            continue;
        }

        alerts.push(
            AlertCandidate::new(
                AlertDetail::CertificationExpired {
                    knowledge_id: link.knowledge_id,
                    knowledge_name: link.knowledge_name.clone(),
                    expired_on,
                    days_expired,
                },
                AlertPriority::Critical,
                format!("Certification '{}' expired", link.knowledge_name),
                format!(
                    "{}'s certification expired on {} ({} day(s) ago).",
                    employee.name,
                    dates::display(expired_on),
                    days_expired
                ),
                format!("{}-{}", employee.id, link.knowledge_id),
            )
            .with_subject(employee.id, &employee.name),
        );
    }
    alerts
}

/// Development plan actions not yet completed that are overdue or due soon
fn development_plan_deadlines(ctx: &RuleContext, window: i64) -> Vec<AlertCandidate> {
    let mut alerts = Vec::new();
    for entry in &ctx.snapshot.development_plans {
        if entry.status == PlanStatus::Completed {
            continue;
        }
        let Some(planned_on) = entry.planned_on else {
            continue;
        };
        let Some(employee) = ctx.employee(&entry.employee_id) else {
            continue;
        };
        let days = dates::days_between(ctx.today, planned_on);

        let (state, priority, title, message) = if days < 0 {
            (
                DeadlineState::Overdue,
                AlertPriority::High,
                format!("Development plan overdue - {}", employee.name),
                format!(
                    "The development plan action '{}' of {} has been overdue since {}.",
                    entry.title,
                    employee.name,
                    dates::display(planned_on)
                ),
            )
        } else if days <= window {
            (
                DeadlineState::Upcoming,
                AlertPriority::Medium,
                format!("Development plan due soon - {}", employee.name),
                format!(
                    "The development plan action '{}' of {} is due {} ({}).",
                    entry.title,
                    employee.name,
                    days_phrase(days),
                    dates::display(planned_on)
                ),
            )
        } else {
            continue;
        };

        alerts.push(
            AlertCandidate::new(
                AlertDetail::DevelopmentPlanDeadline {
                    entry_id: entry.id,
                    state,
                    planned_on,
                    days_until: days,
                },
                priority,
                title,
                message,
                entry.id.to_string(),
            )
            .with_subject(employee.id, &employee.name),
        );
    }
    alerts
}

/// One-on-one follow-up, driven by each employee's most recent meeting
fn one_on_ones(ctx: &RuleContext, window: i64) -> Vec<AlertCandidate> {
    // Employees with any entry at all, dated or not, are not "pending".
    let mut has_entry: HashMap<EmployeeId, Option<&OneOnOneEntry>> = HashMap::new();
    for entry in &ctx.snapshot.one_on_ones {
        let latest = has_entry.entry(entry.employee_id).or_insert(None);
        if entry.scheduled_on.is_none() {
            continue;
        }
        let newer = match latest {
            Some(current) => (entry.scheduled_on, entry.id) > (current.scheduled_on, current.id),
            None => true,
        };
        if newer {
            *latest = Some(entry);
        }
    }

    let mut alerts = Vec::new();
    for employee in ctx.active_employees() {
        match has_entry.get(&employee.id) {
            Some(Some(entry)) => {
                if let Some(alert) = meeting_alert(ctx, employee, entry, window) {
                    alerts.push(alert);
                }
            }
            Some(None) => {}
            None if employee.is_leader => alerts.push(
                AlertCandidate::new(
                    AlertDetail::OneOnOneSchedule {
                        entry_id: None,
                        state: MeetingState::Pending,
                        scheduled_on: None,
                        days_until: None,
                    },
                    AlertPriority::Medium,
                    format!("One-on-one pending - {}", employee.name),
                    format!("{} does not have a one-on-one scheduled yet.", employee.name),
                    format!("pending-{}", employee.id),
                )
                .with_subject(employee.id, &employee.name),
            ),
            None => {}
        }
    }
    alerts
}

fn meeting_alert(
    ctx: &RuleContext,
    employee: &Employee,
    entry: &OneOnOneEntry,
    window: i64,
) -> Option<AlertCandidate> {
    if entry.status == MeetingStatus::Completed {
        return None;
    }
    let scheduled_on = entry.scheduled_on?;
    let days = dates::days_between(ctx.today, scheduled_on);

    let (state, priority, title, message) = if days < 0 {
        (
            MeetingState::Overdue,
            AlertPriority::High,
            format!("One-on-one overdue - {}", employee.name),
            format!(
                "The last one-on-one scheduled with {} should have happened on {}.",
                employee.name,
                dates::display(scheduled_on)
            ),
        )
    } else if days <= window {
        (
            MeetingState::Upcoming,
            AlertPriority::Medium,
            format!("One-on-one coming up - {}", employee.name),
            format!(
                "A one-on-one with {} is scheduled {} ({}).",
                employee.name,
                days_phrase(days),
                dates::display(scheduled_on)
            ),
        )
    } else {
        return None;
    };

    Some(
        AlertCandidate::new(
            AlertDetail::OneOnOneSchedule {
                entry_id: Some(entry.id),
                state,
                scheduled_on: Some(scheduled_on),
                days_until: Some(days),
            },
            priority,
            title,
            message,
            entry.id.to_string(),
        )
        .with_subject(employee.id, &employee.name),
    )
}

// Identity-keyed diff between this pass's candidates and the stored
// managed alerts.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::model::{Alert, AlertCandidate, AlertId, AlertKey};
use crate::core::error::{Error, Result};

/// Writes needed to bring the store in line with one pass's candidates.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub inserts: Vec<AlertCandidate>,
    /// Matched rows whose generated fields changed, or that were read
    pub updates: Vec<(AlertId, AlertCandidate)>,
    pub deletes: Vec<AlertId>,
    /// Matched rows that already look exactly like their candidate
    pub unchanged: usize,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn summary(&self) -> RefreshSummary {
        RefreshSummary {
            inserted: self.inserts.len(),
            updated: self.updates.len(),
            deleted: self.deletes.len(),
            unchanged: self.unchanged,
            active: self.inserts.len() + self.updates.len() + self.unchanged,
        }
    }
}

/// Outcome of one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    /// Managed alerts present once the pass is applied
    pub active: usize,
}

impl RefreshSummary {
    /// Rows written by the pass
    pub fn writes(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

/// Compares `candidates` against the `persisted` managed alerts.
///
/// - A candidate whose key matches a stored row updates that row (and marks
///   it unread), unless the row is already identical and unread.
/// - A candidate without a stored row is inserted.
/// - Stored rows matched by no candidate are deleted, as are surplus rows
///   sharing a key with an earlier row.
///
/// Rows of unmanaged kinds are never part of the plan. Two candidates with
/// the same key fail the whole pass.
pub fn reconcile(candidates: Vec<AlertCandidate>, persisted: Vec<Alert>) -> Result<ReconcilePlan> {
    let mut plan = ReconcilePlan::default();

    let mut indexed: HashMap<AlertKey, Alert> = HashMap::with_capacity(persisted.len());
    for alert in persisted {
        if !alert.kind.is_managed() {
            continue;
        }
        let key = alert.key();
        if indexed.contains_key(&key) {
            plan.deletes.push(alert.id);
            continue;
        }
        indexed.insert(key, alert);
    }

    let mut seen: HashSet<AlertKey> = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.kind.is_managed() {
            log::warn!("Ignoring candidate of unmanaged kind {}", candidate.kind);
            continue;
        }
        let key = candidate.key();
        if !seen.insert(key.clone()) {
            return Err(Error::IdentityCollision {
                kind: key.kind,
                subject: key.subject,
                key: key.identity_key,
            });
        }

        match indexed.remove(&key) {
            Some(existing) if existing.is_current(&candidate) => plan.unchanged += 1,
            Some(existing) => plan.updates.push((existing.id, candidate)),
            None => plan.inserts.push(candidate),
        }
    }

    // Anything left is no longer backed by a firing condition.
    plan.deletes.extend(indexed.into_values().map(|alert| alert.id));
    plan.deletes.sort_unstable();

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::model::{AlertDetail, AlertKind, AlertPriority};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn make_candidate(subject: Uuid, key: &str, days_until: i64) -> AlertCandidate {
        AlertCandidate::new(
            AlertDetail::Birthday {
                target_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
                days_until,
            },
            AlertPriority::Medium,
            "Birthday of João Silva".to_string(),
            format!("in {days_until} days"),
            key.to_string(),
        )
        .with_subject(subject, "João Silva")
    }

    fn stored(id: AlertId, candidate: &AlertCandidate) -> Alert {
        Alert::from_candidate(id, Utc::now(), candidate)
    }

    #[test]
    fn test_new_candidates_are_inserted() {
        let subject = Uuid::new_v4();
        let plan = reconcile(vec![make_candidate(subject, "a", 19)], Vec::new()).unwrap();

        assert_eq!(plan.inserts.len(), 1);
        assert!(plan.updates.is_empty());
        assert!(plan.deletes.is_empty());
        assert_eq!(plan.summary().active, 1);
    }

    #[test]
    fn test_identical_row_is_untouched() {
        let subject = Uuid::new_v4();
        let candidate = make_candidate(subject, "a", 19);
        let plan = reconcile(vec![candidate.clone()], vec![stored(1, &candidate)]).unwrap();

        assert!(plan.is_noop());
        assert_eq!(plan.unchanged, 1);
        assert_eq!(plan.summary().active, 1);
    }

    #[test]
    fn test_changed_row_is_updated_in_place() {
        let subject = Uuid::new_v4();
        let old = make_candidate(subject, "a", 19);
        let new = make_candidate(subject, "a", 18);
        let plan = reconcile(vec![new.clone()], vec![stored(7, &old)]).unwrap();

        assert!(plan.inserts.is_empty());
        assert_eq!(plan.updates, vec![(7, new)]);
    }

    #[test]
    fn test_read_row_is_resurfaced() {
        let subject = Uuid::new_v4();
        let candidate = make_candidate(subject, "a", 19);
        let mut row = stored(3, &candidate);
        row.read = true;
        let plan = reconcile(vec![candidate], vec![row]).unwrap();

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].0, 3);
    }

    #[test]
    fn test_unmatched_rows_are_deleted() {
        let subject = Uuid::new_v4();
        let keep = make_candidate(subject, "keep", 19);
        let gone = make_candidate(subject, "gone", 19);
        let plan = reconcile(vec![keep.clone()], vec![stored(1, &keep), stored(2, &gone)]).unwrap();

        assert_eq!(plan.deletes, vec![2]);
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_same_key_other_subject_is_distinct() {
        let a = make_candidate(Uuid::new_v4(), "same", 19);
        let b = make_candidate(Uuid::new_v4(), "same", 19);
        let plan = reconcile(vec![a, b], Vec::new()).unwrap();
        assert_eq!(plan.inserts.len(), 2);
    }

    #[test]
    fn test_duplicate_candidates_fail() {
        let subject = Uuid::new_v4();
        let result = reconcile(
            vec![make_candidate(subject, "a", 19), make_candidate(subject, "a", 19)],
            Vec::new(),
        );
        match result {
            Err(Error::IdentityCollision { kind, key, .. }) => {
                assert_eq!(kind, AlertKind::Birthday);
                assert_eq!(key, "a");
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_surplus_stored_rows_converge() {
        let subject = Uuid::new_v4();
        let candidate = make_candidate(subject, "a", 19);
        let plan = reconcile(
            vec![candidate.clone()],
            vec![stored(1, &candidate), stored(2, &candidate)],
        )
        .unwrap();

        assert_eq!(plan.deletes, vec![2]);
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_unmanaged_rows_are_invisible() {
        let manual = AlertCandidate::manual(
            AlertKind::System,
            AlertPriority::Info,
            "Maintenance".to_string(),
            "Tonight".to_string(),
        );
        let plan = reconcile(Vec::new(), vec![stored(9, &manual)]).unwrap();
        assert!(plan.is_noop());
    }
}

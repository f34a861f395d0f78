// Alert engine - runs the rules over a snapshot and reconciles the result
// with the alert store.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::{AlertCandidate, AlertKind, RuleConfig, MANAGED_KINDS};
use super::reconcile::{reconcile, RefreshSummary};
use super::rules::{evaluate_rule, RuleContext};
use super::store::{AlertStore, AlertTransaction};
use crate::core::error::Result;
use crate::core::sources::{Snapshot, SourceReader};

/// Alert engine configuration - persisted in settings.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEngineConfig {
    /// Per-rule configuration; rules without an entry run with defaults
    #[serde(default)]
    pub rules: HashMap<AlertKind, RuleConfig>,
}

impl Default for AlertEngineConfig {
    fn default() -> Self {
        Self::default_enabled()
    }
}

impl AlertEngineConfig {
    /// Create config with all rules enabled at default settings
    pub fn default_enabled() -> Self {
        let rules = MANAGED_KINDS
            .iter()
            .map(|kind| (*kind, RuleConfig::default()))
            .collect();
        Self { rules }
    }

    pub fn rule(&self, kind: AlertKind) -> RuleConfig {
        self.rules.get(&kind).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, kind: AlertKind) -> bool {
        kind.is_managed() && self.rule(kind).enabled
    }
}

pub struct AlertEngine {
    config: AlertEngineConfig,
}

impl AlertEngine {
    pub fn new(config: AlertEngineConfig) -> Self {
        Self { config }
    }

    /// Update the engine configuration; takes effect on the next pass
    pub fn update_config(&mut self, config: AlertEngineConfig) {
        self.config = config;
    }

    /// Every candidate the enabled rules produce for `snapshot` as of `today`.
    pub fn generate(&self, snapshot: &Snapshot, today: NaiveDate) -> Vec<AlertCandidate> {
        let ctx = RuleContext::new(snapshot, today);
        let mut candidates = Vec::new();
        for kind in MANAGED_KINDS {
            if !self.config.is_enabled(kind) {
                log::debug!("Rule {} disabled", kind.display_name());
                continue;
            }
            let alerts = evaluate_rule(kind, &ctx, &self.config.rule(kind));
            log::debug!("Rule {} produced {} candidates", kind.display_name(), alerts.len());
            candidates.extend(alerts);
        }
        candidates
    }

    /// Run one full pass: snapshot, generate, diff and apply.
    ///
    /// The diff is computed and applied inside a single store transaction.
    /// Any failure (reading sources, a key collision, a write) leaves the
    /// store exactly as it was.
    pub fn refresh<R, S>(&self, reader: &R, store: &mut S, today: NaiveDate) -> Result<RefreshSummary>
    where
        R: SourceReader + ?Sized,
        S: AlertStore,
    {
        let snapshot = reader.snapshot()?;
        let candidates = self.generate(&snapshot, today);

        let mut tx = store.begin()?;
        let existing = tx.managed_alerts()?;
        let plan = reconcile(candidates, existing)?;

        for id in &plan.deletes {
            tx.delete(*id)?;
        }
        for (id, candidate) in &plan.updates {
            tx.update(*id, candidate)?;
        }
        for candidate in &plan.inserts {
            tx.insert(candidate)?;
        }
        tx.commit()?;

        let summary = plan.summary();
        log::info!(
            "Alert refresh for {}: {} inserted, {} updated, {} deleted, {} unchanged, {} active",
            today,
            summary.inserted,
            summary.updated,
            summary.deleted,
            summary.unchanged,
            summary.active
        );
        Ok(summary)
    }

    /// Run one full pass and return the number of managed alerts afterwards.
    pub fn refresh_alerts<R, S>(&self, reader: &R, store: &mut S, today: NaiveDate) -> Result<usize>
    where
        R: SourceReader + ?Sized,
        S: AlertStore,
    {
        self.refresh(reader, store, today).map(|summary| summary.active)
    }
}

//! Risk metrics over a record set

use crate::risk::effective_risk;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trm_core::{RiskLevel, SoftwareRecord};

/// Share of `count` in `total` as a percentage rounded to one decimal
///
/// Zero when `total` is zero.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Distribution of risk levels and the sub-counts behind them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Every risk level is present, zero when unused
    pub counts: BTreeMap<RiskLevel, usize>,
    pub percentages: BTreeMap<RiskLevel, f64>,
    pub deprecated_count: usize,
    pub missing_vendor_count: usize,
    pub unclassified_count: usize,
    pub total: usize,
}

impl RiskMetrics {
    pub fn count(&self, level: RiskLevel) -> usize {
        self.counts.get(&level).copied().unwrap_or(0)
    }

    pub fn percentage(&self, level: RiskLevel) -> f64 {
        self.percentages.get(&level).copied().unwrap_or(0.0)
    }

    pub fn percentage_sum(&self) -> f64 {
        self.percentages.values().sum()
    }
}

/// Compute risk metrics, recomputed from scratch on every call
pub fn aggregate(records: &[SoftwareRecord]) -> RiskMetrics {
    let total = records.len();
    let mut counts: BTreeMap<RiskLevel, usize> = RiskLevel::ALL.iter().map(|&level| (level, 0)).collect();

    for record in records {
        *counts.entry(effective_risk(record)).or_insert(0) += 1;
    }

    let percentages = counts
        .iter()
        .map(|(&level, &count)| (level, percentage(count, total)))
        .collect();

    RiskMetrics {
        counts,
        percentages,
        deprecated_count: records.iter().filter(|r| r.is_deprecated()).count(),
        missing_vendor_count: records.iter().filter(|r| !r.has_vendor()).count(),
        unclassified_count: records.iter().filter(|r| r.is_unclassified()).count(),
        total,
    }
}

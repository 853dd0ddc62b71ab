//! Inventory datasets: loading, filtering, statistics and export

use crate::metrics::{aggregate, percentage, RiskMetrics};
use crate::risk::effective_risk;
use crate::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;
use trm_core::{RiskLevel, SoftwareRecord, Strategy, Taxonomy};

/// Filter token meaning "no constraint"
pub const SELECT_ALL: &str = "All";

/// Clean one record: trimmed product name, blank free text emptied
pub fn normalize_record(record: &mut SoftwareRecord) {
    record.product_name = record.product_name.trim().to_string();
    if record.description.trim().is_empty() {
        record.description.clear();
    }
    if record.category_hint.trim().is_empty() {
        record.category_hint.clear();
    }
}

pub fn normalize(records: &mut [SoftwareRecord]) {
    records.iter_mut().for_each(normalize_record);
}

/// Accepted input shapes: a bare record array or a previous export bundle
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordSource {
    List(Vec<SoftwareRecord>),
    Bundle { records: Vec<SoftwareRecord> },
}

/// Parse, normalize and validate records from JSON text
pub fn parse_records(json: &str) -> EngineResult<Vec<SoftwareRecord>> {
    let mut records = match serde_json::from_str(json)? {
        RecordSource::List(records) => records,
        RecordSource::Bundle { records } => records,
    };
    normalize(&mut records);

    if let Some(index) = records.iter().position(|r| r.product_name.is_empty()) {
        return Err(EngineError::MissingProductName { index });
    }

    debug!(records = records.len(), "records loaded");
    Ok(records)
}

/// Load records from a JSON file
pub fn load_records(path: impl AsRef<Path>) -> EngineResult<Vec<SoftwareRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}

/// Bring stored classifications in line with the taxonomy
///
/// Pairs the taxonomy rejects are repaired with [`Taxonomy::repair`]. A
/// subdomain without a domain is dropped. Returns the number of records changed.
pub fn reconcile(taxonomy: &Taxonomy, records: &mut [SoftwareRecord]) -> usize {
    let mut changed = 0;
    for record in records.iter_mut() {
        match (record.domain.as_deref(), record.subdomain.as_deref()) {
            (Some(domain), subdomain) => {
                let subdomain = subdomain.unwrap_or_default();
                if taxonomy.is_valid(domain, subdomain) {
                    continue;
                }
                let repaired = taxonomy.repair(domain, subdomain);
                debug!(
                    product = %record.product_name,
                    domain,
                    subdomain,
                    repaired = %repaired,
                    "stored classification repaired"
                );
                record.apply_classification(repaired);
            }
            (None, Some(_)) => record.clear_classification(),
            (None, None) => continue,
        }
        changed += 1;
    }
    changed
}

/// Interactive record filter
///
/// `None`, blank or `"All"` disables a criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub search: Option<String>,
    pub domain: Option<String>,
    pub status: Option<String>,
    pub risk: Option<String>,
}

fn active(criterion: &Option<String>) -> Option<&str> {
    criterion
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != SELECT_ALL)
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_risk(mut self, risk: &str) -> Self {
        self.risk = Some(risk.to_string());
        self
    }

    /// No criterion is active
    pub fn is_empty(&self) -> bool {
        [&self.search, &self.domain, &self.status, &self.risk]
            .into_iter()
            .all(|criterion| active(criterion).is_none())
    }

    pub fn matches(&self, record: &SoftwareRecord) -> bool {
        if let Some(search) = active(&self.search) {
            let needle = search.to_lowercase();
            if !record.product_name.to_lowercase().contains(&needle)
                && !record.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(domain) = active(&self.domain) {
            if record.domain.as_deref() != Some(domain) {
                return false;
            }
        }
        if let Some(status) = active(&self.status) {
            if record.lifecycle_status.as_str() != status {
                return false;
            }
        }
        if let Some(risk) = active(&self.risk) {
            if effective_risk(record).as_str() != risk {
                return false;
            }
        }
        true
    }

    /// Matching records in input order
    pub fn apply<'a>(&self, records: &'a [SoftwareRecord]) -> Vec<&'a SoftwareRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Choices offered by the filter prompts, each list starting with `"All"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub domains: Vec<String>,
    pub statuses: Vec<String>,
    pub risk_levels: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[SoftwareRecord]) -> Self {
        let with_all = |values: BTreeSet<String>| {
            std::iter::once(SELECT_ALL.to_string()).chain(values).collect::<Vec<_>>()
        };

        Self {
            domains: with_all(records.iter().filter_map(|r| r.domain.clone()).collect()),
            statuses: with_all(records.iter().map(|r| r.lifecycle_status.to_string()).collect()),
            risk_levels: with_all(records.iter().map(|r| effective_risk(r).to_string()).collect()),
        }
    }
}

/// Inventory-wide distribution statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStatistics {
    pub total_products: usize,
    pub unique_vendors: usize,
    pub domain_counts: BTreeMap<String, usize>,
    pub domain_percentages: BTreeMap<String, f64>,
    pub status_counts: BTreeMap<String, usize>,
    pub risk_counts: BTreeMap<RiskLevel, usize>,
    pub risk_percentages: BTreeMap<RiskLevel, f64>,
}

impl InventoryStatistics {
    pub fn compute(records: &[SoftwareRecord]) -> Self {
        let total_products = records.len();

        let unique_vendors = records
            .iter()
            .filter_map(|r| r.vendor.as_deref().map(str::trim))
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .len();

        let mut domain_counts = BTreeMap::new();
        let mut status_counts = BTreeMap::new();
        let mut risk_counts = BTreeMap::new();
        for record in records {
            if let Some(domain) = &record.domain {
                *domain_counts.entry(domain.clone()).or_insert(0) += 1;
            }
            *status_counts.entry(record.lifecycle_status.to_string()).or_insert(0) += 1;
            *risk_counts.entry(effective_risk(record)).or_insert(0) += 1;
        }

        let domain_percentages = domain_counts
            .iter()
            .map(|(domain, &count)| (domain.clone(), percentage(count, total_products)))
            .collect();
        let risk_percentages = risk_counts
            .iter()
            .map(|(&level, &count)| (level, percentage(count, total_products)))
            .collect();

        Self {
            total_products,
            unique_vendors,
            domain_counts,
            domain_percentages,
            status_counts,
            risk_counts,
            risk_percentages,
        }
    }
}

/// Serializable snapshot of an annotated inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub generated_at: DateTime<Utc>,
    pub strategies: Vec<Strategy>,
    pub records: Vec<SoftwareRecord>,
    pub metrics: RiskMetrics,
    pub statistics: InventoryStatistics,
}

impl ExportBundle {
    pub fn new(records: Vec<SoftwareRecord>, strategies: &[Strategy]) -> Self {
        Self::at(Utc::now(), records, strategies)
    }

    pub fn at(generated_at: DateTime<Utc>, records: Vec<SoftwareRecord>, strategies: &[Strategy]) -> Self {
        Self {
            generated_at,
            strategies: strategies.to_vec(),
            metrics: aggregate(&records),
            statistics: InventoryStatistics::compute(&records),
            records,
        }
    }

    /// `trm_data_<YYYYMMDD_HHMMSS>.json`
    pub fn file_name(&self) -> String {
        format!("trm_data_{}.json", self.generated_at.format("%Y%m%d_%H%M%S"))
    }

    pub fn to_json(&self, pretty: bool) -> EngineResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        std::fs::write(path, self.to_json(true)?)?;
        Ok(())
    }
}

//! Risk scoring

use trm_core::{LifecycleStatus, RiskLevel, SoftwareRecord};

/// Derive a record's risk level
///
/// First matching rule wins:
/// 1. deprecated lifecycle: High-Risk
/// 2. absent or blank vendor: High-Risk
/// 3. unclassified, including never classified: High-Risk
/// 4. beta lifecycle: Medium-Risk
/// 5. otherwise Normal
pub fn flag_risk(record: &SoftwareRecord) -> RiskLevel {
    if record.is_deprecated() || !record.has_vendor() || record.is_unclassified() {
        return RiskLevel::HighRisk;
    }

    match record.lifecycle_status {
        LifecycleStatus::Beta => RiskLevel::MediumRisk,
        _ => RiskLevel::Normal,
    }
}

/// Score every record in place
pub fn assess_all(records: &mut [SoftwareRecord]) {
    for record in records.iter_mut() {
        record.risk_level = Some(flag_risk(record));
    }
}

/// Stored risk level, or a fresh score when the record was never assessed
pub fn effective_risk(record: &SoftwareRecord) -> RiskLevel {
    record.risk_level.unwrap_or_else(|| flag_risk(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trm_core::Classification;

    fn classified(domain: &str, subdomain: &str) -> SoftwareRecord {
        SoftwareRecord::new("Product", "desc").with_classification(Classification::new(domain, subdomain))
    }

    #[test]
    fn test_deprecated_wins_over_missing_vendor() {
        let record = classified("Network", "Load Balancers").with_status(LifecycleStatus::Deprecated);
        assert!(record.vendor.is_none());
        assert_eq!(flag_risk(&record), RiskLevel::HighRisk);
    }

    #[test]
    fn test_missing_or_blank_vendor() {
        let record = classified("Network", "Load Balancers");
        assert_eq!(flag_risk(&record), RiskLevel::HighRisk);
        assert_eq!(flag_risk(&record.clone().with_vendor("   ")), RiskLevel::HighRisk);
        assert_eq!(flag_risk(&record.with_vendor("Acme")), RiskLevel::Normal);
    }

    #[test]
    fn test_missing_vendor_outranks_beta() {
        let record = classified("Development", "IDEs").with_status(LifecycleStatus::Beta);
        assert_eq!(flag_risk(&record), RiskLevel::HighRisk);
    }

    #[test]
    fn test_unclassified_and_never_classified() {
        let sentinel = SoftwareRecord::new("X", "y")
            .with_vendor("Acme")
            .with_classification(Classification::unclassified());
        assert_eq!(flag_risk(&sentinel), RiskLevel::HighRisk);

        let never = SoftwareRecord::new("X", "y").with_vendor("Acme").with_status(LifecycleStatus::Beta);
        assert_eq!(flag_risk(&never), RiskLevel::HighRisk);
    }

    #[test]
    fn test_beta_with_vendor_and_domain() {
        let record = classified("Development", "IDEs")
            .with_vendor("Acme")
            .with_status(LifecycleStatus::Beta);
        assert_eq!(flag_risk(&record), RiskLevel::MediumRisk);
    }

    #[test]
    fn test_active_and_planned_are_normal() {
        let record = classified("Network", "Networking Tools").with_vendor("Acme");
        assert_eq!(flag_risk(&record), RiskLevel::Normal);
        assert_eq!(flag_risk(&record.with_status(LifecycleStatus::Planned)), RiskLevel::Normal);
    }

    #[test]
    fn test_assess_all_and_effective_risk() {
        let mut records = vec![
            classified("Network", "Networking Tools").with_vendor("Acme"),
            classified("Security", "Security Tools"),
        ];
        assert_eq!(effective_risk(&records[0]), RiskLevel::Normal);

        assess_all(&mut records);
        assert_eq!(records[0].risk_level, Some(RiskLevel::Normal));
        assert_eq!(records[1].risk_level, Some(RiskLevel::HighRisk));

        records[0].risk_level = Some(RiskLevel::MediumRisk);
        assert_eq!(effective_risk(&records[0]), RiskLevel::MediumRisk);
    }
}

//! Software inventory data model

use crate::taxonomy::UNCLASSIFIED;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated (domain, subdomain) placement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub domain: String,
    pub subdomain: String,
}

impl Classification {
    pub fn new(domain: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
        }
    }

    /// The sentinel pair
    pub fn unclassified() -> Self {
        Self::new(UNCLASSIFIED, UNCLASSIFIED)
    }

    pub fn is_unclassified(&self) -> bool {
        self.domain == UNCLASSIFIED
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.domain, self.subdomain)
    }
}

/// Named classification method selectable per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Deterministic keyword rules
    #[default]
    RuleBased,
    /// Text-completion model with rule fallback
    LlmBased,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::RuleBased, Strategy::LlmBased];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RuleBased => "rule-based",
            Strategy::LlmBased => "llm-based",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::new("classification strategy", s))
    }
}

/// Ordinal risk label, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "High-Risk")]
    HighRisk,
    #[serde(rename = "Medium-Risk")]
    MediumRisk,
    #[serde(rename = "Normal")]
    Normal,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::HighRisk, RiskLevel::MediumRisk, RiskLevel::Normal];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::HighRisk => "High-Risk",
            RiskLevel::MediumRisk => "Medium-Risk",
            RiskLevel::Normal => "Normal",
        }
    }

    /// Reviewer guidance for the level
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::HighRisk => "High-Risk items require immediate attention",
            RiskLevel::MediumRisk => "Medium-Risk items should be reviewed during regular cycles",
            RiskLevel::Normal => "Normal items have acceptable risk levels",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::new("risk level", s))
    }
}

/// Product lifecycle stage
///
/// Deserialization is lenient: unknown, blank or null values become `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum LifecycleStatus {
    #[default]
    Active,
    Deprecated,
    Planned,
    Beta,
}

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 4] = [
        LifecycleStatus::Active,
        LifecycleStatus::Deprecated,
        LifecycleStatus::Planned,
        LifecycleStatus::Beta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "Active",
            LifecycleStatus::Deprecated => "Deprecated",
            LifecycleStatus::Planned => "Planned",
            LifecycleStatus::Beta => "Beta",
        }
    }

    /// Map any raw input onto the four known stages, defaulting to `Active`
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Risk implied by the lifecycle stage alone
    pub fn baseline_risk(&self) -> RiskLevel {
        match self {
            LifecycleStatus::Deprecated => RiskLevel::HighRisk,
            LifecycleStatus::Beta => RiskLevel::MediumRisk,
            LifecycleStatus::Active | LifecycleStatus::Planned => RiskLevel::Normal,
        }
    }
}

impl From<Option<String>> for LifecycleStatus {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(LifecycleStatus::normalize).unwrap_or_default()
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::new("lifecycle status", s))
    }
}

/// One software inventory row
///
/// Field names accept both snake_case and the tabular column headers of the
/// inventory spreadsheet ("Product Name", "TRM Domain", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareRecord {
    #[serde(alias = "Product Name")]
    pub product_name: String,

    #[serde(default, alias = "Description", deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(default, alias = "Category Hint", deserialize_with = "null_as_empty")]
    pub category_hint: String,

    /// Absent or blank vendor is a risk signal, so it is kept verbatim
    #[serde(default, alias = "Vendor")]
    pub vendor: Option<String>,

    #[serde(default, alias = "Lifecycle Status")]
    pub lifecycle_status: LifecycleStatus,

    #[serde(default, alias = "TRM Domain", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, alias = "TRM Subdomain", skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    #[serde(default, alias = "Risk Flag", skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SoftwareRecord {
    pub fn new(product_name: &str, description: &str) -> Self {
        Self {
            product_name: product_name.to_string(),
            description: description.to_string(),
            category_hint: String::new(),
            vendor: None,
            lifecycle_status: LifecycleStatus::Active,
            domain: None,
            subdomain: None,
            risk_level: None,
        }
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.category_hint = hint.to_string();
        self
    }

    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.vendor = Some(vendor.to_string());
        self
    }

    pub fn with_status(mut self, status: LifecycleStatus) -> Self {
        self.lifecycle_status = status;
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.apply_classification(classification);
        self
    }

    /// Overwrite domain and subdomain together
    ///
    /// Any stored risk level is dropped, so it is re-derived from the new pair.
    pub fn apply_classification(&mut self, classification: Classification) {
        self.domain = Some(classification.domain);
        self.subdomain = Some(classification.subdomain);
        self.risk_level = None;
    }

    /// Remove the classification and the risk level derived from it
    pub fn clear_classification(&mut self) {
        self.domain = None;
        self.subdomain = None;
        self.risk_level = None;
    }

    pub fn classification(&self) -> Option<Classification> {
        match (&self.domain, &self.subdomain) {
            (Some(domain), Some(subdomain)) => Some(Classification::new(domain.clone(), subdomain.clone())),
            _ => None,
        }
    }

    /// Vendor is present and non-blank
    pub fn has_vendor(&self) -> bool {
        self.vendor.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
    }

    /// Never classified, or classified to the sentinel domain
    pub fn is_unclassified(&self) -> bool {
        self.domain.as_deref().map(|d| d == UNCLASSIFIED).unwrap_or(true)
    }

    pub fn is_deprecated(&self) -> bool {
        self.lifecycle_status == LifecycleStatus::Deprecated
    }
}

/// Unknown label for one of the enumerated fields
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

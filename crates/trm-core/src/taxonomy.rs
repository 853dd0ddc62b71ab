//! Technology reference model taxonomy
//!
//! Ordered registry of domains, their subdomains and the keyword sets used by
//! rule-based matching. Declaration order is observable: rule matching walks
//! the domains in this order and the first domain with a keyword hit wins.

use crate::model::Classification;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Reserved domain and subdomain name for records nothing could place
pub const UNCLASSIFIED: &str = "Unclassified";

/// Version tag of the built-in taxonomy
pub const STANDARD_VERSION: &str = "trm-standard-1";

/// A single domain: its name, ordered subdomains and matching keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    /// Domain name, unique within the taxonomy
    pub name: String,
    /// Ordered subdomains; the first one is the default for keyword matches
    pub subdomains: Vec<String>,
    /// Lowercase keywords and phrases matched as substrings
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DomainEntry {
    pub fn new(name: &str, subdomains: &[&str], keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subdomains: subdomains.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Sentinel entry holding only the unclassified subdomain
    pub fn sentinel() -> Self {
        Self::new(UNCLASSIFIED, &[UNCLASSIFIED], &[])
    }

    pub fn is_sentinel(&self) -> bool {
        self.name == UNCLASSIFIED
    }
}

/// Immutable, validated taxonomy
///
/// Constructed once and shared read-only (usually behind an `Arc`) by every
/// classifier. All constructors enforce the same invariants:
/// - every domain has a non-empty list of unique subdomains
/// - domain names are unique and non-blank
/// - the sentinel domain exists, holds exactly the sentinel subdomain and has no keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyDocument", into = "TaxonomyDocument")]
pub struct Taxonomy {
    version: String,
    entries: Vec<DomainEntry>,
}

/// On-disk shape of a taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaxonomyDocument {
    #[serde(default = "default_version")]
    version: String,
    domains: Vec<DomainEntry>,
}

fn default_version() -> String {
    "custom".to_string()
}

impl TryFrom<TaxonomyDocument> for Taxonomy {
    type Error = TaxonomyError;

    fn try_from(document: TaxonomyDocument) -> Result<Self, Self::Error> {
        Taxonomy::with_version(document.version, document.domains)
    }
}

impl From<Taxonomy> for TaxonomyDocument {
    fn from(taxonomy: Taxonomy) -> Self {
        Self {
            version: taxonomy.version,
            domains: taxonomy.entries,
        }
    }
}

impl Taxonomy {
    /// Build a taxonomy from ordered entries
    pub fn new(entries: Vec<DomainEntry>) -> Result<Self, TaxonomyError> {
        Self::with_version(default_version(), entries)
    }

    /// Build a versioned taxonomy from ordered entries
    pub fn with_version(version: impl Into<String>, entries: Vec<DomainEntry>) -> Result<Self, TaxonomyError> {
        let mut seen_domains = HashSet::new();
        let mut validated = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(TaxonomyError::BlankDomain);
            }
            if !seen_domains.insert(name.clone()) {
                return Err(TaxonomyError::DuplicateDomain(name));
            }
            if entry.subdomains.is_empty() {
                return Err(TaxonomyError::EmptySubdomains(name));
            }

            let mut seen_subdomains = HashSet::new();
            let mut subdomains = Vec::with_capacity(entry.subdomains.len());
            for subdomain in entry.subdomains {
                let subdomain = subdomain.trim().to_string();
                if subdomain.is_empty() {
                    return Err(TaxonomyError::EmptySubdomains(name));
                }
                if !seen_subdomains.insert(subdomain.clone()) {
                    return Err(TaxonomyError::DuplicateSubdomain { domain: name, subdomain });
                }
                subdomains.push(subdomain);
            }

            let mut seen_keywords = HashSet::new();
            let keywords = entry
                .keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty() && seen_keywords.insert(k.clone()))
                .collect();

            validated.push(DomainEntry { name, subdomains, keywords });
        }

        let sentinel = validated
            .iter()
            .find(|entry| entry.is_sentinel())
            .ok_or(TaxonomyError::MissingSentinel)?;
        if sentinel.subdomains != [UNCLASSIFIED] {
            return Err(TaxonomyError::InvalidSentinel(sentinel.subdomains.clone()));
        }
        if !sentinel.keywords.is_empty() {
            return Err(TaxonomyError::SentinelKeywords);
        }

        Ok(Self {
            version: version.into(),
            entries: validated,
        })
    }

    /// The built-in TRM taxonomy
    pub fn standard() -> Self {
        Self {
            version: STANDARD_VERSION.to_string(),
            entries: standard_entries(),
        }
    }

    /// Parse and validate a JSON taxonomy document
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let document: TaxonomyDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    /// Load and validate a JSON taxonomy file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[DomainEntry] {
        &self.entries
    }

    /// Domain names in declaration order
    pub fn domains_of(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn entry(&self, domain: &str) -> Option<&DomainEntry> {
        self.entries.iter().find(|e| e.name == domain)
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.entry(domain).is_some()
    }

    /// Ordered subdomains of a domain
    pub fn subdomains_of(&self, domain: &str) -> Result<&[String], TaxonomyError> {
        self.entry(domain)
            .map(|e| e.subdomains.as_slice())
            .ok_or_else(|| TaxonomyError::UnknownDomain(domain.to_string()))
    }

    /// Keyword set of a domain, possibly empty
    pub fn keywords_of(&self, domain: &str) -> Result<&[String], TaxonomyError> {
        self.entry(domain)
            .map(|e| e.keywords.as_slice())
            .ok_or_else(|| TaxonomyError::UnknownDomain(domain.to_string()))
    }

    /// First declared subdomain, used as the default placement within a domain
    pub fn first_subdomain(&self, domain: &str) -> Result<&str, TaxonomyError> {
        // subdomain lists are validated non-empty
        self.subdomains_of(domain)?
            .first()
            .map(String::as_str)
            .ok_or_else(|| TaxonomyError::EmptySubdomains(domain.to_string()))
    }

    pub fn is_valid(&self, domain: &str, subdomain: &str) -> bool {
        self.entry(domain)
            .map(|e| e.subdomains.iter().any(|s| s == subdomain))
            .unwrap_or(false)
    }

    /// Map any pair onto a valid one
    ///
    /// A valid pair is kept. A known domain with an unknown subdomain gets the
    /// domain's first subdomain. An unknown domain becomes the sentinel pair.
    pub fn repair(&self, domain: &str, subdomain: &str) -> Classification {
        if self.is_valid(domain, subdomain) {
            return Classification::new(domain, subdomain);
        }
        match self.first_subdomain(domain) {
            Ok(first) => Classification::new(domain, first),
            Err(_) => self.sentinel(),
        }
    }

    /// The sentinel (Unclassified, Unclassified) pair
    pub fn sentinel(&self) -> Classification {
        Classification::unclassified()
    }

    /// Number of domains including the sentinel
    pub fn domain_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_entries() -> Vec<DomainEntry> {
    vec![
        DomainEntry::new(
            "Data Management",
            &["Database Platforms", "Data Processing", "Data Storage"],
            &["database", "sql", "nosql", "data store", "postgresql", "mysql", "mongodb", "redis"],
        ),
        DomainEntry::new(
            "Artificial Intelligence",
            &["ML Frameworks", "NLP Tools", "Computer Vision"],
            &["machine learning", "ai", "ml", "artificial intelligence", "deep learning", "tensorflow", "pytorch"],
        ),
        DomainEntry::new(
            "Security",
            &["Security Tools", "Authentication", "Encryption"],
            &["security", "auth", "encryption", "firewall", "protection", "vulnerability", "antivirus"],
        ),
        DomainEntry::new(
            "Network",
            &["Networking Tools", "Load Balancers", "API Gateways"],
            &["network", "protocol", "routing", "traffic", "proxy", "load balancer", "api gateway"],
        ),
        DomainEntry::new(
            "Development",
            &["IDEs", "Version Control", "CI/CD"],
            &["ide", "git", "development", "programming", "code", "compiler", "build", "cicd"],
        ),
        DomainEntry::sentinel(),
    ]
}

/// Taxonomy construction and lookup errors
///
/// These signal a malformed taxonomy or a programming defect, never bad record data.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Domain names must not be blank")]
    BlankDomain,

    #[error("Domain '{0}' is declared more than once")]
    DuplicateDomain(String),

    #[error("Domain '{0}' must declare at least one non-blank subdomain")]
    EmptySubdomains(String),

    #[error("Subdomain '{subdomain}' is declared more than once in domain '{domain}'")]
    DuplicateSubdomain { domain: String, subdomain: String },

    #[error("Taxonomy is missing the '{}' domain", UNCLASSIFIED)]
    MissingSentinel,

    #[error("The '{}' domain must contain exactly one subdomain named '{}', found {0:?}", UNCLASSIFIED, UNCLASSIFIED)]
    InvalidSentinel(Vec<String>),

    #[error("The '{}' domain must not declare keywords", UNCLASSIFIED)]
    SentinelKeywords,

    #[error("Taxonomy document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read taxonomy: {0}")]
    Io(#[from] std::io::Error),
}

//! Keyword rule classifier

use crate::traits::{ClassificationInput, Classifier};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use trm_core::{Classification, Strategy, Taxonomy};

/// The keyword that placed a text into a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch<'t> {
    pub domain: &'t str,
    pub subdomain: &'t str,
    pub keyword: &'t str,
}

/// Deterministic keyword matcher over description and hint
///
/// Domains are scanned in taxonomy order and the first domain with any
/// keyword contained in the lowercased text wins, paired with its first
/// subdomain. Text that matches nothing maps to the sentinel pair.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    taxonomy: Arc<Taxonomy>,
}

impl RuleClassifier {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Classifier over the built-in taxonomy
    pub fn standard() -> Self {
        Self::new(Arc::new(Taxonomy::standard()))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// First keyword hit in taxonomy order
    pub fn first_match(&self, description: &str, hint: &str) -> Option<KeywordMatch<'_>> {
        let text = format!("{} {}", description.to_lowercase(), hint.to_lowercase());

        self.taxonomy.entries().iter().find_map(|entry| {
            let keyword = entry.keywords.iter().find(|k| text.contains(k.as_str()))?;
            let subdomain = entry.subdomains.first()?;
            Some(KeywordMatch {
                domain: &entry.name,
                subdomain,
                keyword,
            })
        })
    }

    /// Classify from description and hint alone
    pub fn classify_text(&self, description: &str, hint: &str) -> Classification {
        match self.first_match(description, hint) {
            Some(hit) => {
                debug!(domain = hit.domain, keyword = hit.keyword, "keyword rule matched");
                Classification::new(hit.domain, hit.subdomain)
            }
            None => self.taxonomy.sentinel(),
        }
    }
}

#[async_trait]
impl Classifier for RuleClassifier {
    fn name(&self) -> &'static str {
        "keyword_rules"
    }

    fn description(&self) -> &'static str {
        "Match taxonomy keywords against description and category hint"
    }

    fn strategy(&self) -> Strategy {
        Strategy::RuleBased
    }

    async fn classify(&self, input: &ClassificationInput<'_>) -> Classification {
        self.classify_text(input.description, input.hint)
    }
}

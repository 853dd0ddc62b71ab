//! Prompt construction and response validation

use trm_core::{Classification, Taxonomy, UNCLASSIFIED};
use trm_rules::ClassificationInput;

/// Separator the model is told to place between domain and subdomain
pub const PAIR_SEPARATOR: &str = ", ";

/// Why a response was mapped to the sentinel pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentinelReason {
    /// The model answered with the sentinel token
    Declared,
    /// The answer did not split into exactly two parts
    Malformed,
    /// The domain is not in the taxonomy
    UnknownDomain(String),
}

/// Outcome of validating one model answer against the taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Known domain and subdomain, taken as-is
    Valid(Classification),
    /// Known domain with an unknown subdomain, replaced by the domain's first subdomain
    Repaired {
        classification: Classification,
        rejected_subdomain: String,
    },
    /// Nothing usable, resolved to the sentinel pair
    Sentinel(SentinelReason),
}

impl ResponseOutcome {
    pub fn into_classification(self) -> Classification {
        match self {
            ResponseOutcome::Valid(classification) => classification,
            ResponseOutcome::Repaired { classification, .. } => classification,
            ResponseOutcome::Sentinel(_) => Classification::unclassified(),
        }
    }
}

/// Build the classification prompt
///
/// Lists every non-sentinel domain with its subdomains in taxonomy order.
pub fn build_prompt(taxonomy: &Taxonomy, input: &ClassificationInput<'_>) -> String {
    let domains_text = taxonomy
        .entries()
        .iter()
        .filter(|entry| !entry.is_sentinel())
        .enumerate()
        .map(|(i, entry)| format!("{}. {} - {}", i + 1, entry.name, entry.subdomains.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Classify the software product '{}' described as '{}' with hint '{}' into one of these TRM Domains and Subdomains:\n\
         {}\n\
         If uncertain, return '{}'.\n\n\
         Return your answer in 'Domain{}Subdomain' format only.",
        input.product_name, input.description, input.hint, domains_text, UNCLASSIFIED, PAIR_SEPARATOR
    )
}

/// Validate a raw model answer
///
/// In order: sentinel token, two-part split on `", "`, known domain, known
/// subdomain (repaired to the first subdomain when unknown).
pub fn interpret_response(taxonomy: &Taxonomy, raw: &str) -> ResponseOutcome {
    let answer = raw.trim();
    if answer.eq_ignore_ascii_case(UNCLASSIFIED) {
        return ResponseOutcome::Sentinel(SentinelReason::Declared);
    }

    let parts: Vec<&str> = answer.split(PAIR_SEPARATOR).collect();
    let [domain, subdomain] = parts.as_slice() else {
        return ResponseOutcome::Sentinel(SentinelReason::Malformed);
    };
    let (domain, subdomain) = (domain.trim(), subdomain.trim());

    let Ok(subdomains) = taxonomy.subdomains_of(domain) else {
        return ResponseOutcome::Sentinel(SentinelReason::UnknownDomain(domain.to_string()));
    };

    if subdomains.iter().any(|s| s == subdomain) {
        return ResponseOutcome::Valid(Classification::new(domain, subdomain));
    }

    match subdomains.first() {
        Some(first) => ResponseOutcome::Repaired {
            classification: Classification::new(domain, first.as_str()),
            rejected_subdomain: subdomain.to_string(),
        },
        None => ResponseOutcome::Sentinel(SentinelReason::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_domains_without_sentinel() {
        let taxonomy = Taxonomy::standard();
        let input = ClassificationInput::new("Vault", "Secrets storage", "security");
        let prompt = build_prompt(&taxonomy, &input);

        assert!(prompt.contains("'Vault' described as 'Secrets storage' with hint 'security'"));
        assert!(prompt.contains("1. Data Management - Database Platforms, Data Processing, Data Storage"));
        assert!(prompt.contains("5. Development - IDEs, Version Control, CI/CD"));
        assert!(!prompt.contains("6. Unclassified"));
        assert!(prompt.contains("If uncertain, return 'Unclassified'."));
        assert!(prompt.ends_with("Return your answer in 'Domain, Subdomain' format only."));
    }

    #[test]
    fn test_valid_pair_passes_through() {
        let outcome = interpret_response(&Taxonomy::standard(), "Network, API Gateways");
        assert_eq!(outcome, ResponseOutcome::Valid(Classification::new("Network", "API Gateways")));
    }

    #[test]
    fn test_sentinel_token_any_case() {
        for raw in ["Unclassified", "  unclassified\n", "UNCLASSIFIED"] {
            assert_eq!(
                interpret_response(&Taxonomy::standard(), raw),
                ResponseOutcome::Sentinel(SentinelReason::Declared)
            );
        }
    }

    #[test]
    fn test_unknown_subdomain_is_repaired() {
        let outcome = interpret_response(&Taxonomy::standard(), "Security, Firewalling");
        assert_eq!(
            outcome,
            ResponseOutcome::Repaired {
                classification: Classification::new("Security", "Security Tools"),
                rejected_subdomain: "Firewalling".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let taxonomy = Taxonomy::standard();
        for raw in ["Security", "Security,Encryption", "Security, Encryption, Extra", ""] {
            assert_eq!(
                interpret_response(&taxonomy, raw),
                ResponseOutcome::Sentinel(SentinelReason::Malformed),
                "response {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_unknown_domain_is_sentinel() {
        let outcome = interpret_response(&Taxonomy::standard(), "Quantum, Qubits");
        assert_eq!(outcome, ResponseOutcome::Sentinel(SentinelReason::UnknownDomain("Quantum".to_string())));
        assert_eq!(outcome.into_classification(), Classification::unclassified());
    }

    #[test]
    fn test_parts_are_trimmed() {
        let outcome = interpret_response(&Taxonomy::standard(), " Development ,  CI/CD \n");
        assert_eq!(outcome, ResponseOutcome::Valid(Classification::new("Development", "CI/CD")));
    }
}

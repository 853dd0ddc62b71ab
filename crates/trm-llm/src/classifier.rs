//! Model classifier with rule fallback

use crate::response::{build_prompt, interpret_response, ResponseOutcome};
use crate::{CompletionClient, CompletionRequest, ModelSettings, OpenAiClient};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use trm_core::{Classification, Strategy, Taxonomy};
use trm_rules::{ClassificationInput, Classifier, RuleClassifier};

/// Classifier backed by a text-completion model
///
/// Every exit path yields a taxonomy-valid pair:
/// - no credential: keyword rules (degraded mode, announced once)
/// - service failure of any kind: keyword rules, with a warning carrying the error
/// - unusable answer: sentinel pair, or the domain's first subdomain when only the subdomain is wrong
pub struct ModelClassifier {
    taxonomy: Arc<Taxonomy>,
    settings: ModelSettings,
    client: Option<Arc<dyn CompletionClient>>,
    fallback: RuleClassifier,
    degraded_notice: AtomicBool,
}

impl ModelClassifier {
    /// Create a classifier talking to the configured OpenAI-compatible endpoint
    pub fn new(taxonomy: Arc<Taxonomy>, settings: ModelSettings) -> Self {
        let client = settings
            .has_credential()
            .then(|| Arc::new(OpenAiClient::new(settings.clone())) as Arc<dyn CompletionClient>);

        Self::build(taxonomy, settings, client)
    }

    /// Create a classifier over any completion client
    pub fn with_client(taxonomy: Arc<Taxonomy>, settings: ModelSettings, client: Arc<dyn CompletionClient>) -> Self {
        Self::build(taxonomy, settings, Some(client))
    }

    fn build(taxonomy: Arc<Taxonomy>, settings: ModelSettings, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            fallback: RuleClassifier::new(Arc::clone(&taxonomy)),
            taxonomy,
            settings,
            client,
            degraded_notice: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// True when classification will always use the keyword rules
    pub fn is_degraded(&self) -> bool {
        !self.settings.has_credential() || self.client.is_none()
    }

    /// Classify from product name, description and hint
    pub async fn classify_product(&self, product_name: &str, description: &str, hint: &str) -> Classification {
        self.classify_input(&ClassificationInput::new(product_name, description, hint)).await
    }

    async fn classify_input(&self, input: &ClassificationInput<'_>) -> Classification {
        let client = match &self.client {
            Some(client) if self.settings.has_credential() => client,
            _ => {
                if !self.degraded_notice.swap(true, Ordering::Relaxed) {
                    warn!("Model API key not configured, using rule-based classification instead");
                }
                return self.fallback.classify_text(input.description, input.hint);
            }
        };

        let request = CompletionRequest::new(&self.settings, build_prompt(&self.taxonomy, input));

        match client.complete(&request).await {
            Ok(answer) => {
                let outcome = interpret_response(&self.taxonomy, &answer);
                match &outcome {
                    ResponseOutcome::Valid(_) => {}
                    ResponseOutcome::Repaired { classification, rejected_subdomain } => debug!(
                        product = input.product_name,
                        domain = %classification.domain,
                        rejected = %rejected_subdomain,
                        "model subdomain replaced with domain default"
                    ),
                    ResponseOutcome::Sentinel(reason) => debug!(
                        product = input.product_name,
                        answer = %answer,
                        ?reason,
                        "model answer resolved to sentinel"
                    ),
                }
                outcome.into_classification()
            }
            Err(error) => {
                warn!(
                    product = input.product_name,
                    error = %error,
                    "Model API error, falling back to rule-based classification"
                );
                self.fallback.classify_text(input.description, input.hint)
            }
        }
    }
}

#[async_trait]
impl Classifier for ModelClassifier {
    fn name(&self) -> &'static str {
        "completion_model"
    }

    fn description(&self) -> &'static str {
        "Ask a text-completion model for a domain pair, validated against the taxonomy"
    }

    fn strategy(&self) -> Strategy {
        Strategy::LlmBased
    }

    async fn classify(&self, input: &ClassificationInput<'_>) -> Classification {
        self.classify_input(input).await
    }
}

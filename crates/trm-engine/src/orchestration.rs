//! Classification orchestration

use crate::risk::assess_all;
use crate::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use trm_core::{Classification, SoftwareRecord, Strategy, Taxonomy};
use trm_llm::{ModelClassifier, ModelSettings};
use trm_rules::{ClassificationInput, Classifier, ClassifierRegistry, RuleClassifier};

/// Result of one strategy over a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub strategy: Strategy,
    /// One pair per input record, in input order
    pub per_record: Vec<Classification>,
    pub domain_counts: BTreeMap<String, usize>,
    pub unclassified_count: usize,
    pub execution_time_ms: u64,
}

impl ClassificationReport {
    fn from_results(strategy: Strategy, per_record: Vec<Classification>, execution_time_ms: u64) -> Self {
        let mut domain_counts = BTreeMap::new();
        for classification in &per_record {
            *domain_counts.entry(classification.domain.clone()).or_insert(0) += 1;
        }
        let unclassified_count = per_record.iter().filter(|c| c.is_unclassified()).count();

        Self {
            strategy,
            per_record,
            domain_counts,
            unclassified_count,
            execution_time_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.per_record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_record.is_empty()
    }
}

/// Classification engine that applies registered strategies to records
pub struct ClassificationEngine {
    taxonomy: Arc<Taxonomy>,
    registry: ClassifierRegistry,
}

impl ClassificationEngine {
    /// Engine with both built-in strategies registered
    pub fn new(taxonomy: Arc<Taxonomy>, settings: ModelSettings) -> Self {
        Self::rules_only(Arc::clone(&taxonomy))
            .with_classifier(Arc::new(ModelClassifier::new(taxonomy, settings)))
    }

    /// Engine with only the keyword rules registered
    pub fn rules_only(taxonomy: Arc<Taxonomy>) -> Self {
        let mut registry = ClassifierRegistry::new();
        registry.register(Arc::new(RuleClassifier::new(Arc::clone(&taxonomy))));
        Self { taxonomy, registry }
    }

    /// Register a classifier, replacing any classifier of the same strategy
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.registry.register(classifier);
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn registry(&self) -> &ClassifierRegistry {
        &self.registry
    }

    /// Classify every record with one strategy without touching the records
    pub async fn classify_all(&self, records: &[SoftwareRecord], strategy: Strategy) -> EngineResult<ClassificationReport> {
        let classifier = self
            .registry
            .get(strategy)
            .ok_or(EngineError::StrategyUnavailable(strategy))?;
        let start_time = Instant::now();

        let mut per_record = Vec::with_capacity(records.len());
        for record in records {
            let classification = classifier.classify(&ClassificationInput::from(record)).await;
            debug!(
                strategy = %strategy,
                product = %record.product_name,
                classification = %classification,
                "record classified"
            );
            per_record.push(classification);
        }

        let report = ClassificationReport::from_results(strategy, per_record, start_time.elapsed().as_millis() as u64);
        info!(
            strategy = %strategy,
            records = report.len(),
            unclassified = report.unclassified_count,
            "classification complete"
        );
        Ok(report)
    }

    /// Apply strategies in order, each overwriting the previous annotation
    pub async fn run(&self, records: &mut [SoftwareRecord], strategies: &[Strategy]) -> EngineResult<Vec<ClassificationReport>> {
        if strategies.is_empty() {
            warn!("no classification strategy selected, records left unannotated");
            return Ok(Vec::new());
        }

        if let Some(&missing) = strategies.iter().find(|&&s| self.registry.get(s).is_none()) {
            return Err(EngineError::StrategyUnavailable(missing));
        }

        let mut reports = Vec::with_capacity(strategies.len());
        for &strategy in strategies {
            let report = self.classify_all(records, strategy).await?;
            for (record, classification) in records.iter_mut().zip(&report.per_record) {
                record.apply_classification(classification.clone());
            }
            reports.push(report);
        }

        Ok(reports)
    }

    /// Classify with the given strategies, then risk-score every record
    pub async fn process(&self, records: &mut [SoftwareRecord], strategies: &[Strategy]) -> EngineResult<Vec<ClassificationReport>> {
        let reports = self.run(records, strategies).await?;
        assess_all(records);
        Ok(reports)
    }
}

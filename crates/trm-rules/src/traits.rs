//! Classifier traits and registry

use async_trait::async_trait;
use std::sync::Arc;
use trm_core::{Classification, SoftwareRecord, Strategy};

/// Free-text fields a classifier may read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationInput<'a> {
    pub product_name: &'a str,
    pub description: &'a str,
    pub hint: &'a str,
}

impl<'a> ClassificationInput<'a> {
    pub fn new(product_name: &'a str, description: &'a str, hint: &'a str) -> Self {
        Self {
            product_name,
            description,
            hint,
        }
    }
}

impl<'a> From<&'a SoftwareRecord> for ClassificationInput<'a> {
    fn from(record: &'a SoftwareRecord) -> Self {
        Self::new(&record.product_name, &record.description, &record.category_hint)
    }
}

/// Core classifier trait
///
/// Implementations are total: every input yields a pair that is valid in the
/// classifier's taxonomy, with the sentinel pair as the expected outcome when
/// nothing applies. Failures are handled inside the implementation.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Get the classifier name
    fn name(&self) -> &'static str;

    /// Get the classifier description
    fn description(&self) -> &'static str;

    /// Strategy this classifier implements
    fn strategy(&self) -> Strategy;

    /// Classify one record's text fields
    async fn classify(&self, input: &ClassificationInput<'_>) -> Classification;
}

/// Registry mapping strategies to classifiers
#[derive(Default)]
pub struct ClassifierRegistry {
    classifiers: Vec<Arc<dyn Classifier>>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self {
            classifiers: Vec::new(),
        }
    }

    /// Register a classifier, replacing any earlier one for the same strategy
    pub fn register(&mut self, classifier: Arc<dyn Classifier>) {
        let strategy = classifier.strategy();
        self.classifiers.retain(|existing| existing.strategy() != strategy);
        self.classifiers.push(classifier);
    }

    pub fn get(&self, strategy: Strategy) -> Option<Arc<dyn Classifier>> {
        self.classifiers
            .iter()
            .find(|classifier| classifier.strategy() == strategy)
            .cloned()
    }

    /// Registered strategies in registration order
    pub fn strategies(&self) -> Vec<Strategy> {
        self.classifiers.iter().map(|c| c.strategy()).collect()
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

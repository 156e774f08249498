//! A [Classifier] test double with canned predictions.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde_json::{Map, Value, json};

use crate::classifier::{Classifier, ClassifierError, Prediction};

#[derive(Debug, Default)]
pub struct StubClassifier {
    default_prediction: Option<Prediction>,
    predictions: HashMap<String, Prediction>,
    error: Option<ClassifierError>,
    batch_error: Option<ClassifierError>,
    info_error: Option<ClassifierError>,
    calls: AtomicUsize,
}

impl StubClassifier {
    /// A classifier that predicts `label` for every description.
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            default_prediction: Some(Prediction::new(label, confidence)),
            ..Default::default()
        }
    }

    /// A classifier where every call fails with `error`.
    pub fn failing(error: ClassifierError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// Predict `label` for `description` instead of the default prediction.
    pub fn with_prediction(mut self, description: &str, label: &str, confidence: f64) -> Self {
        self.predictions
            .insert(description.to_owned(), Prediction::new(label, confidence));
        self
    }

    /// Make batch calls fail with `error` while single calls still succeed.
    pub fn with_batch_error(mut self, error: ClassifierError) -> Self {
        self.batch_error = Some(error);
        self
    }

    /// Make the health body unreadable while health checks still pass.
    pub fn with_info_error(mut self, error: ClassifierError) -> Self {
        self.info_error = Some(error);
        self
    }

    /// The number of calls made to the classification methods.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn predict(&self, description: &str) -> Result<Prediction, ClassifierError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        self.predictions
            .get(description)
            .or(self.default_prediction.as_ref())
            .cloned()
            .ok_or_else(|| ClassifierError::MalformedResponse("no prediction".to_owned()))
    }
}

#[async_trait::async_trait]
impl Classifier for StubClassifier {
    async fn try_classify(&self, description: &str) -> Result<Prediction, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.predict(description)
    }

    async fn classify_batch(
        &self,
        descriptions: &[String],
    ) -> Result<Vec<Prediction>, ClassifierError> {
        if descriptions.is_empty() {
            return Ok(Vec::new());
        }

        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.batch_error {
            return Err(error.clone());
        }

        descriptions
            .iter()
            .map(|description| self.predict(description))
            .collect()
    }

    async fn health_check(&self) -> Result<(), ClassifierError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn service_info(&self) -> Result<Map<String, Value>, ClassifierError> {
        match self.error.as_ref().or(self.info_error.as_ref()) {
            Some(error) => Err(error.clone()),
            None => {
                let mut info = Map::new();
                info.insert("status".to_owned(), json!("healthy"));
                Ok(info)
            }
        }
    }
}

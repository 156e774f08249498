//! Client for the external transaction classification service.
//!
//! Single-item classification never fails: errors are logged and replaced by
//! the [FALLBACK_CATEGORY]. Batch classification surfaces every error so that
//! callers can tell a skipped batch apart from a categorized one.

mod http;
mod status;

pub use http::{ClassifierConfig, HttpClassifier};
pub use status::{get_ai_status, test_ai_classification};

use serde_json::{Map, Value};

/// The label used when a description cannot be classified.
pub const FALLBACK_CATEGORY: &str = "Lainnya";

/// A category label predicted for a transaction description.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted category name.
    pub label: String,
    /// How confident the classifier is, between 0.0 and 1.0 inclusive.
    pub confidence: f64,
}

impl Prediction {
    /// Create a prediction, clamping `confidence` into `[0.0, 1.0]`.
    ///
    /// A NaN confidence becomes 0.0.
    pub fn new(label: &str, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            label: label.to_owned(),
            confidence,
        }
    }

    /// The [FALLBACK_CATEGORY] with zero confidence.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_CATEGORY, 0.0)
    }
}

/// Errors from talking to the classification service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// The service did not respond before the timeout.
    #[error("the classification service timed out")]
    Timeout,

    /// The service could not be reached.
    #[error("could not reach the classification service: {0}")]
    Unreachable(String),

    /// The service responded with a non-success status code.
    #[error("the classification service responded with status {status}: {message}")]
    Service {
        /// The HTTP status code.
        status: u16,
        /// The error message from the response body, if any.
        message: String,
    },

    /// The response body could not be understood.
    #[error("the classification service sent an invalid response: {0}")]
    MalformedResponse(String),

    /// A batch response had a different number of results than descriptions sent.
    #[error("expected {want} results from the classification service, got {got}")]
    ResultCountMismatch {
        /// The number of descriptions sent.
        want: usize,
        /// The number of results received.
        got: usize,
    },
}

/// Predicts category labels for transaction descriptions.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a single description, surfacing any error.
    async fn try_classify(&self, description: &str) -> Result<Prediction, ClassifierError>;

    /// Classify each description in order, returning exactly one prediction per description.
    ///
    /// An empty slice returns an empty list without contacting the service.
    async fn classify_batch(
        &self,
        descriptions: &[String],
    ) -> Result<Vec<Prediction>, ClassifierError>;

    /// Check whether the service is available.
    async fn health_check(&self) -> Result<(), ClassifierError>;

    /// Get the information the service reports about itself.
    async fn service_info(&self) -> Result<Map<String, Value>, ClassifierError>;

    /// Classify a single description.
    ///
    /// Blank descriptions get the fallback prediction without contacting the
    /// service. Errors are logged and also give the fallback prediction.
    async fn classify(&self, description: &str) -> Prediction {
        if description.trim().is_empty() {
            return Prediction::fallback();
        }

        match self.try_classify(description).await {
            Ok(prediction) => prediction,
            Err(error) => {
                tracing::warn!(%error, "classification failed, using fallback category");
                Prediction::fallback()
            }
        }
    }
}

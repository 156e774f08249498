//! The HTTP client for the classification service.

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::classifier::{Classifier, ClassifierError, FALLBACK_CATEGORY, Prediction};

/// Where to find the classification service and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// The base URL of the service, e.g. "http://localhost:5000".
    pub base_url: String,
    /// The maximum time a single call may take.
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct CategorizeRequest<'a> {
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchCategorizeRequest<'a> {
    transactions: Vec<CategorizeRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct CategorizeResponse {
    #[serde(default)]
    predicted_category: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BatchCategorizeResponse {
    results: Vec<CategorizeResponse>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A [Classifier] backed by the classification service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    /// Create a client for the service described by `config`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client could not be built.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| ClassifierError::Unreachable(error.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClassifierError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.url(path))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        parse_response(response).await
    }

    async fn get_health(&self) -> Result<reqwest::Response, ClassifierError> {
        self.http_client
            .get(self.url("/health"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_request_error)
    }
}

#[async_trait::async_trait]
impl Classifier for HttpClassifier {
    async fn try_classify(&self, description: &str) -> Result<Prediction, ClassifierError> {
        let response: CategorizeResponse = self
            .post_json("/categorize", &CategorizeRequest { description })
            .await?;

        match response.predicted_category {
            Some(label) if !label.trim().is_empty() => Ok(Prediction::new(
                label.trim(),
                response.confidence.unwrap_or(0.0),
            )),
            _ => Err(ClassifierError::MalformedResponse(
                "missing predicted_category".to_owned(),
            )),
        }
    }

    async fn classify_batch(
        &self,
        descriptions: &[String],
    ) -> Result<Vec<Prediction>, ClassifierError> {
        if descriptions.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchCategorizeRequest {
            transactions: descriptions
                .iter()
                .map(|description| CategorizeRequest { description })
                .collect(),
        };
        let response: BatchCategorizeResponse =
            self.post_json("/categorize/batch", &request).await?;

        if response.results.len() != descriptions.len() {
            return Err(ClassifierError::ResultCountMismatch {
                want: descriptions.len(),
                got: response.results.len(),
            });
        }

        tracing::info!(
            count = descriptions.len(),
            "classification service categorized batch"
        );

        Ok(response
            .results
            .into_iter()
            .map(|result| match result.predicted_category {
                Some(label) if !label.trim().is_empty() => {
                    Prediction::new(label.trim(), result.confidence.unwrap_or(0.0))
                }
                _ => Prediction::new(FALLBACK_CATEGORY, 0.0),
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), ClassifierError> {
        let response = self.get_health().await?;

        check_status(response).await.map(|_| ())
    }

    async fn service_info(&self) -> Result<Map<String, Value>, ClassifierError> {
        let response = self.get_health().await?;

        parse_response(response).await
    }
}

/// Turn a non-success response into [ClassifierError::Service].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClassifierError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ServiceErrorResponse>().await {
        Ok(ServiceErrorResponse {
            message: Some(message),
            ..
        }) => message,
        Ok(ServiceErrorResponse {
            error: Some(error), ..
        }) => error,
        _ => status.canonical_reason().unwrap_or_default().to_owned(),
    };

    Err(ClassifierError::Service {
        status: status.as_u16(),
        message,
    })
}

async fn parse_response<R: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<R, ClassifierError> {
    let response = check_status(response).await?;

    response.json::<R>().await.map_err(|error| {
        if error.is_timeout() {
            ClassifierError::Timeout
        } else {
            ClassifierError::MalformedResponse(error.to_string())
        }
    })
}

fn map_request_error(error: reqwest::Error) -> ClassifierError {
    if error.is_timeout() {
        ClassifierError::Timeout
    } else {
        ClassifierError::Unreachable(error.to_string())
    }
}

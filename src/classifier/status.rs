//! Diagnostics endpoints for the classification service.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, app_state::ClassifierState, auth::Claims};

/// The health of the classification service.
#[derive(Debug, Serialize, Deserialize)]
pub struct AiStatus {
    /// Whether the service responded to a health check.
    pub ai_service_healthy: bool,
    /// What the service reports about itself, if it sent a JSON object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_service_info: Option<Map<String, Value>>,
    /// Why the service is unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report whether the classification service is reachable.
pub async fn get_ai_status(
    State(state): State<ClassifierState>,
    _claims: Claims,
) -> Json<AiStatus> {
    let status = match state.classifier.health_check().await {
        Ok(()) => AiStatus {
            ai_service_healthy: true,
            ai_service_info: state.classifier.service_info().await.ok(),
            error: None,
        },
        Err(error) => {
            tracing::warn!(%error, "classification service health check failed");
            AiStatus {
                ai_service_healthy: false,
                ai_service_info: None,
                error: Some(error.to_string()),
            }
        }
    };

    Json(status)
}

/// The request body for a test classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct AiTestRequest {
    /// The description to classify.
    pub description: String,
}

/// The result of a test classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct AiTestResponse {
    /// The description that was classified.
    pub description: String,
    /// The label the service predicted.
    pub predicted_category: String,
    /// How confident the service is in the label.
    pub confidence: f64,
}

/// Classify a sample description without storing anything.
///
/// Unlike transaction creation, a failed classification is reported to the client.
pub async fn test_ai_classification(
    State(state): State<ClassifierState>,
    _claims: Claims,
    request: Result<Json<AiTestRequest>, JsonRejection>,
) -> Result<Json<AiTestResponse>, Error> {
    let Json(request) = request.map_err(|rejection| Error::Validation(rejection.body_text()))?;

    if request.description.trim().is_empty() {
        return Err(Error::Validation("description must not be empty".to_owned()));
    }

    let prediction = state
        .classifier
        .try_classify(&request.description)
        .await
        .map_err(Error::Ai)?;

    Ok(Json(AiTestResponse {
        description: request.description,
        predicted_category: prediction.label,
        confidence: prediction.confidence,
    }))
}

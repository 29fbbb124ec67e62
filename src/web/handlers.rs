use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    domain::Prediction,
    ml::InferenceError,
    web::{
        pages::IndexPage,
        AppContext,
    },
};

const MESSAGE_REQUIRED: &str = "Message is required";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Message is required")]
    MissingMessage,
    #[error("Invalid JSON body")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Prediction failed")]
    Inference(#[from] InferenceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingMessage | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Body of `POST /api/predict`. An absent field and an empty one are both
/// rejected, but stay distinguishable until validation.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    pub message: Option<String>,
}

impl PredictRequest {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(ApiError::InvalidJson)
    }

    pub fn into_message(self) -> Result<String, ApiError> {
        match self.message {
            Some(message) if !message.is_empty() => Ok(message),
            _ => Err(ApiError::MissingMessage),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: String,
}

#[derive(Debug, Deserialize)]
pub struct FormPayload {
    pub message: Option<String>,
}

pub async fn index(State(ctx): State<Arc<AppContext>>) -> Response {
    render(&ctx, StatusCode::OK, &IndexPage::default())
}

pub async fn classify_form(
    State(ctx): State<Arc<AppContext>>,
    form: Result<Form<FormPayload>, FormRejection>,
) -> Response {
    // Bodies axum cannot decode as a form carry no `message` either.
    let message = match form {
        Ok(Form(payload)) => payload.message,
        Err(rejection) => {
            info!(target: "http", reason = %rejection.body_text(), "rejected form body");
            None
        }
    };
    let Some(message) = message else {
        return render(
            &ctx,
            StatusCode::BAD_REQUEST,
            &IndexPage::with_error(String::new(), MESSAGE_REQUIRED),
        );
    };
    if message.trim().is_empty() {
        return render(&ctx, StatusCode::OK, &IndexPage::with_message(message));
    }

    match predict(ctx.clone(), message.clone()).await {
        Ok(prediction) => {
            info!(
                target: "predict",
                prediction = %prediction.label,
                confidence = %prediction.confidence_display(),
                "classified form message"
            );
            render(
                &ctx,
                StatusCode::OK,
                &IndexPage::with_prediction(message, &prediction),
            )
        }
        Err(err) => {
            error!(target: "predict", error = %err, "form prediction failed");
            render(
                &ctx,
                StatusCode::INTERNAL_SERVER_ERROR,
                &IndexPage::with_error(message, "Prediction failed"),
            )
        }
    }
}

pub async fn api_predict(
    State(ctx): State<Arc<AppContext>>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let message = PredictRequest::parse(&body)?.into_message()?;
    let prediction = predict(ctx, message).await.inspect_err(|err| {
        error!(target: "predict", error = %err, "api prediction failed");
    })?;

    info!(
        target: "predict",
        prediction = %prediction.label,
        confidence = %prediction.confidence_display(),
        "classified api message"
    );
    Ok(Json(PredictResponse {
        confidence: prediction.confidence_display(),
        prediction: prediction.label,
    }))
}

/// Runs preprocessing and the forward pass off the async workers.
async fn predict(ctx: Arc<AppContext>, message: String) -> Result<Prediction, InferenceError> {
    tokio::task::spawn_blocking(move || ctx.predictor.predict_message(&message))
        .await
        .map_err(|err| InferenceError::Aborted(err.to_string()))?
}

fn render(ctx: &AppContext, status: StatusCode, page: &IndexPage) -> Response {
    match ctx.pages.render_index(page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!(target: "http", error = %err, "failed to render index page");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_messages_are_distinguishable() {
        let absent = PredictRequest::parse(br#"{}"#).unwrap();
        let empty = PredictRequest::parse(br#"{"message": ""}"#).unwrap();
        assert_eq!(absent.message, None);
        assert_eq!(empty.message.as_deref(), Some(""));
        assert!(matches!(absent.into_message(), Err(ApiError::MissingMessage)));
        assert!(matches!(empty.into_message(), Err(ApiError::MissingMessage)));
    }

    #[test]
    fn blank_body_counts_as_absent() {
        assert_eq!(PredictRequest::parse(b"").unwrap().message, None);
        assert_eq!(PredictRequest::parse(b" \n").unwrap().message, None);
    }

    #[test]
    fn wrong_shapes_are_invalid_json() {
        for body in [&b"not json"[..], b"null", br#"{"message": 42}"#, b"[]"] {
            assert!(matches!(
                PredictRequest::parse(body),
                Err(ApiError::InvalidJson(_))
            ));
        }
    }

    #[test]
    fn whitespace_message_is_accepted_by_api() {
        let request = PredictRequest::parse(br#"{"message": "  "}"#).unwrap();
        assert_eq!(request.into_message().unwrap(), "  ");
    }
}

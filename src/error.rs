use actix_web::error::PayloadError;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures surfaced to HTTP clients as `{"error": "<message>"}` with status 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no key specified")]
    NoKeySpecified,
    #[error("{0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },
    #[error("error reading request body: {0}")]
    Payload(#[source] PayloadError),
    #[error("error writing response: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        warn!(error = %message, "request failed");

        match serde_json::to_vec(&ErrorEnvelope { error: &message }) {
            Ok(body) => HttpResponse::build(self.status_code())
                .content_type(ContentType::json())
                .body(body),
            // Nothing left to report the failure with, so the body stays empty
            Err(err) => {
                error!(error = %err, "error writing error response");
                HttpResponse::build(self.status_code()).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use actix_web::ResponseError;
    use actix_web::body::to_bytes;
    use actix_web::http::{StatusCode, header};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_error_envelope() {
        let response = ApiError::NoKeySpecified.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"error": "no key specified"}));
    }

    #[test]
    fn test_invalid_payload_message_comes_from_parser() {
        let parse_err = serde_json::from_str::<Value>("{").unwrap_err();
        let expected = parse_err.to_string();
        assert_eq!(ApiError::InvalidPayload(parse_err).to_string(), expected);
    }

    #[actix_web::test]
    async fn test_payload_too_large_uses_envelope() {
        let response = ApiError::PayloadTooLarge { limit: 16 }.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"error": "request body exceeds the 16 byte limit"}));
    }
}

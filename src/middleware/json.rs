use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::CibilError;
use crate::types::Validate;

/// JSON body that has been decoded and passed its `Validate` checks.
///
/// Decode failures (bad syntax, wrong content type, missing or mistyped fields)
/// become `CibilError::Validation` so every 400 shares one body shape.
pub struct ValidJson<T>(pub T);

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON request body",
        JsonRejection::JsonDataError(_) => "Invalid request data",
        _ => "Unreadable request body",
    }
}

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = CibilError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                CibilError::validation_with(rejection_message(&rejection), rejection.body_text())
            })?;
        body.validate()?;
        Ok(ValidJson(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::requests::ScoreRequest;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn json_request(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_is_normalized() {
        let body = r#"{"pan_card_number":" abcde1234f"}"#;
        let ValidJson(req) = ValidJson::<ScoreRequest>::from_request(json_request(body), &())
            .await
            .unwrap();
        assert_eq!(req.pan_card_number.as_deref(), Some("ABCDE1234F"));
    }

    #[tokio::test]
    async fn syntax_errors_become_validation_errors() {
        let err = ValidJson::<ScoreRequest>::from_request(json_request("{not json"), &())
            .await
            .err()
            .unwrap();
        match err {
            CibilError::Validation { message, details } => {
                assert_eq!(message, "Malformed JSON request body");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_runs_after_decoding() {
        let err = ValidJson::<ScoreRequest>::from_request(json_request("{}"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "PAN card number is required");
    }
}

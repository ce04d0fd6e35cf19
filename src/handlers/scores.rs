use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{error, info};

use crate::db::models::{CibilScore, Customer};
use crate::error::{CibilError, operation_failed};
use crate::middleware::ValidJson;
use crate::router::CibilState;
use crate::service::calculator::{ScoreCalculator, ScoreOutcome};
use crate::service::weights::ScoreWeights;
use crate::types::requests::ScoreRequest;
use crate::types::responses::ScoreResponse;

const SCORE_FAILED: &str = "Failed to calculate dynamic CIBIL score";

/// Score with the default factor weights; any `custom_weights` are ignored.
pub async fn check_cibil_score(
    State(state): State<CibilState>,
    ValidJson(req): ValidJson<ScoreRequest>,
) -> Result<Response, CibilError> {
    let pan = req.pan_card_number.unwrap_or_default();
    score_customer(&state, pan, None).await
}

pub async fn check_dynamic_cibil_score(
    State(state): State<CibilState>,
    ValidJson(req): ValidJson<ScoreRequest>,
) -> Result<Response, CibilError> {
    let pan = req.pan_card_number.unwrap_or_default();
    score_customer(&state, pan, req.custom_weights.as_ref()).await
}

fn weights_supplied(custom: Option<&Value>) -> bool {
    custom
        .and_then(Value::as_object)
        .is_some_and(|m| !m.is_empty())
}

async fn score_customer(
    state: &CibilState,
    pan: String,
    custom: Option<&Value>,
) -> Result<Response, CibilError> {
    let weights = ScoreWeights::from_custom(custom)?;
    let customer = state.storage.customer_by_pan(&pan).await?;

    match evaluate_and_record(state, customer.clone(), weights).await {
        Ok((outcome, recorded)) => {
            info!(pan = %pan, score = recorded.score, "score calculated");
            let body = ScoreResponse::new(
                pan,
                &customer,
                &recorded,
                outcome,
                weights_supplied(custom),
            );
            Ok(Json(body).into_response())
        }
        Err(e) if !e.is_internal() => Err(e),
        Err(e) => {
            error!(pan = %pan, error = %e, "score calculation failed");
            Ok(operation_failed(
                StatusCode::INTERNAL_SERVER_ERROR,
                SCORE_FAILED,
                &e,
            ))
        }
    }
}

async fn evaluate_and_record(
    state: &CibilState,
    customer: Customer,
    weights: ScoreWeights,
) -> Result<(ScoreOutcome, CibilScore), CibilError> {
    let profile = state.storage.load_profile(&customer.id).await?;
    let outcome = ScoreCalculator::new(&profile, weights).evaluate();
    let (recorded, _report) = state.ledger.record(customer, outcome.clone()).await?;
    Ok((outcome, recorded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_non_empty_objects_count_as_custom_weights() {
        assert!(!weights_supplied(None));
        assert!(!weights_supplied(Some(&json!({}))));
        assert!(!weights_supplied(Some(&Value::Null)));
        assert!(weights_supplied(Some(&json!({"credit_mix": 20}))));
    }
}

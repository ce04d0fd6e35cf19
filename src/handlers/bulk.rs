use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::customers::customer_view;
use crate::error::{CibilError, operation_failed};
use crate::router::CibilState;
use crate::types::Validate;
use crate::types::requests::CustomerBundle;
use crate::types::responses::{CustomerView, ImportResponse};

const IMPORT_FAILED: &str = "Failed to add customer data";

/// Import a customer with all of their records in one transaction.
///
/// Every failure, including an unreadable body, answers 400 with the cause in
/// `details`.
pub async fn add_customer_data(
    State(state): State<CibilState>,
    payload: Result<Json<CustomerBundle>, JsonRejection>,
) -> Response {
    match import(&state, payload).await {
        Ok(customer) => {
            info!(pan = %customer.customer.pan_card_number, "customer data imported");
            (
                StatusCode::CREATED,
                Json(ImportResponse {
                    message: "Customer data added successfully",
                    customer,
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "customer data import failed");
            operation_failed(StatusCode::BAD_REQUEST, IMPORT_FAILED, &e)
        }
    }
}

async fn import(
    state: &CibilState,
    payload: Result<Json<CustomerBundle>, JsonRejection>,
) -> Result<CustomerView, CibilError> {
    let Json(mut bundle) = payload.map_err(|r| CibilError::validation(r.body_text()))?;
    bundle.validate()?;
    let customer = state.storage.import_bundle(bundle).await?;
    customer_view(&state.storage, customer).await
}

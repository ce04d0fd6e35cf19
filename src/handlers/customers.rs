use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use super::pan_key;
use crate::db::CibilStorage;
use crate::db::models::Customer;
use crate::error::CibilError;
use crate::middleware::ValidJson;
use crate::router::CibilState;
use crate::types::requests::{CustomerPatch, NewCustomer};
use crate::types::responses::{CibilReportView, CustomerView};

/// Load the records nested under a customer in API responses.
pub async fn customer_view(
    storage: &CibilStorage,
    customer: Customer,
) -> Result<CustomerView, CibilError> {
    let id = customer.id.as_str();
    let bank_accounts = storage.list_bank_accounts(Some(id)).await?;
    let credit_cards = storage.list_credit_cards(Some(id)).await?;
    let loans = storage.list_loans(Some(id)).await?;
    let latest = storage.latest_score(id).await?;
    Ok(CustomerView {
        bank_accounts,
        credit_cards: credit_cards.into_iter().map(Into::into).collect(),
        loans,
        latest_cibil_score: latest.map(Into::into),
        customer,
    })
}

pub async fn list_customers(
    State(state): State<CibilState>,
) -> Result<Json<Vec<CustomerView>>, CibilError> {
    let customers = state.storage.list_customers().await?;
    let mut views = Vec::with_capacity(customers.len());
    for customer in customers {
        views.push(customer_view(&state.storage, customer).await?);
    }
    Ok(Json(views))
}

pub async fn create_customer(
    State(state): State<CibilState>,
    ValidJson(new): ValidJson<NewCustomer>,
) -> Result<(StatusCode, Json<CustomerView>), CibilError> {
    let customer = state.storage.create_customer(new).await?;
    info!(pan = %customer.pan_card_number, "customer created");
    let view = customer_view(&state.storage, customer).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_customer(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
) -> Result<Json<CustomerView>, CibilError> {
    let customer = state.storage.customer_by_pan(&pan_key(&pan)).await?;
    Ok(Json(customer_view(&state.storage, customer).await?))
}

pub async fn replace_customer(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
    ValidJson(fields): ValidJson<NewCustomer>,
) -> Result<Json<CustomerView>, CibilError> {
    let current = state.storage.customer_by_pan(&pan_key(&pan)).await?;
    let updated = state.storage.update_customer(&current.id, fields).await?;
    Ok(Json(customer_view(&state.storage, updated).await?))
}

pub async fn patch_customer(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
    ValidJson(patch): ValidJson<CustomerPatch>,
) -> Result<Json<CustomerView>, CibilError> {
    let current = state.storage.customer_by_pan(&pan_key(&pan)).await?;
    let fields = patch.apply_to(&current);
    let updated = state.storage.update_customer(&current.id, fields).await?;
    Ok(Json(customer_view(&state.storage, updated).await?))
}

pub async fn delete_customer(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
) -> Result<StatusCode, CibilError> {
    let pan = pan_key(&pan);
    state.storage.delete_customer(&pan).await?;
    info!(pan = %pan, "customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn customer_reports(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
) -> Result<Json<Vec<CibilReportView>>, CibilError> {
    let customer = state.storage.customer_by_pan(&pan_key(&pan)).await?;
    let reports = state.storage.list_reports(&customer.id).await?;
    let mut views = Vec::with_capacity(reports.len());
    for report in reports {
        let score = state.storage.score_by_id(&report.cibil_score_id).await?;
        views.push(CibilReportView {
            report,
            cibil_score_details: score.map(Into::into),
        });
    }
    Ok(Json(views))
}

use axum::{
    Json,
    extract::{Path, State},
};

use super::customers::customer_view;
use super::pan_key;
use crate::error::CibilError;
use crate::router::CibilState;
use crate::types::responses::{DashboardResponse, DashboardSummary, HistoryResponse};

const RECENT_PAYMENTS: i64 = 10;

pub async fn customer_dashboard(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
) -> Result<Json<DashboardResponse>, CibilError> {
    let storage = &state.storage;
    let customer = storage.customer_by_pan(&pan_key(&pan)).await?;
    let id = customer.id.clone();

    let bank_accounts = storage.list_bank_accounts(Some(id.as_str())).await?;
    let credit_cards = storage.list_credit_cards(Some(id.as_str())).await?;
    let loans = storage.list_loans(Some(id.as_str())).await?;
    let recent_payments = storage.recent_payments(&id, RECENT_PAYMENTS).await?;
    let latest = storage.latest_score(&id).await?;

    let summary = DashboardSummary::from_records(&bank_accounts, &credit_cards, &loans);
    Ok(Json(DashboardResponse {
        customer: customer_view(storage, customer).await?,
        summary,
        bank_accounts,
        credit_cards: credit_cards.into_iter().map(Into::into).collect(),
        loans,
        recent_payments,
        latest_cibil_score: latest.map(Into::into),
    }))
}

pub async fn cibil_history(
    State(state): State<CibilState>,
    Path(pan): Path<String>,
) -> Result<Json<HistoryResponse>, CibilError> {
    let customer = state.storage.customer_by_pan(&pan_key(&pan)).await?;
    let history = state.storage.score_history(&customer.id).await?;
    Ok(Json(HistoryResponse {
        customer: customer.full_name,
        pan_card_number: customer.pan_card_number,
        score_history: history.into_iter().map(Into::into).collect(),
    }))
}

//! List and create handlers for the records owned by a customer.
//!
//! Each record kind is served twice: under `/customers/{pan}/...`, where the
//! path decides the owner, and at the top level, where the body names the
//! owning customer id.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use super::pan_key;
use crate::db::models::{BankAccount, Loan, PaymentHistory};
use crate::error::CibilError;
use crate::middleware::ValidJson;
use crate::router::CibilState;
use crate::types::requests::{NewBankAccount, NewCreditCard, NewLoan, NewPayment};
use crate::types::responses::CreditCardView;

fn required_customer(customer: Option<String>) -> Result<String, CibilError> {
    customer
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CibilError::validation("customer: This field is required."))
}

macro_rules! record_handlers {
    (
        $kind:literal,
        $new:ty => $view:ty,
        list: $list:ident,
        add: $add:ident,
        handlers: (
            $list_all:ident,
            $create_any:ident,
            $list_for:ident,
            $create_for:ident $(,)?
        ) $(,)?
    ) => {
        pub async fn $list_all(
            State(state): State<CibilState>,
        ) -> Result<Json<Vec<$view>>, CibilError> {
            let records = state.storage.$list(None).await?;
            Ok(Json(records.into_iter().map(Into::into).collect()))
        }

        pub async fn $create_any(
            State(state): State<CibilState>,
            ValidJson(mut new): ValidJson<$new>,
        ) -> Result<(StatusCode, Json<$view>), CibilError> {
            let customer_id = required_customer(new.customer.take())?;
            let record = state.storage.$add(&customer_id, new).await?;
            info!(kind = $kind, customer = %customer_id, id = %record.id, "record created");
            Ok((StatusCode::CREATED, Json(record.into())))
        }

        pub async fn $list_for(
            State(state): State<CibilState>,
            Path(pan): Path<String>,
        ) -> Result<Json<Vec<$view>>, CibilError> {
            let customer = state.storage.customer_by_pan(&pan_key(&pan)).await?;
            let records = state.storage.$list(Some(customer.id.as_str())).await?;
            Ok(Json(records.into_iter().map(Into::into).collect()))
        }

        pub async fn $create_for(
            State(state): State<CibilState>,
            Path(pan): Path<String>,
            ValidJson(new): ValidJson<$new>,
        ) -> Result<(StatusCode, Json<$view>), CibilError> {
            let customer = state.storage.customer_by_pan(&pan_key(&pan)).await?;
            let record = state.storage.$add(&customer.id, new).await?;
            info!(kind = $kind, pan = %customer.pan_card_number, id = %record.id, "record created");
            Ok((StatusCode::CREATED, Json(record.into())))
        }
    };
}

record_handlers!(
    "bank account",
    NewBankAccount => BankAccount,
    list: list_bank_accounts,
    add: add_bank_account,
    handlers: (
        list_bank_accounts,
        create_bank_account,
        list_customer_bank_accounts,
        create_customer_bank_account,
    ),
);

record_handlers!(
    "credit card",
    NewCreditCard => CreditCardView,
    list: list_credit_cards,
    add: add_credit_card,
    handlers: (
        list_credit_cards,
        create_credit_card,
        list_customer_credit_cards,
        create_customer_credit_card,
    ),
);

record_handlers!(
    "loan",
    NewLoan => Loan,
    list: list_loans,
    add: add_loan,
    handlers: (
        list_loans,
        create_loan,
        list_customer_loans,
        create_customer_loan,
    ),
);

record_handlers!(
    "payment",
    NewPayment => PaymentHistory,
    list: list_payments,
    add: add_payment,
    handlers: (
        list_payments,
        create_payment,
        list_customer_payments,
        create_customer_payment,
    ),
);

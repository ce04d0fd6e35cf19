use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::db::CibilStorage;
use crate::handlers::{bulk, customers, dashboard, financials, health, scores};
use crate::middleware::cors_layer;
use crate::service::score_ledger::LedgerHandle;

#[derive(Clone)]
pub struct CibilState {
    pub storage: CibilStorage,
    pub ledger: LedgerHandle,
}

impl CibilState {
    pub fn new(storage: CibilStorage, ledger: LedgerHandle) -> Self {
        Self { storage, ledger }
    }
}

fn api_routes() -> Router<CibilState> {
    Router::new()
        .route("/test-connection/", get(health::test_connection))
        .route("/check-cibil-score/", post(scores::check_cibil_score))
        .route(
            "/check-dynamic-cibil-score/",
            post(scores::check_dynamic_cibil_score),
        )
        .route(
            "/customers/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{pan}/",
            get(customers::get_customer)
                .put(customers::replace_customer)
                .patch(customers::patch_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/customers/{pan}/dashboard/",
            get(dashboard::customer_dashboard),
        )
        .route(
            "/customers/{pan}/cibil-history/",
            get(dashboard::cibil_history),
        )
        .route(
            "/customers/{pan}/cibil-reports/",
            get(customers::customer_reports),
        )
        .route(
            "/customers/{pan}/bank-accounts/",
            get(financials::list_customer_bank_accounts)
                .post(financials::create_customer_bank_account),
        )
        .route(
            "/customers/{pan}/credit-cards/",
            get(financials::list_customer_credit_cards)
                .post(financials::create_customer_credit_card),
        )
        .route(
            "/customers/{pan}/loans/",
            get(financials::list_customer_loans).post(financials::create_customer_loan),
        )
        .route(
            "/customers/{pan}/payment-history/",
            get(financials::list_customer_payments).post(financials::create_customer_payment),
        )
        .route(
            "/bank-accounts/",
            get(financials::list_bank_accounts).post(financials::create_bank_account),
        )
        .route(
            "/credit-cards/",
            get(financials::list_credit_cards).post(financials::create_credit_card),
        )
        .route(
            "/loans/",
            get(financials::list_loans).post(financials::create_loan),
        )
        .route(
            "/payment-history/",
            get(financials::list_payments).post(financials::create_payment),
        )
        .route("/add-customer-data/", post(bulk::add_customer_data))
}

/// Full application router: every API route under `/api`, with request
/// tracing and CORS applied to all of them.
pub fn cibil_router(state: CibilState, cors: &CorsConfig) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

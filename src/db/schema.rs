//! SQL DDL for initializing the credit ledger.
//! SQLite-first design; money columns are TEXT holding exact decimals.

/// Seven tables mirroring the domain records:
/// - every `id` is a 32-char hex TEXT primary key
/// - child rows reference `customers(id)` with `ON DELETE CASCADE`
/// - `pan_card_number` is UNIQUE; `(account_number, ifsc_code)` is UNIQUE
/// - booleans are INTEGER 0/1, dates `YYYY-MM-DD`, timestamps RFC3339
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY NOT NULL,
    pan_card_number TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    email TEXT NOT NULL,
    address TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_customers_created_at ON customers(created_at);

CREATE TABLE IF NOT EXISTS bank_accounts (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    bank_name TEXT NOT NULL,
    account_number TEXT NOT NULL,
    account_type TEXT NOT NULL,
    ifsc_code TEXT NOT NULL,
    account_opened_date TEXT NOT NULL,
    current_balance TEXT NOT NULL DEFAULT '0',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    UNIQUE (account_number, ifsc_code)
);

CREATE INDEX IF NOT EXISTS idx_bank_accounts_customer_active ON bank_accounts(customer_id, is_active);

CREATE TABLE IF NOT EXISTS credit_cards (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    bank_name TEXT NOT NULL,
    card_number_last_four TEXT NOT NULL,
    card_type TEXT NOT NULL,
    credit_limit TEXT NOT NULL,
    current_balance TEXT NOT NULL DEFAULT '0',
    available_credit TEXT NOT NULL,
    card_issued_date TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_credit_cards_customer_active ON credit_cards(customer_id, is_active);

CREATE TABLE IF NOT EXISTS loans (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    bank_name TEXT NOT NULL,
    loan_account_number TEXT NOT NULL,
    loan_type TEXT NOT NULL,
    principal_amount TEXT NOT NULL,
    outstanding_amount TEXT NOT NULL,
    emi_amount TEXT NOT NULL,
    interest_rate TEXT NOT NULL,
    tenure_months INTEGER NOT NULL,
    remaining_tenure INTEGER NOT NULL,
    loan_start_date TEXT NOT NULL,
    loan_end_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_loans_customer_status ON loans(customer_id, status);
CREATE INDEX IF NOT EXISTS idx_loans_account_number ON loans(loan_account_number);

CREATE TABLE IF NOT EXISTS payment_history (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    loan_id TEXT NULL REFERENCES loans(id) ON DELETE CASCADE,
    credit_card_id TEXT NULL REFERENCES credit_cards(id) ON DELETE CASCADE,
    payment_type TEXT NOT NULL,
    due_date TEXT NOT NULL,
    payment_date TEXT NULL,
    due_amount TEXT NOT NULL,
    paid_amount TEXT NOT NULL DEFAULT '0',
    payment_status TEXT NOT NULL,
    days_late INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_payment_history_customer_due ON payment_history(customer_id, due_date);
CREATE INDEX IF NOT EXISTS idx_payment_history_status ON payment_history(payment_status);
CREATE INDEX IF NOT EXISTS idx_payment_history_created_at ON payment_history(created_at);

CREATE TABLE IF NOT EXISTS cibil_scores (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    score INTEGER NOT NULL,
    payment_history_score TEXT NOT NULL,
    credit_utilization_score TEXT NOT NULL,
    credit_history_length_score TEXT NOT NULL,
    credit_mix_score TEXT NOT NULL,
    new_credit_score TEXT NOT NULL,
    total_accounts INTEGER NOT NULL DEFAULT 0,
    active_accounts INTEGER NOT NULL DEFAULT 0,
    total_credit_limit TEXT NOT NULL DEFAULT '0',
    total_outstanding TEXT NOT NULL DEFAULT '0',
    credit_utilization_ratio TEXT NOT NULL DEFAULT '0',
    score_date TEXT NOT NULL,
    is_latest INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_cibil_scores_customer_latest ON cibil_scores(customer_id, is_latest);
CREATE INDEX IF NOT EXISTS idx_cibil_scores_score_date ON cibil_scores(score_date);

CREATE TABLE IF NOT EXISTS cibil_reports (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    cibil_score_id TEXT NOT NULL REFERENCES cibil_scores(id) ON DELETE CASCADE,
    report_summary TEXT NOT NULL,
    recommendations TEXT NOT NULL DEFAULT '',
    risk_factors TEXT NOT NULL DEFAULT '',
    positive_factors TEXT NOT NULL DEFAULT '',
    generated_at TEXT NOT NULL,
    report_version TEXT NOT NULL DEFAULT '1.0'
);

CREATE INDEX IF NOT EXISTS idx_cibil_reports_customer_generated ON cibil_reports(customer_id, generated_at)
"#;

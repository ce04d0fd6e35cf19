//! Row decoding and single-row inserts shared by pooled and transactional callers.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;

use super::models::{
    BankAccount, CibilReport, CibilScore, CreditCard, Customer, Loan, PaymentHistory,
    UnknownChoice, generate_id, money,
};
use crate::error::CibilError;
use crate::types::requests::{NewBankAccount, NewCreditCard, NewCustomer, NewLoan, NewPayment};

pub const CUSTOMER_COLUMNS: &str = "id, pan_card_number, full_name, date_of_birth, phone_number, \
     email, address, created_at, updated_at";

pub const BANK_ACCOUNT_COLUMNS: &str = "id, customer_id, bank_name, account_number, account_type, \
     ifsc_code, account_opened_date, current_balance, is_active, created_at";

pub const CREDIT_CARD_COLUMNS: &str = "id, customer_id, bank_name, card_number_last_four, card_type, \
     credit_limit, current_balance, available_credit, card_issued_date, expiry_date, is_active, \
     created_at";

pub const LOAN_COLUMNS: &str = "id, customer_id, bank_name, loan_account_number, loan_type, \
     principal_amount, outstanding_amount, emi_amount, interest_rate, tenure_months, \
     remaining_tenure, loan_start_date, loan_end_date, status, created_at";

pub const PAYMENT_COLUMNS: &str = "id, customer_id, loan_id, credit_card_id, payment_type, due_date, \
     payment_date, due_amount, paid_amount, payment_status, days_late, created_at";

pub const SCORE_COLUMNS: &str = "id, customer_id, score, payment_history_score, \
     credit_utilization_score, credit_history_length_score, credit_mix_score, new_credit_score, \
     total_accounts, active_accounts, total_credit_limit, total_outstanding, \
     credit_utilization_ratio, score_date, is_latest";

pub const REPORT_COLUMNS: &str = "id, customer_id, cibil_score_id, report_summary, recommendations, \
     risk_factors, positive_factors, generated_at, report_version";

fn decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn choice<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownChoice>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub fn customer_from_row(row: &SqliteRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: row.try_get("id")?,
        pan_card_number: row.try_get("pan_card_number")?,
        full_name: row.try_get("full_name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        phone_number: row.try_get("phone_number")?,
        email: row.try_get("email")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub fn bank_account_from_row(row: &SqliteRow) -> Result<BankAccount, sqlx::Error> {
    Ok(BankAccount {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        bank_name: row.try_get("bank_name")?,
        account_number: row.try_get("account_number")?,
        account_type: choice(row, "account_type")?,
        ifsc_code: row.try_get("ifsc_code")?,
        account_opened_date: row.try_get("account_opened_date")?,
        current_balance: decimal(row, "current_balance")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn credit_card_from_row(row: &SqliteRow) -> Result<CreditCard, sqlx::Error> {
    Ok(CreditCard {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        bank_name: row.try_get("bank_name")?,
        card_number_last_four: row.try_get("card_number_last_four")?,
        card_type: choice(row, "card_type")?,
        credit_limit: decimal(row, "credit_limit")?,
        current_balance: decimal(row, "current_balance")?,
        available_credit: decimal(row, "available_credit")?,
        card_issued_date: row.try_get("card_issued_date")?,
        expiry_date: row.try_get("expiry_date")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn loan_from_row(row: &SqliteRow) -> Result<Loan, sqlx::Error> {
    Ok(Loan {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        bank_name: row.try_get("bank_name")?,
        loan_account_number: row.try_get("loan_account_number")?,
        loan_type: choice(row, "loan_type")?,
        principal_amount: decimal(row, "principal_amount")?,
        outstanding_amount: decimal(row, "outstanding_amount")?,
        emi_amount: decimal(row, "emi_amount")?,
        interest_rate: decimal(row, "interest_rate")?,
        tenure_months: row.try_get("tenure_months")?,
        remaining_tenure: row.try_get("remaining_tenure")?,
        loan_start_date: row.try_get("loan_start_date")?,
        loan_end_date: row.try_get("loan_end_date")?,
        status: choice(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn payment_from_row(row: &SqliteRow) -> Result<PaymentHistory, sqlx::Error> {
    Ok(PaymentHistory {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        loan_id: row.try_get("loan_id")?,
        credit_card_id: row.try_get("credit_card_id")?,
        payment_type: choice(row, "payment_type")?,
        due_date: row.try_get("due_date")?,
        payment_date: row.try_get("payment_date")?,
        due_amount: decimal(row, "due_amount")?,
        paid_amount: decimal(row, "paid_amount")?,
        payment_status: choice(row, "payment_status")?,
        days_late: row.try_get("days_late")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn score_from_row(row: &SqliteRow) -> Result<CibilScore, sqlx::Error> {
    Ok(CibilScore {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        score: row.try_get("score")?,
        payment_history_score: decimal(row, "payment_history_score")?,
        credit_utilization_score: decimal(row, "credit_utilization_score")?,
        credit_history_length_score: decimal(row, "credit_history_length_score")?,
        credit_mix_score: decimal(row, "credit_mix_score")?,
        new_credit_score: decimal(row, "new_credit_score")?,
        total_accounts: row.try_get("total_accounts")?,
        active_accounts: row.try_get("active_accounts")?,
        total_credit_limit: decimal(row, "total_credit_limit")?,
        total_outstanding: decimal(row, "total_outstanding")?,
        credit_utilization_ratio: decimal(row, "credit_utilization_ratio")?,
        score_date: row.try_get("score_date")?,
        is_latest: row.try_get("is_latest")?,
    })
}

pub fn report_from_row(row: &SqliteRow) -> Result<CibilReport, sqlx::Error> {
    Ok(CibilReport {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        cibil_score_id: row.try_get("cibil_score_id")?,
        report_summary: row.try_get("report_summary")?,
        recommendations: row.try_get("recommendations")?,
        risk_factors: row.try_get("risk_factors")?,
        positive_factors: row.try_get("positive_factors")?,
        generated_at: row.try_get("generated_at")?,
        report_version: row.try_get("report_version")?,
    })
}

pub async fn insert_customer(
    conn: &mut SqliteConnection,
    new: NewCustomer,
) -> Result<Customer, CibilError> {
    let now = Utc::now();
    let customer = Customer {
        id: generate_id(),
        pan_card_number: new.pan_card_number,
        full_name: new.full_name,
        date_of_birth: new.date_of_birth,
        phone_number: new.phone_number,
        email: new.email,
        address: new.address,
        created_at: now,
        updated_at: now,
    };
    sqlx::query(&format!(
        "INSERT INTO customers ({CUSTOMER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&customer.id)
    .bind(&customer.pan_card_number)
    .bind(&customer.full_name)
    .bind(customer.date_of_birth)
    .bind(&customer.phone_number)
    .bind(&customer.email)
    .bind(&customer.address)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(customer)
}

pub async fn insert_bank_account(
    conn: &mut SqliteConnection,
    customer_id: &str,
    new: NewBankAccount,
) -> Result<BankAccount, CibilError> {
    let account = BankAccount {
        id: generate_id(),
        customer_id: customer_id.to_string(),
        bank_name: new.bank_name,
        account_number: new.account_number,
        account_type: new.account_type,
        ifsc_code: new.ifsc_code,
        account_opened_date: new.account_opened_date,
        current_balance: money(new.current_balance),
        is_active: new.is_active,
        created_at: Utc::now(),
    };
    sqlx::query(&format!(
        "INSERT INTO bank_accounts ({BANK_ACCOUNT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&account.id)
    .bind(&account.customer_id)
    .bind(&account.bank_name)
    .bind(&account.account_number)
    .bind(account.account_type.as_str())
    .bind(&account.ifsc_code)
    .bind(account.account_opened_date)
    .bind(account.current_balance.to_string())
    .bind(account.is_active)
    .bind(account.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(account)
}

pub async fn insert_credit_card(
    conn: &mut SqliteConnection,
    customer_id: &str,
    new: NewCreditCard,
) -> Result<CreditCard, CibilError> {
    let card = CreditCard {
        id: generate_id(),
        customer_id: customer_id.to_string(),
        bank_name: new.bank_name,
        card_number_last_four: new.card_number_last_four,
        card_type: new.card_type,
        credit_limit: money(new.credit_limit),
        current_balance: money(new.current_balance),
        available_credit: money(new.available_credit),
        card_issued_date: new.card_issued_date,
        expiry_date: new.expiry_date,
        is_active: new.is_active,
        created_at: Utc::now(),
    };
    sqlx::query(&format!(
        "INSERT INTO credit_cards ({CREDIT_CARD_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&card.id)
    .bind(&card.customer_id)
    .bind(&card.bank_name)
    .bind(&card.card_number_last_four)
    .bind(card.card_type.as_str())
    .bind(card.credit_limit.to_string())
    .bind(card.current_balance.to_string())
    .bind(card.available_credit.to_string())
    .bind(card.card_issued_date)
    .bind(card.expiry_date)
    .bind(card.is_active)
    .bind(card.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(card)
}

pub async fn insert_loan(
    conn: &mut SqliteConnection,
    customer_id: &str,
    new: NewLoan,
) -> Result<Loan, CibilError> {
    let loan = Loan {
        id: generate_id(),
        customer_id: customer_id.to_string(),
        bank_name: new.bank_name,
        loan_account_number: new.loan_account_number,
        loan_type: new.loan_type,
        principal_amount: money(new.principal_amount),
        outstanding_amount: money(new.outstanding_amount),
        emi_amount: money(new.emi_amount),
        interest_rate: money(new.interest_rate),
        tenure_months: new.tenure_months,
        remaining_tenure: new.remaining_tenure,
        loan_start_date: new.loan_start_date,
        loan_end_date: new.loan_end_date,
        status: new.status,
        created_at: Utc::now(),
    };
    sqlx::query(&format!(
        "INSERT INTO loans ({LOAN_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&loan.id)
    .bind(&loan.customer_id)
    .bind(&loan.bank_name)
    .bind(&loan.loan_account_number)
    .bind(loan.loan_type.as_str())
    .bind(loan.principal_amount.to_string())
    .bind(loan.outstanding_amount.to_string())
    .bind(loan.emi_amount.to_string())
    .bind(loan.interest_rate.to_string())
    .bind(loan.tenure_months)
    .bind(loan.remaining_tenure)
    .bind(loan.loan_start_date)
    .bind(loan.loan_end_date)
    .bind(loan.status.as_str())
    .bind(loan.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(loan)
}

pub async fn insert_payment(
    conn: &mut SqliteConnection,
    customer_id: &str,
    new: NewPayment,
) -> Result<PaymentHistory, CibilError> {
    let payment = PaymentHistory {
        id: generate_id(),
        customer_id: customer_id.to_string(),
        loan_id: new.loan,
        credit_card_id: new.credit_card,
        payment_type: new.payment_type,
        due_date: new.due_date,
        payment_date: new.payment_date,
        due_amount: money(new.due_amount),
        paid_amount: money(new.paid_amount),
        payment_status: new.payment_status,
        days_late: new.days_late,
        created_at: Utc::now(),
    };
    sqlx::query(&format!(
        "INSERT INTO payment_history ({PAYMENT_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&payment.id)
    .bind(&payment.customer_id)
    .bind(&payment.loan_id)
    .bind(&payment.credit_card_id)
    .bind(payment.payment_type.as_str())
    .bind(payment.due_date)
    .bind(payment.payment_date)
    .bind(payment.due_amount.to_string())
    .bind(payment.paid_amount.to_string())
    .bind(payment.payment_status.as_str())
    .bind(payment.days_late)
    .bind(payment.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(payment)
}

pub async fn insert_score(
    conn: &mut SqliteConnection,
    score: &CibilScore,
) -> Result<(), CibilError> {
    sqlx::query(&format!(
        "INSERT INTO cibil_scores ({SCORE_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&score.id)
    .bind(&score.customer_id)
    .bind(score.score)
    .bind(score.payment_history_score.to_string())
    .bind(score.credit_utilization_score.to_string())
    .bind(score.credit_history_length_score.to_string())
    .bind(score.credit_mix_score.to_string())
    .bind(score.new_credit_score.to_string())
    .bind(score.total_accounts)
    .bind(score.active_accounts)
    .bind(score.total_credit_limit.to_string())
    .bind(score.total_outstanding.to_string())
    .bind(score.credit_utilization_ratio.to_string())
    .bind(score.score_date)
    .bind(score.is_latest)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_report(
    conn: &mut SqliteConnection,
    report: &CibilReport,
) -> Result<(), CibilError> {
    sqlx::query(&format!(
        "INSERT INTO cibil_reports ({REPORT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&report.id)
    .bind(&report.customer_id)
    .bind(&report.cibil_score_id)
    .bind(&report.report_summary)
    .bind(&report.recommendations)
    .bind(&report.risk_factors)
    .bind(&report.positive_factors)
    .bind(report.generated_at)
    .bind(&report.report_version)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

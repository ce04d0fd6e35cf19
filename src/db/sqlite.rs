use crate::db::models::{
    BankAccount, CibilReport, CibilScore, CreditCard, Customer, Loan, PaymentHistory,
};
use crate::db::rows::{
    self, BANK_ACCOUNT_COLUMNS, CREDIT_CARD_COLUMNS, CUSTOMER_COLUMNS, LOAN_COLUMNS,
    PAYMENT_COLUMNS, REPORT_COLUMNS, SCORE_COLUMNS,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::CibilError;
use crate::service::profile::CreditProfile;
use crate::types::requests::{
    CustomerBundle, NewBankAccount, NewCreditCard, NewCustomer, NewLoan, NewPayment,
};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open a pool against `url`, creating the file when missing and enforcing foreign keys.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, CibilError> {
    let connect_opts = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}

/// Build `SELECT <columns> FROM <table>`, optionally scoped to one customer.
fn scoped_select(columns: &str, table: &str, scoped: bool, order: &str) -> String {
    if scoped {
        format!("SELECT {columns} FROM {table} WHERE customer_id = ? ORDER BY {order}")
    } else {
        format!("SELECT {columns} FROM {table} ORDER BY {order}")
    }
}

#[derive(Clone)]
pub struct CibilStorage {
    pool: SqlitePool,
}

impl CibilStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CibilError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn fetch_scoped<T>(
        &self,
        sql: String,
        customer_id: Option<&str>,
        map: fn(&SqliteRow) -> Result<T, sqlx::Error>,
    ) -> Result<Vec<T>, CibilError> {
        let mut query = sqlx::query(&sql);
        if let Some(id) = customer_id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(map).collect::<Result<Vec<_>, _>>()?)
    }

    // ---- customers ----

    pub async fn list_customers(&self) -> Result<Vec<Customer>, CibilError> {
        self.fetch_scoped(
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at, rowid"),
            None,
            rows::customer_from_row,
        )
        .await
    }

    pub async fn find_customer(&self, pan: &str) -> Result<Option<Customer>, CibilError> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE pan_card_number = ?"
        ))
        .bind(pan)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(rows::customer_from_row).transpose()?)
    }

    /// Look up a customer by PAN, failing with a 404-mapped error when absent.
    pub async fn customer_by_pan(&self, pan: &str) -> Result<Customer, CibilError> {
        self.find_customer(pan)
            .await?
            .ok_or_else(|| CibilError::customer_not_found(pan))
    }

    pub async fn create_customer(&self, new: NewCustomer) -> Result<Customer, CibilError> {
        let mut conn = self.pool.acquire().await?;
        rows::insert_customer(&mut conn, new).await
    }

    /// Overwrite every editable field of the customer with `id`.
    pub async fn update_customer(
        &self,
        id: &str,
        fields: NewCustomer,
    ) -> Result<Customer, CibilError> {
        let result = sqlx::query(
            r#"UPDATE customers SET
                pan_card_number = ?,
                full_name = ?,
                date_of_birth = ?,
                phone_number = ?,
                email = ?,
                address = ?,
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(&fields.pan_card_number)
        .bind(&fields.full_name)
        .bind(fields.date_of_birth)
        .bind(&fields.phone_number)
        .bind(&fields.email)
        .bind(&fields.address)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CibilError::NotFound {
                resource: "Customer",
                key: id.to_string(),
            });
        }
        self.find_customer(&fields.pan_card_number)
            .await?
            .ok_or_else(|| CibilError::customer_not_found(fields.pan_card_number))
    }

    /// Delete a customer; owned records follow through `ON DELETE CASCADE`.
    pub async fn delete_customer(&self, pan: &str) -> Result<(), CibilError> {
        let result = sqlx::query("DELETE FROM customers WHERE pan_card_number = ?")
            .bind(pan)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CibilError::customer_not_found(pan));
        }
        Ok(())
    }

    // ---- financial records ----

    pub async fn list_bank_accounts(
        &self,
        customer_id: Option<&str>,
    ) -> Result<Vec<BankAccount>, CibilError> {
        let sql = scoped_select(
            BANK_ACCOUNT_COLUMNS,
            "bank_accounts",
            customer_id.is_some(),
            "created_at, rowid",
        );
        self.fetch_scoped(sql, customer_id, rows::bank_account_from_row)
            .await
    }

    pub async fn list_credit_cards(
        &self,
        customer_id: Option<&str>,
    ) -> Result<Vec<CreditCard>, CibilError> {
        let sql = scoped_select(
            CREDIT_CARD_COLUMNS,
            "credit_cards",
            customer_id.is_some(),
            "created_at, rowid",
        );
        self.fetch_scoped(sql, customer_id, rows::credit_card_from_row)
            .await
    }

    pub async fn list_loans(&self, customer_id: Option<&str>) -> Result<Vec<Loan>, CibilError> {
        let sql = scoped_select(
            LOAN_COLUMNS,
            "loans",
            customer_id.is_some(),
            "created_at, rowid",
        );
        self.fetch_scoped(sql, customer_id, rows::loan_from_row).await
    }

    /// Payments, newest due date first when scoped to a customer.
    pub async fn list_payments(
        &self,
        customer_id: Option<&str>,
    ) -> Result<Vec<PaymentHistory>, CibilError> {
        let order = if customer_id.is_some() {
            "due_date DESC, rowid DESC"
        } else {
            "created_at, rowid"
        };
        let sql = scoped_select(PAYMENT_COLUMNS, "payment_history", customer_id.is_some(), order);
        self.fetch_scoped(sql, customer_id, rows::payment_from_row)
            .await
    }

    pub async fn recent_payments(
        &self,
        customer_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentHistory>, CibilError> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_history WHERE customer_id = ? \
             ORDER BY due_date DESC, rowid DESC LIMIT ?"
        ))
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(rows::payment_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn add_bank_account(
        &self,
        customer_id: &str,
        new: NewBankAccount,
    ) -> Result<BankAccount, CibilError> {
        let mut conn = self.pool.acquire().await?;
        rows::insert_bank_account(&mut conn, customer_id, new).await
    }

    pub async fn add_credit_card(
        &self,
        customer_id: &str,
        new: NewCreditCard,
    ) -> Result<CreditCard, CibilError> {
        let mut conn = self.pool.acquire().await?;
        rows::insert_credit_card(&mut conn, customer_id, new).await
    }

    pub async fn add_loan(&self, customer_id: &str, new: NewLoan) -> Result<Loan, CibilError> {
        let mut conn = self.pool.acquire().await?;
        rows::insert_loan(&mut conn, customer_id, new).await
    }

    pub async fn add_payment(
        &self,
        customer_id: &str,
        new: NewPayment,
    ) -> Result<PaymentHistory, CibilError> {
        let mut conn = self.pool.acquire().await?;
        rows::insert_payment(&mut conn, customer_id, new).await
    }

    /// Snapshot every record the score calculator reads for one customer.
    pub async fn load_profile(&self, customer_id: &str) -> Result<CreditProfile, CibilError> {
        let mut profile = CreditProfile::empty(Utc::now());
        profile.bank_accounts = self.list_bank_accounts(Some(customer_id)).await?;
        profile.credit_cards = self.list_credit_cards(Some(customer_id)).await?;
        profile.loans = self.list_loans(Some(customer_id)).await?;
        profile.payments = self.list_payments(Some(customer_id)).await?;
        Ok(profile)
    }

    // ---- scores and reports ----

    pub async fn latest_score(&self, customer_id: &str) -> Result<Option<CibilScore>, CibilError> {
        let row = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM cibil_scores WHERE customer_id = ? AND is_latest = 1 \
             ORDER BY score_date DESC, rowid DESC LIMIT 1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(rows::score_from_row).transpose()?)
    }

    pub async fn score_by_id(&self, id: &str) -> Result<Option<CibilScore>, CibilError> {
        let row = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM cibil_scores WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(rows::score_from_row).transpose()?)
    }

    /// All recorded scores, newest first.
    pub async fn score_history(&self, customer_id: &str) -> Result<Vec<CibilScore>, CibilError> {
        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM cibil_scores WHERE customer_id = ? \
             ORDER BY score_date DESC, rowid DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(rows::score_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn list_reports(&self, customer_id: &str) -> Result<Vec<CibilReport>, CibilError> {
        let rows = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM cibil_reports WHERE customer_id = ? \
             ORDER BY generated_at DESC, rowid DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(rows::report_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Store a new score as the customer's latest, together with its report.
    /// Earlier scores lose the latest flag in the same transaction.
    pub async fn record_score(
        &self,
        score: &CibilScore,
        report: &CibilReport,
    ) -> Result<(), CibilError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE cibil_scores SET is_latest = 0 WHERE customer_id = ? AND is_latest = 1")
            .bind(&score.customer_id)
            .execute(&mut *tx)
            .await?;
        rows::insert_score(&mut tx, score).await?;
        rows::insert_report(&mut tx, report).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---- bulk import ----

    /// Get-or-create the bundle's customer by PAN and attach every nested record.
    /// Nothing is written unless all of it succeeds.
    pub async fn import_bundle(&self, bundle: CustomerBundle) -> Result<Customer, CibilError> {
        let CustomerBundle {
            customer,
            bank_accounts,
            credit_cards,
            loans,
            payment_history,
        } = bundle;

        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE pan_card_number = ?"
        ))
        .bind(&customer.pan_card_number)
        .fetch_optional(&mut *tx)
        .await?;
        let customer = match existing {
            Some(row) => rows::customer_from_row(&row)?,
            None => rows::insert_customer(&mut tx, customer).await?,
        };

        for account in bank_accounts {
            rows::insert_bank_account(&mut tx, &customer.id, account).await?;
        }
        for card in credit_cards {
            rows::insert_credit_card(&mut tx, &customer.id, card).await?;
        }
        for loan in loans {
            rows::insert_loan(&mut tx, &customer.id, loan).await?;
        }
        for payment in payment_history {
            rows::insert_payment(&mut tx, &customer.id, payment).await?;
        }

        tx.commit().await?;
        Ok(customer)
    }
}

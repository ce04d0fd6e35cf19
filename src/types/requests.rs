use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

use super::Validate;
use crate::db::models::{
    AccountType, CardType, Customer, LoanStatus, LoanType, PaymentStatus, PaymentType,
};
use crate::error::CibilError;

static PAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid PAN regex"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Upper-cases and checks a PAN card number (five letters, four digits, one letter).
pub fn normalize_pan(raw: &str) -> Result<String, CibilError> {
    let pan = raw.trim().to_ascii_uppercase();
    if PAN_PATTERN.is_match(&pan) {
        Ok(pan)
    } else {
        Err(CibilError::validation_with(
            "Invalid PAN card format",
            format!("pan_card_number: {raw}"),
        ))
    }
}

fn check_text(field: &str, value: &str, max_len: usize) -> Result<(), CibilError> {
    if value.trim().is_empty() {
        return Err(CibilError::validation(format!(
            "{field}: This field may not be blank."
        )));
    }
    if value.chars().count() > max_len {
        return Err(CibilError::validation(format!(
            "{field}: Ensure this field has no more than {max_len} characters."
        )));
    }
    Ok(())
}

fn check_decimal(
    field: &str,
    value: Decimal,
    max_digits: u32,
    decimal_places: u32,
) -> Result<(), CibilError> {
    if value.normalize().scale() > decimal_places {
        return Err(CibilError::validation(format!(
            "{field}: Ensure that there are no more than {decimal_places} decimal places."
        )));
    }
    let whole_digits = max_digits - decimal_places;
    if value.abs() >= Decimal::from(10i64.pow(whole_digits)) {
        return Err(CibilError::validation(format!(
            "{field}: Ensure that there are no more than {whole_digits} digits before the decimal point."
        )));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), CibilError> {
    if EMAIL_PATTERN.is_match(value) && value.len() <= 254 {
        Ok(())
    } else {
        Err(CibilError::validation("email: Enter a valid email address."))
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub pan_card_number: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub address: String,
}

impl Validate for NewCustomer {
    fn validate(&mut self) -> Result<(), CibilError> {
        self.pan_card_number = normalize_pan(&self.pan_card_number)?;
        check_text("full_name", &self.full_name, 255)?;
        check_text("phone_number", &self.phone_number, 15)?;
        check_email(&self.email)?;
        check_text("address", &self.address, usize::MAX)?;
        Ok(())
    }
}

/// Partial customer update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    pub pan_card_number: Option<String>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CustomerPatch {
    /// Overlay the patch on the stored customer, producing the full replacement.
    pub fn apply_to(self, current: &Customer) -> NewCustomer {
        NewCustomer {
            pan_card_number: self
                .pan_card_number
                .unwrap_or_else(|| current.pan_card_number.clone()),
            full_name: self.full_name.unwrap_or_else(|| current.full_name.clone()),
            date_of_birth: self.date_of_birth.unwrap_or(current.date_of_birth),
            phone_number: self
                .phone_number
                .unwrap_or_else(|| current.phone_number.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            address: self.address.unwrap_or_else(|| current.address.clone()),
        }
    }
}

impl Validate for CustomerPatch {
    fn validate(&mut self) -> Result<(), CibilError> {
        if let Some(pan) = self.pan_card_number.as_mut() {
            *pan = normalize_pan(pan)?;
        }
        if let Some(name) = &self.full_name {
            check_text("full_name", name, 255)?;
        }
        if let Some(phone) = &self.phone_number {
            check_text("phone_number", phone, 15)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(address) = &self.address {
            check_text("address", address, usize::MAX)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBankAccount {
    /// Owning customer id; taken from the URL on customer-scoped routes.
    #[serde(default)]
    pub customer: Option<String>,
    pub bank_name: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub ifsc_code: String,
    pub account_opened_date: NaiveDate,
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for NewBankAccount {
    fn validate(&mut self) -> Result<(), CibilError> {
        check_text("bank_name", &self.bank_name, 100)?;
        check_text("account_number", &self.account_number, 20)?;
        check_text("ifsc_code", &self.ifsc_code, 11)?;
        check_decimal("current_balance", self.current_balance, 15, 2)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCreditCard {
    #[serde(default)]
    pub customer: Option<String>,
    pub bank_name: String,
    pub card_number_last_four: String,
    pub card_type: CardType,
    pub credit_limit: Decimal,
    #[serde(default)]
    pub current_balance: Decimal,
    pub available_credit: Decimal,
    pub card_issued_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for NewCreditCard {
    fn validate(&mut self) -> Result<(), CibilError> {
        check_text("bank_name", &self.bank_name, 100)?;
        check_text("card_number_last_four", &self.card_number_last_four, 4)?;
        check_decimal("credit_limit", self.credit_limit, 10, 2)?;
        check_decimal("current_balance", self.current_balance, 10, 2)?;
        check_decimal("available_credit", self.available_credit, 10, 2)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLoan {
    #[serde(default)]
    pub customer: Option<String>,
    pub bank_name: String,
    pub loan_account_number: String,
    pub loan_type: LoanType,
    pub principal_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub emi_amount: Decimal,
    pub interest_rate: Decimal,
    pub tenure_months: i64,
    pub remaining_tenure: i64,
    pub loan_start_date: NaiveDate,
    pub loan_end_date: NaiveDate,
    #[serde(default)]
    pub status: LoanStatus,
}

impl Validate for NewLoan {
    fn validate(&mut self) -> Result<(), CibilError> {
        check_text("bank_name", &self.bank_name, 100)?;
        check_text("loan_account_number", &self.loan_account_number, 50)?;
        check_decimal("principal_amount", self.principal_amount, 15, 2)?;
        check_decimal("outstanding_amount", self.outstanding_amount, 15, 2)?;
        check_decimal("emi_amount", self.emi_amount, 10, 2)?;
        check_decimal("interest_rate", self.interest_rate, 5, 2)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub loan: Option<String>,
    #[serde(default)]
    pub credit_card: Option<String>,
    pub payment_type: PaymentType,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    pub due_amount: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub days_late: i64,
}

impl Validate for NewPayment {
    fn validate(&mut self) -> Result<(), CibilError> {
        check_decimal("due_amount", self.due_amount, 10, 2)?;
        check_decimal("paid_amount", self.paid_amount, 10, 2)
    }
}

/// Body of the bulk import endpoint: one customer plus all of their records.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerBundle {
    pub customer: NewCustomer,
    #[serde(default)]
    pub bank_accounts: Vec<NewBankAccount>,
    #[serde(default)]
    pub credit_cards: Vec<NewCreditCard>,
    #[serde(default)]
    pub loans: Vec<NewLoan>,
    #[serde(default)]
    pub payment_history: Vec<NewPayment>,
}

impl Validate for CustomerBundle {
    fn validate(&mut self) -> Result<(), CibilError> {
        self.customer.validate()?;
        self.bank_accounts
            .iter_mut()
            .try_for_each(Validate::validate)?;
        self.credit_cards.iter_mut().try_for_each(Validate::validate)?;
        self.loans.iter_mut().try_for_each(Validate::validate)?;
        self.payment_history
            .iter_mut()
            .try_for_each(Validate::validate)
    }
}

/// Body of the score endpoints. `custom_weights` stays loosely typed so that
/// unknown factors and malformed weights surface as validation messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub pan_card_number: Option<String>,
    #[serde(default)]
    pub custom_weights: Option<Value>,
}

impl Validate for ScoreRequest {
    fn validate(&mut self) -> Result<(), CibilError> {
        let pan = self
            .pan_card_number
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_ascii_uppercase();
        if pan.is_empty() {
            return Err(CibilError::validation("PAN card number is required"));
        }
        self.pan_card_number = Some(pan);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_json() -> Value {
        serde_json::json!({
            "pan_card_number": "abcde1234f",
            "full_name": "Asha Rao",
            "date_of_birth": "1990-04-12",
            "phone_number": "9876543210",
            "email": "asha@example.com",
            "address": "12 MG Road, Bengaluru"
        })
    }

    #[test]
    fn pan_is_upper_cased_and_checked() {
        assert_eq!(normalize_pan(" abcde1234f ").ok().as_deref(), Some("ABCDE1234F"));
        assert!(normalize_pan("ABCD1234F").is_err());
        assert!(normalize_pan("ABCDE12345").is_err());
    }

    #[test]
    fn new_customer_normalizes_pan() {
        let mut c: NewCustomer = serde_json::from_value(customer_json()).unwrap();
        c.validate().unwrap();
        assert_eq!(c.pan_card_number, "ABCDE1234F");
    }

    #[test]
    fn new_customer_rejects_bad_email_and_long_phone() {
        let mut v = customer_json();
        v["email"] = Value::from("not-an-email");
        let mut c: NewCustomer = serde_json::from_value(v).unwrap();
        assert!(c.validate().is_err());

        let mut v = customer_json();
        v["phone_number"] = Value::from("1234567890123456");
        let mut c: NewCustomer = serde_json::from_value(v).unwrap();
        assert!(c.validate().is_err());
    }

    #[test]
    fn decimal_precision_is_enforced() {
        assert!(check_decimal("x", Decimal::new(12345, 3), 10, 2).is_err());
        assert!(check_decimal("x", Decimal::new(123400, 4), 10, 2).is_ok());
        assert!(check_decimal("x", Decimal::from(100_000_000i64), 10, 2).is_err());
        assert!(check_decimal("x", Decimal::new(9_999_999_999, 2), 10, 2).is_ok());
    }

    #[test]
    fn loan_status_defaults_to_active() {
        let loan: NewLoan = serde_json::from_value(serde_json::json!({
            "bank_name": "SBI",
            "loan_account_number": "HL-001",
            "loan_type": "HOME_LOAN",
            "principal_amount": "2500000.00",
            "outstanding_amount": 1800000,
            "emi_amount": "21000.00",
            "interest_rate": "8.40",
            "tenure_months": 240,
            "remaining_tenure": 180,
            "loan_start_date": "2019-01-01",
            "loan_end_date": "2039-01-01"
        }))
        .unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.outstanding_amount, Decimal::from(1_800_000));
    }

    #[test]
    fn score_request_requires_pan() {
        let mut req = ScoreRequest::default();
        assert!(req.validate().is_err());
        let mut req = ScoreRequest {
            pan_card_number: Some("  ".into()),
            custom_weights: None,
        };
        assert!(req.validate().is_err());
        let mut req = ScoreRequest {
            pan_card_number: Some("abcde1234f".into()),
            custom_weights: None,
        };
        req.validate().unwrap();
        assert_eq!(req.pan_card_number.as_deref(), Some("ABCDE1234F"));
    }
}

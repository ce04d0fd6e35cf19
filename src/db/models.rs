use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fresh primary key: a UUIDv4 rendered as 32 lowercase hex characters.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Pin a money amount to two decimal places, padding when needed.
pub fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(2);
    amount
}

/// Error for a stored choice column holding an unknown value.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of string choices stored verbatim in a TEXT column.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownChoice {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum!(AccountType, "account_type" {
    Savings => "SAVINGS",
    Current => "CURRENT",
    Salary => "SALARY",
    FixedDeposit => "FIXED_DEPOSIT",
    RecurringDeposit => "RECURRING_DEPOSIT",
});

choice_enum!(CardType, "card_type" {
    Visa => "VISA",
    Mastercard => "MASTERCARD",
    Rupay => "RUPAY",
    Amex => "AMEX",
});

choice_enum!(LoanType, "loan_type" {
    HomeLoan => "HOME_LOAN",
    PersonalLoan => "PERSONAL_LOAN",
    CarLoan => "CAR_LOAN",
    EducationLoan => "EDUCATION_LOAN",
    BusinessLoan => "BUSINESS_LOAN",
    GoldLoan => "GOLD_LOAN",
});

choice_enum!(#[derive(Default)] LoanStatus, "status" {
    #[default]
    Active => "ACTIVE",
    Closed => "CLOSED",
    Overdue => "OVERDUE",
    Defaulted => "DEFAULTED",
});

choice_enum!(PaymentType, "payment_type" {
    LoanEmi => "LOAN_EMI",
    CreditCard => "CREDIT_CARD",
    UtilityBill => "UTILITY_BILL",
    Other => "OTHER",
});

choice_enum!(PaymentStatus, "payment_status" {
    OnTime => "ON_TIME",
    Late1To30 => "LATE_1_30",
    Late31To60 => "LATE_31_60",
    Late61To90 => "LATE_61_90",
    Late90Plus => "LATE_90_PLUS",
    Missed => "MISSED",
    Defaulted => "DEFAULTED",
});

impl PaymentStatus {
    pub fn is_late(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Late1To30
                | PaymentStatus::Late31To60
                | PaymentStatus::Late61To90
                | PaymentStatus::Late90Plus
        )
    }

    pub fn is_missed(&self) -> bool {
        matches!(self, PaymentStatus::Missed | PaymentStatus::Defaulted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: String,
    pub pan_card_number: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankAccount {
    pub id: String,
    #[serde(rename = "customer")]
    pub customer_id: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub ifsc_code: String,
    pub account_opened_date: NaiveDate,
    pub current_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditCard {
    pub id: String,
    #[serde(rename = "customer")]
    pub customer_id: String,
    pub bank_name: String,
    pub card_number_last_four: String,
    pub card_type: CardType,
    pub credit_limit: Decimal,
    pub current_balance: Decimal,
    pub available_credit: Decimal,
    pub card_issued_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl CreditCard {
    /// Balance as a percentage of the limit, 0 when the limit is not positive.
    pub fn utilization_percentage(&self) -> f64 {
        if self.credit_limit > Decimal::ZERO {
            let pct = (self.current_balance / self.credit_limit * Decimal::ONE_HUNDRED)
                .round_dp(2);
            pct.to_f64().unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Loan {
    pub id: String,
    #[serde(rename = "customer")]
    pub customer_id: String,
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
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentHistory {
    pub id: String,
    #[serde(rename = "customer")]
    pub customer_id: String,
    #[serde(rename = "loan")]
    pub loan_id: Option<String>,
    #[serde(rename = "credit_card")]
    pub credit_card_id: Option<String>,
    pub payment_type: PaymentType,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub due_amount: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub days_late: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CibilScore {
    pub id: String,
    #[serde(rename = "customer")]
    pub customer_id: String,
    pub score: i64,
    pub payment_history_score: Decimal,
    pub credit_utilization_score: Decimal,
    pub credit_history_length_score: Decimal,
    pub credit_mix_score: Decimal,
    pub new_credit_score: Decimal,
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub total_credit_limit: Decimal,
    pub total_outstanding: Decimal,
    pub credit_utilization_ratio: Decimal,
    pub score_date: DateTime<Utc>,
    pub is_latest: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CibilReport {
    pub id: String,
    #[serde(rename = "customer")]
    pub customer_id: String,
    #[serde(rename = "cibil_score")]
    pub cibil_score_id: String,
    pub report_summary: String,
    pub recommendations: String,
    pub risk_factors: String,
    pub positive_factors: String,
    pub generated_at: DateTime<Utc>,
    pub report_version: String,
}

pub const REPORT_VERSION: &str = "1.0";

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn generated_ids_are_32_hex_chars() {
        let id = generate_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, generate_id());
    }

    #[test]
    fn choices_round_trip_through_their_column_text() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>().ok(), Some(*status));
        }
        assert!("LATE".parse::<PaymentStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&LoanType::HomeLoan).ok().as_deref(),
            Some("\"HOME_LOAN\"")
        );
    }

    #[test]
    fn loans_default_to_active() {
        assert_eq!(LoanStatus::default(), LoanStatus::Active);
        let parsed: LoanStatus = serde_json::from_str("\"CLOSED\"").unwrap();
        assert_eq!(parsed, LoanStatus::Closed);
    }

    #[test]
    fn card_utilization_is_rounded_percentage() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut card = CreditCard {
            id: generate_id(),
            customer_id: generate_id(),
            bank_name: "HDFC".into(),
            card_number_last_four: "1234".into(),
            card_type: CardType::Visa,
            credit_limit: Decimal::new(300_000, 2),
            current_balance: Decimal::new(100_000, 2),
            available_credit: Decimal::new(200_000, 2),
            card_issued_date: today,
            expiry_date: today,
            is_active: true,
            created_at: Utc::now(),
        };
        assert_eq!(card.utilization_percentage(), 33.33);
        card.credit_limit = Decimal::ZERO;
        assert_eq!(card.utilization_percentage(), 0.0);
    }

    #[test]
    fn money_is_pinned_to_cents() {
        assert_eq!(money(Decimal::from(50_000)).to_string(), "50000.00");
        assert_eq!(money(Decimal::new(12_345, 1)).to_string(), "1234.50");
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::db::models::{BankAccount, CreditCard, Loan, PaymentHistory};

/// Everything the scorer looks at for one customer, captured at `as_of`.
#[derive(Debug, Clone)]
pub struct CreditProfile {
    pub as_of: DateTime<Utc>,
    pub bank_accounts: Vec<BankAccount>,
    pub credit_cards: Vec<CreditCard>,
    pub loans: Vec<Loan>,
    pub payments: Vec<PaymentHistory>,
}

impl CreditProfile {
    pub fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            bank_accounts: Vec::new(),
            credit_cards: Vec::new(),
            loans: Vec::new(),
            payments: Vec::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of.date_naive()
    }

    pub fn active_cards(&self) -> impl Iterator<Item = &CreditCard> {
        self.credit_cards.iter().filter(|c| c.is_active)
    }

    pub fn active_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|l| l.is_active())
    }

    pub fn has_active_card(&self) -> bool {
        self.active_cards().next().is_some()
    }

    pub fn has_active_bank_account(&self) -> bool {
        self.bank_accounts.iter().any(|a| a.is_active)
    }

    /// Sum of limits and balances over active cards.
    pub fn active_card_totals(&self) -> (Decimal, Decimal) {
        self.active_cards()
            .fold((Decimal::ZERO, Decimal::ZERO), |(limit, balance), c| {
                (limit + c.credit_limit, balance + c.current_balance)
            })
    }

    /// Earliest loan start, card issue or account opening date, active or not.
    pub fn oldest_account_date(&self) -> Option<NaiveDate> {
        let loans = self.loans.iter().map(|l| l.loan_start_date);
        let cards = self.credit_cards.iter().map(|c| c.card_issued_date);
        let accounts = self.bank_accounts.iter().map(|a| a.account_opened_date);
        loans.chain(cards).chain(accounts).min()
    }

    /// Age of the oldest account in years; 0 with no accounts.
    pub fn credit_age_years(&self) -> f64 {
        self.oldest_account_date()
            .map(|oldest| (self.today() - oldest).num_days() as f64 / 365.25)
            .unwrap_or(0.0)
    }
}

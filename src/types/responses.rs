use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::db::models::{
    BankAccount, CibilReport, CibilScore, CreditCard, Customer, Loan, PaymentHistory,
};
use crate::service::calculator::{ScoreBreakdown, ScoreOutcome};
use crate::service::grading::{cibil_grade, score_category};
use crate::service::weights::PerFactor;

pub const ALGORITHM_VERSION: &str = "2.0_dynamic";

#[derive(Debug, Clone, Serialize)]
pub struct CreditCardView {
    #[serde(flatten)]
    pub card: CreditCard,
    pub utilization_percentage: f64,
}

impl From<CreditCard> for CreditCardView {
    fn from(card: CreditCard) -> Self {
        Self {
            utilization_percentage: card.utilization_percentage(),
            card,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CibilScoreView {
    #[serde(flatten)]
    pub score: CibilScore,
    pub score_category: &'static str,
}

impl From<CibilScore> for CibilScoreView {
    fn from(score: CibilScore) -> Self {
        Self {
            score_category: score_category(score.score),
            score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CibilReportView {
    #[serde(flatten)]
    pub report: CibilReport,
    pub cibil_score_details: Option<CibilScoreView>,
}

/// A customer together with their accounts, cards, loans and latest score.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    pub bank_accounts: Vec<BankAccount>,
    pub credit_cards: Vec<CreditCardView>,
    pub loans: Vec<Loan>,
    pub latest_cibil_score: Option<CibilScoreView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactCard {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub pan_card_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRange {
    pub minimum_possible: i64,
    pub maximum_possible: i64,
    pub range_width: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummaryView {
    pub final_score: i64,
    pub base_score: i64,
    pub score_range: ScoreRange,
    pub score_grade: &'static str,
    pub improvement_potential: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightConfiguration {
    pub custom_weights_applied: bool,
    pub weights_used: PerFactor<f64>,
    pub weights_normalized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationMetadata {
    pub calculation_date: String,
    pub dynamic_range_applied: bool,
    pub behavioral_adjustments_applied: bool,
    pub algorithm_version: &'static str,
}

/// Success body of both score endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub pan_card_number: String,
    pub customer: ContactCard,
    pub cibil_score_summary: ScoreSummaryView,
    pub weight_configuration: WeightConfiguration,
    pub detailed_breakdown: ScoreBreakdown,
    pub calculation_metadata: CalculationMetadata,
}

impl ScoreResponse {
    pub fn new(
        pan_card_number: String,
        customer: &Customer,
        recorded: &CibilScore,
        outcome: ScoreOutcome,
        custom_weights_applied: bool,
    ) -> Self {
        let breakdown = outcome.breakdown;
        let range = breakdown.dynamic_range;
        Self {
            pan_card_number,
            customer: ContactCard {
                full_name: customer.full_name.clone(),
                email: customer.email.clone(),
                phone: customer.phone_number.clone(),
                pan_card_number: customer.pan_card_number.clone(),
            },
            cibil_score_summary: ScoreSummaryView {
                final_score: breakdown.final_cibil_score,
                base_score: breakdown.base_cibil_score,
                score_range: ScoreRange {
                    minimum_possible: range.min_score,
                    maximum_possible: range.max_score,
                    range_width: range.range_width,
                },
                score_grade: cibil_grade(breakdown.final_cibil_score),
                improvement_potential: breakdown.summary.improvement_potential,
            },
            weight_configuration: WeightConfiguration {
                custom_weights_applied,
                weights_used: breakdown.custom_weights,
                weights_normalized: true,
            },
            calculation_metadata: CalculationMetadata {
                calculation_date: recorded.score_date.to_rfc3339(),
                dynamic_range_applied: true,
                behavioral_adjustments_applied: true,
                algorithm_version: ALGORITHM_VERSION,
            },
            detailed_breakdown: breakdown,
        }
    }
}

/// Aggregates shown at the top of the customer dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_bank_accounts: usize,
    pub active_credit_cards: usize,
    pub active_loans: usize,
    pub total_credit_limit: f64,
    pub total_credit_used: f64,
    pub credit_utilization_ratio: f64,
    pub total_loan_outstanding: f64,
}

impl DashboardSummary {
    pub fn from_records(
        bank_accounts: &[BankAccount],
        credit_cards: &[CreditCard],
        loans: &[Loan],
    ) -> Self {
        let active_cards: Vec<&CreditCard> = credit_cards.iter().filter(|c| c.is_active).collect();
        let active_loans: Vec<&Loan> = loans.iter().filter(|l| l.is_active()).collect();

        let limit: Decimal = active_cards.iter().map(|c| c.credit_limit).sum();
        let used: Decimal = active_cards.iter().map(|c| c.current_balance).sum();
        let outstanding: Decimal = active_loans.iter().map(|l| l.outstanding_amount).sum();
        let ratio = if limit > Decimal::ZERO {
            (used / limit * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Self {
            total_bank_accounts: bank_accounts.len(),
            active_credit_cards: active_cards.len(),
            active_loans: active_loans.len(),
            total_credit_limit: limit.to_f64().unwrap_or(0.0),
            total_credit_used: used.to_f64().unwrap_or(0.0),
            credit_utilization_ratio: ratio.to_f64().unwrap_or(0.0),
            total_loan_outstanding: outstanding.to_f64().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub customer: CustomerView,
    pub summary: DashboardSummary,
    pub bank_accounts: Vec<BankAccount>,
    pub credit_cards: Vec<CreditCardView>,
    pub loans: Vec<Loan>,
    pub recent_payments: Vec<PaymentHistory>,
    pub latest_cibil_score: Option<CibilScoreView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub customer: String,
    pub pan_card_number: String,
    pub score_history: Vec<CibilScoreView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub message: &'static str,
    pub customer: CustomerView,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{CardType, LoanStatus, LoanType};
    use chrono::{NaiveDate, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
    }

    fn card(limit: i64, balance: i64, active: bool) -> CreditCard {
        CreditCard {
            id: "k".into(),
            customer_id: "c".into(),
            bank_name: "HDFC".into(),
            card_number_last_four: "4321".into(),
            card_type: CardType::Rupay,
            credit_limit: Decimal::from(limit),
            current_balance: Decimal::from(balance),
            available_credit: Decimal::from(limit - balance),
            card_issued_date: day(),
            expiry_date: day(),
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn loan(outstanding: i64, status: LoanStatus) -> Loan {
        Loan {
            id: "l".into(),
            customer_id: "c".into(),
            bank_name: "SBI".into(),
            loan_account_number: "LN1".into(),
            loan_type: LoanType::CarLoan,
            principal_amount: Decimal::from(500_000),
            outstanding_amount: Decimal::from(outstanding),
            emi_amount: Decimal::from(10_000),
            interest_rate: Decimal::new(950, 2),
            tenure_months: 60,
            remaining_tenure: 30,
            loan_start_date: day(),
            loan_end_date: day(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn dashboard_summary_counts_only_active_records() {
        let cards = [card(100_000, 25_000, true), card(50_000, 50_000, false)];
        let loans = [
            loan(240_000, LoanStatus::Active),
            loan(90_000, LoanStatus::Closed),
        ];
        let summary = DashboardSummary::from_records(&[], &cards, &loans);
        assert_eq!(
            summary,
            DashboardSummary {
                total_bank_accounts: 0,
                active_credit_cards: 1,
                active_loans: 1,
                total_credit_limit: 100_000.0,
                total_credit_used: 25_000.0,
                credit_utilization_ratio: 25.0,
                total_loan_outstanding: 240_000.0,
            }
        );
    }

    #[test]
    fn card_view_flattens_with_utilization() {
        let view = CreditCardView::from(card(3_000, 1_000, true));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["utilization_percentage"], 33.33);
        assert_eq!(json["card_type"], "RUPAY");
        assert_eq!(json["customer"], "c");
    }
}

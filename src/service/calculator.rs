//! Dynamic CIBIL scoring.
//!
//! Five factor scores on a 0-100 scale are combined with the caller's weights,
//! scaled by a behavioral multiplier and mapped onto a score range that widens
//! or narrows with the maturity of the customer's credit profile.

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::HashSet;

use super::grading::factor_rating;
use super::profile::CreditProfile;
use super::round_to;
use super::weights::{Factor, PerFactor, ScoreWeights};
use crate::db::models::{LoanType, PaymentStatus};

const BASE_MIN_SCORE: f64 = 200.0;
const BASE_MAX_SCORE: f64 = 1000.0;
const FLOOR_SCORE: i64 = 150;
const CEILING_SCORE: i64 = 1200;
const SIGMOID_STEEPNESS: f64 = 8.0;
const RECENT_WINDOW_DAYS: i64 = 180;
const GROWTH_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DynamicRange {
    pub min_score: i64,
    pub max_score: i64,
    pub range_multiplier: f64,
    pub range_width: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BehavioralAdjustments {
    pub total_multiplier: f64,
    pub underutilization_penalty: f64,
    pub diversity_adjustment: f64,
    pub consistency_adjustment: f64,
    pub growth_adjustment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorContribution {
    pub weight_percentage: f64,
    pub raw_score: f64,
    pub weighted_contribution: f64,
    pub score_rating: &'static str,
    pub contribution_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub base_total_score: f64,
    pub adjusted_total_score: f64,
    pub improvement_potential: f64,
    pub score_range_width: i64,
}

/// Full explanation of one score computation, as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub final_cibil_score: i64,
    pub base_cibil_score: i64,
    pub dynamic_range: DynamicRange,
    pub custom_weights: PerFactor<f64>,
    pub behavioral_adjustments: BehavioralAdjustments,
    pub score_factors: PerFactor<FactorContribution>,
    pub summary: ScoreSummary,
}

/// Account counts and balances stored alongside each score.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountMetrics {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub total_credit_limit: Decimal,
    pub total_outstanding: Decimal,
    /// Active card balance over active card limit, in percent (2 dp).
    pub credit_utilization_ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub weights: ScoreWeights,
    pub factor_scores: PerFactor<f64>,
    pub metrics: AccountMetrics,
    pub breakdown: ScoreBreakdown,
}

impl ScoreOutcome {
    pub fn final_score(&self) -> i64 {
        self.breakdown.final_cibil_score
    }
}

pub struct ScoreCalculator<'a> {
    profile: &'a CreditProfile,
    weights: ScoreWeights,
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

impl<'a> ScoreCalculator<'a> {
    pub fn new(profile: &'a CreditProfile, weights: ScoreWeights) -> Self {
        Self { profile, weights }
    }

    pub fn evaluate(&self) -> ScoreOutcome {
        let factor_scores = self.factor_scores();
        let contributions = factor_scores.map(|f, raw| raw * self.weights.get(f));
        let base_total: f64 = contributions.iter().map(|(_, c)| c).sum();

        let behavioral = self.behavioral_adjustments();
        let adjusted_total = base_total * behavioral.total_multiplier;

        let range = self.dynamic_range();
        let base_cibil_score = convert_to_dynamic_scale(base_total, &range);
        let final_cibil_score = convert_to_dynamic_scale(adjusted_total, &range);

        let score_factors = factor_scores.map(|f, raw| {
            let contribution = contributions.get(f);
            FactorContribution {
                weight_percentage: round_to(self.weights.get(f) * 100.0, 1),
                raw_score: round_to(raw, 2),
                weighted_contribution: round_to(contribution, 2),
                score_rating: factor_rating(raw),
                contribution_percentage: if adjusted_total > 0.0 {
                    round_to(contribution / adjusted_total * 100.0, 1)
                } else {
                    0.0
                },
            }
        });

        let breakdown = ScoreBreakdown {
            final_cibil_score,
            base_cibil_score,
            dynamic_range: range,
            custom_weights: self.weights.as_percentages(),
            behavioral_adjustments: behavioral,
            score_factors,
            summary: ScoreSummary {
                base_total_score: round_to(base_total, 2),
                adjusted_total_score: round_to(adjusted_total, 2),
                improvement_potential: round_to(100.0 - base_total, 2),
                score_range_width: range.range_width,
            },
        };

        ScoreOutcome {
            weights: self.weights,
            factor_scores,
            metrics: self.metrics(),
            breakdown,
        }
    }

    pub fn factor_scores(&self) -> PerFactor<f64> {
        PerFactor::from_fn(|factor| match factor {
            Factor::PaymentHistory => self.payment_history_score(),
            Factor::CreditUtilization => self.credit_utilization_score(),
            Factor::CreditHistoryLength => self.credit_history_length_score(),
            Factor::CreditMix => self.credit_mix_score(),
            Factor::NewCredit => self.new_credit_score(),
        })
    }

    fn payment_history_score(&self) -> f64 {
        let payments = &self.profile.payments;
        if payments.is_empty() {
            return 50.0;
        }
        let total = payments.len() as f64;
        let on_time = payments
            .iter()
            .filter(|p| p.payment_status == PaymentStatus::OnTime)
            .count() as f64;
        let late = payments.iter().filter(|p| p.payment_status.is_late()).count() as f64;
        let missed = payments
            .iter()
            .filter(|p| p.payment_status.is_missed())
            .count() as f64;

        let score = (on_time / total) * 100.0 - (late / total) * 30.0 - (missed / total) * 50.0;
        round_to(score.max(0.0), 2)
    }

    fn credit_utilization_score(&self) -> f64 {
        if !self.profile.has_active_card() {
            return 70.0;
        }
        let (limit, balance) = self.profile.active_card_totals();
        if limit.is_zero() {
            return 70.0;
        }
        match to_f64(balance / limit) {
            r if r <= 0.05 => 95.0,
            r if r <= 0.10 => 100.0,
            r if r <= 0.30 => 85.0,
            r if r <= 0.50 => 65.0,
            r if r <= 0.70 => 45.0,
            r if r <= 0.90 => 25.0,
            _ => 10.0,
        }
    }

    fn credit_history_length_score(&self) -> f64 {
        if self.profile.oldest_account_date().is_none() {
            return 30.0;
        }
        match self.profile.credit_age_years() {
            y if y >= 10.0 => 100.0,
            y if y >= 7.0 => 85.0,
            y if y >= 5.0 => 70.0,
            y if y >= 3.0 => 55.0,
            y if y >= 1.0 => 40.0,
            _ => 25.0,
        }
    }

    fn active_loan_types(&self) -> HashSet<LoanType> {
        self.profile.active_loans().map(|l| l.loan_type).collect()
    }

    fn credit_mix_score(&self) -> f64 {
        let loan_types = self.active_loan_types();
        let mut score = 0.0;
        if self.profile.has_active_card() {
            score += 30.0;
        }
        if self.profile.has_active_bank_account() {
            score += 20.0;
        }
        if loan_types.contains(&LoanType::HomeLoan) {
            score += 25.0;
        }
        if loan_types.contains(&LoanType::CarLoan) {
            score += 15.0;
        }
        if loan_types.contains(&LoanType::PersonalLoan) {
            score += 10.0;
        }
        f64::min(100.0, score)
    }

    fn new_credit_score(&self) -> f64 {
        let since = self.profile.as_of - Duration::days(RECENT_WINDOW_DAYS);
        let recent_loans = self
            .profile
            .loans
            .iter()
            .filter(|l| l.created_at >= since)
            .count();
        let recent_cards = self
            .profile
            .credit_cards
            .iter()
            .filter(|c| c.created_at >= since)
            .count();
        match recent_loans + recent_cards {
            0 => 100.0,
            1 => 80.0,
            2 => 60.0,
            3 | 4 => 40.0,
            _ => 20.0,
        }
    }

    fn account_diversity_score(&self) -> f64 {
        let mut score = 0.0;
        if self.profile.has_active_card() {
            score += 25.0;
        }
        score += self.active_loan_types().len() as f64 * 15.0;
        if self.profile.has_active_bank_account() {
            score += 20.0;
        }
        f64::min(100.0, score)
    }

    /// On-time share of payments made in the recent window, in percent.
    /// Fewer than three recent payments is treated as a neutral 50.
    fn payment_consistency_score(&self) -> f64 {
        let since = (self.profile.as_of - Duration::days(RECENT_WINDOW_DAYS)).date_naive();
        let recent: Vec<_> = self
            .profile
            .payments
            .iter()
            .filter(|p| p.payment_date.is_some_and(|d| d >= since))
            .collect();
        if recent.len() < 3 {
            return 50.0;
        }
        let on_time = recent
            .iter()
            .filter(|p| p.payment_status == PaymentStatus::OnTime)
            .count();
        on_time as f64 / recent.len() as f64 * 100.0
    }

    fn credit_growth_score(&self) -> f64 {
        let cutoff = self.profile.as_of - Duration::days(GROWTH_WINDOW_DAYS);
        let (current_limit, _) = self.profile.active_card_totals();
        let old_limit: Decimal = self
            .profile
            .credit_cards
            .iter()
            .filter(|c| c.created_at <= cutoff)
            .map(|c| c.credit_limit)
            .sum();
        if old_limit <= Decimal::ZERO {
            return 60.0;
        }
        let old = to_f64(old_limit);
        let growth = (to_f64(current_limit) - old) / old;
        if (0.10..=0.50).contains(&growth) {
            85.0
        } else if (0.05..0.10).contains(&growth) || (growth > 0.50 && growth <= 0.80) {
            70.0
        } else {
            50.0
        }
    }

    pub fn dynamic_range(&self) -> DynamicRange {
        let years = self.profile.credit_age_years();
        let total_limit = to_f64(self.profile.active_card_totals().0);
        let diversity = self.account_diversity_score();

        let mut multiplier = 1.0;
        if years >= 10.0 {
            multiplier += 0.2;
        } else if years >= 5.0 {
            multiplier += 0.1;
        } else if years < 1.0 {
            multiplier -= 0.1;
        }

        if total_limit > 500_000.0 {
            multiplier += 0.15;
        } else if total_limit > 100_000.0 {
            multiplier += 0.05;
        } else if total_limit < 25_000.0 {
            multiplier -= 0.05;
        }

        if diversity >= 80.0 {
            multiplier += 0.1;
        } else if diversity < 40.0 {
            multiplier -= 0.05;
        }

        let expansion = (BASE_MAX_SCORE - BASE_MIN_SCORE) * (multiplier - 1.0);
        let min_score = FLOOR_SCORE.max((BASE_MIN_SCORE - expansion / 2.0) as i64);
        let max_score = CEILING_SCORE.min((BASE_MAX_SCORE + expansion / 2.0) as i64);

        DynamicRange {
            min_score,
            max_score,
            range_multiplier: round_to(multiplier, 3),
            range_width: max_score - min_score,
        }
    }

    fn underutilization_penalty(&self) -> f64 {
        if !self.profile.has_active_card() {
            return 1.0;
        }
        let (limit, balance) = self.profile.active_card_totals();
        if limit <= Decimal::ZERO {
            return 1.0;
        }
        let utilization = to_f64(balance / limit);
        let limit = to_f64(limit);
        if utilization < 0.05 && limit > 100_000.0 {
            0.85
        } else if utilization < 0.02 && limit > 50_000.0 {
            0.92
        } else if utilization < 0.01 && limit > 25_000.0 {
            0.95
        } else {
            1.0
        }
    }

    fn diversity_adjustment(&self) -> f64 {
        match self.account_diversity_score() {
            d if d >= 80.0 => 1.05,
            d if d >= 60.0 => 1.02,
            d if d < 30.0 => 0.95,
            _ => 1.0,
        }
    }

    fn consistency_adjustment(&self) -> f64 {
        match self.payment_consistency_score() {
            c if c >= 90.0 => 1.03,
            c if c >= 75.0 => 1.01,
            c if c < 50.0 => 0.97,
            _ => 1.0,
        }
    }

    fn growth_adjustment(&self) -> f64 {
        match self.credit_growth_score() {
            g if (70.0..=85.0).contains(&g) => 1.02,
            g if !(30.0..=90.0).contains(&g) => 0.98,
            _ => 1.0,
        }
    }

    pub fn behavioral_adjustments(&self) -> BehavioralAdjustments {
        let underutilization_penalty = self.underutilization_penalty();
        let diversity_adjustment = self.diversity_adjustment();
        let consistency_adjustment = self.consistency_adjustment();
        let growth_adjustment = self.growth_adjustment();

        let mut multiplier = 1.0;
        multiplier *= underutilization_penalty;
        multiplier *= diversity_adjustment;
        multiplier *= consistency_adjustment;
        multiplier *= growth_adjustment;

        BehavioralAdjustments {
            total_multiplier: round_to(multiplier, 4),
            underutilization_penalty,
            diversity_adjustment,
            consistency_adjustment,
            growth_adjustment,
        }
    }

    pub fn metrics(&self) -> AccountMetrics {
        let profile = self.profile;
        let total_accounts =
            profile.loans.len() + profile.credit_cards.len() + profile.bank_accounts.len();
        let active_accounts = profile.active_loans().count()
            + profile.active_cards().count()
            + profile.bank_accounts.iter().filter(|a| a.is_active).count();

        let (card_limit, card_balance) = profile.active_card_totals();
        let loan_outstanding: Decimal = profile.active_loans().map(|l| l.outstanding_amount).sum();

        let credit_utilization_ratio = if card_limit > Decimal::ZERO {
            (card_balance / card_limit * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };

        AccountMetrics {
            total_accounts: total_accounts as i64,
            active_accounts: active_accounts as i64,
            total_credit_limit: card_limit,
            total_outstanding: card_balance + loan_outstanding,
            credit_utilization_ratio,
        }
    }
}

/// Map a 0-100 score onto `range` through a sigmoid, compressing the low end
/// and stretching the high end slightly.
pub fn convert_to_dynamic_scale(score: f64, range: &DynamicRange) -> i64 {
    let normalized = score.clamp(0.0, 100.0) / 100.0;
    let sigmoid = 1.0 / (1.0 + (-SIGMOID_STEEPNESS * (normalized - 0.5)).exp());
    let shaped = if normalized < 0.5 {
        sigmoid.powf(1.2)
    } else {
        sigmoid.powf(0.9)
    };
    let width = (range.max_score - range.min_score) as f64;
    let mapped = (range.min_score as f64 + shaped * width) as i64;
    mapped.clamp(range.min_score, range.max_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        AccountType, BankAccount, CardType, CreditCard, Loan, LoanStatus, PaymentHistory,
        PaymentType, generate_id,
    };
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn bank(opened: NaiveDate) -> BankAccount {
        BankAccount {
            id: generate_id(),
            customer_id: "c".into(),
            bank_name: "SBI".into(),
            account_number: "000111".into(),
            account_type: AccountType::Savings,
            ifsc_code: "SBIN0000001".into(),
            account_opened_date: opened,
            current_balance: Decimal::from(50_000),
            is_active: true,
            created_at: long_ago(),
        }
    }

    fn card(limit: i64, balance: i64, created_at: DateTime<Utc>) -> CreditCard {
        CreditCard {
            id: generate_id(),
            customer_id: "c".into(),
            bank_name: "HDFC".into(),
            card_number_last_four: "4242".into(),
            card_type: CardType::Visa,
            credit_limit: Decimal::from(limit),
            current_balance: Decimal::from(balance),
            available_credit: Decimal::from(limit - balance),
            card_issued_date: date(2018, 3, 1),
            expiry_date: date(2028, 3, 1),
            is_active: true,
            created_at,
        }
    }

    fn loan(loan_type: LoanType, outstanding: i64) -> Loan {
        Loan {
            id: generate_id(),
            customer_id: "c".into(),
            bank_name: "ICICI".into(),
            loan_account_number: "LN-1".into(),
            loan_type,
            principal_amount: Decimal::from(outstanding * 2),
            outstanding_amount: Decimal::from(outstanding),
            emi_amount: Decimal::from(10_000),
            interest_rate: Decimal::new(875, 2),
            tenure_months: 120,
            remaining_tenure: 60,
            loan_start_date: date(2016, 5, 1),
            loan_end_date: date(2026, 5, 1),
            status: LoanStatus::Active,
            created_at: long_ago(),
        }
    }

    fn payment(status: PaymentStatus, paid_on: Option<NaiveDate>) -> PaymentHistory {
        PaymentHistory {
            id: generate_id(),
            customer_id: "c".into(),
            loan_id: None,
            credit_card_id: None,
            payment_type: PaymentType::LoanEmi,
            due_date: date(2025, 5, 1),
            payment_date: paid_on,
            due_amount: Decimal::from(10_000),
            paid_amount: Decimal::from(10_000),
            payment_status: status,
            days_late: 0,
            created_at: long_ago(),
        }
    }

    #[test]
    fn empty_profile_uses_neutral_factor_scores() {
        let profile = CreditProfile::empty(as_of());
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        let scores = calc.factor_scores();
        assert_eq!(scores.get(Factor::PaymentHistory), 50.0);
        assert_eq!(scores.get(Factor::CreditUtilization), 70.0);
        assert_eq!(scores.get(Factor::CreditHistoryLength), 30.0);
        assert_eq!(scores.get(Factor::CreditMix), 0.0);
        assert_eq!(scores.get(Factor::NewCredit), 100.0);
    }

    #[test]
    fn empty_profile_scores_deterministically() {
        let profile = CreditProfile::empty(as_of());
        let outcome = ScoreCalculator::new(&profile, ScoreWeights::default()).evaluate();
        let b = &outcome.breakdown;

        assert_eq!(b.dynamic_range.min_score, 280);
        assert_eq!(b.dynamic_range.max_score, 920);
        assert_eq!(b.dynamic_range.range_multiplier, 0.8);
        assert_eq!(b.behavioral_adjustments.diversity_adjustment, 0.95);
        assert_eq!(b.behavioral_adjustments.total_multiplier, 0.95);
        assert_eq!(b.summary.base_total_score, 53.0);
        assert_eq!(b.summary.adjusted_total_score, 50.35);
        assert_eq!(b.summary.improvement_potential, 47.0);
        assert_eq!(b.base_cibil_score, 659);
        assert_eq!(b.final_cibil_score, 627);
        assert_eq!(outcome.metrics.total_accounts, 0);
        assert_eq!(outcome.metrics.credit_utilization_ratio, Decimal::ZERO);
    }

    #[test]
    fn established_profile_scores_high() {
        let now = as_of();
        let mut profile = CreditProfile::empty(now);
        profile.bank_accounts.push(bank(date(2012, 1, 15)));
        profile.credit_cards.push(card(300_000, 24_000, long_ago()));
        profile.credit_cards.push(card(300_000, 30_000, long_ago()));
        profile.loans.push(loan(LoanType::HomeLoan, 1_500_000));
        profile.loans.push(loan(LoanType::CarLoan, 200_000));
        for days_ago in [20, 50, 80, 110] {
            let paid = (now - Duration::days(days_ago)).date_naive();
            profile.payments.push(payment(PaymentStatus::OnTime, Some(paid)));
        }

        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        let scores = calc.factor_scores();
        assert_eq!(scores.get(Factor::PaymentHistory), 100.0);
        // 54k / 600k = 9% utilization
        assert_eq!(scores.get(Factor::CreditUtilization), 100.0);
        assert_eq!(scores.get(Factor::CreditHistoryLength), 100.0);
        assert_eq!(scores.get(Factor::CreditMix), 90.0);
        assert_eq!(scores.get(Factor::NewCredit), 100.0);

        let outcome = calc.evaluate();
        let b = &outcome.breakdown;
        // 13+ years, 600k active limit, diversity 75
        assert_eq!(b.dynamic_range.range_multiplier, 1.35);
        assert_eq!(b.dynamic_range.min_score, 150);
        assert_eq!(b.dynamic_range.max_score, 1140);
        assert_eq!(b.behavioral_adjustments.diversity_adjustment, 1.02);
        assert_eq!(b.behavioral_adjustments.consistency_adjustment, 1.03);
        assert_eq!(b.behavioral_adjustments.growth_adjustment, 1.0);
        assert_eq!(b.behavioral_adjustments.total_multiplier, 1.0506);
        assert_eq!(b.summary.base_total_score, 99.0);
        assert_eq!(b.base_cibil_score, 1122);
        assert_eq!(b.final_cibil_score, 1123);

        assert_eq!(outcome.metrics.total_accounts, 5);
        assert_eq!(outcome.metrics.active_accounts, 5);
        assert_eq!(outcome.metrics.total_credit_limit, Decimal::from(600_000));
        assert_eq!(outcome.metrics.total_outstanding, Decimal::from(1_754_000));
        assert_eq!(outcome.metrics.credit_utilization_ratio, Decimal::new(900, 2));
    }

    #[test]
    fn late_and_missed_payments_are_penalized() {
        let mut profile = CreditProfile::empty(as_of());
        profile.payments.push(payment(PaymentStatus::OnTime, None));
        profile.payments.push(payment(PaymentStatus::OnTime, None));
        profile.payments.push(payment(PaymentStatus::Late31To60, None));
        profile.payments.push(payment(PaymentStatus::Defaulted, None));
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        // 50 - 7.5 - 12.5
        assert_eq!(calc.factor_scores().get(Factor::PaymentHistory), 30.0);
    }

    #[test]
    fn utilization_bands() {
        let cases = [
            (1_000, 95.0),
            (8_000, 100.0),
            (25_000, 85.0),
            (45_000, 65.0),
            (60_000, 45.0),
            (85_000, 25.0),
            (99_000, 10.0),
        ];
        for (balance, expected) in cases {
            let mut profile = CreditProfile::empty(as_of());
            profile.credit_cards.push(card(100_000, balance, long_ago()));
            let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
            assert_eq!(
                calc.factor_scores().get(Factor::CreditUtilization),
                expected,
                "balance {balance}"
            );
        }
    }

    #[test]
    fn inactive_cards_do_not_count_toward_utilization() {
        let mut profile = CreditProfile::empty(as_of());
        let mut c = card(100_000, 99_000, long_ago());
        c.is_active = false;
        profile.credit_cards.push(c);
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        assert_eq!(calc.factor_scores().get(Factor::CreditUtilization), 70.0);
    }

    #[test]
    fn recently_opened_accounts_lower_new_credit_score() {
        let now = as_of();
        let mut profile = CreditProfile::empty(now);
        profile.credit_cards.push(card(50_000, 0, now - Duration::days(10)));
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        assert_eq!(calc.factor_scores().get(Factor::NewCredit), 80.0);

        profile.credit_cards.push(card(50_000, 0, now - Duration::days(30)));
        profile.credit_cards.push(card(50_000, 0, now - Duration::days(40)));
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        assert_eq!(calc.factor_scores().get(Factor::NewCredit), 40.0);
    }

    #[test]
    fn heavy_underutilization_of_large_limits_is_penalized() {
        let mut profile = CreditProfile::empty(as_of());
        profile.credit_cards.push(card(200_000, 1_000, long_ago()));
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        assert_eq!(calc.behavioral_adjustments().underutilization_penalty, 0.85);
    }

    #[test]
    fn credit_growth_within_optimal_band_earns_bonus() {
        let now = as_of();
        let mut profile = CreditProfile::empty(now);
        profile.credit_cards.push(card(100_000, 10_000, long_ago()));
        profile
            .credit_cards
            .push(card(30_000, 3_000, now - Duration::days(30)));
        // 130k now versus 100k a year ago: 30% growth
        let calc = ScoreCalculator::new(&profile, ScoreWeights::default());
        assert_eq!(calc.behavioral_adjustments().growth_adjustment, 1.02);
    }

    #[test]
    fn custom_weights_shift_the_score() {
        let mut profile = CreditProfile::empty(as_of());
        for _ in 0..4 {
            profile.payments.push(payment(PaymentStatus::Missed, None));
        }
        let default = ScoreCalculator::new(&profile, ScoreWeights::default()).evaluate();
        let heavy = serde_json::json!({"payment_history": 90});
        let weights = ScoreWeights::from_custom(Some(&heavy)).unwrap();
        let weighted = ScoreCalculator::new(&profile, weights).evaluate();
        assert!(weighted.final_score() < default.final_score());
        assert_eq!(
            weighted.breakdown.score_factors.get(Factor::PaymentHistory).raw_score,
            0.0
        );
    }

    #[test]
    fn scale_conversion_is_monotonic_and_bounded() {
        let range = DynamicRange {
            min_score: 200,
            max_score: 1000,
            range_multiplier: 1.0,
            range_width: 800,
        };
        let mut previous = i64::MIN;
        for step in 0..=100 {
            let converted = convert_to_dynamic_scale(step as f64, &range);
            assert!(converted >= previous);
            assert!((200..=1000).contains(&converted));
            previous = converted;
        }
        assert_eq!(convert_to_dynamic_scale(-20.0, &range), convert_to_dynamic_scale(0.0, &range));
        assert_eq!(
            convert_to_dynamic_scale(150.0, &range),
            convert_to_dynamic_scale(100.0, &range)
        );
    }
}

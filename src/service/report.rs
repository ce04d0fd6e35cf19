use rust_decimal::Decimal;

use super::grading::score_category;
use crate::db::models::{CibilScore, Customer};

/// Report content generated for a freshly recorded score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub report_summary: String,
    pub recommendations: String,
    pub risk_factors: String,
    pub positive_factors: String,
}

/// Render an amount with thousands separators and two decimals, e.g. `1,754,000.00`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac}")
}

pub fn draft_report(customer: &Customer, score: &CibilScore) -> ReportDraft {
    let category = score_category(score.score);
    let report_summary = [
        format!("CIBIL Score Report for {}", customer.full_name),
        format!("PAN: {}", customer.pan_card_number),
        format!("Score: {} ({category})", score.score),
        format!("Report Date: {}", score.score_date.format("%Y-%m-%d")),
        String::new(),
        "Score Breakdown:".to_string(),
        format!(
            "- Payment History: {}% (Weight: 35%)",
            score.payment_history_score
        ),
        format!(
            "- Credit Utilization: {}% (Weight: 30%)",
            score.credit_utilization_score
        ),
        format!(
            "- Credit History Length: {}% (Weight: 15%)",
            score.credit_history_length_score
        ),
        format!("- Credit Mix: {}% (Weight: 10%)", score.credit_mix_score),
        format!("- New Credit: {}% (Weight: 10%)", score.new_credit_score),
        String::new(),
        "Account Summary:".to_string(),
        format!("- Total Accounts: {}", score.total_accounts),
        format!("- Active Accounts: {}", score.active_accounts),
        format!(
            "- Total Credit Limit: ₹{}",
            format_amount(score.total_credit_limit)
        ),
        format!(
            "- Total Outstanding: ₹{}",
            format_amount(score.total_outstanding)
        ),
        format!(
            "- Credit Utilization: {}%",
            score.credit_utilization_ratio
        ),
    ]
    .join("\n");

    let mut recommendations = Vec::new();
    let mut risk_factors = Vec::new();
    let mut positive_factors = Vec::new();

    if score.payment_history_score < Decimal::from(70) {
        risk_factors.push("Payment history needs improvement");
        recommendations.push("Make all payments on time to improve payment history");
    } else {
        positive_factors.push("Good payment history");
    }

    if score.credit_utilization_ratio > Decimal::from(30) {
        risk_factors.push("High credit utilization");
        recommendations.push("Reduce credit card balances to below 30% of limit");
    } else {
        positive_factors.push("Good credit utilization");
    }

    if score.credit_history_length_score < Decimal::from(50) {
        risk_factors.push("Short credit history");
        recommendations.push("Maintain old accounts to build credit history");
    }

    if score.credit_mix_score < Decimal::from(50) {
        recommendations.push("Consider diversifying credit types");
    }

    ReportDraft {
        report_summary,
        recommendations: recommendations.join("; "),
        risk_factors: risk_factors.join("; "),
        positive_factors: positive_factors.join("; "),
    }
}

//! Single writer for recorded scores.
//!
//! Every persisted score passes through one actor so that demoting the previous
//! latest score and inserting the new one never interleave for a customer.

use crate::db::CibilStorage;
use crate::db::models::{
    CibilReport, CibilScore, Customer, REPORT_VERSION, generate_id, money,
};
use crate::error::CibilError;
use crate::service::calculator::ScoreOutcome;
use crate::service::report::draft_report;
use crate::service::weights::Factor;

use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{error, info};

/// Messages handled by the score ledger actor.
#[derive(Debug)]
pub enum LedgerMessage {
    /// Persist a computed outcome as the customer's latest score, with its report.
    Record {
        customer: Customer,
        outcome: Box<ScoreOutcome>,
        reply: RpcReplyPort<Result<(CibilScore, CibilReport), CibilError>>,
    },
}

/// Handle for interacting with the score ledger actor.
#[derive(Clone)]
pub struct LedgerHandle {
    actor: ActorRef<LedgerMessage>,
}

impl LedgerHandle {
    /// Record `outcome` for `customer`; resolves once the row is committed.
    pub async fn record(
        &self,
        customer: Customer,
        outcome: ScoreOutcome,
    ) -> Result<(CibilScore, CibilReport), CibilError> {
        let outcome = Box::new(outcome);
        ractor::call!(self.actor, |reply| LedgerMessage::Record {
            customer,
            outcome,
            reply
        })
        .map_err(|e| CibilError::Ledger(format!("Record RPC failed: {e}")))?
    }
}

fn factor_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| money(d.round_dp(2)))
        .unwrap_or_default()
}

/// Build the score row and its report for one outcome.
pub fn score_record(customer: &Customer, outcome: &ScoreOutcome) -> (CibilScore, CibilReport) {
    let factors = &outcome.factor_scores;
    let metrics = &outcome.metrics;
    let score = CibilScore {
        id: generate_id(),
        customer_id: customer.id.clone(),
        score: outcome.final_score(),
        payment_history_score: factor_decimal(factors.get(Factor::PaymentHistory)),
        credit_utilization_score: factor_decimal(factors.get(Factor::CreditUtilization)),
        credit_history_length_score: factor_decimal(factors.get(Factor::CreditHistoryLength)),
        credit_mix_score: factor_decimal(factors.get(Factor::CreditMix)),
        new_credit_score: factor_decimal(factors.get(Factor::NewCredit)),
        total_accounts: metrics.total_accounts,
        active_accounts: metrics.active_accounts,
        total_credit_limit: money(metrics.total_credit_limit),
        total_outstanding: money(metrics.total_outstanding),
        credit_utilization_ratio: money(metrics.credit_utilization_ratio),
        score_date: Utc::now(),
        is_latest: true,
    };

    let draft = draft_report(customer, &score);
    let report = CibilReport {
        id: generate_id(),
        customer_id: customer.id.clone(),
        cibil_score_id: score.id.clone(),
        report_summary: draft.report_summary,
        recommendations: draft.recommendations,
        risk_factors: draft.risk_factors,
        positive_factors: draft.positive_factors,
        generated_at: score.score_date,
        report_version: REPORT_VERSION.to_string(),
    };
    (score, report)
}

struct ScoreLedgerState {
    storage: CibilStorage,
    recorded: u64,
}

struct ScoreLedger;

#[ractor::async_trait]
impl Actor for ScoreLedger {
    type Msg = LedgerMessage;
    type State = ScoreLedgerState;
    type Arguments = CibilStorage;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        storage: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("ScoreLedger started");
        Ok(ScoreLedgerState {
            storage,
            recorded: 0,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            LedgerMessage::Record {
                customer,
                outcome,
                reply,
            } => {
                let (score, report) = score_record(&customer, &outcome);
                let result = match state.storage.record_score(&score, &report).await {
                    Ok(()) => {
                        state.recorded += 1;
                        info!(
                            pan = %customer.pan_card_number,
                            score = score.score,
                            recorded = state.recorded,
                            "score recorded"
                        );
                        Ok((score, report))
                    }
                    Err(e) => {
                        error!(pan = %customer.pan_card_number, error = %e, "score record failed");
                        Err(e)
                    }
                };
                let _ = reply.send(result);
            }
        }
        Ok(())
    }
}

/// Spawn the ledger actor over `storage`.
///
/// The actor is left unnamed so that several ledgers (one per pool) can coexist
/// in one process.
pub async fn spawn(storage: CibilStorage) -> Result<LedgerHandle, CibilError> {
    let (actor, _jh) = Actor::spawn(None, ScoreLedger, storage)
        .await
        .map_err(|e| CibilError::Ledger(format!("failed to spawn ScoreLedger: {e}")))?;
    Ok(LedgerHandle { actor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::calculator::ScoreCalculator;
    use crate::service::profile::CreditProfile;
    use crate::service::weights::ScoreWeights;
    use chrono::{NaiveDate, TimeZone};

    fn customer() -> Customer {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Customer {
            id: "c1".into(),
            pan_card_number: "ABCDE1234F".into(),
            full_name: "Asha Rao".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            phone_number: "9876543210".into(),
            email: "asha@example.com".into(),
            address: "Bengaluru".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn record_carries_final_score_and_links_report() {
        let profile = CreditProfile::empty(Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap());
        let outcome = ScoreCalculator::new(&profile, ScoreWeights::default()).evaluate();
        let (score, report) = score_record(&customer(), &outcome);

        assert_eq!(score.score, outcome.final_score());
        assert!(score.is_latest);
        assert_eq!(score.customer_id, "c1");
        assert_eq!(score.total_accounts, 0);
        assert_eq!(report.cibil_score_id, score.id);
        assert_eq!(report.report_version, "1.0");
        assert!(report.report_summary.starts_with("CIBIL Score Report for Asha Rao"));
    }

    #[test]
    fn factor_scores_are_kept_to_two_places() {
        assert_eq!(factor_decimal(66.666_666), Decimal::new(6667, 2));
        assert_eq!(factor_decimal(f64::NAN), Decimal::ZERO);
    }
}

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CibilError;

/// The five scoring factors, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    PaymentHistory,
    CreditUtilization,
    CreditHistoryLength,
    CreditMix,
    NewCredit,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::PaymentHistory,
        Factor::CreditUtilization,
        Factor::CreditHistoryLength,
        Factor::CreditMix,
        Factor::NewCredit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::PaymentHistory => "payment_history",
            Factor::CreditUtilization => "credit_utilization",
            Factor::CreditHistoryLength => "credit_history_length",
            Factor::CreditMix => "credit_mix",
            Factor::NewCredit => "new_credit",
        }
    }

    pub fn parse(name: &str) -> Option<Factor> {
        Factor::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            Factor::PaymentHistory => 0.35,
            Factor::CreditUtilization => 0.30,
            Factor::CreditHistoryLength => 0.15,
            Factor::CreditMix => 0.10,
            Factor::NewCredit => 0.10,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Per-factor values keyed by [`Factor`], serialized as a JSON object in factor order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerFactor<T>([T; 5]);

impl<T: Copy> PerFactor<T> {
    pub fn from_fn(mut f: impl FnMut(Factor) -> T) -> Self {
        PerFactor(Factor::ALL.map(&mut f))
    }

    pub fn get(&self, factor: Factor) -> T {
        self.0[factor.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, T)> + '_ {
        Factor::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(Factor, T) -> U) -> PerFactor<U> {
        PerFactor::from_fn(|factor| f(factor, self.get(factor)))
    }
}

impl<T: Serialize + Copy> Serialize for PerFactor<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(5))?;
        for (factor, value) in self.iter() {
            map.serialize_entry(factor.as_str(), &value)?;
        }
        map.end()
    }
}

/// Normalized factor weights; always sum to 1.
pub type ScoreWeights = PerFactor<f64>;

impl Default for ScoreWeights {
    fn default() -> Self {
        PerFactor::from_fn(|f| f.default_weight())
    }
}

fn valid_factor_list() -> String {
    let names: Vec<String> = Factor::ALL
        .iter()
        .map(|f| format!("'{}'", f.as_str()))
        .collect();
    format!("[{}]", names.join(", "))
}

fn weight_value(factor: &str, raw: &Value) -> Result<f64, CibilError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or_else(|| {
        CibilError::validation_with(
            "Invalid weight format",
            format!("could not convert weight for {factor} to a number: {raw}"),
        )
    })
}

impl ScoreWeights {
    /// Build weights from a caller-supplied map of factor name to weight.
    ///
    /// Values above 1 are percentages (`30` means 30%), values up to 1 are
    /// fractions. Missing factors take their default weight and the whole set
    /// is rescaled to sum to 1.
    pub fn from_custom(custom: Option<&Value>) -> Result<ScoreWeights, CibilError> {
        let Some(raw) = custom else {
            return Ok(ScoreWeights::default());
        };
        let empty = Map::new();
        let entries = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(CibilError::validation_with(
                    "Invalid weight format",
                    format!("custom_weights must be an object, got {other}"),
                ));
            }
        };

        let mut provided: [Option<f64>; 5] = [None; 5];
        for (name, raw_weight) in entries {
            let Some(factor) = Factor::parse(name) else {
                return Err(CibilError::validation(format!(
                    "Invalid factor: {name}. Valid factors are: {}",
                    valid_factor_list()
                )));
            };
            let weight = weight_value(name, raw_weight)?;
            if !(0.0..=100.0).contains(&weight) {
                return Err(CibilError::validation(format!(
                    "Weight for {name} must be between 0 and 100"
                )));
            }
            provided[factor.index()] = Some(if weight > 1.0 { weight / 100.0 } else { weight });
        }

        let merged = PerFactor::from_fn(|f| provided[f.index()].unwrap_or(f.default_weight()));
        let total: f64 = merged.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(CibilError::validation(
                "At least one factor weight must be greater than 0",
            ));
        }
        if total == 1.0 {
            return Ok(merged);
        }
        Ok(merged.map(|_, w| w / total))
    }

    /// Weights as percentages rounded to one decimal place.
    pub fn as_percentages(&self) -> PerFactor<f64> {
        self.map(|_, w| super::round_to(w * 100.0, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sum(w: &ScoreWeights) -> f64 {
        w.iter().map(|(_, v)| v).sum()
    }

    #[test]
    fn absent_weights_use_defaults() {
        let w = ScoreWeights::from_custom(None).unwrap();
        assert_eq!(w.get(Factor::PaymentHistory), 0.35);
        assert_eq!(w.get(Factor::NewCredit), 0.10);
        let empty = json!({});
        let w = ScoreWeights::from_custom(Some(&empty)).unwrap();
        assert!((sum(&w) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn percentages_and_fractions_are_both_accepted() {
        let custom = json!({"payment_history": 50, "credit_utilization": "0.30"});
        let w = ScoreWeights::from_custom(Some(&custom)).unwrap();
        // 0.50 + 0.30 + 0.15 + 0.10 + 0.10 = 1.15 before normalization
        assert!((w.get(Factor::PaymentHistory) - 0.50 / 1.15).abs() < 1e-9);
        assert!((w.get(Factor::CreditUtilization) - 0.30 / 1.15).abs() < 1e-9);
        assert!((sum(&w) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_factor_is_rejected() {
        let custom = json!({"income": 20});
        let err = ScoreWeights::from_custom(Some(&custom)).unwrap_err();
        assert!(err.to_string().starts_with("Invalid factor: income."));
        assert!(err.to_string().contains("'new_credit'"));
    }

    #[test]
    fn out_of_range_and_malformed_weights_are_rejected() {
        let too_big = json!({"credit_mix": 120});
        assert_eq!(
            ScoreWeights::from_custom(Some(&too_big)).unwrap_err().to_string(),
            "Weight for credit_mix must be between 0 and 100"
        );
        let negative = json!({"credit_mix": -1});
        assert!(ScoreWeights::from_custom(Some(&negative)).is_err());
        let garbage = json!({"credit_mix": "lots"});
        assert_eq!(
            ScoreWeights::from_custom(Some(&garbage)).unwrap_err().to_string(),
            "Invalid weight format"
        );
        let not_a_map = json!([1, 2]);
        assert!(ScoreWeights::from_custom(Some(&not_a_map)).is_err());
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let zeros = json!({
            "payment_history": 0,
            "credit_utilization": 0,
            "credit_history_length": 0,
            "credit_mix": 0,
            "new_credit": 0
        });
        assert!(ScoreWeights::from_custom(Some(&zeros)).is_err());
    }

    #[test]
    fn percentages_serialize_in_factor_order() {
        let json = serde_json::to_string(&ScoreWeights::default().as_percentages()).unwrap();
        assert_eq!(
            json,
            r#"{"payment_history":35.0,"credit_utilization":30.0,"credit_history_length":15.0,"credit_mix":10.0,"new_credit":10.0}"#
        );
    }
}

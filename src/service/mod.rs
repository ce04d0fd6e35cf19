pub mod calculator;
pub mod grading;
pub mod profile;
pub mod report;
pub mod score_ledger;
pub mod weights;

/// Round half away from zero to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

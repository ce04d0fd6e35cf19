pub mod bulk;
pub mod customers;
pub mod dashboard;
pub mod financials;
pub mod health;
pub mod scores;

/// PAN values taken from the URL are matched case-insensitively.
pub(crate) fn pan_key(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

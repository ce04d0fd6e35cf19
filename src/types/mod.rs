//! Request and response payloads of the HTTP API.

pub mod requests;
pub mod responses;

use crate::error::CibilError;

/// Field-level checks run on a decoded request body before it reaches storage.
///
/// Implementations may normalize values in place (e.g. upper-casing a PAN).
pub trait Validate {
    fn validate(&mut self) -> Result<(), CibilError>;
}

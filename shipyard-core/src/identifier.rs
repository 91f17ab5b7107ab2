//! Ship identifier checks.

use crate::error::{Result, ShipyardError};

/// Parse a textual ship identifier.
///
/// The token must be a base-10 integer greater than zero. Anything else is a
/// [`ShipyardError::MalformedIdentifier`] and must not reach the store.
pub fn parse_ship_id(raw: &str) -> Result<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ShipyardError::MalformedIdentifier(raw.to_string())),
    }
}

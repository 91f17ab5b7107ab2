//! Ship rating calculation.

use chrono::{DateTime, Datelike, Utc};

/// Year the rating is measured against.
pub const RATING_BASE_YEAR: i32 = 3019;

const RATING_SCALE: usize = 2;

/// Compute the rating for a ship.
///
/// `80 * speed * k / (3019 - prod_year + 1)` where `k` is 0.5 for used ships
/// and 1 otherwise, rounded half-up to two decimals. Inputs are not checked;
/// `prod_year` must not exceed [`RATING_BASE_YEAR`].
pub fn rating(speed: f64, is_used: bool, prod_year: i32) -> f64 {
    let usage = if is_used { 0.5 } else { 1.0 };
    let age = f64::from(RATING_BASE_YEAR - prod_year + 1);
    round_half_up((80.0 * speed * usage) / age, RATING_SCALE)
}

/// Compute the rating from a production timestamp, using its UTC year.
pub fn rating_for(speed: f64, is_used: bool, prod_date: &DateTime<Utc>) -> f64 {
    rating(speed, is_used, prod_date.year())
}

/// Round to `scale` decimals, ties away from zero, based on the shortest
/// decimal representation of `value`.
fn round_half_up(value: f64, scale: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let repr = value.abs().to_string();
    let (whole, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if fraction.len() <= scale {
        return value;
    }

    let Ok(mut units) = format!("{whole}{}", &fraction[..scale]).parse::<u128>() else {
        let factor = 10f64.powi(scale as i32);
        return (value * factor).round() / factor;
    };
    if fraction.as_bytes()[scale] >= b'5' {
        units += 1;
    }

    let rounded = units as f64 / 10f64.powi(scale as i32);
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

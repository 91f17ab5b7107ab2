//! Field rules for ship candidates and patches.
//!
//! Create requires every bounded field; update checks only the fields that
//! were supplied. Every rule runs in the same pass so callers see all
//! violations at once.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Utc};

use crate::domain::{FieldViolation, ShipDraft, ShipPatch};

/// Allowed length of names and planets, in characters.
pub const TEXT_LENGTH: RangeInclusive<usize> = 1..=50;
/// Allowed production years.
pub const PROD_YEARS: RangeInclusive<i32> = 2800..=3019;
/// Allowed speeds.
pub const SPEEDS: RangeInclusive<f64> = 0.01..=0.99;
/// Allowed crew sizes.
pub const CREW_SIZES: RangeInclusive<i32> = 1..=9999;

/// Every rule a creation candidate breaks.
pub fn create_violations(candidate: &ShipDraft) -> Vec<FieldViolation> {
    [
        required("name", candidate.name.as_deref(), |name| {
            text_violation("name", name)
        }),
        required("planet", candidate.planet.as_deref(), |planet| {
            text_violation("planet", planet)
        }),
        required("shipType", candidate.ship_type.as_ref(), |_| None),
        required("prodDate", candidate.prod_date.as_ref(), prod_date_violation),
        required("speed", candidate.speed.as_ref(), |speed| {
            speed_violation(*speed)
        }),
        required("crewSize", candidate.crew_size.as_ref(), |crew_size| {
            crew_size_violation(*crew_size)
        }),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Every rule a patch breaks. Fields that were not supplied are not checked.
pub fn update_violations(patch: &ShipPatch) -> Vec<FieldViolation> {
    [
        patch
            .name
            .as_deref()
            .and_then(|name| text_violation("name", name)),
        patch
            .planet
            .as_deref()
            .and_then(|planet| text_violation("planet", planet)),
        patch.prod_date.as_ref().and_then(prod_date_violation),
        patch.speed.and_then(speed_violation),
        patch.crew_size.and_then(crew_size_violation),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Whether a candidate may be created. An absent candidate never passes.
pub fn validate_for_create(candidate: Option<&ShipDraft>) -> bool {
    candidate.is_some_and(|candidate| create_violations(candidate).is_empty())
}

/// Whether a patch may be applied.
pub fn validate_for_update(patch: &ShipPatch) -> bool {
    update_violations(patch).is_empty()
}

fn required<T: ?Sized>(
    field: &str,
    value: Option<&T>,
    check: impl FnOnce(&T) -> Option<FieldViolation>,
) -> Option<FieldViolation> {
    match value {
        Some(value) => check(value),
        None => Some(FieldViolation::new(field, "is required")),
    }
}

fn text_violation(field: &str, value: &str) -> Option<FieldViolation> {
    let length = value.chars().count();
    (!TEXT_LENGTH.contains(&length)).then(|| {
        FieldViolation::new(
            field,
            format!(
                "must be {} to {} characters long, got {length}",
                TEXT_LENGTH.start(),
                TEXT_LENGTH.end()
            ),
        )
    })
}

fn prod_date_violation(prod_date: &DateTime<Utc>) -> Option<FieldViolation> {
    let year = prod_date.year();
    (!PROD_YEARS.contains(&year)).then(|| {
        FieldViolation::new(
            "prodDate",
            format!(
                "year must be between {} and {}, got {year}",
                PROD_YEARS.start(),
                PROD_YEARS.end()
            ),
        )
    })
}

fn speed_violation(speed: f64) -> Option<FieldViolation> {
    (!SPEEDS.contains(&speed)).then(|| {
        FieldViolation::new(
            "speed",
            format!(
                "must be between {} and {}, got {speed}",
                SPEEDS.start(),
                SPEEDS.end()
            ),
        )
    })
}

fn crew_size_violation(crew_size: i32) -> Option<FieldViolation> {
    (!CREW_SIZES.contains(&crew_size)).then(|| {
        FieldViolation::new(
            "crewSize",
            format!(
                "must be between {} and {}, got {crew_size}",
                CREW_SIZES.start(),
                CREW_SIZES.end()
            ),
        )
    })
}

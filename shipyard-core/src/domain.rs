//! Domain entities for Shipyard.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ShipyardError;

/// Ship classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipType {
    /// Cargo and passenger transport.
    Transport,
    /// Armed vessel.
    Military,
    /// Trading vessel.
    Merchant,
}

impl ShipType {
    /// Wire token for the ship type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipType::Transport => "TRANSPORT",
            ShipType::Military => "MILITARY",
            ShipType::Merchant => "MERCHANT",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = ShipyardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRANSPORT" => Ok(ShipType::Transport),
            "MILITARY" => Ok(ShipType::Military),
            "MERCHANT" => Ok(ShipType::Merchant),
            _ => Err(ShipyardError::validation(
                "shipType",
                format!("unknown ship type `{value}`"),
            )),
        }
    }
}

/// A persisted ship record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    /// Store-assigned identifier, always positive.
    pub id: i64,
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship classification.
    pub ship_type: ShipType,
    /// Production timestamp, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub prod_date: DateTime<Utc>,
    /// Whether the ship has been used before.
    pub is_used: bool,
    /// Speed, 0.01 to 0.99.
    pub speed: f64,
    /// Crew size, 1 to 9999.
    pub crew_size: i32,
    /// Derived rating, two decimals.
    pub rating: f64,
}

impl Ship {
    /// Production year in UTC.
    pub fn prod_year(&self) -> i32 {
        self.prod_date.year()
    }
}

/// A validated, rated ship that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShip {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship classification.
    pub ship_type: ShipType,
    /// Production timestamp.
    pub prod_date: DateTime<Utc>,
    /// Whether the ship has been used before.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl NewShip {
    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: i64) -> Ship {
        Ship {
            id,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date: self.prod_date,
            is_used: self.is_used,
            speed: self.speed,
            crew_size: self.crew_size,
            rating: self.rating,
        }
    }
}

/// Candidate record submitted for creation.
///
/// Every field is optional so that a missing field surfaces as a validation
/// failure instead of a decode failure. There is no rating or identifier field;
/// both are assigned server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipDraft {
    /// Ship name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Home planet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Ship classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// Production timestamp in epoch milliseconds.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub prod_date: Option<DateTime<Utc>>,
    /// Whether the ship has been used before; defaults to false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Crew size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_size: Option<i32>,
}

/// Partial update for an existing ship.
///
/// `None` means the caller did not supply the field; it is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipPatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New home planet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// New classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// New production timestamp in epoch milliseconds.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub prod_date: Option<DateTime<Utc>>,
    /// New usage flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// New speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// New crew size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_size: Option<i32>,
}

impl ShipPatch {
    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Copy every supplied field onto `ship`. The rating is not touched.
    pub fn apply_to(self, ship: &mut Ship) {
        if let Some(name) = self.name {
            ship.name = name;
        }
        if let Some(planet) = self.planet {
            ship.planet = planet;
        }
        if let Some(ship_type) = self.ship_type {
            ship.ship_type = ship_type;
        }
        if let Some(prod_date) = self.prod_date {
            ship.prod_date = prod_date;
        }
        if let Some(is_used) = self.is_used {
            ship.is_used = is_used;
        }
        if let Some(speed) = self.speed {
            ship.speed = speed;
        }
        if let Some(crew_size) = self.crew_size {
            ship.crew_size = crew_size;
        }
    }
}

/// A single broken field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolation {
    /// Wire name of the offending field.
    pub field: String,
    /// Human-readable description of the rule.
    pub message: String,
}

impl FieldViolation {
    /// Create a violation for `field`.
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Sort key for ship listings. Ties are always broken by identifier.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipOrder {
    /// Identifier ascending.
    #[default]
    Id,
    /// Name ascending.
    Name,
    /// Planet ascending.
    Planet,
    /// Production date ascending.
    Date,
    /// Speed ascending.
    Speed,
    /// Crew size ascending.
    CrewSize,
    /// Rating ascending.
    Rating,
}

impl ShipOrder {
    /// Wire token for the sort key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipOrder::Id => "ID",
            ShipOrder::Name => "NAME",
            ShipOrder::Planet => "PLANET",
            ShipOrder::Date => "DATE",
            ShipOrder::Speed => "SPEED",
            ShipOrder::CrewSize => "CREW_SIZE",
            ShipOrder::Rating => "RATING",
        }
    }

    /// Name of the ship field this key sorts by.
    pub fn field_name(&self) -> &'static str {
        match self {
            ShipOrder::Id => "id",
            ShipOrder::Name => "name",
            ShipOrder::Planet => "planet",
            ShipOrder::Date => "prodDate",
            ShipOrder::Speed => "speed",
            ShipOrder::CrewSize => "crewSize",
            ShipOrder::Rating => "rating",
        }
    }

    /// Compare two ships by this key, then by identifier.
    pub fn compare(&self, a: &Ship, b: &Ship) -> Ordering {
        let primary = match self {
            ShipOrder::Id => Ordering::Equal,
            ShipOrder::Name => a.name.cmp(&b.name),
            ShipOrder::Planet => a.planet.cmp(&b.planet),
            ShipOrder::Date => a.prod_date.cmp(&b.prod_date),
            ShipOrder::Speed => a.speed.total_cmp(&b.speed),
            ShipOrder::CrewSize => a.crew_size.cmp(&b.crew_size),
            ShipOrder::Rating => a.rating.total_cmp(&b.rating),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for ShipOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipOrder {
    type Err = ShipyardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ID" => Ok(ShipOrder::Id),
            "NAME" => Ok(ShipOrder::Name),
            "PLANET" => Ok(ShipOrder::Planet),
            "DATE" => Ok(ShipOrder::Date),
            "SPEED" => Ok(ShipOrder::Speed),
            "CREW_SIZE" => Ok(ShipOrder::CrewSize),
            "RATING" => Ok(ShipOrder::Rating),
            _ => Err(ShipyardError::validation(
                "order",
                format!("unknown sort key `{value}`"),
            )),
        }
    }
}

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// A zero-indexed page of a listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number.
    pub number: u32,
    /// Records per page.
    pub size: u32,
}

impl PageRequest {
    /// Create a page request.
    pub fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    /// Number of records preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ship(id: i64, name: &str, speed: f64) -> Ship {
        Ship {
            id,
            name: name.to_string(),
            planet: "Mars".to_string(),
            ship_type: ShipType::Merchant,
            prod_date: Utc.with_ymd_and_hms(3000, 1, 1, 0, 0, 0).unwrap(),
            is_used: false,
            speed,
            crew_size: 10,
            rating: 2.0,
        }
    }

    #[test]
    fn ship_serializes_with_camel_case_and_epoch_millis() {
        let value = serde_json::to_value(ship(1, "Falcon", 0.5)).expect("serialize");
        assert_eq!(value["shipType"], "MERCHANT");
        assert_eq!(value["isUsed"], false);
        assert_eq!(value["crewSize"], 10);
        assert_eq!(value["prodDate"], 32_503_680_000_000i64);
    }

    #[test]
    fn patch_treats_missing_and_null_as_unset() {
        let patch: ShipPatch =
            serde_json::from_str(r#"{"speed":0.8,"name":null}"#).expect("deserialize");
        assert_eq!(patch.speed, Some(0.8));
        assert_eq!(patch.name, None);
        assert!(!patch.is_empty());

        let empty: ShipPatch = serde_json::from_str("{}").expect("deserialize");
        assert!(empty.is_empty());
    }

    #[test]
    fn patch_keeps_empty_string_distinct_from_unset() {
        let patch: ShipPatch = serde_json::from_str(r#"{"name":""}"#).expect("deserialize");
        assert_eq!(patch.name.as_deref(), Some(""));
    }

    #[test]
    fn draft_ignores_client_supplied_rating_and_id() {
        let draft: ShipDraft =
            serde_json::from_str(r#"{"id":9,"rating":99.0,"name":"Falcon","prodDate":0}"#)
                .expect("deserialize");
        assert_eq!(draft.name.as_deref(), Some("Falcon"));
        assert_eq!(draft.prod_date, Some(DateTime::<Utc>::UNIX_EPOCH));
    }

    #[test]
    fn apply_to_only_touches_supplied_fields() {
        let mut target = ship(3, "Falcon", 0.5);
        let original = target.clone();
        ShipPatch {
            speed: Some(0.8),
            ..ShipPatch::default()
        }
        .apply_to(&mut target);

        assert_eq!(target.speed, 0.8);
        assert_eq!(target.name, original.name);
        assert_eq!(target.prod_date, original.prod_date);
        assert_eq!(target.rating, original.rating);
    }

    #[test]
    fn ship_type_and_order_parse_tokens() {
        assert_eq!("transport".parse::<ShipType>(), Ok(ShipType::Transport));
        assert_eq!("MILITARY".parse::<ShipType>(), Ok(ShipType::Military));
        assert!("freighter".parse::<ShipType>().is_err());
        assert_eq!("crew-size".parse::<ShipOrder>(), Ok(ShipOrder::CrewSize));
        assert_eq!("DATE".parse::<ShipOrder>(), Ok(ShipOrder::Date));
        assert!("color".parse::<ShipOrder>().is_err());
    }

    #[test]
    fn order_breaks_ties_by_identifier() {
        let slow = ship(2, "Beta", 0.3);
        let fast = ship(1, "Alpha", 0.7);
        let twin = ship(3, "Alpha", 0.7);

        assert_eq!(ShipOrder::Speed.compare(&slow, &fast), Ordering::Less);
        assert_eq!(ShipOrder::Name.compare(&fast, &twin), Ordering::Less);
        assert_eq!(ShipOrder::Id.compare(&twin, &slow), Ordering::Greater);
        assert_eq!(ShipOrder::Date.field_name(), "prodDate");
    }

    #[test]
    fn page_request_defaults_and_offset() {
        let page = PageRequest::default();
        assert_eq!(page, PageRequest::new(0, 3));
        assert_eq!(PageRequest::new(2, 3).offset(), 6);
    }
}

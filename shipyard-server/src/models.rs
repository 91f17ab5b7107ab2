//! Database models for Shipyard server.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use shipyard_core::{NewShip, Ship, ShipType, ShipyardError};

use crate::schema::ships;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = ships)]
/// Ship database record.
pub struct ShipRecord {
    /// Ship identifier.
    pub id: i64,
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship type token.
    pub ship_type: String,
    /// Production timestamp in UTC.
    pub prod_date: NaiveDateTime,
    /// Usage flag.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl TryFrom<ShipRecord> for Ship {
    type Error = ShipyardError;

    fn try_from(record: ShipRecord) -> Result<Self, Self::Error> {
        let ship_type = record.ship_type.parse::<ShipType>().map_err(|_| {
            ShipyardError::Store(format!(
                "ship {} has unknown type `{}`",
                record.id, record.ship_type
            ))
        })?;
        Ok(Ship {
            id: record.id,
            name: record.name,
            planet: record.planet,
            ship_type,
            prod_date: record.prod_date.and_utc(),
            is_used: record.is_used,
            speed: record.speed,
            crew_size: record.crew_size,
            rating: record.rating,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = ships)]
/// Insertable or updatable ship columns.
pub struct ShipColumns {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship type token.
    pub ship_type: String,
    /// Production timestamp in UTC.
    pub prod_date: NaiveDateTime,
    /// Usage flag.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl From<NewShip> for ShipColumns {
    fn from(ship: NewShip) -> Self {
        Self {
            name: ship.name,
            planet: ship.planet,
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: ship.prod_date.naive_utc(),
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        }
    }
}

impl From<Ship> for ShipColumns {
    fn from(ship: Ship) -> Self {
        Self {
            name: ship.name,
            planet: ship.planet,
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: ship.prod_date.naive_utc(),
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        }
    }
}

//! PostgreSQL-backed ship store.

use std::fmt::Display;

use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use shipyard_core::{
    Criterion, NewShip, PageRequest, Result, Ship, ShipOrder, ShipPredicate, ShipStore,
    ShipyardError,
};

use crate::db::DbPool;
use crate::models::{ShipColumns, ShipRecord};
use crate::schema::ships;

/// Ship store persisted in the `ships` table.
#[derive(Clone)]
pub struct PgShipStore {
    pool: DbPool,
}

impl PgShipStore {
    /// Create a store over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(store_error)
    }
}

fn store_error(err: impl Display) -> ShipyardError {
    ShipyardError::Store(err.to_string())
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards in it taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

macro_rules! within {
    ($query:expr, $column:expr, $bounds:expr) => {{
        let bounds = $bounds;
        let mut query = $query;
        if let Some(min) = bounds.min {
            query = query.filter($column.ge(min));
        }
        if let Some(max) = bounds.max {
            query = query.filter($column.le(max));
        }
        query
    }};
}

fn filtered(predicate: &ShipPredicate) -> ships::BoxedQuery<'static, Pg> {
    let mut query = ships::table.into_boxed();
    for criterion in predicate.criteria() {
        query = match criterion {
            Criterion::NameContains(needle) => {
                query.filter(ships::name.like(contains_pattern(needle)))
            }
            Criterion::PlanetContains(needle) => {
                query.filter(ships::planet.like(contains_pattern(needle)))
            }
            Criterion::ShipTypeIs(ship_type) => {
                query.filter(ships::ship_type.eq(ship_type.as_str()))
            }
            Criterion::ProducedWithin(bounds) => {
                within!(query, ships::prod_date, bounds.map(|date| date.naive_utc()))
            }
            Criterion::UsedIs(is_used) => query.filter(ships::is_used.eq(*is_used)),
            Criterion::SpeedWithin(bounds) => within!(query, ships::speed, *bounds),
            Criterion::CrewSizeWithin(bounds) => within!(query, ships::crew_size, *bounds),
            Criterion::RatingWithin(bounds) => within!(query, ships::rating, *bounds),
        };
    }
    query
}

fn ordered(predicate: &ShipPredicate, order: ShipOrder) -> ships::BoxedQuery<'static, Pg> {
    let query = filtered(predicate);
    match order {
        ShipOrder::Id => query.order_by(ships::id.asc()),
        ShipOrder::Name => query.order_by((ships::name.asc(), ships::id.asc())),
        ShipOrder::Planet => query.order_by((ships::planet.asc(), ships::id.asc())),
        ShipOrder::Date => query.order_by((ships::prod_date.asc(), ships::id.asc())),
        ShipOrder::Speed => query.order_by((ships::speed.asc(), ships::id.asc())),
        ShipOrder::CrewSize => query.order_by((ships::crew_size.asc(), ships::id.asc())),
        ShipOrder::Rating => query.order_by((ships::rating.asc(), ships::id.asc())),
    }
}

fn into_ships(records: Vec<ShipRecord>) -> Result<Vec<Ship>> {
    records.into_iter().map(Ship::try_from).collect()
}

impl ShipStore for PgShipStore {
    fn create(&self, ship: NewShip) -> Result<Ship> {
        let mut conn = self.connection()?;
        let record = diesel::insert_into(ships::table)
            .values(ShipColumns::from(ship))
            .get_result::<ShipRecord>(&mut conn)
            .map_err(store_error)?;
        Ship::try_from(record)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Ship>> {
        let mut conn = self.connection()?;
        ships::table
            .find(id)
            .first::<ShipRecord>(&mut conn)
            .optional()
            .map_err(store_error)?
            .map(Ship::try_from)
            .transpose()
    }

    fn exists_by_id(&self, id: i64) -> Result<bool> {
        let mut conn = self.connection()?;
        diesel::select(exists(ships::table.find(id)))
            .get_result::<bool>(&mut conn)
            .map_err(store_error)
    }

    fn update(&self, ship: Ship) -> Result<Ship> {
        let mut conn = self.connection()?;
        let id = ship.id;
        let record = diesel::update(ships::table.find(id))
            .set(ShipColumns::from(ship))
            .get_result::<ShipRecord>(&mut conn)
            .optional()
            .map_err(store_error)?
            .ok_or(ShipyardError::NotFound(id))?;
        Ship::try_from(record)
    }

    fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(ships::table.find(id))
            .execute(&mut conn)
            .map_err(store_error)?;
        Ok(deleted > 0)
    }

    fn find_page(
        &self,
        predicate: &ShipPredicate,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        let mut conn = self.connection()?;
        let records = ordered(predicate, order)
            .limit(i64::from(page.size))
            .offset(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .load::<ShipRecord>(&mut conn)
            .map_err(store_error)?;
        into_ships(records)
    }

    fn find_all(&self, predicate: &ShipPredicate, order: ShipOrder) -> Result<Vec<Ship>> {
        let mut conn = self.connection()?;
        let records = ordered(predicate, order)
            .load::<ShipRecord>(&mut conn)
            .map_err(store_error)?;
        into_ships(records)
    }

    fn count(&self, predicate: &ShipPredicate) -> Result<u64> {
        let mut conn = self.connection()?;
        let total = filtered(predicate)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(store_error)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

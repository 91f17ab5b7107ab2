//! Record store abstraction and the in-memory implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::{NewShip, PageRequest, Ship, ShipOrder};
use crate::error::{Result, ShipyardError};
use crate::predicate::ShipPredicate;

/// Persistence for ship records.
///
/// Single-record writes must be atomic and reads must never observe a
/// half-written record.
#[cfg_attr(test, mockall::automock)]
pub trait ShipStore {
    /// Persist a new ship and assign its identifier.
    fn create(&self, ship: NewShip) -> Result<Ship>;
    /// Fetch a ship by identifier.
    fn get_by_id(&self, id: i64) -> Result<Option<Ship>>;
    /// Whether a ship with the identifier exists.
    fn exists_by_id(&self, id: i64) -> Result<bool>;
    /// Overwrite an existing ship.
    fn update(&self, ship: Ship) -> Result<Ship>;
    /// Remove a ship, returning false when it did not exist.
    fn delete_by_id(&self, id: i64) -> Result<bool>;
    /// One page of matching ships in the given order.
    fn find_page(
        &self,
        predicate: &ShipPredicate,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>>;
    /// Every matching ship in the given order.
    fn find_all(&self, predicate: &ShipPredicate, order: ShipOrder) -> Result<Vec<Ship>>;
    /// Number of matching ships.
    fn count(&self, predicate: &ShipPredicate) -> Result<u64> {
        Ok(self.find_all(predicate, ShipOrder::Id)?.len() as u64)
    }
}

/// Ship store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryShipStore {
    ships: RwLock<BTreeMap<i64, Ship>>,
    last_id: AtomicI64,
}

impl MemoryShipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> ShipyardError {
        ShipyardError::Store("memory store lock poisoned".to_string())
    }
}

impl ShipStore for MemoryShipStore {
    fn create(&self, ship: NewShip) -> Result<Ship> {
        let mut ships = self.ships.write().map_err(|_| Self::poisoned())?;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let ship = ship.with_id(id);
        ships.insert(id, ship.clone());
        Ok(ship)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Ship>> {
        let ships = self.ships.read().map_err(|_| Self::poisoned())?;
        Ok(ships.get(&id).cloned())
    }

    fn exists_by_id(&self, id: i64) -> Result<bool> {
        let ships = self.ships.read().map_err(|_| Self::poisoned())?;
        Ok(ships.contains_key(&id))
    }

    fn update(&self, ship: Ship) -> Result<Ship> {
        let mut ships = self.ships.write().map_err(|_| Self::poisoned())?;
        let Some(slot) = ships.get_mut(&ship.id) else {
            return Err(ShipyardError::NotFound(ship.id));
        };
        *slot = ship.clone();
        Ok(ship)
    }

    fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut ships = self.ships.write().map_err(|_| Self::poisoned())?;
        Ok(ships.remove(&id).is_some())
    }

    fn find_page(
        &self,
        predicate: &ShipPredicate,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(self
            .find_all(predicate, order)?
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .collect())
    }

    fn find_all(&self, predicate: &ShipPredicate, order: ShipOrder) -> Result<Vec<Ship>> {
        let ships = self.ships.read().map_err(|_| Self::poisoned())?;
        let mut matching: Vec<Ship> = ships
            .values()
            .filter(|ship| predicate.matches(ship))
            .cloned()
            .collect();
        matching.sort_by(|a, b| order.compare(a, b));
        Ok(matching)
    }

    fn count(&self, predicate: &ShipPredicate) -> Result<u64> {
        let ships = self.ships.read().map_err(|_| Self::poisoned())?;
        Ok(ships.values().filter(|ship| predicate.matches(ship)).count() as u64)
    }
}

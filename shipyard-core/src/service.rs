//! Ship query and command orchestration.
//!
//! Both services borrow a [`ShipStore`] and hold no state of their own. Every
//! identifier is checked before the store is touched, and existence is checked
//! before any write.

use log::debug;

use crate::domain::{NewShip, PageRequest, Ship, ShipDraft, ShipOrder, ShipPatch};
use crate::error::{Result, ShipyardError};
use crate::identifier::parse_ship_id;
use crate::predicate::{ShipFilter, build_predicate};
use crate::rating::rating_for;
use crate::store::ShipStore;
use crate::validator::{create_violations, update_violations};

/// Read-only ship operations.
pub struct ShipQueryService<'a, S: ShipStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ShipStore + ?Sized> ShipQueryService<'a, S> {
    /// Create a query service over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// One page of ships matching `filter`, sorted ascending by `order`.
    pub fn list(&self, filter: &ShipFilter, order: ShipOrder, page: PageRequest) -> Result<Vec<Ship>> {
        if page.size == 0 {
            return Err(ShipyardError::validation("pageSize", "must be at least 1"));
        }
        let predicate = build_predicate(filter);
        debug!(
            "listing ships: {} criteria, order {order}, page {} of size {}",
            predicate.criteria().len(),
            page.number,
            page.size
        );
        self.store.find_page(&predicate, order, page)
    }

    /// Every ship matching `filter`, sorted ascending by `order`.
    pub fn list_all(&self, filter: &ShipFilter, order: ShipOrder) -> Result<Vec<Ship>> {
        let predicate = build_predicate(filter);
        self.store.find_all(&predicate, order)
    }

    /// Number of ships matching `filter`.
    pub fn count(&self, filter: &ShipFilter) -> Result<u64> {
        let predicate = build_predicate(filter);
        debug!("counting ships: {} criteria", predicate.criteria().len());
        self.store.count(&predicate)
    }

    /// Fetch one ship by its textual identifier.
    pub fn get(&self, raw_id: &str) -> Result<Ship> {
        let id = parse_ship_id(raw_id)?;
        self.store
            .get_by_id(id)?
            .ok_or(ShipyardError::NotFound(id))
    }
}

/// Ship mutations.
pub struct ShipCommandService<'a, S: ShipStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ShipStore + ?Sized> ShipCommandService<'a, S> {
    /// Create a command service over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate, rate and persist a new ship.
    pub fn create(&self, candidate: ShipDraft) -> Result<Ship> {
        let violations = create_violations(&candidate);
        let ShipDraft {
            name: Some(name),
            planet: Some(planet),
            ship_type: Some(ship_type),
            prod_date: Some(prod_date),
            is_used,
            speed: Some(speed),
            crew_size: Some(crew_size),
        } = candidate
        else {
            return Err(ShipyardError::Validation(violations));
        };
        if !violations.is_empty() {
            return Err(ShipyardError::Validation(violations));
        }

        let is_used = is_used.unwrap_or(false);
        let ship = self.store.create(NewShip {
            name,
            planet,
            ship_type,
            rating: rating_for(speed, is_used, &prod_date),
            prod_date,
            is_used,
            speed,
            crew_size,
        })?;
        debug!("created ship {} with rating {}", ship.id, ship.rating);
        Ok(ship)
    }

    /// Apply the supplied fields of `patch` to an existing ship and re-rate it.
    pub fn update(&self, raw_id: &str, patch: ShipPatch) -> Result<Ship> {
        let id = parse_ship_id(raw_id)?;
        let violations = update_violations(&patch);
        if !violations.is_empty() {
            return Err(ShipyardError::Validation(violations));
        }
        let Some(mut ship) = self.store.get_by_id(id)? else {
            return Err(ShipyardError::NotFound(id));
        };

        patch.apply_to(&mut ship);
        ship.rating = rating_for(ship.speed, ship.is_used, &ship.prod_date);
        let ship = self.store.update(ship)?;
        debug!("updated ship {id}, rating now {}", ship.rating);
        Ok(ship)
    }

    /// Remove a ship.
    pub fn delete(&self, raw_id: &str) -> Result<()> {
        let id = parse_ship_id(raw_id)?;
        if !self.store.exists_by_id(id)? || !self.store.delete_by_id(id)? {
            return Err(ShipyardError::NotFound(id));
        }
        debug!("deleted ship {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ShipCommandService, ShipQueryService};
    use crate::domain::{PageRequest, Ship, ShipDraft, ShipOrder, ShipPatch, ShipType};
    use crate::error::ShipyardError;
    use crate::predicate::{Criterion, ShipFilter};
    use crate::store::MockShipStore;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    fn stored_falcon() -> Ship {
        Ship {
            id: 4,
            name: "Falcon".to_string(),
            planet: "Mars".to_string(),
            ship_type: ShipType::Transport,
            prod_date: Utc.with_ymd_and_hms(3000, 3, 1, 0, 0, 0).unwrap(),
            is_used: false,
            speed: 0.5,
            crew_size: 10,
            rating: 2.0,
        }
    }

    fn falcon_draft() -> ShipDraft {
        ShipDraft {
            name: Some("Falcon".to_string()),
            planet: Some("Mars".to_string()),
            ship_type: Some(ShipType::Transport),
            prod_date: Some(Utc.with_ymd_and_hms(3000, 3, 1, 0, 0, 0).unwrap()),
            is_used: None,
            speed: Some(0.5),
            crew_size: Some(10),
        }
    }

    #[test]
    fn list_passes_predicate_order_and_page_to_store() {
        let mut store = MockShipStore::new();
        store
            .expect_find_page()
            .withf(|predicate, order, page| {
                predicate.criteria() == [Criterion::UsedIs(true)]
                    && *order == ShipOrder::Rating
                    && *page == PageRequest::new(2, 5)
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![stored_falcon()]));

        let filter = ShipFilter {
            is_used: Some(true),
            ..ShipFilter::default()
        };
        let ships = ShipQueryService::new(&store)
            .list(&filter, ShipOrder::Rating, PageRequest::new(2, 5))
            .expect("list");
        assert_eq!(ships.len(), 1);
    }

    #[test]
    fn list_rejects_empty_pages_without_touching_store() {
        let store = MockShipStore::new();
        let error = ShipQueryService::new(&store)
            .list(&ShipFilter::default(), ShipOrder::Id, PageRequest::new(0, 0))
            .expect_err("page size zero");
        assert_eq!(error.violations()[0].field, "pageSize");
    }

    #[test]
    fn count_uses_unconstrained_predicate_for_empty_filter() {
        let mut store = MockShipStore::new();
        store
            .expect_count()
            .withf(|predicate| predicate.is_unconstrained())
            .returning(|_| Ok(7));

        let count = ShipQueryService::new(&store)
            .count(&ShipFilter::default())
            .expect("count");
        assert_eq!(count, 7);
    }

    #[test]
    fn get_checks_format_before_store() {
        let store = MockShipStore::new();
        let error = ShipQueryService::new(&store).get("0").expect_err("malformed");
        assert_eq!(error, ShipyardError::MalformedIdentifier("0".to_string()));
    }

    #[test]
    fn get_reports_missing_ship() {
        let mut store = MockShipStore::new();
        store
            .expect_get_by_id()
            .with(eq(12))
            .returning(|_| Ok(None));
        let error = ShipQueryService::new(&store).get("12").expect_err("missing");
        assert_eq!(error, ShipyardError::NotFound(12));
    }

    #[test]
    fn create_defaults_usage_and_computes_rating() {
        let mut store = MockShipStore::new();
        store
            .expect_create()
            .withf(|ship| !ship.is_used && ship.rating == 2.0 && ship.name == "Falcon")
            .times(1)
            .returning(|ship| Ok(ship.with_id(1)));

        let ship = ShipCommandService::new(&store)
            .create(falcon_draft())
            .expect("create");
        assert_eq!(ship.id, 1);
        assert_eq!(ship.rating, 2.0);
    }

    #[test]
    fn create_rates_used_ships_at_half() {
        let mut store = MockShipStore::new();
        store
            .expect_create()
            .returning(|ship| Ok(ship.with_id(2)));

        let ship = ShipCommandService::new(&store)
            .create(ShipDraft {
                is_used: Some(true),
                ..falcon_draft()
            })
            .expect("create");
        assert!(ship.is_used);
        assert_eq!(ship.rating, 1.0);
    }

    #[test]
    fn create_rejects_invalid_candidate_without_persisting() {
        let store = MockShipStore::new();
        let error = ShipCommandService::new(&store)
            .create(ShipDraft {
                crew_size: Some(10_000),
                speed: None,
                ..falcon_draft()
            })
            .expect_err("invalid");
        let fields: Vec<_> = error.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["speed", "crewSize"]);
    }

    #[test]
    fn update_merges_supplied_fields_and_rerates() {
        let mut store = MockShipStore::new();
        store
            .expect_get_by_id()
            .with(eq(4))
            .returning(|_| Ok(Some(stored_falcon())));
        store
            .expect_update()
            .times(1)
            .returning(|ship| Ok(ship));

        let updated = ShipCommandService::new(&store)
            .update(
                "4",
                ShipPatch {
                    speed: Some(0.8),
                    ..ShipPatch::default()
                },
            )
            .expect("update");

        let before = stored_falcon();
        assert_eq!(updated.speed, 0.8);
        assert_eq!(updated.rating, 3.2);
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.planet, before.planet);
        assert_eq!(updated.ship_type, before.ship_type);
        assert_eq!(updated.prod_date, before.prod_date);
        assert_eq!(updated.is_used, before.is_used);
        assert_eq!(updated.crew_size, before.crew_size);
    }

    #[test]
    fn update_checks_identifier_then_patch_then_existence() {
        let store = MockShipStore::new();
        let service = ShipCommandService::new(&store);
        let bad_patch = ShipPatch {
            name: Some("x".repeat(51)),
            ..ShipPatch::default()
        };

        assert_eq!(
            service.update("-1", bad_patch.clone()),
            Err(ShipyardError::MalformedIdentifier("-1".to_string()))
        );
        assert!(matches!(
            service.update("4", bad_patch),
            Err(ShipyardError::Validation(_))
        ));

        let mut store = MockShipStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));
        store.expect_update().never();
        assert_eq!(
            ShipCommandService::new(&store).update("5", ShipPatch::default()),
            Err(ShipyardError::NotFound(5))
        );
    }

    #[test]
    fn empty_patch_is_a_no_op_update() {
        let mut store = MockShipStore::new();
        store
            .expect_get_by_id()
            .returning(|_| Ok(Some(stored_falcon())));
        store.expect_update().returning(|ship| Ok(ship));

        let updated = ShipCommandService::new(&store)
            .update("4", ShipPatch::default())
            .expect("update");
        assert_eq!(updated, stored_falcon());
    }

    #[test]
    fn delete_requires_existing_ship() {
        let mut store = MockShipStore::new();
        store
            .expect_exists_by_id()
            .with(eq(9))
            .returning(|_| Ok(false));
        store.expect_delete_by_id().never();

        assert_eq!(
            ShipCommandService::new(&store).delete("9"),
            Err(ShipyardError::NotFound(9))
        );
    }

    #[test]
    fn store_failures_propagate_unchanged() {
        let mut store = MockShipStore::new();
        store
            .expect_exists_by_id()
            .returning(|_| Err(ShipyardError::Store("disk on fire".to_string())));

        assert_eq!(
            ShipCommandService::new(&store).delete("3"),
            Err(ShipyardError::Store("disk on fire".to_string()))
        );
    }
}

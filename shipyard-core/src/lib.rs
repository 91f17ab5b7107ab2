#![deny(missing_docs)]
//! Shipyard core library.
//!
//! Domain types, field rules, rating and filter composition for the ship
//! catalog, plus the services that drive a record store.

pub mod domain;
pub mod error;
pub mod identifier;
pub mod predicate;
pub mod rating;
pub mod service;
pub mod store;
pub mod validator;

pub use domain::{
    DEFAULT_PAGE_SIZE, FieldViolation, NewShip, PageRequest, Ship, ShipDraft, ShipOrder, ShipPatch,
    ShipType,
};
pub use error::{Result, ShipyardError};
pub use identifier::parse_ship_id;
pub use predicate::{Bounds, Criterion, ShipFilter, ShipPredicate, build_predicate};
pub use rating::{rating, rating_for};
pub use service::{ShipCommandService, ShipQueryService};
pub use store::{MemoryShipStore, ShipStore};
pub use validator::{
    create_violations, update_violations, validate_for_create, validate_for_update,
};

//! Filter composition for ship listings.
//!
//! A [`ShipFilter`] holds every optional filter input. [`build_predicate`]
//! turns the inputs that are present into [`Criterion`] values and joins them
//! with AND; inputs that are absent add nothing. Stores either evaluate the
//! predicate in memory with [`ShipPredicate::matches`] or translate its
//! criteria into their own query language.

use chrono::{DateTime, Utc};

use crate::domain::{Ship, ShipType};

/// Optional filter inputs for ship listings and counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipFilter {
    /// Substring of the name.
    pub name: Option<String>,
    /// Substring of the planet.
    pub planet: Option<String>,
    /// Exact ship type.
    pub ship_type: Option<ShipType>,
    /// Earliest production date, inclusive.
    pub after: Option<DateTime<Utc>>,
    /// Latest production date, inclusive.
    pub before: Option<DateTime<Utc>>,
    /// Usage flag.
    pub is_used: Option<bool>,
    /// Minimum speed, inclusive.
    pub min_speed: Option<f64>,
    /// Maximum speed, inclusive.
    pub max_speed: Option<f64>,
    /// Minimum crew size, inclusive.
    pub min_crew_size: Option<i32>,
    /// Maximum crew size, inclusive.
    pub max_crew_size: Option<i32>,
    /// Minimum rating, inclusive.
    pub min_rating: Option<f64>,
    /// Maximum rating, inclusive.
    pub max_rating: Option<f64>,
}

/// An inclusive range where either end may be open.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds<T> {
    /// Lower bound, inclusive.
    pub min: Option<T>,
    /// Upper bound, inclusive.
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Bounds from optional ends, or `None` when both are absent.
    pub fn new(min: Option<T>, max: Option<T>) -> Option<Self> {
        (min.is_some() || max.is_some()).then_some(Self { min, max })
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Convert both ends.
    pub fn map<U>(self, f: impl Fn(T) -> U) -> Bounds<U> {
        Bounds {
            min: self.min.map(&f),
            max: self.max.map(&f),
        }
    }
}

/// One test over a ship.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Name contains the substring, case-sensitive.
    NameContains(String),
    /// Planet contains the substring, case-sensitive.
    PlanetContains(String),
    /// Ship type equals the value.
    ShipTypeIs(ShipType),
    /// Production date lies within the bounds.
    ProducedWithin(Bounds<DateTime<Utc>>),
    /// Usage flag equals the value.
    UsedIs(bool),
    /// Speed lies within the bounds.
    SpeedWithin(Bounds<f64>),
    /// Crew size lies within the bounds.
    CrewSizeWithin(Bounds<i32>),
    /// Rating lies within the bounds.
    RatingWithin(Bounds<f64>),
}

impl Criterion {
    /// Whether `ship` passes this test.
    pub fn matches(&self, ship: &Ship) -> bool {
        match self {
            Criterion::NameContains(needle) => ship.name.contains(needle.as_str()),
            Criterion::PlanetContains(needle) => ship.planet.contains(needle.as_str()),
            Criterion::ShipTypeIs(ship_type) => ship.ship_type == *ship_type,
            Criterion::ProducedWithin(bounds) => bounds.contains(ship.prod_date),
            Criterion::UsedIs(is_used) => ship.is_used == *is_used,
            Criterion::SpeedWithin(bounds) => bounds.contains(ship.speed),
            Criterion::CrewSizeWithin(bounds) => bounds.contains(ship.crew_size),
            Criterion::RatingWithin(bounds) => bounds.contains(ship.rating),
        }
    }
}

/// Conjunction of criteria. With no criteria every ship matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipPredicate {
    criteria: Vec<Criterion>,
}

impl ShipPredicate {
    /// A predicate that matches every ship.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a criterion if one is given; `None` leaves the predicate unchanged.
    pub fn and(mut self, criterion: Option<Criterion>) -> Self {
        self.criteria.extend(criterion);
        self
    }

    /// Whether `ship` passes every criterion.
    pub fn matches(&self, ship: &Ship) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(ship))
    }

    /// The criteria joined by this predicate.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Whether the predicate places no constraint on ships.
    pub fn is_unconstrained(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Build the predicate for a filter.
pub fn build_predicate(filter: &ShipFilter) -> ShipPredicate {
    ShipPredicate::all()
        .and(filter.name.clone().map(Criterion::NameContains))
        .and(filter.planet.clone().map(Criterion::PlanetContains))
        .and(filter.ship_type.map(Criterion::ShipTypeIs))
        .and(Bounds::new(filter.after, filter.before).map(Criterion::ProducedWithin))
        .and(filter.is_used.map(Criterion::UsedIs))
        .and(Bounds::new(filter.min_speed, filter.max_speed).map(Criterion::SpeedWithin))
        .and(
            Bounds::new(filter.min_crew_size, filter.max_crew_size)
                .map(Criterion::CrewSizeWithin),
        )
        .and(Bounds::new(filter.min_rating, filter.max_rating).map(Criterion::RatingWithin))
}

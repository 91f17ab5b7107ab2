//! Diesel schema definitions for Shipyard server.

diesel::table! {
    ships (id) {
        id -> BigInt,
        name -> Varchar,
        planet -> Varchar,
        ship_type -> Text,
        prod_date -> Timestamp,
        is_used -> Bool,
        speed -> Double,
        crew_size -> Integer,
        rating -> Double,
    }
}

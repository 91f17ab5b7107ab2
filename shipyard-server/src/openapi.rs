//! OpenAPI specification for Shipyard server.

use utoipa::OpenApi;

use shipyard_core::{FieldViolation, Ship, ShipDraft, ShipOrder, ShipPatch, ShipType};

use crate::routes::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::ships_list,
        crate::routes::ships_count,
        crate::routes::ship_create,
        crate::routes::ship_get,
        crate::routes::ship_update,
        crate::routes::ship_delete,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            Ship,
            ShipDraft,
            ShipPatch,
            ShipType,
            ShipOrder,
            FieldViolation,
            ErrorResponse
        )
    ),
    tags(
        (name = "ships", description = "Ship catalog"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the Shipyard server.
pub struct ApiDoc;

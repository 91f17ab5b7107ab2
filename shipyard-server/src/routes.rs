//! HTTP handlers for Shipyard server.

use std::sync::Arc;

use actix_web::error::{BlockingError, InternalError};
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shipyard_core::{
    DEFAULT_PAGE_SIZE, FieldViolation, PageRequest, Ship, ShipCommandService, ShipDraft,
    ShipFilter, ShipOrder, ShipPatch, ShipQueryService, ShipStore, ShipType, ShipyardError,
};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::openapi::ApiDoc;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Backing ship store.
    pub store: Arc<dyn ShipStore + Send + Sync>,
}

impl AppState {
    /// Wrap `store` for sharing across workers.
    pub fn new(store: impl ShipStore + Send + Sync + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
    /// Broken field rules, when the request failed validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl ErrorResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            violations: Vec::new(),
        }
    }
}

/// Query parameters accepted by ship listings and counts.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipListParams {
    /// Substring of the name.
    pub name: Option<String>,
    /// Substring of the planet.
    pub planet: Option<String>,
    /// Exact ship type.
    pub ship_type: Option<ShipType>,
    /// Earliest production date, epoch milliseconds.
    pub after: Option<i64>,
    /// Latest production date, epoch milliseconds.
    pub before: Option<i64>,
    /// Usage flag.
    pub is_used: Option<bool>,
    /// Minimum speed.
    pub min_speed: Option<f64>,
    /// Maximum speed.
    pub max_speed: Option<f64>,
    /// Minimum crew size.
    pub min_crew_size: Option<i32>,
    /// Maximum crew size.
    pub max_crew_size: Option<i32>,
    /// Minimum rating.
    pub min_rating: Option<f64>,
    /// Maximum rating.
    pub max_rating: Option<f64>,
    /// Sort key.
    #[serde(default)]
    pub order: ShipOrder,
    /// Zero-based page number.
    #[serde(default)]
    pub page_number: u32,
    /// Records per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn epoch_millis(field: &str, value: Option<i64>) -> shipyard_core::Result<Option<DateTime<Utc>>> {
    value
        .map(|millis| {
            DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| ShipyardError::validation(field, "is out of range"))
        })
        .transpose()
}

impl ShipListParams {
    /// Filter inputs carried by the query.
    pub fn filter(&self) -> shipyard_core::Result<ShipFilter> {
        Ok(ShipFilter {
            name: self.name.clone(),
            planet: self.planet.clone(),
            ship_type: self.ship_type,
            after: epoch_millis("after", self.after)?,
            before: epoch_millis("before", self.before)?,
            is_used: self.is_used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        })
    }

    /// Requested page.
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page_number, self.page_size)
    }
}

fn error_response(err: &ShipyardError) -> HttpResponse {
    match err {
        ShipyardError::Validation(violations) => HttpResponse::BadRequest().json(ErrorResponse {
            message: err.to_string(),
            violations: violations.clone(),
        }),
        ShipyardError::MalformedIdentifier(_) => {
            HttpResponse::BadRequest().json(ErrorResponse::message(err.to_string()))
        }
        ShipyardError::NotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::message(err.to_string()))
        }
        ShipyardError::Store(detail) => {
            log::error!("ship store failure: {detail}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::message("ship store unavailable"))
        }
    }
}

fn respond<T: Serialize>(
    result: Result<shipyard_core::Result<T>, BlockingError>,
) -> HttpResponse {
    match result {
        Ok(Ok(body)) => HttpResponse::Ok().json(body),
        Ok(Err(err)) => error_response(&err),
        Err(err) => HttpResponse::InternalServerError().json(ErrorResponse::message(format!(
            "ship task failed: {err}"
        ))),
    }
}

/// Parse an optional JSON body; blank bodies and `null` yield `None`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, HttpResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(body).map_err(|err| {
        HttpResponse::BadRequest().json(ErrorResponse::message(format!(
            "malformed request body: {err}"
        )))
    })
}

#[utoipa::path(
    get,
    path = "/rest/ships",
    params(ShipListParams),
    responses(
        (status = 200, description = "One page of matching ships", body = [Ship]),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships")]
/// List ships matching the filters, sorted and paginated.
pub async fn ships_list(
    state: web::Data<AppState>,
    query: web::Query<ShipListParams>,
) -> impl Responder {
    let params = query.into_inner();
    let store = state.store.clone();
    let result = web::block(move || {
        let filter = params.filter()?;
        ShipQueryService::new(&*store).list(&filter, params.order, params.page())
    })
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/rest/ships/count",
    params(ShipListParams),
    responses(
        (status = 200, description = "Number of matching ships", body = u64),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/count")]
/// Count ships matching the filters.
pub async fn ships_count(
    state: web::Data<AppState>,
    query: web::Query<ShipListParams>,
) -> impl Responder {
    let params = query.into_inner();
    let store = state.store.clone();
    let result = web::block(move || {
        let filter = params.filter()?;
        ShipQueryService::new(&*store).count(&filter)
    })
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/rest/ships",
    request_body = ShipDraft,
    responses(
        (status = 200, description = "Created ship", body = Ship),
        (status = 400, description = "Invalid ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships")]
/// Create a ship.
pub async fn ship_create(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let draft = match parse_body::<ShipDraft>(&body) {
        Ok(Some(draft)) => draft,
        Ok(None) => {
            return error_response(&ShipyardError::validation("ship", "must be supplied"));
        }
        Err(response) => return response,
    };
    let store = state.store.clone();
    let result = web::block(move || ShipCommandService::new(&*store).create(draft)).await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/rest/ships/{id}",
    params(
        ("id" = String, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship", body = Ship),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/{id}")]
/// Fetch one ship.
pub async fn ship_get(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let raw_id = path.into_inner();
    let store = state.store.clone();
    let result = web::block(move || ShipQueryService::new(&*store).get(&raw_id)).await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/rest/ships/{id}",
    params(
        ("id" = String, Path, description = "Ship identifier")
    ),
    request_body = ShipPatch,
    responses(
        (status = 200, description = "Updated ship", body = Ship),
        (status = 400, description = "Invalid identifier or patch", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships/{id}")]
/// Apply a partial update to a ship. An empty body leaves the ship unchanged.
pub async fn ship_update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let patch = match parse_body::<ShipPatch>(&body) {
        Ok(patch) => patch.unwrap_or_default(),
        Err(response) => return response,
    };
    let raw_id = path.into_inner();
    let store = state.store.clone();
    let result =
        web::block(move || ShipCommandService::new(&*store).update(&raw_id, patch)).await;
    respond(result)
}

#[utoipa::path(
    delete,
    path = "/rest/ships/{id}",
    params(
        ("id" = String, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[delete("/rest/ships/{id}")]
/// Delete a ship.
pub async fn ship_delete(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let raw_id = path.into_inner();
    let store = state.store.clone();
    let result = web::block(move || ShipCommandService::new(&*store).delete(&raw_id)).await;
    match result {
        Ok(Ok(())) => HttpResponse::Ok().finish(),
        other => respond(other),
    }
}

#[utoipa::path(
    get,
    path = "/rest/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/rest/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ErrorResponse::message(format!("invalid query: {err}")));
    InternalError::from_response(err, response).into()
}

/// Register every ship route. `count` precedes `{id}` so it is not read as an identifier.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .service(openapi_json)
        .service(ships_count)
        .service(ships_list)
        .service(ship_create)
        .service(ship_get)
        .service(ship_update)
        .service(ship_delete);
}

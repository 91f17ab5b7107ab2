//! HTTP client for the Shipyard ship API.

use crate::CliResult;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shipyard_core::{FieldViolation, Ship, ShipDraft, ShipOrder, ShipPatch, ShipType};
use std::fmt::Write;
use std::future::Future;
use std::pin::Pin;

/// Query parameters for listing and counting ships.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_crew_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_crew_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<ShipOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    violations: Vec<FieldViolation>,
}

/// Ship API operations used by the CLI.
pub trait ShipClient {
    fn list<'a>(
        &'a self,
        query: &'a ShipQuery,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Ship>>> + Send + 'a>>;

    fn count<'a>(
        &'a self,
        query: &'a ShipQuery,
    ) -> Pin<Box<dyn Future<Output = CliResult<u64>> + Send + 'a>>;

    fn get<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>>;

    fn create<'a>(
        &'a self,
        draft: &'a ShipDraft,
    ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>>;

    fn update<'a>(
        &'a self,
        id: &'a str,
        patch: &'a ShipPatch,
    ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>>;

    fn delete<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<()>> + Send + 'a>>;
}

/// Reqwest-backed ship client.
#[cfg_attr(test, allow(dead_code))]
pub struct ReqwestShipClient {
    client: Client,
    server_url: String,
}

impl ReqwestShipClient {
    /// Build a client for `server_url`.
    #[cfg_attr(test, allow(dead_code))]
    pub fn new(server_url: String) -> CliResult<Self> {
        let client = Client::builder().user_agent("shipyard-cli").build()?;
        Ok(Self { client, server_url })
    }

    fn ships_url(&self) -> String {
        format!("{}/rest/ships", self.server_url)
    }

    fn ship_url(&self, id: &str) -> String {
        format!("{}/rest/ships/{}", self.server_url, id.trim())
    }
}

impl ShipClient for ReqwestShipClient {
    fn list<'a>(
        &'a self,
        query: &'a ShipQuery,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Ship>>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.get(self.ships_url()).query(query).send().await?;
            read_json(response).await
        })
    }

    fn count<'a>(
        &'a self,
        query: &'a ShipQuery,
    ) -> Pin<Box<dyn Future<Output = CliResult<u64>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/count", self.ships_url());
            let response = self.client.get(url).query(query).send().await?;
            read_json(response).await
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.get(self.ship_url(id)).send().await?;
            read_json(response).await
        })
    }

    fn create<'a>(
        &'a self,
        draft: &'a ShipDraft,
    ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.post(self.ships_url()).json(draft).send().await?;
            read_json(response).await
        })
    }

    fn update<'a>(
        &'a self,
        id: &'a str,
        patch: &'a ShipPatch,
    ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.post(self.ship_url(id)).json(patch).send().await?;
            read_json(response).await
        })
    }

    fn delete<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.delete(self.ship_url(id)).send().await?;
            check_status(response).await?;
            Ok(())
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}

async fn check_status(response: Response) -> CliResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(describe_failure(status, &body).into())
}

/// Turn a non-success response into a readable message.
fn describe_failure(status: StatusCode, body: &str) -> String {
    let Ok(error) = serde_json::from_str::<ApiError>(body) else {
        let body = body.trim();
        return if body.is_empty() {
            format!("server responded with {status}")
        } else {
            format!("server responded with {status}: {body}")
        };
    };
    let mut message = format!("server responded with {status}: {}", error.message);
    for violation in &error.violations {
        let _ = write!(message, "\n- {violation}");
    }
    message
}

/// Normalize a server URL by trimming whitespace and trailing slashes.
pub fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

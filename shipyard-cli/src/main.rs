#![deny(missing_docs)]
//! Shipyard command-line interface.
//!
//! Lists, counts, inspects and edits ships through the Shipyard HTTP API.

mod client;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::{ShipClient, ShipQuery};
use serde::Serialize;
use shipyard_core::{Ship, ShipDraft, ShipOrder, ShipPatch, ShipType, ShipyardError};
use std::fmt::Write;

#[cfg(not(test))]
use client::{ReqwestShipClient, normalize_server_url};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser, Debug)]
#[command(name = "shipyard", version, about = "Shipyard ship catalog CLI")]
struct Cli {
    /// Base URL of the Shipyard server.
    #[arg(long, global = true, env = "SHIPYARD_API_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Clone, Debug, Default)]
struct FilterArgs {
    /// Substring of the ship name.
    #[arg(long)]
    name: Option<String>,
    /// Substring of the home planet.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (transport, military, merchant).
    #[arg(long, value_parser = parse_ship_type)]
    ship_type: Option<ShipType>,
    /// Earliest production date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date)]
    after: Option<DateTime<Utc>>,
    /// Latest production date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date)]
    before: Option<DateTime<Utc>>,
    /// Usage flag; `--used` alone means true.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    used: Option<bool>,
    /// Minimum speed.
    #[arg(long)]
    min_speed: Option<f64>,
    /// Maximum speed.
    #[arg(long)]
    max_speed: Option<f64>,
    /// Minimum crew size.
    #[arg(long)]
    min_crew_size: Option<i32>,
    /// Maximum crew size.
    #[arg(long)]
    max_crew_size: Option<i32>,
    /// Minimum rating.
    #[arg(long)]
    min_rating: Option<f64>,
    /// Maximum rating.
    #[arg(long)]
    max_rating: Option<f64>,
}

impl FilterArgs {
    fn to_query(&self) -> ShipQuery {
        ShipQuery {
            name: self.name.clone(),
            planet: self.planet.clone(),
            ship_type: self.ship_type,
            after: self.after.map(|date| date.timestamp_millis()),
            before: self.before.map(|date| date.timestamp_millis()),
            is_used: self.used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
            ..ShipQuery::default()
        }
    }
}

#[derive(Args, Clone, Debug)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Sort key (id, name, planet, date, speed, crew-size, rating).
    #[arg(long, value_parser = parse_order)]
    order: Option<ShipOrder>,
    /// Zero-based page number.
    #[arg(long)]
    page_number: Option<u32>,
    /// Ships per page.
    #[arg(long)]
    page_size: Option<u32>,
}

impl ListArgs {
    fn to_query(&self) -> ShipQuery {
        ShipQuery {
            order: self.order,
            page_number: self.page_number,
            page_size: self.page_size,
            ..self.filter.to_query()
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
struct ShipFieldArgs {
    /// Ship name.
    #[arg(long)]
    name: Option<String>,
    /// Home planet.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (transport, military, merchant).
    #[arg(long, value_parser = parse_ship_type)]
    ship_type: Option<ShipType>,
    /// Production year; the date becomes January 1st of that year.
    #[arg(long, conflicts_with = "prod_date")]
    prod_year: Option<i32>,
    /// Production date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date)]
    prod_date: Option<DateTime<Utc>>,
    /// Usage flag; `--used` alone means true.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    used: Option<bool>,
    /// Speed between 0.01 and 0.99.
    #[arg(long)]
    speed: Option<f64>,
    /// Crew size between 1 and 9999.
    #[arg(long)]
    crew_size: Option<i32>,
}

impl ShipFieldArgs {
    fn prod_date(&self) -> CliResult<Option<DateTime<Utc>>> {
        match self.prod_year {
            Some(year) => Ok(Some(year_start(year)?)),
            None => Ok(self.prod_date),
        }
    }

    fn into_draft(self) -> CliResult<ShipDraft> {
        Ok(ShipDraft {
            prod_date: self.prod_date()?,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            is_used: self.used,
            speed: self.speed,
            crew_size: self.crew_size,
        })
    }

    fn into_patch(self) -> CliResult<ShipPatch> {
        Ok(ShipPatch {
            prod_date: self.prod_date()?,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            is_used: self.used,
            speed: self.speed,
            crew_size: self.crew_size,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List one page of ships matching the filters.
    List(ListArgs),
    /// Count ships matching the filters.
    Count(FilterArgs),
    /// Show one ship.
    Get {
        /// Ship identifier.
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Create a ship; the server computes its rating.
    Create(ShipFieldArgs),
    /// Change the supplied fields of a ship.
    Update {
        /// Ship identifier.
        #[arg(allow_hyphen_values = true)]
        id: String,
        #[command(flatten)]
        fields: ShipFieldArgs,
    },
    /// Delete a ship.
    Delete {
        /// Ship identifier.
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = ReqwestShipClient::new(normalize_server_url(&cli.server_url)?)?;
    let output = run_command(&client, cli.command, cli.format).await?;
    print!("{output}");
    Ok(())
}

#[cfg(test)]
fn main() {}

/// Execute `command` against `client` and render the result.
async fn run_command<C: ShipClient + ?Sized>(
    client: &C,
    command: Commands,
    format: OutputFormat,
) -> CliResult<String> {
    match command {
        Commands::List(args) => {
            let ships = client.list(&args.to_query()).await?;
            match format {
                OutputFormat::Text => Ok(render_ships_text(&ships)),
                OutputFormat::Json => render_json(&ships),
            }
        }
        Commands::Count(filter) => {
            let count = client.count(&filter.to_query()).await?;
            match format {
                OutputFormat::Text => Ok(format!("{count} ships\n")),
                OutputFormat::Json => render_json(&count),
            }
        }
        Commands::Get { id } => render_ship(&client.get(&id).await?, format),
        Commands::Create(fields) => {
            let draft = fields.into_draft()?;
            render_ship(&client.create(&draft).await?, format)
        }
        Commands::Update { id, fields } => {
            let patch = fields.into_patch()?;
            render_ship(&client.update(&id, &patch).await?, format)
        }
        Commands::Delete { id } => {
            client.delete(&id).await?;
            match format {
                OutputFormat::Text => Ok(format!("Deleted ship {}.\n", id.trim())),
                OutputFormat::Json => render_json(&serde_json::json!({ "deleted": id.trim() })),
            }
        }
    }
}

fn parse_ship_type(raw: &str) -> Result<ShipType, ShipyardError> {
    raw.parse()
}

fn parse_order(raw: &str) -> Result<ShipOrder, ShipyardError> {
    raw.parse()
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
        .ok_or_else(|| format!("`{raw}` is not a YYYY-MM-DD or RFC 3339 date"))
}

fn year_start(year: i32) -> CliResult<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
        .ok_or_else(|| format!("production year {year} is out of range").into())
}

fn render_json<T: Serialize + ?Sized>(payload: &T) -> CliResult<String> {
    let mut output = serde_json::to_string_pretty(payload)?;
    output.push('\n');
    Ok(output)
}

fn render_ship(ship: &Ship, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(render_ship_text(ship)),
        OutputFormat::Json => render_json(ship),
    }
}

fn render_ship_text(ship: &Ship) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Ship {}: {}", ship.id, ship.name);
    let _ = writeln!(output, "Planet: {}", ship.planet);
    let _ = writeln!(output, "Type: {}", ship.ship_type);
    let _ = writeln!(output, "Produced: {}", ship.prod_date.format("%Y-%m-%d"));
    let _ = writeln!(output, "Used: {}", if ship.is_used { "yes" } else { "no" });
    let _ = writeln!(output, "Speed: {:.2}", ship.speed);
    let _ = writeln!(output, "Crew: {}", ship.crew_size);
    let _ = writeln!(output, "Rating: {:.2}", ship.rating);
    output
}

fn render_ships_text(ships: &[Ship]) -> String {
    if ships.is_empty() {
        return "No ships found.\n".to_string();
    }
    let mut output = String::new();
    for ship in ships {
        output.push_str(&render_ship_text(ship));
        let _ = writeln!(output);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, CliResult, Commands, OutputFormat, parse_date, render_ships_text, run_command,
    };
    use crate::client::{ShipClient, ShipQuery};
    use chrono::{TimeZone, Utc};
    use clap::Parser;
    use shipyard_core::{Ship, ShipDraft, ShipOrder, ShipPatch, ShipType};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    fn falcon() -> Ship {
        Ship {
            id: 7,
            name: "Falcon".to_string(),
            planet: "Mars".to_string(),
            ship_type: ShipType::Transport,
            prod_date: Utc.with_ymd_and_hms(3000, 1, 1, 0, 0, 0).unwrap(),
            is_used: false,
            speed: 0.5,
            crew_size: 10,
            rating: 2.0,
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        queries: Mutex<Vec<ShipQuery>>,
        drafts: Mutex<Vec<ShipDraft>>,
        patches: Mutex<Vec<(String, ShipPatch)>>,
        deleted: Mutex<Vec<String>>,
        fail_with: Option<String>,
    }

    impl RecordingClient {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn outcome<T>(&self, value: T) -> CliResult<T> {
            match &self.fail_with {
                Some(message) => Err(message.clone().into()),
                None => Ok(value),
            }
        }
    }

    impl ShipClient for RecordingClient {
        fn list<'a>(
            &'a self,
            query: &'a ShipQuery,
        ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Ship>>> + Send + 'a>> {
            self.queries.lock().expect("queries").push(query.clone());
            Box::pin(async move { self.outcome(vec![falcon()]) })
        }

        fn count<'a>(
            &'a self,
            query: &'a ShipQuery,
        ) -> Pin<Box<dyn Future<Output = CliResult<u64>> + Send + 'a>> {
            self.queries.lock().expect("queries").push(query.clone());
            Box::pin(async move { self.outcome(4) })
        }

        fn get<'a>(
            &'a self,
            _id: &'a str,
        ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>> {
            Box::pin(async move { self.outcome(falcon()) })
        }

        fn create<'a>(
            &'a self,
            draft: &'a ShipDraft,
        ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>> {
            self.drafts.lock().expect("drafts").push(draft.clone());
            Box::pin(async move { self.outcome(falcon()) })
        }

        fn update<'a>(
            &'a self,
            id: &'a str,
            patch: &'a ShipPatch,
        ) -> Pin<Box<dyn Future<Output = CliResult<Ship>> + Send + 'a>> {
            self.patches
                .lock()
                .expect("patches")
                .push((id.to_string(), patch.clone()));
            Box::pin(async move { self.outcome(falcon()) })
        }

        fn delete<'a>(
            &'a self,
            id: &'a str,
        ) -> Pin<Box<dyn Future<Output = CliResult<()>> + Send + 'a>> {
            self.deleted.lock().expect("deleted").push(id.to_string());
            Box::pin(async move { self.outcome(()) })
        }
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["shipyard"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn list_flags_become_query_parameters() {
        let cli = parse(&[
            "list",
            "--ship-type",
            "military",
            "--min-speed",
            "0.2",
            "--used",
            "--after",
            "2990-01-01",
            "--order",
            "crew-size",
            "--page-size",
            "5",
        ]);
        let Commands::List(args) = cli.command else {
            panic!("expected list command");
        };
        let query = args.to_query();

        assert_eq!(query.ship_type, Some(ShipType::Military));
        assert_eq!(query.min_speed, Some(0.2));
        assert_eq!(query.is_used, Some(true));
        assert_eq!(
            query.after,
            Some(Utc.with_ymd_and_hms(2990, 1, 1, 0, 0, 0).unwrap().timestamp_millis())
        );
        assert_eq!(query.order, Some(ShipOrder::CrewSize));
        assert_eq!(query.page_size, Some(5));
        assert_eq!(query.page_number, None);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn unknown_ship_type_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["shipyard", "count", "--ship-type", "yacht"]);
        assert!(result.is_err());
    }

    #[test]
    fn prod_year_and_prod_date_conflict() {
        let result = Cli::try_parse_from([
            "shipyard",
            "create",
            "--prod-year",
            "3000",
            "--prod-date",
            "3000-05-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_date_accepts_plain_and_rfc3339_dates() {
        let expected = Utc.with_ymd_and_hms(2999, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2999-12-31").expect("plain"), expected);
        assert_eq!(
            parse_date("2999-12-31T02:00:00+02:00").expect("rfc3339"),
            expected
        );
        assert!(parse_date("next tuesday").is_err());
    }

    #[tokio::test]
    async fn create_sends_draft_with_year_start() {
        let client = RecordingClient::default();
        let cli = parse(&[
            "create",
            "--name",
            "Falcon",
            "--planet",
            "Mars",
            "--ship-type",
            "transport",
            "--prod-year",
            "3000",
            "--speed",
            "0.5",
            "--crew-size",
            "10",
        ]);

        let output = run_command(&client, cli.command, cli.format)
            .await
            .expect("create");
        assert!(output.contains("Ship 7: Falcon"));
        assert!(output.contains("Rating: 2.00"));

        let drafts = client.drafts.lock().expect("drafts");
        assert_eq!(drafts.len(), 1);
        let draft = &drafts[0];
        assert_eq!(draft.name.as_deref(), Some("Falcon"));
        assert_eq!(
            draft.prod_date,
            Some(Utc.with_ymd_and_hms(3000, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(draft.is_used, None);
    }

    #[tokio::test]
    async fn update_without_flags_sends_empty_patch() {
        let client = RecordingClient::default();
        let cli = parse(&["update", "7"]);

        run_command(&client, cli.command, cli.format)
            .await
            .expect("update");

        let patches = client.patches.lock().expect("patches");
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].0, "7");
        assert!(patches[0].1.is_empty());
    }

    #[tokio::test]
    async fn update_passes_used_false() {
        let client = RecordingClient::default();
        let cli = parse(&["update", "7", "--used", "false", "--speed", "0.8"]);

        run_command(&client, cli.command, cli.format)
            .await
            .expect("update");

        let patches = client.patches.lock().expect("patches");
        assert_eq!(patches[0].1.is_used, Some(false));
        assert_eq!(patches[0].1.speed, Some(0.8));
    }

    #[tokio::test]
    async fn json_format_emits_parseable_output() {
        let client = RecordingClient::default();
        let cli = parse(&["--format", "json", "get", "7"]);

        let output = run_command(&client, cli.command, cli.format)
            .await
            .expect("get");
        let ship: Ship = serde_json::from_str(&output).expect("json ship");
        assert_eq!(ship, falcon());

        let cli = parse(&["count", "--format", "json"]);
        let output = run_command(&client, cli.command, cli.format)
            .await
            .expect("count");
        assert_eq!(output.trim(), "4");
    }

    #[tokio::test]
    async fn delete_reports_identifier() {
        let client = RecordingClient::default();
        let cli = parse(&["delete", "7"]);

        let output = run_command(&client, cli.command, cli.format)
            .await
            .expect("delete");
        assert_eq!(output, "Deleted ship 7.\n");
        assert_eq!(*client.deleted.lock().expect("deleted"), ["7"]);
    }

    #[tokio::test]
    async fn client_errors_propagate() {
        let client = RecordingClient::failing("server responded with 404 Not Found");
        let cli = parse(&["get", "99"]);

        let error = run_command(&client, cli.command, cli.format)
            .await
            .expect_err("missing ship");
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn empty_listing_has_placeholder() {
        assert_eq!(render_ships_text(&[]), "No ships found.\n");
        let text = render_ships_text(&[falcon()]);
        assert!(text.contains("Planet: Mars"));
        assert!(text.contains("Type: TRANSPORT"));
        assert!(text.contains("Produced: 3000-01-01"));
        assert!(text.contains("Used: no"));
    }
}

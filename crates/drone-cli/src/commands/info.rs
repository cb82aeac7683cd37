//! Read-only commands: version, apps, app, running

use crate::client::DroneClient;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use drone_types::{
    parse_drone_map, parse_running, validate_name, DroneRecord, RunningDrone, VersionInfo,
};
use serde::Serialize;
use tabled::Tabled;

/// Table row for the daemon version
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Reported version
    version: String,
}

impl From<VersionInfo> for VersionRow {
    fn from(info: VersionInfo) -> Self {
        Self {
            version: info.version,
        }
    }
}

/// Table row for app listings
#[derive(Debug, Serialize, Tabled)]
struct AppRow {
    /// App name
    name: String,
    /// Owner
    user: String,
    /// Number of running drones
    drones: usize,
    /// Listening addresses
    addresses: String,
}

impl From<(String, DroneRecord)> for AppRow {
    fn from((name, record): (String, DroneRecord)) -> Self {
        let addresses: Vec<String> = record
            .drones
            .iter()
            .filter_map(RunningDrone::address)
            .collect();

        Self {
            user: record.user().unwrap_or("-").to_string(),
            drones: record.drones.len(),
            addresses: if addresses.is_empty() {
                "-".to_string()
            } else {
                addresses.join(", ")
            },
            name,
        }
    }
}

/// Table row for running drones
#[derive(Debug, Serialize, Tabled)]
struct DroneRow {
    /// App name
    name: String,
    /// Owner
    user: String,
    /// Listening address
    address: String,
    /// Process id
    pid: String,
    /// Time since start
    uptime: String,
}

impl From<RunningDrone> for DroneRow {
    fn from(d: RunningDrone) -> Self {
        let uptime = d
            .started_at()
            .map(|t| humanize_duration(chrono::Utc::now() - t))
            .unwrap_or_else(|| "-".to_string());

        Self {
            address: d.address().unwrap_or_else(|| "-".to_string()),
            pid: d
                .pid
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            user: d.user.unwrap_or_else(|| "-".to_string()),
            name: d.name,
            uptime,
        }
    }
}

fn humanize_duration(duration: chrono::Duration) -> String {
    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        format!("{}s", duration.num_seconds().max(0))
    }
}

/// `GET /version`
pub async fn version(client: &DroneClient, format: OutputFormat) -> CliResult<()> {
    let heading = "service version:";
    let result = client.version().await?;

    if format == OutputFormat::Table {
        if let Ok(info) = serde_json::from_value::<VersionInfo>(result.clone()) {
            output::print_table(heading, vec![VersionRow::from(info)]);
            return Ok(());
        }
    }

    output::print_document(heading, &result, format)
}

/// `GET /drones`
pub async fn apps(client: &DroneClient, format: OutputFormat) -> CliResult<()> {
    let heading = "detailed info on apps:";
    let result = client.list_drones().await?;

    if format == OutputFormat::Table {
        if let Some(records) = parse_drone_map(&result) {
            let rows: Vec<AppRow> = records.into_iter().map(AppRow::from).collect();
            output::print_table(heading, rows);
            return Ok(());
        }
    }

    output::print_document(heading, &result, format)
}

/// `GET /drones/:name`
pub async fn app(client: &DroneClient, name: &str, format: OutputFormat) -> CliResult<()> {
    validate_name(name)?;
    let result = client.get_drone(name).await?;
    output::print_document(&format!("detailed info on app: {}", name), &result, format)
}

/// `GET /drones/running`
pub async fn running(client: &DroneClient, format: OutputFormat) -> CliResult<()> {
    let heading = "running apps:";
    let result = client.running_drones().await?;

    if format == OutputFormat::Table {
        if let Some(drones) = parse_running(&result) {
            let rows: Vec<DroneRow> = drones.into_iter().map(DroneRow::from).collect();
            output::print_table(heading, rows);
            return Ok(());
        }
    }

    output::print_document(heading, &result, format)
}

//! Daemon response types
//!
//! Decoding is best-effort: every helper returns `None` when the JSON does not
//! have the expected shape, so callers can fall back to rendering raw JSON.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `GET /version`; extra fields are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

/// One running drone process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningDrone {
    /// App name
    pub name: String,

    /// Owner of the app
    #[serde(default)]
    pub user: Option<String>,

    /// Host the drone listens on
    #[serde(default)]
    pub host: Option<String>,

    /// Port the drone listens on
    #[serde(default)]
    pub port: Option<u16>,

    /// Daemon-assigned drone id
    #[serde(default)]
    pub uid: Option<String>,

    /// OS process id
    #[serde(default)]
    pub pid: Option<u32>,

    /// Creation time in milliseconds since the epoch
    #[serde(default)]
    pub ctime: Option<i64>,
}

impl RunningDrone {
    /// Start time of the drone, if the daemon reported one
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.ctime
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// `host:port` when both are known
    pub fn address(&self) -> Option<String> {
        match (&self.host, self.port) {
            (Some(host), Some(port)) => Some(format!("{}:{}", host, port)),
            (None, Some(port)) => Some(format!(":{}", port)),
            _ => None,
        }
    }
}

/// Entry of `GET /drones`: the app manifest plus its running drones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneRecord {
    /// Manifest the daemon holds for the app
    #[serde(default)]
    pub app: Value,

    /// Running processes for the app
    #[serde(default)]
    pub drones: Vec<RunningDrone>,
}

impl DroneRecord {
    /// Owner recorded in the app manifest
    pub fn user(&self) -> Option<&str> {
        self.app.get("user").and_then(Value::as_str)
    }
}

/// Decode the body of `GET /drones/running`
///
/// Accepts either a bare array or an object wrapping it under `drones`.
pub fn parse_running(value: &Value) -> Option<Vec<RunningDrone>> {
    let list = match value {
        Value::Array(_) => value,
        Value::Object(map) => map.get("drones")?,
        _ => return None,
    };
    serde_json::from_value(list.clone()).ok()
}

/// Decode the body of `GET /drones` into `(app name, record)` pairs
///
/// Accepts either a bare object keyed by app name or one wrapped under
/// `drones` as its only key. A lone app named `drones` does not decode as a
/// wrapper, so it is read as an app. Pairs are returned in key order.
pub fn parse_drone_map(value: &Value) -> Option<Vec<(String, DroneRecord)>> {
    let outer = value.as_object()?;
    if outer.len() == 1 {
        if let Some(Value::Object(inner)) = outer.get("drones") {
            if let Some(records) = decode_records(inner) {
                return Some(records);
            }
        }
    }
    decode_records(outer)
}

fn decode_records(map: &serde_json::Map<String, Value>) -> Option<Vec<(String, DroneRecord)>> {
    let mut records = Vec::with_capacity(map.len());
    for (name, entry) in map {
        if !entry.is_object() {
            return None;
        }
        let record: DroneRecord = serde_json::from_value(entry.clone()).ok()?;
        records.push((name.clone(), record));
    }
    records.sort_by(|a, b| a.0.cmp(&b.0));
    Some(records)
}

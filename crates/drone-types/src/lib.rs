//! Drone Types - Shared types for the drone deployment client
//!
//! This crate provides the data that travels between the client and the
//! drone daemon:
//! - App manifests (`config.json`) and their repository descriptors
//! - Action envelopes for start/stop/restart/update/clean requests
//! - Response shapes for version, drone listings and running drones
//!
//! Daemon responses are loosely typed on the wire. The response types here
//! are used for tabular rendering only; callers keep the raw JSON around for
//! everything else.

pub mod envelope;
pub mod error;
pub mod manifest;
pub mod response;

pub use envelope::{Action, Envelope, NameRef};
pub use error::ManifestError;
pub use manifest::{validate_name, AppConfig, Repository, Scripts};
pub use response::{parse_drone_map, parse_running, DroneRecord, RunningDrone, VersionInfo};

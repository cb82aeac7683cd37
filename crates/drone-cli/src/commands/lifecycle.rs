//! Lifecycle commands: start, stop, restart, update, clean

use crate::client::DroneClient;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use dialoguer::Confirm;
use drone_types::{validate_name, Action, AppConfig, NameRef};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Heading printed above an action's response
pub fn heading(action: Action, name: &str) -> String {
    match action {
        Action::Stop => format!("stopped app(s): {}", name),
        other => format!("{} app: {}", other.past_tense(), name),
    }
}

async fn send<P: Serialize>(
    client: &DroneClient,
    name: &str,
    action: Action,
    payload: &P,
    format: OutputFormat,
) -> CliResult<()> {
    let result = client.drone_action(name, action, payload).await?;
    output::print_document(&heading(action, name), &result, format)
}

fn load_manifest(path: &Path, verbose: bool) -> CliResult<AppConfig> {
    let config = AppConfig::load(path)?;
    if verbose {
        debug!(path = %path.display(), "Loaded manifest");
        output::print_info(&format!(
            "app manifest:\n{}",
            serde_json::to_string_pretty(&config)?
        ));
    }
    Ok(config)
}

/// Start the app described by the manifest at `manifest`
pub async fn start(
    client: &DroneClient,
    manifest: &Path,
    verbose: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let config = load_manifest(manifest, verbose)?;
    send(client, &config.name, Action::Start, &config, format).await
}

/// Stop every drone of `name`
pub async fn stop(client: &DroneClient, name: &str, format: OutputFormat) -> CliResult<()> {
    validate_name(name)?;
    send(client, name, Action::Stop, &NameRef::new(name), format).await
}

/// Restart every drone of `name`
pub async fn restart(client: &DroneClient, name: &str, format: OutputFormat) -> CliResult<()> {
    validate_name(name)?;
    send(client, name, Action::Restart, &NameRef::new(name), format).await
}

/// Push the manifest at `manifest` to the daemon
pub async fn update(
    client: &DroneClient,
    manifest: &Path,
    verbose: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let config = load_manifest(manifest, verbose)?;
    send(client, &config.name, Action::Update, &config, format).await
}

/// Stop `name` (or the manifest's app) and remove its files from the daemon
pub async fn clean(
    client: &DroneClient,
    name: Option<&str>,
    manifest: &Path,
    yes: bool,
    verbose: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let target = match name {
        Some(name) => {
            validate_name(name)?;
            CleanTarget::Name(NameRef::new(name))
        }
        None => CleanTarget::Manifest(load_manifest(manifest, verbose)?),
    };

    if !yes && !confirm(&format!("Clean app '{}' and remove its files?", target.name())) {
        output::print_warning("Aborted");
        return Ok(());
    }

    match &target {
        CleanTarget::Name(payload) => {
            send(client, &payload.name, Action::Clean, payload, format).await
        }
        CleanTarget::Manifest(payload) => {
            send(client, &payload.name, Action::Clean, payload, format).await
        }
    }
}

enum CleanTarget {
    Name(NameRef),
    Manifest(AppConfig),
}

impl CleanTarget {
    fn name(&self) -> &str {
        match self {
            CleanTarget::Name(n) => &n.name,
            CleanTarget::Manifest(c) => &c.name,
        }
    }
}

/// Ask for confirmation; anything but an explicit yes (including a missing
/// terminal) counts as no
fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

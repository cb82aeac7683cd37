//! Source packaging commands: deploy, pack

use crate::client::DroneClient;
use crate::config::{CliConfig, DEFAULT_MANIFEST};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use clap::Args;
use drone_pack::{pack_directory, pack_directory_in, PackOptions};
use drone_types::AppConfig;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Arguments for `drone deploy`
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Directory to package (defaults to the manifest's local directory)
    pub directory: Option<PathBuf>,

    /// Owner to deploy as
    #[arg(short, long)]
    pub user: Option<String>,

    /// File or directory name to leave out (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub excludes: Vec<String>,
}

/// Arguments for `drone pack`
#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Directory to package
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Where to write the tarball
    #[arg(short, long)]
    pub file: PathBuf,

    /// File or directory name to leave out (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub excludes: Vec<String>,
}

/// Package a directory and upload it to `/deploy/<user>/<name>`
pub async fn deploy(
    client: &DroneClient,
    args: DeployArgs,
    manifest: Option<&Path>,
    settings: &CliConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let manifest_path = resolve_manifest_path(manifest, args.directory.as_deref());
    let config = AppConfig::load(&manifest_path)?;

    if let Some(repository) = &config.repository {
        if !repository.is_local() && args.directory.is_none() {
            output::print_warning(&format!(
                "repository type is '{}', uploading the local directory anyway",
                repository.kind()
            ));
        }
    }

    let user = resolve_user(
        args.user.as_deref(),
        &config,
        settings,
        std::env::var("USER").ok().as_deref(),
    )?;
    let source = resolve_source_dir(args.directory.as_deref(), &config, &manifest_path);
    debug!(
        app = %config.name,
        user = %user,
        source = %source.display(),
        "Deploying"
    );

    let spinner = spinner(format!("Packing {}", source.display()), format);
    let options = PackOptions::with_excludes(args.excludes);
    let packed = tokio::task::spawn_blocking(move || pack_directory(&source, &options)).await?;
    let archive = match packed {
        Ok(archive) => archive,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    spinner.set_message(format!(
        "Uploading {} ({} files, {})",
        config.name,
        archive.stats().files,
        HumanBytes(archive.size())
    ));
    let result = client.deploy(&user, &config.name, archive.path()).await;
    spinner.finish_and_clear();

    let result = result?;
    output::print_document(&format!("deployed app: {}", config.name), &result, format)
}

/// Package a directory into a local tarball
pub async fn pack(args: PackArgs) -> CliResult<()> {
    let PackArgs {
        directory,
        file,
        excludes,
    } = args;
    let options = PackOptions::with_excludes(excludes).skip_path(&file);
    let target = file.clone();

    // Built next to the target and renamed into place only once complete
    let stats = tokio::task::spawn_blocking(move || -> CliResult<_> {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let archive = pack_directory_in(&directory, &options, dir)?;
        let stats = archive.stats();
        archive.persist(&target)?;
        Ok(stats)
    })
    .await??;

    output::print_success(&format!(
        "Wrote {} ({} files, {} entries)",
        file.display(),
        stats.files,
        stats.entries
    ));
    Ok(())
}

/// Manifest to use: the flag, else `<dir>/config.json` when it exists, else
/// `./config.json`
pub fn resolve_manifest_path(flag: Option<&Path>, directory: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(dir) = directory {
        let candidate = dir.join("config.json");
        if candidate.is_file() {
            return candidate;
        }
    }
    PathBuf::from(DEFAULT_MANIFEST)
}

/// Directory to package: the argument, else the manifest's local directory
/// (relative to the manifest), else the manifest's own directory
pub fn resolve_source_dir(
    directory: Option<&Path>,
    config: &AppConfig,
    manifest_path: &Path,
) -> PathBuf {
    if let Some(dir) = directory {
        return dir.to_path_buf();
    }

    let base = manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    match config.local_directory() {
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    }
}

/// Owner to deploy as: flag, manifest, settings, then `$USER`
pub fn resolve_user(
    flag: Option<&str>,
    config: &AppConfig,
    settings: &CliConfig,
    env_user: Option<&str>,
) -> CliResult<String> {
    let user = flag
        .or(config.user.as_deref())
        .or(settings.user.as_deref())
        .or(env_user)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            CliError::InvalidInput(
                "no user to deploy as; pass --user or set \"user\" in the manifest".into(),
            )
        })?;

    if user.contains('/') {
        return Err(CliError::InvalidInput(format!(
            "user '{}' must not contain '/'",
            user
        )));
    }
    Ok(user.to_string())
}

fn spinner(message: String, format: OutputFormat) -> ProgressBar {
    let spinner = if format.is_machine() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

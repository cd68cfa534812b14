use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rollback_core::{RollbackError, RollbackTarget};
use rollback_gcloud::DEFAULT_LIST_LIMIT;

use crate::rollback::RollbackArgs;

/// Defaults read from `~/.rollback/config.toml`.
#[derive(serde::Deserialize, Default, Debug)]
pub struct FileConfig {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub gcloud: Option<PathBuf>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

/// Per-service overrides of the top-level defaults.
#[derive(serde::Deserialize, Default, Debug)]
pub struct ServiceConfig {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Everything a run needs, after flags and file defaults are merged.
#[derive(Debug)]
pub struct Settings {
    pub target: RollbackTarget,
    pub gcloud: PathBuf,
    pub limit: u32,
    pub key: Option<String>,
    pub key_file: Option<PathBuf>,
    pub dry_run: bool,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rollback").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load the config file. An explicit path must exist; the default location
/// may be absent. Whichever file is found must parse.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig, RollbackError> {
    match explicit {
        Some(path) => load_config_at(path, true),
        None => match default_config_path() {
            Some(path) => load_config_at(&path, false),
            None => Ok(FileConfig::default()),
        },
    }
}

fn load_config_at(path: &Path, required: bool) -> Result<FileConfig, RollbackError> {
    if !required && !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        RollbackError::Configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    let config = parse_config(&content).map_err(|e| {
        RollbackError::Configuration(format!("invalid config {}: {e}", path.display()))
    })?;
    tracing::debug!("loaded defaults from {}", path.display());
    Ok(config)
}

/// Merge flags over file defaults. Flags win; per-service entries win over
/// top-level defaults.
pub fn resolve(args: RollbackArgs, mut file: FileConfig) -> Result<Settings, RollbackError> {
    let service = args.service.unwrap_or_default();
    let overrides = file.services.remove(&service).unwrap_or_default();

    let project = args
        .project
        .or(overrides.project)
        .or(file.project)
        .unwrap_or_default();
    let region = args
        .region
        .or(overrides.region)
        .or(file.region)
        .unwrap_or_default();
    let target = RollbackTarget::new(project, service, region)?;

    let limit = args.limit.or(file.limit).unwrap_or(DEFAULT_LIST_LIMIT);
    if limit == 0 {
        return Err(RollbackError::Configuration(
            "limit must be at least 1".to_string(),
        ));
    }

    Ok(Settings {
        target,
        gcloud: args
            .gcloud
            .or(file.gcloud)
            .unwrap_or_else(|| PathBuf::from("gcloud")),
        limit,
        key: args.key.filter(|k| !k.is_empty()),
        key_file: args.key_file.or(file.key_file),
        dry_run: args.dry_run,
    })
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use rollback_core::{roll_back, RollbackError, Stage};
use rollback_gcloud::{CredentialFile, Gcloud};

use crate::config::{load_config, resolve};
use crate::output::outcome_report;

#[derive(Args, Default, Debug)]
pub struct RollbackArgs {
    /// The project id of the Cloud Run service to roll back
    #[arg(long)]
    pub project: Option<String>,
    /// The name of the Cloud Run service to roll back
    #[arg(long)]
    pub service: Option<String>,
    /// The region where the Cloud Run service is deployed
    #[arg(long)]
    pub region: Option<String>,
    /// Service account key (JSON) allowed to manage the Cloud Run service
    #[arg(long)]
    pub key: Option<String>,
    /// Where to write the service account key; a temporary file is used otherwise
    #[arg(long)]
    pub key_file: Option<PathBuf>,
    /// How many of the newest revisions to inspect
    #[arg(long)]
    pub limit: Option<u32>,
    /// Path to the gcloud executable
    #[arg(long)]
    pub gcloud: Option<PathBuf>,
    /// Config file with default project, region and limits
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Select the revision but leave traffic untouched
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: RollbackArgs) -> anyhow::Result<()> {
    let file = load_config(args.config.as_deref())?;
    let settings = resolve(args, file)?;

    let mut gcloud = Gcloud::new(&settings.gcloud).with_limit(settings.limit);

    // Held until the end of the run so a temporary key outlives every command.
    let _credentials = match settings.key.as_deref() {
        Some(payload) => {
            let credentials = CredentialFile::write(payload, settings.key_file.as_deref())
                .map_err(|e| RollbackError::collaborator(Stage::Credentials, e))?;
            gcloud = gcloud
                .activate(&credentials)
                .map_err(|e| RollbackError::collaborator(Stage::Credentials, e))?;
            Some(credentials)
        }
        None => None,
    };

    let target = &settings.target;
    let outcome = roll_back(&gcloud, target, settings.dry_run)
        .with_context(|| format!("rolling back service {}", target.service))?;

    println!("{}", outcome_report(target, &outcome));

    Ok(())
}

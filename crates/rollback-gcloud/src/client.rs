use std::path::{Path, PathBuf};

use rollback_core::revision::parse_revision_list;
use rollback_core::{CloudRun, RevisionRecord, RollbackTarget};

use crate::command::Invocation;
use crate::credentials::CredentialFile;
use crate::GcloudError;

pub const DEFAULT_LIST_LIMIT: u32 = 5;

const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Cloud Run control plane driven through the `gcloud` CLI.
#[derive(Debug, Clone)]
pub struct Gcloud {
    program: PathBuf,
    limit: u32,
    key_file: Option<PathBuf>,
}

impl Default for Gcloud {
    fn default() -> Self {
        Self::new("gcloud")
    }
}

impl Gcloud {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            limit: DEFAULT_LIST_LIMIT,
            key_file: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Point every later command at this service-account key.
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn invocation(&self) -> Invocation {
        let inv = Invocation::new(&self.program);
        match &self.key_file {
            Some(path) => inv.env(CREDENTIALS_ENV, path.as_os_str()),
            None => inv,
        }
    }

    pub fn activate_invocation(&self, key_file: &Path) -> Invocation {
        self.invocation()
            .env(CREDENTIALS_ENV, key_file.as_os_str())
            .args(["auth", "activate-service-account"])
            .arg(format!("--key-file={}", key_file.display()))
    }

    pub fn list_invocation(&self, target: &RollbackTarget) -> Invocation {
        self.invocation()
            .args(["run", "revisions", "list"])
            .args(["--project", target.project.as_str()])
            .args(["--service", target.service.as_str()])
            .args(["--region", target.region.as_str()])
            .args(["--format", "json"])
            .arg("--limit")
            .arg(self.limit.to_string())
    }

    pub fn update_traffic_invocation(&self, target: &RollbackTarget, revision: &str) -> Invocation {
        self.invocation()
            .args(["run", "services", "update-traffic", target.service.as_str()])
            .arg("--to-revisions")
            .arg(format!("{revision}=100"))
            .args(["--project", target.project.as_str()])
            .args(["--region", target.region.as_str()])
    }

    /// Activate the key with `gcloud auth` and return a client that exports
    /// it to every subsequent command.
    pub fn activate(self, credentials: &CredentialFile) -> Result<Self, GcloudError> {
        let path = credentials.path();
        tracing::info!("Activating service account key at {}", path.display());
        self.activate_invocation(path).run()?;
        Ok(self.with_key_file(path))
    }
}

impl CloudRun for Gcloud {
    type Error = GcloudError;

    fn list_revisions(&self, target: &RollbackTarget) -> Result<Vec<RevisionRecord>, GcloudError> {
        let stdout = self.list_invocation(target).run()?;
        Ok(parse_revision_list(&stdout)?)
    }

    fn route_all_traffic(&self, target: &RollbackTarget, revision: &str) -> Result<(), GcloudError> {
        self.update_traffic_invocation(target, revision).run()?;
        Ok(())
    }
}

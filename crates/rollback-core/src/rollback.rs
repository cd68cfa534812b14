use crate::error::{RollbackError, Stage};
use crate::revision::RevisionRecord;
use crate::select::select_retired;

/// The service a rollback acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackTarget {
    pub project: String,
    pub service: String,
    pub region: String,
}

impl RollbackTarget {
    pub fn new(
        project: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, RollbackError> {
        let target = Self {
            project: project.into(),
            service: service.into(),
            region: region.into(),
        };

        let missing: Vec<&str> = [
            ("project", &target.project),
            ("service", &target.service),
            ("region", &target.region),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(flag, _)| flag)
        .collect();

        if !missing.is_empty() {
            return Err(RollbackError::Configuration(format!(
                "missing required value for: {}",
                missing.join(", ")
            )));
        }
        Ok(target)
    }
}

/// Control-plane operations a rollback needs.
pub trait CloudRun {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a bounded listing of the service's revisions.
    fn list_revisions(&self, target: &RollbackTarget) -> Result<Vec<RevisionRecord>, Self::Error>;

    /// Send 100% of the service's traffic to `revision`.
    fn route_all_traffic(&self, target: &RollbackTarget, revision: &str)
        -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub revision: RevisionRecord,
    /// False for dry runs, where traffic was left untouched.
    pub routed: bool,
}

/// List the service's revisions, pick the newest retired one and route all
/// traffic to it. Stops at the first error.
pub fn roll_back<C: CloudRun>(
    client: &C,
    target: &RollbackTarget,
    dry_run: bool,
) -> Result<Outcome, RollbackError> {
    tracing::info!(
        "Rolling back service {} in region {}...",
        target.service,
        target.region
    );

    let revisions = client
        .list_revisions(target)
        .map_err(|e| RollbackError::collaborator(Stage::ListRevisions, e))?;
    tracing::debug!("listed {} revisions", revisions.len());

    let unnamed = revisions.iter().filter(|r| r.name.is_empty()).count();
    if unnamed > 0 {
        tracing::warn!("ignoring {unnamed} revision(s) without a name");
    }

    let selected = select_retired(&revisions)
        .cloned()
        .ok_or_else(|| RollbackError::NotFound {
            service: target.service.clone(),
        })?;

    if dry_run {
        tracing::info!(
            "Dry run: would update all traffic to revision {}",
            selected.name
        );
        return Ok(Outcome {
            revision: selected,
            routed: false,
        });
    }

    tracing::info!("Update all traffic to revision {}...", selected.name);
    client
        .route_all_traffic(target, &selected.name)
        .map_err(|e| RollbackError::collaborator(Stage::UpdateTraffic, e))?;

    Ok(Outcome {
        revision: selected,
        routed: true,
    })
}

//! End-to-end runs of the rollback flow against a stub `gcloud` executable.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rollback_core::{roll_back, ErrorKind, RollbackError, RollbackTarget, Stage};
use rollback_gcloud::{CredentialFile, Gcloud, GcloudError};

struct StubGcloud {
    _tmp: tempfile::TempDir,
    program: PathBuf,
    log: PathBuf,
}

impl StubGcloud {
    fn new(listing: &str, list_exit: i32) -> Self {
        Self::with_auth_exit(listing, list_exit, 0)
    }

    /// A fake gcloud that records each invocation and answers `run revisions
    /// list` with `listing`. The exit codes let a test make the listing or
    /// the key activation fail.
    fn with_auth_exit(listing: &str, list_exit: i32, auth_exit: i32) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let program = tmp.path().join("gcloud");
        let log = tmp.path().join("calls.log");
        let fixture = tmp.path().join("revisions.json");
        std::fs::write(&fixture, listing).unwrap();

        let script = format!(
            r#"#!/bin/sh
echo "$* | ${{GOOGLE_APPLICATION_CREDENTIALS:-none}}" >> "{log}"
case "$1 $2" in
  "run revisions")
    cat "{fixture}"
    if [ {list_exit} -ne 0 ]; then echo "permission denied" >&2; fi
    exit {list_exit}
    ;;
  "run services") echo "Done." ;;
  "auth activate-service-account")
    if [ {auth_exit} -ne 0 ]; then echo "invalid key file" >&2; exit {auth_exit}; fi
    echo "Activated service account credentials"
    ;;
  *) echo "unexpected: $*" >&2; exit 64 ;;
esac
"#,
            log = log.display(),
            fixture = fixture.display(),
        );
        std::fs::write(&program, script).unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self {
            _tmp: tmp,
            program,
            log,
        }
    }

    fn client(&self) -> Gcloud {
        Gcloud::new(&self.program)
    }

    fn calls(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.log) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn target() -> RollbackTarget {
    RollbackTarget::new("acme-prod", "api", "us-central1").unwrap()
}

fn revision_json(name: &str, created: &str, reason: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "serving.knative.dev/v1",
        "kind": "Revision",
        "metadata": {
            "name": name,
            "creationTimestamp": created,
            "annotations": { "client.knative.dev/user-image": format!("gcr.io/acme/{name}") }
        },
        "status": {
            "conditions": [
                { "type": "Ready", "status": "True" },
                { "type": "Active", "reason": reason, "status": status }
            ]
        }
    })
}

fn listing() -> String {
    serde_json::Value::Array(vec![
        revision_json("api-00007-cur", "2024-05-07T10:00:00Z", "", "True"),
        revision_json("api-00005-old", "2024-05-05T10:00:00Z", "Retired", "True"),
        revision_json("api-00006-prv", "2024-05-06T10:00:00Z", "Retired", "True"),
        revision_json("api-00004-anc", "2024-05-04T10:00:00Z", "Retired", "False"),
    ])
    .to_string()
}

#[test]
fn routes_all_traffic_to_newest_retired_revision() {
    let stub = StubGcloud::new(&listing(), 0);
    let outcome = roll_back(&stub.client(), &target(), false).unwrap();

    assert!(outcome.routed);
    assert_eq!(outcome.revision.name, "api-00006-prv");
    assert_eq!(
        outcome.revision.image.as_deref(),
        Some("gcr.io/acme/api-00006-prv")
    );

    let calls = stub.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with(
        "run revisions list --project acme-prod --service api --region us-central1 \
         --format json --limit 5 |"
    ));
    assert!(calls[1].starts_with(
        "run services update-traffic api --to-revisions api-00006-prv=100 \
         --project acme-prod --region us-central1 |"
    ));
}

#[test]
fn dry_run_only_lists() {
    let stub = StubGcloud::new(&listing(), 0);
    let outcome = roll_back(&stub.client().with_limit(2), &target(), true).unwrap();

    assert!(!outcome.routed);
    assert_eq!(outcome.revision.name, "api-00006-prv");

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("--limit 2"));
}

#[test]
fn nothing_retired_never_updates_traffic() {
    let only_serving = serde_json::Value::Array(vec![revision_json(
        "api-00001-one",
        "2024-05-01T10:00:00Z",
        "Retired",
        "False",
    )])
    .to_string();
    let stub = StubGcloud::new(&only_serving, 0);

    let err = roll_back(&stub.client(), &target(), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(stub.calls().len(), 1);
}

#[test]
fn empty_listing_is_not_found() {
    let stub = StubGcloud::new("[]", 0);
    let err = roll_back(&stub.client(), &target(), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn failing_listing_reports_command_and_stderr() {
    let stub = StubGcloud::new("", 1);
    let err = roll_back(&stub.client(), &target(), false).unwrap_err();

    let RollbackError::Collaborator { stage, source } = err else {
        panic!("expected collaborator failure");
    };
    assert_eq!(stage, Stage::ListRevisions);
    match source.downcast_ref::<GcloudError>() {
        Some(GcloudError::Failed {
            command, stderr, ..
        }) => {
            assert!(command.ends_with("--format json --limit 5"));
            assert_eq!(stderr, "permission denied");
        }
        other => panic!("unexpected source: {other:?}"),
    }
    assert_eq!(stub.calls().len(), 1);
}

#[test]
fn malformed_listing_is_collaborator_failure() {
    let stub = StubGcloud::new("Listed 0 items.", 0);
    let err = roll_back(&stub.client(), &target(), false).unwrap_err();

    let RollbackError::Collaborator { stage, source } = err else {
        panic!("expected collaborator failure");
    };
    assert_eq!(stage, Stage::ListRevisions);
    assert!(matches!(
        source.downcast_ref::<GcloudError>(),
        Some(GcloudError::Decode(_))
    ));
}

#[test]
fn activated_key_is_exported_to_every_later_command() {
    let stub = StubGcloud::new(&listing(), 0);
    let key_dir = tempfile::tempdir().unwrap();
    let key_path = key_dir.path().join("service-account.json");

    let credentials =
        CredentialFile::write(r#"{"type":"service_account"}"#, Some(&key_path)).unwrap();
    let gcloud = stub.client().activate(&credentials).unwrap();
    roll_back(&gcloud, &target(), false).unwrap();

    let key = key_path.display().to_string();
    let calls = stub.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        format!("auth activate-service-account --key-file={key} | {key}")
    );
    assert!(calls[1].starts_with("run revisions list"));
    assert!(calls[1].ends_with(&format!("| {key}")));
    assert!(calls[2].starts_with("run services update-traffic"));
    assert!(calls[2].ends_with(&format!("| {key}")));
}

#[test]
fn rejected_key_stops_before_any_listing() {
    let stub = StubGcloud::with_auth_exit(&listing(), 0, 1);
    let credentials = CredentialFile::write(r#"{"type":"service_account"}"#, None).unwrap();

    let err = stub.client().activate(&credentials).unwrap_err();
    match err {
        GcloudError::Failed { command, stderr, .. } => {
            assert!(command.contains("auth activate-service-account --key-file="));
            assert_eq!(stderr, "invalid key file");
        }
        other => panic!("unexpected error: {other}"),
    }

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("auth activate-service-account"));
}

#[test]
fn missing_gcloud_binary_is_spawn_error() {
    let gcloud = Gcloud::new(Path::new("/nonexistent/bin/gcloud"));
    let err = roll_back(&gcloud, &target(), false).unwrap_err();
    let RollbackError::Collaborator { source, .. } = err else {
        panic!("expected collaborator failure");
    };
    assert!(matches!(
        source.downcast_ref::<GcloudError>(),
        Some(GcloudError::Spawn { .. })
    ));
}

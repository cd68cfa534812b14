use rollback_core::{ErrorKind, RollbackError};

fn rollback_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<RollbackError>())
        .map(RollbackError::kind)
}

/// Render the error with its cause chain and, when the failure has a known
/// kind, a hint on what to check next.
pub fn format_error(err: &anyhow::Error) -> String {
    let mut lines = vec![format!("error: {err}")];
    lines.extend(err.chain().skip(1).map(|cause| format!("  caused by: {cause}")));

    let hint = match rollback_kind(err) {
        Some(ErrorKind::Configuration) => {
            Some("check --project, --service, --region and the config file")
        }
        Some(ErrorKind::NotFound) => {
            Some("no earlier revision is retired; raise --limit to look further back")
        }
        Some(ErrorKind::Collaborator) | None => None,
    };
    if let Some(hint) = hint {
        lines.push(format!("  hint: {hint}"));
    }
    lines.join("\n")
}

/// 2 for bad configuration, 3 when there is nothing to roll back to, 1 for
/// everything else.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match rollback_kind(err) {
        Some(ErrorKind::Configuration) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Collaborator) | None => 1,
    }
}

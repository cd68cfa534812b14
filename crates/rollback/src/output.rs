use rollback_core::{Outcome, RollbackTarget};

/// What the operator sees on stdout once a run succeeds.
pub fn outcome_report(target: &RollbackTarget, outcome: &Outcome) -> String {
    let revision = &outcome.revision;
    if outcome.routed {
        return format!(
            "Routed 100% of traffic for {} ({}, {}) to revision {}",
            target.service, target.project, target.region, revision.name
        );
    }

    let mut fields = vec![
        ("project", target.project.clone()),
        ("service", target.service.clone()),
        ("region", target.region.clone()),
        ("revision", revision.name.clone()),
        ("created", revision.created_at.to_rfc3339()),
    ];
    if let Some(image) = &revision.image {
        fields.push(("image", image.clone()));
    }

    let mut report = String::from("Dry run, traffic left unchanged; would route 100% to:");
    for (key, value) in fields {
        report.push_str(&format!("\n  {key:<9}{value}"));
    }
    report
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

const USER_IMAGE_ANNOTATION: &str = "client.knative.dev/user-image";

/// One revision as reported by `gcloud run revisions list --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRevision")]
pub struct RevisionRecord {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub conditions: Vec<Condition>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Condition {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

impl Condition {
    pub fn new(reason: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kind: String::new(),
            reason: reason.into(),
            status: status.into(),
        }
    }
}

impl RevisionRecord {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
            conditions: Vec::new(),
            image: None,
        }
    }

    pub fn with_condition(mut self, reason: &str, status: &str) -> Self {
        self.conditions.push(Condition::new(reason, status));
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRevision {
    metadata: RawMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    status: RawStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    creation_timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    annotations: BTreeMap<String, Option<String>>,
}

#[derive(Deserialize, Default)]
struct RawStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    conditions: Vec<Condition>,
}

/// gcloud emits `null` for unset fields; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<RawRevision> for RevisionRecord {
    fn from(raw: RawRevision) -> Self {
        let RawMetadata {
            name,
            creation_timestamp,
            mut annotations,
        } = raw.metadata;
        Self {
            name,
            created_at: creation_timestamp,
            conditions: raw.status.conditions,
            image: annotations.remove(USER_IMAGE_ANNOTATION).flatten(),
        }
    }
}

/// Decode the JSON array printed by the revision inventory command.
pub fn parse_revision_list(json: &[u8]) -> Result<Vec<RevisionRecord>, serde_json::Error> {
    serde_json::from_slice(json)
}

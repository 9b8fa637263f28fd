//! Docker API payload types used by the client operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deserializes a required list that the daemon may send as `null`.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Prune Reports
// =============================================================================

/// One image removed or untagged by a prune.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageDeleteResponseItem {
    /// Reference that was untagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untagged: Option<String>,
    /// Image id that was deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
}

/// Result of `POST /images/prune`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImagesPruneReport {
    /// Images deleted or untagged, in daemon order.
    #[serde(deserialize_with = "nullable_vec")]
    pub images_deleted: Vec<ImageDeleteResponseItem>,
    /// Disk space reclaimed in bytes.
    pub space_reclaimed: u64,
}

/// Result of `POST /containers/prune`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainersPruneReport {
    /// Container ids deleted.
    #[serde(deserialize_with = "nullable_vec")]
    pub containers_deleted: Vec<String>,
    /// Disk space reclaimed in bytes.
    pub space_reclaimed: u64,
}

/// Result of `POST /volumes/prune`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumesPruneReport {
    /// Volume names deleted.
    #[serde(deserialize_with = "nullable_vec")]
    pub volumes_deleted: Vec<String>,
    /// Disk space reclaimed in bytes.
    pub space_reclaimed: u64,
}

/// Result of `POST /networks/prune`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworksPruneReport {
    /// Network names deleted.
    #[serde(deserialize_with = "nullable_vec")]
    pub networks_deleted: Vec<String>,
}

// =============================================================================
// Swarm Secrets
// =============================================================================

/// Object version used for optimistic concurrency on swarm objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    /// Monotonic index; updates must send the index they were based on.
    #[serde(default)]
    pub index: u64,
}

/// Driver reference with options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Driver {
    /// Driver name.
    pub name: String,
    /// Driver-specific options.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// User-defined part of a secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretSpec {
    /// Secret name.
    #[serde(default)]
    pub name: String,
    /// User labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Secret payload; base64 on the wire.
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
    /// External secret driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
    /// Templating driver applied to the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating: Option<Driver>,
}

impl SecretSpec {
    /// Creates a spec holding `data` under `name`.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            ..Self::default()
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// A swarm secret as returned by inspect and list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Secret {
    /// Secret id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Current object version.
    #[serde(default)]
    pub version: ObjectVersion,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Secret spec (data is never returned by the daemon).
    pub spec: SecretSpec,
}

/// Result of `POST /secrets/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretCreateResponse {
    /// Id of the new secret.
    #[serde(rename = "ID")]
    pub id: String,
}

// =============================================================================
// System
// =============================================================================

/// Headers reported by `GET /_ping`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingInfo {
    /// Maximum API version supported by the daemon.
    pub api_version: Option<String>,
    /// Daemon operating system (`linux`, `windows`).
    pub os_type: Option<String>,
    /// Whether experimental features are enabled.
    pub experimental: bool,
    /// Default builder version.
    pub builder_version: Option<String>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD.decode(encoded).map_err(de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

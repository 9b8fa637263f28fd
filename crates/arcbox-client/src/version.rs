//! API version parsing and per-operation version gates.

use crate::error::{ClientError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted API version such as `1.25`.
///
/// Ordering is numeric per component, and missing trailing components count
/// as zero, so `1.25 == 1.25.0` and `1.9 < 1.10`.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    raw: String,
    components: Vec<u64>,
}

impl ApiVersion {
    /// Returns the version as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the numeric components.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for ApiVersion {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let components = raw
            .split('.')
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| ClientError::InvalidVersion(s.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let ours = self.components.get(i).copied().unwrap_or(0);
                let theirs = other.components.get(i).copied().unwrap_or(0);
                ours.cmp(&theirs)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ApiVersion {}

/// Fails with [`ClientError::UnsupportedVersion`] if `negotiated` is older
/// than `min_version`.
///
/// An empty `negotiated` version means the client is not pinned to a
/// version and always passes.
///
/// # Errors
///
/// Returns [`ClientError::UnsupportedVersion`] when the gate rejects the
/// operation, or [`ClientError::InvalidVersion`] if either version is not a
/// dotted list of integers.
pub fn require_min_version(operation: &str, min_version: &str, negotiated: &str) -> Result<()> {
    if negotiated.is_empty() {
        return Ok(());
    }

    let required: ApiVersion = min_version.parse()?;
    let current: ApiVersion = negotiated.parse()?;
    if current < required {
        return Err(ClientError::UnsupportedVersion {
            operation: operation.to_string(),
            required: required.to_string(),
            current: current.to_string(),
        });
    }
    Ok(())
}

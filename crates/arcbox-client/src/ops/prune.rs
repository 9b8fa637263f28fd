//! Prune operations for images, containers, volumes and networks.

use crate::client::DaemonClient;
use crate::error::Result;
use crate::filters::FilterSet;
use crate::request::QueryParams;
use crate::response::decode_json;
use crate::types::{
    ContainersPruneReport, ImagesPruneReport, NetworksPruneReport, VolumesPruneReport,
};
use hyper::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// Minimum API version of every prune endpoint.
pub const PRUNE_MIN_API_VERSION: &str = "1.25";

impl DaemonClient {
    /// Deletes unused images.
    ///
    /// Common filters: `dangling=true|false`, `until=<timestamp>`,
    /// `label=<key>[=<value>]`, `label!=<key>[=<value>]`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnsupportedVersion`](crate::ClientError::UnsupportedVersion)
    /// below API 1.25, transport errors unchanged, and daemon or decode errors
    /// from the response.
    pub async fn images_prune(
        &self,
        filters: &FilterSet,
        cancel: &CancellationToken,
    ) -> Result<ImagesPruneReport> {
        let report: ImagesPruneReport = self
            .prune("image prune", "/images/prune", filters, cancel)
            .await?;
        tracing::debug!(
            deleted = report.images_deleted.len(),
            space_reclaimed = report.space_reclaimed,
            "Pruned images"
        );
        Ok(report)
    }

    /// Deletes stopped containers.
    ///
    /// # Errors
    ///
    /// Same as [`images_prune`](Self::images_prune).
    pub async fn containers_prune(
        &self,
        filters: &FilterSet,
        cancel: &CancellationToken,
    ) -> Result<ContainersPruneReport> {
        let report: ContainersPruneReport = self
            .prune("container prune", "/containers/prune", filters, cancel)
            .await?;
        tracing::debug!(
            deleted = report.containers_deleted.len(),
            space_reclaimed = report.space_reclaimed,
            "Pruned containers"
        );
        Ok(report)
    }

    /// Deletes volumes not used by any container.
    ///
    /// # Errors
    ///
    /// Same as [`images_prune`](Self::images_prune).
    pub async fn volumes_prune(
        &self,
        filters: &FilterSet,
        cancel: &CancellationToken,
    ) -> Result<VolumesPruneReport> {
        let report: VolumesPruneReport = self
            .prune("volume prune", "/volumes/prune", filters, cancel)
            .await?;
        tracing::debug!(
            deleted = report.volumes_deleted.len(),
            space_reclaimed = report.space_reclaimed,
            "Pruned volumes"
        );
        Ok(report)
    }

    /// Deletes networks not used by any container.
    ///
    /// # Errors
    ///
    /// Same as [`images_prune`](Self::images_prune).
    pub async fn networks_prune(
        &self,
        filters: &FilterSet,
        cancel: &CancellationToken,
    ) -> Result<NetworksPruneReport> {
        let report: NetworksPruneReport = self
            .prune("network prune", "/networks/prune", filters, cancel)
            .await?;
        tracing::debug!(deleted = report.networks_deleted.len(), "Pruned networks");
        Ok(report)
    }

    async fn prune<R: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        filters: &FilterSet,
        cancel: &CancellationToken,
    ) -> Result<R> {
        self.require_version(operation, PRUNE_MIN_API_VERSION)?;

        let mut query = QueryParams::new();
        query.set_filters("filters", filters)?;

        let request = self.request(Method::POST, path).query(query).build();
        let response = self.send(request, cancel).await?;
        decode_json(response).await
    }
}

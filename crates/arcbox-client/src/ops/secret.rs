//! Swarm secret operations.

use crate::client::DaemonClient;
use crate::error::{ClientError, Result};
use crate::filters::FilterSet;
use crate::request::{path_segment, QueryParams};
use crate::response::{decode_json, ensure_success};
use crate::types::{ObjectVersion, Secret, SecretCreateResponse, SecretSpec};
use hyper::Method;
use tokio_util::sync::CancellationToken;

/// Minimum API version of the secret endpoints.
pub const SECRET_MIN_API_VERSION: &str = "1.25";

fn secret_path(id: &str) -> Result<String> {
    if id.is_empty() {
        return Err(ClientError::ObjectNotFound {
            kind: "secret",
            id: String::new(),
        });
    }
    Ok(format!("/secrets/{}", path_segment(id)))
}

impl DaemonClient {
    /// Lists secrets matching `filters` (`id`, `label`, `name`, `names`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnsupportedVersion`] below API 1.25, transport
    /// errors unchanged, and daemon or decode errors from the response.
    pub async fn secret_list(
        &self,
        filters: &FilterSet,
        cancel: &CancellationToken,
    ) -> Result<Vec<Secret>> {
        self.require_version("secret list", SECRET_MIN_API_VERSION)?;

        let mut query = QueryParams::new();
        query.set_filters("filters", filters)?;

        let request = self.request(Method::GET, "/secrets").query(query).build();
        let response = self.send(request, cancel).await?;
        decode_json(response).await
    }

    /// Creates a secret.
    ///
    /// # Errors
    ///
    /// Same as [`secret_list`](Self::secret_list).
    pub async fn secret_create(
        &self,
        spec: &SecretSpec,
        cancel: &CancellationToken,
    ) -> Result<SecretCreateResponse> {
        self.require_version("secret create", SECRET_MIN_API_VERSION)?;

        let request = self
            .request(Method::POST, "/secrets/create")
            .json_body(spec)?
            .build();
        let response = self.send(request, cancel).await?;
        let created: SecretCreateResponse = decode_json(response).await?;
        tracing::debug!(id = %created.id, name = %spec.name, "Created secret");
        Ok(created)
    }

    /// Returns the secret with the given id or name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ObjectNotFound`] for an empty id, otherwise the
    /// same as [`secret_list`](Self::secret_list).
    pub async fn secret_inspect(&self, id: &str, cancel: &CancellationToken) -> Result<Secret> {
        self.require_version("secret inspect", SECRET_MIN_API_VERSION)?;
        let path = secret_path(id)?;

        let request = self.request(Method::GET, path).build();
        let response = self.send(request, cancel).await?;
        decode_json(response).await
    }

    /// Removes a secret.
    ///
    /// # Errors
    ///
    /// Same as [`secret_inspect`](Self::secret_inspect).
    pub async fn secret_remove(&self, id: &str, cancel: &CancellationToken) -> Result<()> {
        self.require_version("secret remove", SECRET_MIN_API_VERSION)?;
        let path = secret_path(id)?;

        let request = self.request(Method::DELETE, path).build();
        let response = self.send(request, cancel).await?;
        ensure_success(response).await
    }

    /// Replaces the spec of a secret.
    ///
    /// `version` must be the object version the new spec is based on; the
    /// daemon rejects the update if the secret changed in the meantime.
    ///
    /// # Errors
    ///
    /// Same as [`secret_inspect`](Self::secret_inspect).
    pub async fn secret_update(
        &self,
        id: &str,
        version: ObjectVersion,
        spec: &SecretSpec,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.require_version("secret update", SECRET_MIN_API_VERSION)?;
        let path = format!("{}/update", secret_path(id)?);

        let mut query = QueryParams::new();
        query.set("version", version.index.to_string());

        let request = self
            .request(Method::POST, path)
            .query(query)
            .json_body(spec)?
            .build();
        let response = self.send(request, cancel).await?;
        ensure_success(response).await?;
        tracing::debug!(id, version = version.index, "Updated secret");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::testing::{error_response, json_response, query_params, MockTransport};
    use hyper::header::CONTENT_TYPE;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    fn config(version: &str) -> ClientConfig {
        ClientConfig {
            api_version: version.to_string(),
            ..ClientConfig::with_socket("/nonexistent.sock")
        }
    }

    #[tokio::test]
    async fn test_secret_update_unsupported() {
        let (client, mock) = MockTransport::client(config("1.24"), |_| {
            Ok(json_response(StatusCode::OK, ""))
        });

        let err = client
            .secret_update(
                "secret_id",
                ObjectVersion::default(),
                &SecretSpec::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"secret update\" requires API version 1.25, but the Docker daemon API version is 1.24"
        );
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_secret_update_error() {
        let (client, _mock) = MockTransport::client(config("1.25"), |_| {
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
            ))
        });

        let err = client
            .secret_update(
                "secret_id",
                ObjectVersion::default(),
                &SecretSpec::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error response from daemon: Server error");
    }

    #[tokio::test]
    async fn test_secret_update() {
        let (client, mock) = MockTransport::client(config("1.25"), |_| {
            Ok(json_response(StatusCode::OK, "body"))
        });

        let spec = SecretSpec::new("db-password", "s3cr3t").label("env", "prod");
        client
            .secret_update(
                "secret_id",
                ObjectVersion { index: 10 },
                &spec,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let request = mock.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path(), "/v1.25/secrets/secret_id/update");
        assert_eq!(query_params(&request)["version"], "10");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");

        let body: Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"Name": "db-password", "Labels": {"env": "prod"}, "Data": "czNjcjN0"})
        );
    }

    #[tokio::test]
    async fn test_empty_id_is_not_found() {
        let (client, mock) = MockTransport::client(config("1.25"), |_| {
            Ok(json_response(StatusCode::OK, "{}"))
        });
        let cancel = CancellationToken::new();

        let err = client.secret_inspect("", &cancel).await.unwrap_err();
        assert!(err.is_not_found());
        let err = client.secret_remove("", &cancel).await.unwrap_err();
        assert!(err.is_not_found());
        let err = client
            .secret_update("", ObjectVersion::default(), &SecretSpec::default(), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_secret_inspect() {
        let (client, mock) = MockTransport::client(config("1.25"), |_| {
            Ok(json_response(
                StatusCode::OK,
                r#"{"ID":"secret_id","Version":{"Index":3},"Spec":{"Name":"db"}}"#,
            ))
        });

        let secret = client
            .secret_inspect("secret_id", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(secret.id, "secret_id");
        assert_eq!(secret.version.index, 3);
        assert_eq!(secret.spec.name, "db");
        assert_eq!(mock.last_request().path(), "/v1.25/secrets/secret_id");
    }

    #[tokio::test]
    async fn test_secret_inspect_not_found() {
        let (client, _mock) = MockTransport::client(config("1.25"), |_| {
            Ok(error_response(StatusCode::NOT_FOUND, "secret missing not found"))
        });

        let err = client
            .secret_inspect("missing", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Error response from daemon: secret missing not found"
        );
    }

    #[tokio::test]
    async fn test_secret_list_with_filters() {
        let (client, mock) = MockTransport::client(config("1.30"), |_| {
            Ok(json_response(
                StatusCode::OK,
                r#"[{"ID":"a","Spec":{"Name":"one"}},{"ID":"b","Spec":{"Name":"two"}}]"#,
            ))
        });

        let filters = FilterSet::new().with("label", "env=prod");
        let secrets = client
            .secret_list(&filters, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets[1].spec.name, "two");

        let request = mock.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path(), "/v1.30/secrets");
        let filters: Value = serde_json::from_str(&query_params(&request)["filters"]).unwrap();
        assert_eq!(filters, json!({"label": {"env=prod": true}}));
    }

    #[tokio::test]
    async fn test_secret_create() {
        let (client, mock) = MockTransport::client(config("1.25"), |_| {
            Ok(json_response(StatusCode::CREATED, r#"{"ID":"new_id"}"#))
        });

        let created = client
            .secret_create(&SecretSpec::new("tls.key", "key"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(created.id, "new_id");

        let request = mock.last_request();
        assert_eq!(request.path(), "/v1.25/secrets/create");
        assert!(request.query().is_none());
    }

    #[tokio::test]
    async fn test_secret_remove_escapes_id() {
        let (client, mock) = MockTransport::client(config("1.25"), |_| {
            Ok(json_response(StatusCode::NO_CONTENT, ""))
        });

        client
            .secret_remove("name with space", &CancellationToken::new())
            .await
            .unwrap();

        let request = mock.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path(), "/v1.25/secrets/name%20with%20space");
    }

    #[tokio::test]
    async fn test_secret_remove_dot_dot_stays_in_secrets() {
        let (client, mock) = MockTransport::client(config("1.25"), |_| {
            Ok(json_response(StatusCode::NO_CONTENT, ""))
        });

        client
            .secret_remove("..", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(mock.last_request().path(), "/v1.25/secrets/%2E%2E");
    }
}

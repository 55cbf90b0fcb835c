//! reqwest implementation of [`PermissionApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use toolbox_models::{PermissionDto, PermissionRecord, RoleId, RoleSummary, SavePermissionDto};
use tracing::{debug, instrument};

use crate::{ClientError, PermissionApi};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            debug!(status = status.as_u16(), %message, "Request failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    fn map_transport(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Transport(err)
        }
    }
}

#[async_trait]
impl PermissionApi for HttpClient {
    #[instrument(skip(self))]
    async fn find_by_role_id(&self, role_id: RoleId) -> Result<Vec<PermissionDto>, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/permissions/roles/{role_id}")))
            .await
    }

    #[instrument(skip(self, request), fields(role_id = %request.role_id, screen = %request.screen_name))]
    async fn save_permission(
        &self,
        request: &SavePermissionDto,
    ) -> Result<PermissionRecord, ClientError> {
        self.send(self.request(Method::PUT, "/api/permissions").json(request))
            .await
    }

    #[instrument(skip(self))]
    async fn get_all_roles(&self) -> Result<Vec<RoleSummary>, ClientError> {
        self.send(self.request(Method::GET, "/api/roles/all")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(client.token.is_none());
        assert!(client.with_token("t").token.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = HttpClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.get_all_roles().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(_) | ClientError::Timeout(_)
        ));
    }
}

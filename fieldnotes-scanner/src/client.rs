use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fieldnotes_model::api::routes::v1;
use fieldnotes_model::{
    ApiResponse, ErrorEnvelope, MachineRecord, NewServiceRequest,
    ServiceRecord, SparePart, User,
};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use crate::controller::UserSession;
use crate::error::ClientError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves a scanned identifier into a machine record.
#[async_trait]
pub trait MachineDirectory: Send + Sync {
    async fn lookup_machine(
        &self,
        identifier: &str,
    ) -> Result<MachineRecord, ClientError>;
}

#[async_trait]
pub trait SparePartSource: Send + Sync {
    /// `None` or an empty query returns the newest parts.
    async fn search_spare_parts(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<SparePart>, ClientError>;
}

#[async_trait]
pub trait ServiceSubmitter: Send + Sync {
    async fn submit_service(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRecord, ClientError>;
}

#[derive(Debug, Deserialize)]
struct Revocation {
    revoked: bool,
}

/// HTTP client for the Fieldnotes API with bearer-session support.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field(
                "has_token",
                &self.token.try_read().map(|t| t.is_some()).unwrap_or(false),
            )
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;

        info!("[ApiClient] using API at {base_url}");
        Ok(Self {
            client,
            base_url,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Resolve an absolute API route against the base URL.
    pub fn url(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(route.trim_start_matches('/'))?)
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and unwrap the `data` of its envelope. `subject` names
    /// the resource in a 404.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        subject: impl FnOnce() -> String,
    ) -> Result<T, ClientError> {
        let response = self.authorized(builder).await.send().await?;
        let status = response.status();

        if status.is_success() {
            let envelope: ApiResponse<T> = response.json().await?;
            return envelope.data.ok_or(ClientError::EmptyResponse);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(subject())),
            StatusCode::UNAUTHORIZED => {
                warn!("[ApiClient] session rejected by server");
                self.set_token(None).await;
                Err(ClientError::Unauthorized)
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorEnvelope>(&text)
                    .map(|envelope| envelope.error.message)
                    .unwrap_or_else(|_| {
                        format!("Request failed with status {status}")
                    });
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        let request = self.client.get(self.url(v1::users::ME)?);
        self.execute(request, || "User".to_string()).await
    }

    pub async fn lookup_machine(
        &self,
        identifier: &str,
    ) -> Result<MachineRecord, ClientError> {
        debug!("[ApiClient] looking up machine {identifier}");
        let request = self
            .client
            .get(self.url(v1::machines::LOOKUP)?)
            .query(&[("id", identifier)]);
        self.execute(request, || format!("Machine {identifier}"))
            .await
    }

    pub async fn search_spare_parts(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<SparePart>, ClientError> {
        let mut request = self.client.get(self.url(v1::spare_parts::SEARCH)?);
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("q", q)]);
        }
        self.execute(request, || "Spare parts".to_string()).await
    }

    pub async fn submit_service(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRecord, ClientError> {
        let machine_id = request.machine_id;
        let builder = self
            .client
            .post(self.url(v1::services::COLLECTION)?)
            .json(request);
        self.execute(builder, || format!("Machine {machine_id}"))
            .await
    }

    /// Revoke the current session server-side and forget the token.
    pub async fn logout(&self) -> Result<bool, ClientError> {
        let request = self.client.post(self.url(v1::auth::LOGOUT)?);
        let revocation: Revocation =
            self.execute(request, || "Session".to_string()).await?;
        self.set_token(None).await;
        Ok(revocation.revoked)
    }
}

#[async_trait]
impl MachineDirectory for ApiClient {
    async fn lookup_machine(
        &self,
        identifier: &str,
    ) -> Result<MachineRecord, ClientError> {
        ApiClient::lookup_machine(self, identifier).await
    }
}

#[async_trait]
impl SparePartSource for ApiClient {
    async fn search_spare_parts(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<SparePart>, ClientError> {
        ApiClient::search_spare_parts(self, query).await
    }
}

#[async_trait]
impl ServiceSubmitter for ApiClient {
    async fn submit_service(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRecord, ClientError> {
        ApiClient::submit_service(self, request).await
    }
}

#[async_trait]
impl UserSession for ApiClient {
    async fn end_session(&self) -> Result<(), ClientError> {
        self.logout().await.map(|_| ())
    }
}

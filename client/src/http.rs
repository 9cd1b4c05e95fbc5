//! HTTP implementation of the transport port.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

use paging::{PageRequest, PagedResult};

use crate::api::{IncidentApi, IncidentChanges, NewIncident, TransportError};
use crate::auth::AuthSession;
use crate::model::{ApiErrorBody, Comment, Incident};

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_KIND_HEADER: &str = "x-actor-kind";

/// Incident service client over HTTP.
pub struct HttpIncidentApi {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthSession>,
}

impl HttpIncidentApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth: Arc<AuthSession>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            auth,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.auth.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some((actor_id, actor_kind)) = self.auth.actor() {
            builder = builder
                .header(ACTOR_ID_HEADER, actor_id.to_string())
                .header(ACTOR_KIND_HEADER, actor_kind.as_str());
        }
        builder
    }

    async fn send(builder: RequestBuilder) -> Result<Response, TransportError> {
        builder
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))
    }

    /// Turn a non-success response into the service's error envelope, or a
    /// decode error when the body is not the envelope shape.
    async fn error_from(response: Response) -> TransportError {
        let status = response.status();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => {
                debug!(status = %status, code = ?body.code, "request failed");
                TransportError::Api(body)
            }
            Err(err) => TransportError::Decode(format!("{status}: {err}")),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, TransportError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[async_trait]
impl IncidentApi for HttpIncidentApi {
    async fn list(&self, page: PageRequest) -> Result<PagedResult<Incident>, TransportError> {
        let builder = self.request(Method::GET, "/api/incidents").query(&[
            ("pageNumber", page.page_number()),
            ("pageSize", page.page_size()),
        ]);
        Self::decode(Self::send(builder).await?).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Incident>, TransportError> {
        let builder = self.request(Method::GET, &format!("/api/incidents/{id}"));
        let response = Self::send(builder).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    async fn create(&self, new: NewIncident) -> Result<Incident, TransportError> {
        let builder = self.request(Method::POST, "/api/incidents").json(&new);
        Self::decode(Self::send(builder).await?).await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: IncidentChanges,
    ) -> Result<Incident, TransportError> {
        let builder = self
            .request(Method::PUT, &format!("/api/incidents/{id}"))
            .json(&changes);
        Self::decode(Self::send(builder).await?).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), TransportError> {
        let builder = self.request(Method::DELETE, &format!("/api/incidents/{id}"));
        let response = Self::send(builder).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn add_comment(
        &self,
        incident_id: Uuid,
        content: String,
    ) -> Result<Comment, TransportError> {
        let builder = self
            .request(Method::POST, &format!("/api/incidents/{incident_id}/comments"))
            .json(&serde_json::json!({ "content": content }));
        Self::decode(Self::send(builder).await?).await
    }
}

// SPDX-License-Identifier: MPL-2.0
//! `reqwest` implementation of [`NotificationApi`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::api::{ListQuery, NotificationApi};
use super::model::{Notification, NotificationId};
use crate::config::Config;
use crate::error::ApiError;

const USER_AGENT: &str = concat!("SchoolBell/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct UnreadCountBody {
    unread_count: u64,
}

#[derive(Debug, Deserialize)]
struct MarkAllBody {
    updated_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// HTTP client for the notification endpoints.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Builds a client; `base_url` is the API root without `/notifications`.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            config.server.base_url.clone(),
            config.token(),
            config.request_timeout(),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/notifications{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // FastAPI-style `{"detail": "..."}` bodies are surfaced when present.
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail);
        tracing::debug!(status = status.as_u16(), ?detail, "notification request failed");
        Err(ApiError::from_status(status.as_u16(), detail))
    }
}

impl NotificationApi for HttpClient {
    async fn list(&self, query: ListQuery) -> Result<Vec<Notification>, ApiError> {
        let builder = self.client.get(self.url("")).query(&[
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
            ("unread_only", query.unread_only.to_string()),
        ]);
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }

    async fn unread_count(&self) -> Result<u64, ApiError> {
        let response = self.send(self.client.get(self.url("/unread/count"))).await?;
        let body: UnreadCountBody = response.json().await?;
        Ok(body.unread_count)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), ApiError> {
        self.send(self.client.patch(self.url(&format!("/{id}/read"))))
            .await
            .map(drop)
    }

    async fn mark_all_read(&self) -> Result<u64, ApiError> {
        let response = self
            .send(self.client.patch(self.url("/mark-all-read")))
            .await?;
        let body: MarkAllBody = response.json().await?;
        Ok(body.updated_count)
    }

    async fn delete(&self, id: NotificationId) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&format!("/{id}"))))
            .await
            .map(drop)
    }
}

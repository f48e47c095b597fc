//! # HTTP Gateway
//!
//! [`HttpGateway`] speaks the product API over HTTP:
//!
//! | Call | Request |
//! |---|---|
//! | `fetch_page` | `GET /product?page=&limit=` |
//! | `create` | `POST /product` |
//! | `update` | `PUT /product?id=` |
//! | `remove` | `DELETE /product?id=` |
//! | `login` | `POST /login` |
//! | `profile` | `GET /profile` |
//! | `logout` | `POST /profile/logout` |
//!
//! Session credentials are cookies set by `/login`; the underlying client keeps a
//! cookie store and replays them on every call.
//!
//! The live feed polls `GET /product` and emits the whole collection each time it
//! differs from the previously emitted one.

use super::{
    AuthGateway, ProductGateway, RequestError, SnapshotFeed, Subscription, REQUEST_FAILED,
    SOMETHING_WENT_WRONG,
};
use crate::config::ClientConfig;
use crate::model::{Credentials, Product, ProductPatch, User};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

const LOGIN_FAILED: &str = "Login failed";
const PROFILE_FAILED: &str = "Failed to fetch profile";
const LOGOUT_FAILED: &str = "Logout failed";

/// reqwest-backed [`ProductGateway`] and [`AuthGateway`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: String,
    poll_interval: Duration,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, RequestError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .build()
            .map_err(|e| RequestError::new(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, RequestError> {
        let response = Self::send(request, fallback).await?;
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Unreadable response body");
            RequestError::new(SOMETHING_WENT_WRONG)
        })
    }

    async fn send(
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, RequestError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Transport failure");
            RequestError::new(fallback)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RequestError::from_response_body(status.as_u16(), &body, fallback);
        warn!(status = status.as_u16(), error = %err, "Request rejected");
        Err(err)
    }
}

#[async_trait]
impl ProductGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Product>, RequestError> {
        debug!("Sending request");
        let request = self
            .http
            .get(self.url("product"))
            .query(&[("page", page), ("limit", limit)]);
        Self::send_json(request, REQUEST_FAILED).await
    }

    #[instrument(skip(self))]
    async fn create(&self, patch: ProductPatch) -> Result<Product, RequestError> {
        debug!("Sending request");
        let request = self.http.post(self.url("product")).json(&patch);
        Self::send_json(request, REQUEST_FAILED).await
    }

    #[instrument(skip(self))]
    async fn update(&self, id: String, patch: ProductPatch) -> Result<Product, RequestError> {
        debug!("Sending request");
        let request = self
            .http
            .put(self.url("product"))
            .query(&[("id", id.as_str())])
            .json(&patch);
        Self::send_json(request, REQUEST_FAILED).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: String) -> Result<(), RequestError> {
        debug!("Sending request");
        let request = self
            .http
            .delete(self.url("product"))
            .query(&[("id", id.as_str())]);
        Self::send(request, REQUEST_FAILED).await.map(|_| ())
    }

    fn subscribe(&self) -> SnapshotFeed {
        let (sender, receiver) = mpsc::unbounded_channel();
        let http = self.http.clone();
        let url = self.url("product");
        let poll_interval = self.poll_interval;

        let task = tokio::spawn(async move {
            info!(%url, ?poll_interval, "Live feed opened");
            let mut ticker = tokio::time::interval(poll_interval);
            let mut last: Option<Vec<Product>> = None;
            loop {
                ticker.tick().await;
                let polled = Self::send_json(http.get(&url), REQUEST_FAILED).await;
                let snapshot: Vec<Product> = match polled {
                    Ok(products) => products,
                    Err(e) => {
                        warn!(error = %e, "Live feed poll failed");
                        continue;
                    }
                };
                if last.as_ref() == Some(&snapshot) {
                    continue;
                }
                debug!(size = snapshot.len(), "Live feed snapshot");
                if sender.send(snapshot.clone()).is_err() {
                    break;
                }
                last = Some(snapshot);
            }
            info!("Live feed closed");
        });

        let abort = task.abort_handle();
        SnapshotFeed::new(receiver, Subscription::new(move || abort.abort()))
    }
}

/// Body of a successful `/login`: either a full user or a bare token.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: Option<User>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: User,
}

#[async_trait]
impl AuthGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn login(&self, credentials: Credentials) -> Result<User, RequestError> {
        debug!("Sending request");
        let username = credentials.username.clone();
        let request = self.http.post(self.url("login")).json(&credentials);
        let body: LoginResponse = Self::send_json(request, LOGIN_FAILED).await?;
        Ok(body.user.unwrap_or(User {
            username,
            id: None,
            token: body.token,
        }))
    }

    #[instrument(skip(self))]
    async fn profile(&self) -> Result<User, RequestError> {
        debug!("Sending request");
        let request = self.http.get(self.url("profile"));
        let body: ProfileResponse = Self::send_json(request, PROFILE_FAILED).await?;
        Ok(body.user)
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), RequestError> {
        debug!("Sending request");
        let request = self.http.post(self.url("profile/logout"));
        Self::send(request, LOGOUT_FAILED).await.map(|_| ())
    }
}

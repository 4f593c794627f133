// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authenticated session against one Keycloak server.

use super::token::CachedToken;
use super::{AdminPath, Error};
use crate::metrics;
use reqwest::{header, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};
use tracing::debug;
use url::Url;

/// Admin credentials. The two grants are mutually exclusive.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `client_credentials` grant against a confidential client with a service account.
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    /// `password` grant against the public `admin-cli` client.
    Password { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Everything needed to build an [`AdminClient`].
///
/// Two configs compare equal when they would produce identical sessions; the
/// [`ClientManager`](super::ClientManager) relies on this to detect rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub base_url: Url,
    pub admin_realm: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub insecure_skip_verify: bool,
}

impl ConnectionConfig {
    /// Validate the base URL and assemble a config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` does not parse or cannot carry a path.
    pub fn new(
        base_url: &str,
        admin_realm: &str,
        credentials: Credentials,
        timeout: Duration,
        insecure_skip_verify: bool,
    ) -> Result<Self, Error> {
        let parsed =
            Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: parsed,
            admin_realm: admin_realm.to_string(),
            credentials,
            timeout,
            insecure_skip_verify,
        })
    }
}

/// Successful response, fully read while the admission permit was held.
pub(super) struct Reply {
    pub location: Option<String>,
    pub body: String,
}

/// One authenticated session against one Keycloak server.
///
/// Cheap to share behind an `Arc`: the token cache is internally synchronized
/// and `reqwest::Client` pools connections.
pub struct AdminClient {
    pub(super) http: reqwest::Client,
    pub(super) config: ConnectionConfig,
    pub(super) token: RwLock<Option<CachedToken>>,
    limiter: Option<Arc<Semaphore>>,
}

impl fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("admin_realm", &self.config.admin_realm)
            .field("limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Build a client. `limiter` is the shared admission semaphore, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the TLS backend cannot be initialised.
    pub fn new(config: ConnectionConfig, limiter: Option<Arc<Semaphore>>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            http,
            config,
            token: RwLock::new(None),
            limiter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Build a URL below the base URL from raw path segments and query pairs.
    ///
    /// Each segment is percent-encoded on its own, so `/` inside a segment
    /// never changes the path structure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn admin_url(&self, path: &AdminPath, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut segments = vec!["admin", "realms"];
        segments.extend(path.segments().iter().map(String::as_str));
        self.endpoint(&segments, query)
    }

    /// Take one admission permit. The permit is released when dropped.
    pub(super) async fn admit(&self) -> Result<Option<OwnedSemaphorePermit>, Error> {
        match &self.limiter {
            None => Ok(None),
            Some(limiter) => Arc::clone(limiter)
                .acquire_owned()
                .await
                .map(Some)
                .map_err(|_| Error::AdmissionClosed),
        }
    }

    /// Send one authenticated request and read the whole response.
    ///
    /// The token is obtained before the admission permit is taken, so a token
    /// refresh never waits on a permit held by the same caller.
    async fn execute(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Reply, Error> {
        let token = self.ensure_valid_token().await?;

        let (status, location, text) = {
            let _permit = self.admit().await?;
            let started = Instant::now();

            debug!(method = %method, url = %url, "Keycloak admin API request");

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&*token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(source) => {
                    metrics::record_keycloak_request(
                        method.as_str(),
                        "transport",
                        started.elapsed(),
                    );
                    return Err(Error::Transport {
                        method,
                        url: url.to_string(),
                        source,
                    });
                }
            };

            let status = response.status();
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let text = response.text().await.map_err(|source| Error::Transport {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

            metrics::record_keycloak_request(method.as_str(), status.as_str(), started.elapsed());
            (status, location, text)
        };

        if status.is_success() {
            return Ok(Reply {
                location,
                body: text,
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            // The server revoked the session; the next call fetches a new token.
            self.invalidate_token().await;
        }

        debug!(method = %method, url = %url, status = %status, "Keycloak admin API request failed");
        Err(Error::Api {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body: text,
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(url: &Url, body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|e| Error::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET a single representation. A 404 yields `None`.
    ///
    /// # Errors
    ///
    /// Returns any other transport, API or decode failure.
    pub async fn get_json(&self, path: &AdminPath) -> Result<Option<Value>, Error> {
        let url = self.admin_url(path, &[])?;
        match self.execute(Method::GET, url.clone(), None).await {
            Ok(reply) => Self::decode(&url, &reply.body).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET a collection with optional query parameters.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decode failure.
    pub async fn list_json(
        &self,
        path: &AdminPath,
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, Error> {
        let url = self.admin_url(path, query)?;
        let reply = self.execute(Method::GET, url.clone(), None).await?;
        Self::decode(&url, &reply.body)
    }

    /// POST a new representation and return the identifier from the `Location` header.
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure.
    pub async fn create(&self, path: &AdminPath, body: &Value) -> Result<Option<String>, Error> {
        let url = self.admin_url(path, &[])?;
        let reply = self.execute(Method::POST, url, Some(body)).await?;
        Ok(reply.location.as_deref().and_then(id_from_location))
    }

    /// PUT a full representation.
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure.
    pub async fn update(&self, path: &AdminPath, body: &Value) -> Result<(), Error> {
        let url = self.admin_url(path, &[])?;
        self.execute(Method::PUT, url, Some(body)).await.map(|_| ())
    }

    /// DELETE a representation. A 404 counts as success.
    ///
    /// # Errors
    ///
    /// Returns any other transport or API failure.
    pub async fn delete(&self, path: &AdminPath) -> Result<(), Error> {
        let url = self.admin_url(path, &[])?;
        match self.execute(Method::DELETE, url, None).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// POST a body whose response is irrelevant (e.g., adding role mappings).
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure.
    pub async fn post_json(&self, path: &AdminPath, body: &Value) -> Result<(), Error> {
        let url = self.admin_url(path, &[])?;
        self.execute(Method::POST, url, Some(body)).await.map(|_| ())
    }

    /// DELETE with a JSON body (e.g., removing role mappings). A 404 counts as success.
    ///
    /// # Errors
    ///
    /// Returns any other transport or API failure.
    pub async fn delete_json(&self, path: &AdminPath, body: &Value) -> Result<(), Error> {
        let url = self.admin_url(path, &[])?;
        match self.execute(Method::DELETE, url, Some(body)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// GET a path outside `/admin/realms` (e.g., `/admin/serverinfo`).
    pub(super) async fn get_raw(&self, segments: &[&str]) -> Result<Value, Error> {
        let url = self.endpoint(segments, &[])?;
        let reply = self.execute(Method::GET, url.clone(), None).await?;
        Self::decode(&url, &reply.body)
    }
}

/// Last path segment of a `Location` header.
pub(super) fn id_from_location(location: &str) -> Option<String> {
    let path = Url::parse(location)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| location.to_string());
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

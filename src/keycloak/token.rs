// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bearer token acquisition and caching.
//!
//! The token lives behind a `tokio::sync::RwLock`. Callers first look at it
//! under the shared lock; only when it is missing or stale do they take the
//! exclusive lock, and they check again before asking Keycloak for a new one.
//! Fifty reconcilers finding the same expired token therefore cause a single
//! token request.

use super::client::{AdminClient, Credentials};
use super::Error;
use crate::constants::{ADMIN_CLI_CLIENT_ID, TOKEN_EXPIRY_MARGIN_SECS};
use crate::metrics;
use reqwest::header;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A cached access token.
pub(crate) struct CachedToken {
    pub(crate) access_token: Arc<str>,
    pub(crate) expires_at: Instant,
    pub(crate) margin: Duration,
}

impl CachedToken {
    fn new(access_token: Arc<str>, issued_at: Instant, expires_in: Duration) -> Self {
        Self {
            access_token,
            expires_at: issued_at + expires_in,
            margin: refresh_margin(expires_in),
        }
    }

    /// Usable until `margin` before its expiry.
    fn is_fresh(&self, now: Instant) -> bool {
        now + self.margin < self.expires_at
    }
}

/// `TOKEN_EXPIRY_MARGIN_SECS`, capped at half the token lifetime so that a
/// short-lived token is still fresh when it lands in the cache.
pub(crate) fn refresh_margin(expires_in: Duration) -> Duration {
    Duration::from_secs(TOKEN_EXPIRY_MARGIN_SECS).min(expires_in / 2)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl AdminClient {
    /// Return a usable bearer token, fetching a new one when the cache is stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] with Keycloak's status and body when the token
    /// endpoint rejects the request, or a transport error. Nothing is retried.
    pub async fn ensure_valid_token(&self) -> Result<Arc<str>, Error> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
                return Ok(Arc::clone(&token.access_token));
            }
        }

        let mut cached = self.token.write().await;
        // Another caller may have refreshed while we waited for the write lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(Arc::clone(&token.access_token));
        }

        let fresh = self.request_token().await?;
        let access_token = Arc::clone(&fresh.access_token);
        *cached = Some(fresh);
        Ok(access_token)
    }

    /// Succeeds iff a token can be obtained.
    ///
    /// # Errors
    ///
    /// Same as [`Self::ensure_valid_token`].
    pub async fn ping(&self) -> Result<(), Error> {
        self.ensure_valid_token().await.map(|_| ())
    }

    /// Drop the cached token.
    pub(super) async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, Error> {
        let url = self.endpoint(
            &[
                "realms",
                &self.config.admin_realm,
                "protocol",
                "openid-connect",
                "token",
            ],
            &[],
        )?;

        // The serializer is not Sync; it must be dropped before the first await.
        let body = {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            match &self.config.credentials {
                Credentials::ClientCredentials {
                    client_id,
                    client_secret,
                } => {
                    form.append_pair("grant_type", "client_credentials")
                        .append_pair("client_id", client_id)
                        .append_pair("client_secret", client_secret);
                }
                Credentials::Password { username, password } => {
                    form.append_pair("grant_type", "password")
                        .append_pair("client_id", ADMIN_CLI_CLIENT_ID)
                        .append_pair("username", username)
                        .append_pair("password", password);
                }
            }
            form.finish()
        };

        let _permit = self.admit().await?;
        let started = Instant::now();
        debug!(url = %url, realm = %self.config.admin_realm, "Requesting Keycloak access token");

        let response = self
            .http
            .post(url.clone())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|source| {
                metrics::record_keycloak_request("token", "transport", started.elapsed());
                Error::Transport {
                    method: reqwest::Method::POST,
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| Error::Transport {
            method: reqwest::Method::POST,
            url: url.to_string(),
            source,
        })?;
        metrics::record_keycloak_request("token", status.as_str(), started.elapsed());

        if !status.is_success() {
            return Err(Error::Token {
                status: status.as_u16(),
                body: text,
            });
        }

        let token: TokenResponse = serde_json::from_str(&text).map_err(|e| Error::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        info!(
            base_url = %self.config.base_url,
            expires_in = token.expires_in,
            "Obtained Keycloak access token"
        );

        Ok(CachedToken::new(
            Arc::from(token.access_token),
            started,
            Duration::from_secs(token.expires_in),
        ))
    }

    /// Seed the cache, bypassing the token endpoint.
    #[cfg(test)]
    pub(crate) async fn seed_token(&self, access_token: &str, expires_at: Instant) {
        *self.token.write().await = Some(CachedToken {
            access_token: Arc::from(access_token),
            expires_at,
            margin: Duration::from_secs(TOKEN_EXPIRY_MARGIN_SECS),
        });
    }
}

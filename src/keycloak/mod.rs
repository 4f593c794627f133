// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Keycloak admin REST API client.
//!
//! This module owns every outbound call to Keycloak:
//!
//! - [`AdminClient`] - one authenticated session against one Keycloak server.
//!   It caches the bearer token and refreshes it transparently.
//! - [`ClientManager`] - the registry of [`AdminClient`]s, keyed by the connection
//!   descriptor that owns them, plus the process-wide admission cap.
//! - [`version`] - server version comparison for the minimum-version policy.
//!
//! Failed requests are never retried here. A failure bubbles up to the
//! reconciler, which records it in status and requeues.
//!
//! # Example
//!
//! ```rust,no_run
//! use keycloak_operator::keycloak::{AdminPath, ClientKey, ClientManager, ConnectionConfig, Credentials};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), keycloak_operator::keycloak::Error> {
//! let manager = ClientManager::new(10);
//! let config = ConnectionConfig::new(
//!     "https://sso.example.com",
//!     "master",
//!     Credentials::Password {
//!         username: "admin".into(),
//!         password: "changeme".into(),
//!     },
//!     Duration::from_secs(30),
//!     false,
//! )?;
//!
//! let client = manager
//!     .get_or_create(&ClientKey::namespaced("sso", "main"), config)
//!     .await?;
//! let realm = client.get_json(&AdminPath::realm("demo")).await?;
//! # let _ = realm;
//! # Ok(())
//! # }
//! ```

mod admin;
mod client;
pub mod manager;
mod path;
mod token;
pub mod version;

pub use client::{AdminClient, ConnectionConfig, Credentials};
pub use manager::{ClientKey, ClientManager};
pub use path::AdminPath;

use reqwest::Method;
use thiserror::Error;

/// Errors returned by the Keycloak client.
#[derive(Debug, Error)]
pub enum Error {
    /// No HTTP response was received (connection refused, DNS, TLS, timeout).
    #[error("failed to send {method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Keycloak answered with a non-2xx status.
    #[error("{method} {url} returned {status}: {body}")]
    Api {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    /// The token endpoint rejected the credentials.
    #[error("token request failed with status {status}: {body}")]
    Token { status: u16, body: String },

    /// The base URL cannot carry a path.
    #[error("invalid Keycloak URL: {0}")]
    InvalidUrl(String),

    /// A 2xx response body could not be decoded.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The HTTP client could not be built from the connection config.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The admission semaphore was closed during shutdown.
    #[error("request admission closed")]
    AdmissionClosed,
}

impl Error {
    /// HTTP status carried by the error, if Keycloak answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Token { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error is a 404 from the admin API.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod client_tests;

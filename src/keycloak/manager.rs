// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registry of [`AdminClient`]s keyed by the connection descriptor that owns them.
//!
//! The manager is created once in `main` and handed to every reconciler through
//! the controller context. It guarantees at most one client per owner key; the
//! registry mutex is held across lookup and insertion so concurrent callers
//! never build two clients for the same key.
//!
//! The manager also owns the admission semaphore shared by all of its clients,
//! which caps the number of in-flight Keycloak requests process-wide.

use super::client::{AdminClient, ConnectionConfig};
use super::Error;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info};

/// Identity of the connection descriptor owning a client.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClientKey {
    /// A `KeycloakInstance`.
    Namespaced { namespace: String, name: String },
    /// A `ClusterKeycloakInstance`.
    Cluster { name: String },
}

impl ClientKey {
    #[must_use]
    pub fn namespaced(namespace: &str, name: &str) -> Self {
        Self::Namespaced {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn cluster(name: &str) -> Self {
        Self::Cluster {
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespaced { namespace, name } => write!(f, "{namespace}/{name}"),
            Self::Cluster { name } => write!(f, "cluster:{name}"),
        }
    }
}

/// Shared registry of Keycloak clients.
pub struct ClientManager {
    clients: Mutex<HashMap<ClientKey, Arc<AdminClient>>>,
    limiter: Option<Arc<Semaphore>>,
    max_concurrent_requests: usize,
}

impl fmt::Debug for ClientManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientManager")
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish_non_exhaustive()
    }
}

impl ClientManager {
    /// Create a manager. `max_concurrent_requests == 0` disables admission control.
    #[must_use]
    pub fn new(max_concurrent_requests: usize) -> Self {
        let limiter = (max_concurrent_requests > 0)
            .then(|| Arc::new(Semaphore::new(max_concurrent_requests)));
        Self {
            clients: Mutex::new(HashMap::new()),
            limiter,
            max_concurrent_requests,
        }
    }

    /// Return the client for `key`, building it on first use.
    ///
    /// An existing client is reused while its config is unchanged. When the
    /// config differs (rotated credentials, new URL), the old client is
    /// replaced; callers still holding it finish their current call with the
    /// old session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if a new HTTP client cannot be built.
    pub async fn get_or_create(
        &self,
        key: &ClientKey,
        config: ConnectionConfig,
    ) -> Result<Arc<AdminClient>, Error> {
        let mut clients = self.clients.lock().await;

        if let Some(existing) = clients.get(key) {
            if existing.config() == &config {
                return Ok(Arc::clone(existing));
            }
            info!(owner = %key, "Keycloak connection changed, replacing client");
        } else {
            debug!(owner = %key, base_url = %config.base_url, "Creating Keycloak client");
        }

        let client = Arc::new(AdminClient::new(config, self.limiter.clone())?);
        clients.insert(key.clone(), Arc::clone(&client));
        Ok(client)
    }

    /// Current client for `key`, if any.
    #[cfg(test)]
    pub(crate) async fn get(&self, key: &ClientKey) -> Option<Arc<AdminClient>> {
        self.clients.lock().await.get(key).cloned()
    }

    /// Evict the client for `key` so its credentials are no longer retained.
    pub async fn remove(&self, key: &ClientKey) -> Option<Arc<AdminClient>> {
        let removed = self.clients.lock().await.remove(key);
        if removed.is_some() {
            info!(owner = %key, "Evicted Keycloak client");
        }
        removed
    }

    /// Number of registered clients.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Permits currently free on the admission semaphore; `None` when uncapped.
    #[cfg(test)]
    pub(crate) fn available_permits(&self) -> Option<usize> {
        self.limiter.as_ref().map(|limiter| limiter.available_permits())
    }
}

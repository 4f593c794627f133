// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! Every controller receives an `Arc<Context>` holding:
//! - the control-plane [`ObjectStore`] used for reads, finalizers and status
//! - the process-wide [`ClientManager`] of Keycloak admin clients
//! - the [`OperatorConfig`] (requeue delays, timeouts, version floor)
//!
//! The store is a type parameter so the reconciliation engine runs unchanged
//! against the in-memory store in unit tests.

use crate::config::OperatorConfig;
use crate::keycloak::ClientManager;
use crate::store::{KubeStore, ObjectStore};
use std::sync::Arc;

/// Shared context passed to all reconcilers.
pub struct Context<S: ObjectStore = KubeStore> {
    /// Control-plane object access
    pub store: S,

    /// Registry of Keycloak admin clients, keyed by connection descriptor
    pub clients: Arc<ClientManager>,

    /// Operator settings
    pub config: OperatorConfig,
}

impl<S: ObjectStore> Context<S> {
    /// Build a context whose client registry honours
    /// `config.max_concurrent_requests`.
    #[must_use]
    pub fn new(store: S, config: OperatorConfig) -> Self {
        let clients = Arc::new(ClientManager::new(config.max_concurrent_requests));
        Self {
            store,
            clients,
            config,
        }
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakInstance` and `ClusterKeycloakInstance` reconciliation.
//!
//! A connection descriptor owns no remote object. Reconciling one means:
//! read its credentials, register (or refresh) its client in the
//! [`ClientManager`](crate::keycloak::ClientManager), authenticate, read the
//! server version and check it against the configured minimum. Deletion only
//! drops the registered client.

use crate::config::OperatorConfig;
use crate::constants::{KIND_CLUSTER_KEYCLOAK_INSTANCE, KIND_KEYCLOAK_INSTANCE};
use crate::context::Context;
use crate::crd::{ClusterKeycloakInstance, ConnectionSpec, KeycloakInstance, KeycloakInstanceStatus};
use crate::errors::{Error, Result};
use crate::keycloak::{version, ClientKey};
use crate::labels::FINALIZER_INSTANCE;
use crate::metrics;
use crate::reconcilers::finalizers::{
    display_name, ensure_finalizer, has_finalizer, is_deleting, remove_finalizer,
};
use crate::reconcilers::resolver;
use crate::reconcilers::status::{connected_status, disconnected_status};
use crate::store::{KubeObject, ObjectStore, StoreError};
use kube::runtime::controller::Action;
use kube::ResourceExt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Accessors shared by both connection descriptor kinds.
pub trait ConnectionDescriptor: KubeObject {
    const KIND: &'static str;

    fn connection(&self) -> &ConnectionSpec;

    fn instance_status(&self) -> Option<&KeycloakInstanceStatus>;

    /// Key of the registered client.
    fn client_key(&self) -> ClientKey;

    /// Namespace the credentials Secret is read from when the descriptor
    /// does not name one.
    fn credentials_namespace(&self, config: &OperatorConfig) -> String;

    /// Namespace of a referenced Secret, for watch mapping.
    fn secret_namespace(&self, config: &OperatorConfig) -> String {
        self.connection()
            .credentials
            .namespace
            .clone()
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| self.credentials_namespace(config))
    }
}

impl ConnectionDescriptor for KeycloakInstance {
    const KIND: &'static str = KIND_KEYCLOAK_INSTANCE;

    fn connection(&self) -> &ConnectionSpec {
        &self.spec.connection
    }

    fn instance_status(&self) -> Option<&KeycloakInstanceStatus> {
        self.status.as_ref()
    }

    fn client_key(&self) -> ClientKey {
        ClientKey::namespaced(&self.namespace().unwrap_or_default(), &self.name_any())
    }

    fn credentials_namespace(&self, _config: &OperatorConfig) -> String {
        self.namespace().unwrap_or_default()
    }
}

impl ConnectionDescriptor for ClusterKeycloakInstance {
    const KIND: &'static str = KIND_CLUSTER_KEYCLOAK_INSTANCE;

    fn connection(&self) -> &ConnectionSpec {
        &self.spec.connection
    }

    fn instance_status(&self) -> Option<&KeycloakInstanceStatus> {
        self.status.as_ref()
    }

    fn client_key(&self) -> ClientKey {
        ClientKey::cluster(&self.name_any())
    }

    fn credentials_namespace(&self, config: &OperatorConfig) -> String {
        config.operator_namespace.clone()
    }
}

/// Connect, authenticate and check the server version.
async fn probe<K, S>(ctx: &Context<S>, instance: &K) -> Result<String>
where
    K: ConnectionDescriptor,
    S: ObjectStore,
{
    let namespace = instance.credentials_namespace(&ctx.config);
    let client = resolver::connect(
        ctx,
        &instance.client_key(),
        instance.connection(),
        &namespace,
    )
    .await?;

    client.ping().await?;
    let found = client.server_version().await?;
    let minimum = &ctx.config.min_keycloak_version;
    if !version::meets_minimum(&found, minimum) {
        return Err(Error::VersionUnsupported {
            found,
            minimum: minimum.clone(),
        });
    }
    Ok(found)
}

/// Reconcile a connection descriptor.
///
/// # Errors
///
/// Only finalizer and status writes fail the reconcile; connection failures
/// are recorded in status and requeued after the error delay.
pub async fn reconcile_instance<K, S>(ctx: &Context<S>, instance: &K) -> Result<Action>
where
    K: ConnectionDescriptor,
    S: ObjectStore,
{
    let start = Instant::now();
    let name = display_name(instance);

    if is_deleting(instance) {
        if has_finalizer(instance, FINALIZER_INSTANCE) {
            if ctx.clients.remove(&instance.client_key()).await.is_some() {
                info!("Dropped Keycloak client for {} {}", K::KIND, name);
            }
            remove_finalizer(&ctx.store, instance, FINALIZER_INSTANCE).await?;
        }
        return Ok(Action::await_change());
    }

    if !has_finalizer(instance, FINALIZER_INSTANCE) {
        ensure_finalizer(&ctx.store, instance, FINALIZER_INSTANCE).await?;
        return Ok(Action::requeue(Duration::ZERO));
    }

    let previous = instance.instance_status();
    let (status, action) = match probe(ctx, instance).await {
        Ok(found) => {
            info!(version = %found, "Connected {} {}", K::KIND, name);
            metrics::record_reconciliation_success(K::KIND, start.elapsed());
            (
                connected_status(previous, &found, instance.meta().generation),
                Action::requeue(ctx.config.sync_period),
            )
        }
        Err(err) => {
            let reason = err.reason();
            warn!(reason, error = %err, "Failed to connect {} {}", K::KIND, name);
            let found = match &err {
                Error::VersionUnsupported { found, .. } => Some(found.as_str()),
                _ => None,
            };
            metrics::record_reconciliation_error(K::KIND, start.elapsed());
            metrics::record_error(K::KIND, reason);
            metrics::record_reconciliation_requeue(K::KIND, reason);
            (
                disconnected_status(previous, reason, &err.status_message(), found),
                Action::requeue(ctx.config.error_requeue),
            )
        }
    };

    if previous != Some(&status) {
        let what = format!("status of {} {}", K::KIND, name);
        let value = serde_json::to_value(&status).map_err(|source| {
            Error::store(
                what.clone(),
                StoreError::Serde {
                    kind: K::KIND.to_string(),
                    source,
                },
            )
        })?;
        ctx.store
            .patch_status(instance, &value)
            .await
            .map_err(|e| Error::store(what, e))?;
    }

    Ok(action)
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dependency resolution.
//!
//! Walks leaf → realm → connection descriptor and returns an authenticated
//! [`AdminClient`] plus the realm name. Every step reads the control plane
//! afresh; the first missing or not-ready ancestor aborts the walk with a
//! retryable error:
//!
//! 1. Realm (`realmRef` or `clusterRealmRef`) missing or not ready ⇒ `RealmNotReady`
//! 2. Realm definition without `realm` ⇒ `InvalidDefinition`
//! 3. Connection (`instanceRef` or `clusterInstanceRef`) missing or not ready ⇒ `InstanceNotReady`
//! 4. Credentials Secret missing or incomplete ⇒ `SecretError`
//! 5. `ClientManager::get_or_create` keyed by the connection's identity

use crate::constants::DEFAULT_ADMIN_REALM;
use crate::context::Context;
use crate::crd::{
    ClusterKeycloakInstance, ClusterKeycloakRealm, ConnectionSpec, InstanceRefs,
    KeycloakInstance, KeycloakRealm, KeycloakResourceStatus, RealmRefs,
};
use crate::errors::{Error, Result};
use crate::keycloak::{AdminClient, ClientKey, ConnectionConfig};
use crate::reconcilers::definition;
use crate::reconcilers::engine::ManagedResource;
use crate::reconcilers::secrets::{credentials_from_secret, read_secret};
use crate::store::{KubeObject, ObjectStore};
use crate::validation::{instance_reference, realm_reference, InstanceReference, RealmReference};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Client and realm a resource is synced against.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub client: Arc<AdminClient>,
    pub realm: String,
}

async fn fetch<K: KubeObject, S: ObjectStore>(
    ctx: &Context<S>,
    namespace: Option<&str>,
    name: &str,
) -> Result<Option<K>> {
    let what = match namespace {
        Some(ns) => format!("{} {ns}/{name}", K::kind(&())),
        None => format!("{} {name}", K::kind(&())),
    };
    ctx.store
        .get::<K>(namespace, name)
        .await
        .map_err(|e| Error::fetch(what, e))
}

/// Resolve a leaf's realm reference.
///
/// # Errors
///
/// Returns the first failure of the walk described in the module docs.
pub async fn resolve_realm<S: ObjectStore>(
    ctx: &Context<S>,
    refs: &RealmRefs,
    own_namespace: &str,
) -> Result<Resolved> {
    match realm_reference(refs, own_namespace)? {
        RealmReference::Namespaced { namespace, name } => {
            let realm = fetch::<KeycloakRealm, S>(ctx, Some(&namespace), &name)
                .await?
                .ok_or_else(|| {
                    Error::RealmNotReady(format!("KeycloakRealm {namespace}/{name} not found"))
                })?;
            let label = format!("KeycloakRealm {namespace}/{name}");
            realm_chain(
                ctx,
                &label,
                realm.status.as_ref(),
                realm.spec.definition.as_ref(),
                &realm.spec.instance,
                Some(&namespace),
            )
            .await
        }
        RealmReference::Cluster { name } => {
            let realm = fetch::<ClusterKeycloakRealm, S>(ctx, None, &name)
                .await?
                .ok_or_else(|| {
                    Error::RealmNotReady(format!("ClusterKeycloakRealm {name} not found"))
                })?;
            let label = format!("ClusterKeycloakRealm {name}");
            realm_chain(
                ctx,
                &label,
                realm.status.as_ref(),
                realm.spec.definition.as_ref(),
                &realm.spec.instance,
                None,
            )
            .await
        }
    }
}

async fn realm_chain<S: ObjectStore>(
    ctx: &Context<S>,
    label: &str,
    status: Option<&KeycloakResourceStatus>,
    definition: Option<&Value>,
    instance: &InstanceRefs,
    realm_namespace: Option<&str>,
) -> Result<Resolved> {
    if !status.is_some_and(|s| s.ready) {
        return Err(Error::RealmNotReady(format!("{label} is not ready")));
    }
    let realm = definition::realm_name(definition)?;
    let client = resolve_instance(ctx, instance, realm_namespace).await?;
    debug!(realm = %realm, "Resolved {label}");
    Ok(Resolved { client, realm })
}

/// Resolve a realm's connection reference to a ready client.
///
/// # Errors
///
/// Returns [`Error::InstanceNotReady`], [`Error::Secret`] or
/// [`Error::InvalidReference`] as appropriate.
pub async fn resolve_instance<S: ObjectStore>(
    ctx: &Context<S>,
    refs: &InstanceRefs,
    own_namespace: Option<&str>,
) -> Result<Arc<AdminClient>> {
    match instance_reference(refs, own_namespace)? {
        InstanceReference::Namespaced { namespace, name } => {
            let instance = fetch::<KeycloakInstance, S>(ctx, Some(&namespace), &name)
                .await?
                .ok_or_else(|| {
                    Error::InstanceNotReady(format!(
                        "KeycloakInstance {namespace}/{name} not found"
                    ))
                })?;
            if !instance.status.as_ref().is_some_and(|s| s.ready) {
                return Err(Error::InstanceNotReady(format!(
                    "KeycloakInstance {namespace}/{name} is not ready"
                )));
            }
            connect(
                ctx,
                &ClientKey::namespaced(&namespace, &name),
                &instance.spec.connection,
                &namespace,
            )
            .await
        }
        InstanceReference::Cluster { name } => {
            let instance = fetch::<ClusterKeycloakInstance, S>(ctx, None, &name)
                .await?
                .ok_or_else(|| {
                    Error::InstanceNotReady(format!("ClusterKeycloakInstance {name} not found"))
                })?;
            if !instance.status.as_ref().is_some_and(|s| s.ready) {
                return Err(Error::InstanceNotReady(format!(
                    "ClusterKeycloakInstance {name} is not ready"
                )));
            }
            let operator_namespace = ctx.config.operator_namespace.clone();
            connect(
                ctx,
                &ClientKey::cluster(&name),
                &instance.spec.connection,
                &operator_namespace,
            )
            .await
        }
    }
}

/// Connection settings of a descriptor, with credentials read from its Secret.
/// `default_namespace` applies when `credentials.namespace` is unset.
///
/// # Errors
///
/// Returns [`Error::Secret`] for missing credentials and
/// [`Error::InvalidDefinition`] for an unusable base URL.
pub async fn connection_config<S: ObjectStore>(
    ctx: &Context<S>,
    connection: &ConnectionSpec,
    default_namespace: &str,
) -> Result<ConnectionConfig> {
    let namespace = connection
        .credentials
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .unwrap_or(default_namespace);
    let secret_name = &connection.credentials.secret_name;

    let secret = read_secret(ctx, namespace, secret_name)
        .await?
        .ok_or_else(|| Error::Secret(format!("Secret {namespace}/{secret_name} not found")))?;
    let credentials = credentials_from_secret(&secret)?;

    ConnectionConfig::new(
        &connection.base_url,
        connection
            .admin_realm
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ADMIN_REALM),
        credentials,
        ctx.config.http_timeout,
        connection.insecure_skip_verify,
    )
    .map_err(|e| Error::InvalidDefinition(e.to_string()))
}

/// Registered client for a connection descriptor.
///
/// # Errors
///
/// As [`connection_config`], or a client construction failure.
pub async fn connect<S: ObjectStore>(
    ctx: &Context<S>,
    key: &ClientKey,
    connection: &ConnectionSpec,
    default_namespace: &str,
) -> Result<Arc<AdminClient>> {
    let config = connection_config(ctx, connection, default_namespace).await?;
    Ok(ctx.clients.get_or_create(key, config).await?)
}

/// A ready sibling resource in `namespace` and its remote id.
///
/// The sibling must live in `realm`; pointing a mapper at a client of another
/// realm is a reference error, not something to wait for.
///
/// # Errors
///
/// Returns [`Error::DependencyNotReady`] while the sibling is missing or not
/// synced, [`Error::InvalidReference`] when it belongs to another realm.
pub async fn sibling<K, S>(
    ctx: &Context<S>,
    namespace: &str,
    name: &str,
    realm: &str,
) -> Result<(K, String)>
where
    K: ManagedResource,
    S: ObjectStore,
{
    let object = fetch::<K, S>(ctx, Some(namespace), name)
        .await?
        .ok_or_else(|| {
            Error::DependencyNotReady(format!("{} {namespace}/{name} not found", K::KIND))
        })?;

    let status = object.resource_status();
    let remote_id = status
        .filter(|s| s.ready)
        .and_then(|s| s.remote_id.clone())
        .ok_or_else(|| {
            Error::DependencyNotReady(format!("{} {namespace}/{name} is not ready", K::KIND))
        })?;

    if let Some(other) = status.and_then(|s| s.realm.as_deref()) {
        if other != realm {
            return Err(Error::InvalidReference(format!(
                "{} {namespace}/{name} belongs to realm {other}, not {realm}",
                K::KIND
            )));
        }
    }

    Ok((object, remote_id))
}

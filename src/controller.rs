// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic controller runners.
//!
//! One `kube::runtime::Controller` runs per kind. Besides its own kind, each
//! controller watches what its resources depend on, so a change upstream
//! enqueues the dependents at once instead of waiting for the error requeue:
//!
//! | Tier | Watches |
//! |------|---------|
//! | connection descriptors | credential Secrets |
//! | realms | `KeycloakInstance`, `ClusterKeycloakInstance` |
//! | realm contents | `KeycloakRealm`, `ClusterKeycloakRealm`, referenced Secrets |
//!
//! Dependents are looked up in the controller's own reflector store.

use crate::context::Context;
use crate::crd::{
    ClusterKeycloakInstance, ClusterKeycloakRealm, InstanceRefs, KeycloakInstance, KeycloakRealm,
};
use crate::errors::Error;
use crate::reconcilers::{reconcile, reconcile_instance, ConnectionDescriptor, ManagedResource};
use crate::store::KubeObject;
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::runtime::controller::{Action, Config as ControllerConfig};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{error, info};

/// Reconciliation error wrapper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] Error);

#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
fn error_policy<K: KubeObject>(resource: Arc<K>, err: &ReconcileError, ctx: Arc<Context>) -> Action {
    error!(
        error = %err,
        kind = %K::kind(&()),
        name = %resource.name_any(),
        "Reconciliation error - will retry in {}s",
        ctx.config.error_requeue.as_secs()
    );
    Action::requeue(ctx.config.error_requeue)
}

async fn reconcile_managed<K: ManagedResource>(
    resource: Arc<K>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    Ok(reconcile(ctx.as_ref(), resource.as_ref()).await?)
}

async fn reconcile_descriptor<K: ConnectionDescriptor>(
    resource: Arc<K>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    Ok(reconcile_instance(ctx.as_ref(), resource.as_ref()).await?)
}

fn controller_config(ctx: &Context) -> ControllerConfig {
    ControllerConfig::default().concurrency(ctx.config.workers)
}

/// `namespace` defaults to the referencing object's own namespace.
fn points_at(
    referenced_namespace: Option<&str>,
    own_namespace: Option<&str>,
    namespace: Option<&str>,
) -> bool {
    referenced_namespace.filter(|ns| !ns.is_empty()).or(own_namespace) == namespace
}

/// Whether `resource` references the namespaced realm `namespace/name`.
#[must_use]
pub fn references_realm<K: ManagedResource>(resource: &K, namespace: Option<&str>, name: &str) -> bool {
    let own = resource.namespace();
    resource
        .realm_refs()
        .and_then(|refs| refs.realm_ref.as_ref())
        .is_some_and(|r| {
            r.name == name && points_at(r.namespace.as_deref(), own.as_deref(), namespace)
        })
}

/// Whether `resource` references the cluster realm `name`.
#[must_use]
pub fn references_cluster_realm<K: ManagedResource>(resource: &K, name: &str) -> bool {
    resource
        .realm_refs()
        .and_then(|refs| refs.cluster_realm_ref.as_ref())
        .is_some_and(|r| r.name == name)
}

/// Whether `refs`, held by an object in `own_namespace`, point at the
/// namespaced instance `namespace/name`.
#[must_use]
pub fn references_instance(
    refs: &InstanceRefs,
    own_namespace: Option<&str>,
    namespace: Option<&str>,
    name: &str,
) -> bool {
    refs.instance_ref
        .as_ref()
        .is_some_and(|r| r.name == name && points_at(r.namespace.as_deref(), own_namespace, namespace))
}

/// Whether `resource` reads the Secret `namespace/name`.
#[must_use]
pub fn references_secret<K: ManagedResource>(resource: &K, namespace: Option<&str>, name: &str) -> bool {
    resource.namespace().as_deref() == namespace
        && resource.secret_names().iter().any(|s| s == name)
}

/// Realm kinds expose the connection they sync against.
pub trait RealmDescriptor: ManagedResource {
    fn instance_refs(&self) -> &InstanceRefs;
}

impl RealmDescriptor for KeycloakRealm {
    fn instance_refs(&self) -> &InstanceRefs {
        &self.spec.instance
    }
}

impl RealmDescriptor for ClusterKeycloakRealm {
    fn instance_refs(&self) -> &InstanceRefs {
        &self.spec.instance
    }
}

/// Run the controller of a connection descriptor kind.
///
/// # Errors
///
/// Returns an error if the controller fails to start.
pub async fn run_descriptor_controller<K: ConnectionDescriptor>(ctx: Arc<Context>) -> Result<()> {
    info!("Starting {} controller", K::KIND);

    let client = ctx.store.client().clone();
    let watcher_config = WatcherConfig::default().any_semantic();
    let controller = Controller::new(Api::<K>::all(client.clone()), watcher_config.clone());
    let descriptors = controller.store();
    let config = ctx.config.clone();

    controller
        .with_config(controller_config(&ctx))
        .watches(Api::<Secret>::all(client), watcher_config, move |secret| {
            let namespace = secret.namespace().unwrap_or_default();
            let name = secret.name_any();
            descriptors
                .state()
                .into_iter()
                .filter(|d| {
                    d.connection().credentials.secret_name == name
                        && d.secret_namespace(&config) == namespace
                })
                .map(|d| ObjectRef::from_obj(d.as_ref()))
                .collect::<Vec<_>>()
        })
        .run(reconcile_descriptor::<K>, error_policy::<K>, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the controller of a realm kind.
///
/// # Errors
///
/// Returns an error if the controller fails to start.
pub async fn run_realm_controller<K: RealmDescriptor>(ctx: Arc<Context>) -> Result<()> {
    info!("Starting {} controller", K::KIND);

    let client = ctx.store.client().clone();
    let watcher_config = WatcherConfig::default().any_semantic();
    let controller = Controller::new(Api::<K>::all(client.clone()), watcher_config.clone());
    let realms = controller.store();
    let cluster_realms = realms.clone();

    controller
        .with_config(controller_config(&ctx))
        .watches(
            Api::<KeycloakInstance>::all(client.clone()),
            watcher_config.clone(),
            move |instance| {
                let namespace = instance.namespace();
                let name = instance.name_any();
                realms
                    .state()
                    .into_iter()
                    .filter(|r| {
                        let own = r.namespace();
                        references_instance(
                            r.instance_refs(),
                            own.as_deref(),
                            namespace.as_deref(),
                            &name,
                        )
                    })
                    .map(|r| ObjectRef::from_obj(r.as_ref()))
                    .collect::<Vec<_>>()
            },
        )
        .watches(
            Api::<ClusterKeycloakInstance>::all(client),
            watcher_config,
            move |instance| {
                let name = instance.name_any();
                cluster_realms
                    .state()
                    .into_iter()
                    .filter(|r| {
                        r.instance_refs()
                            .cluster_instance_ref
                            .as_ref()
                            .is_some_and(|c| c.name == name)
                    })
                    .map(|r| ObjectRef::from_obj(r.as_ref()))
                    .collect::<Vec<_>>()
            },
        )
        .run(reconcile_managed::<K>, error_policy::<K>, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the controller of a realm-content kind.
///
/// # Errors
///
/// Returns an error if the controller fails to start.
pub async fn run_resource_controller<K: ManagedResource>(ctx: Arc<Context>) -> Result<()> {
    info!("Starting {} controller", K::KIND);

    let client = ctx.store.client().clone();
    let watcher_config = WatcherConfig::default().any_semantic();
    let controller = Controller::new(Api::<K>::all(client.clone()), watcher_config.clone());
    let by_realm = controller.store();
    let by_cluster_realm = by_realm.clone();
    let by_secret = by_realm.clone();

    controller
        .with_config(controller_config(&ctx))
        .watches(
            Api::<KeycloakRealm>::all(client.clone()),
            watcher_config.clone(),
            move |realm| {
                let namespace = realm.namespace();
                let name = realm.name_any();
                by_realm
                    .state()
                    .into_iter()
                    .filter(|r| references_realm(r.as_ref(), namespace.as_deref(), &name))
                    .map(|r| ObjectRef::from_obj(r.as_ref()))
                    .collect::<Vec<_>>()
            },
        )
        .watches(
            Api::<ClusterKeycloakRealm>::all(client.clone()),
            watcher_config.clone(),
            move |realm| {
                let name = realm.name_any();
                by_cluster_realm
                    .state()
                    .into_iter()
                    .filter(|r| references_cluster_realm(r.as_ref(), &name))
                    .map(|r| ObjectRef::from_obj(r.as_ref()))
                    .collect::<Vec<_>>()
            },
        )
        .watches(Api::<Secret>::all(client), watcher_config, move |secret| {
            let namespace = secret.namespace();
            let name = secret.name_any();
            by_secret
                .state()
                .into_iter()
                .filter(|r| references_secret(r.as_ref(), namespace.as_deref(), &name))
                .map(|r| ObjectRef::from_obj(r.as_ref()))
                .collect::<Vec<_>>()
        })
        .run(reconcile_managed::<K>, error_policy::<K>, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

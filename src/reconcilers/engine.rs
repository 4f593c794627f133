// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic reconciliation engine for realms and realm contents.
//!
//! Every kind implements [`ManagedResource`]; [`reconcile`] drives the shared
//! state machine:
//!
//! ```text
//! Unmanaged ──add finalizer──▶ Syncing ──ok──▶ Ready   (requeue after sync period)
//!                                 └──err──▶ Error      (requeue after error delay)
//! Terminating ──best-effort remote delete──▶ finalizer removed ──▶ Gone
//! ```
//!
//! Syncing always looks the remote object up by its natural key, so a remote
//! object deleted out-of-band is recreated instead of failing on a stale id.
//! Failures are recorded in status and requeued; only control-plane write
//! failures (finalizer, status) are returned to the work queue.

use crate::context::Context;
use crate::crd::{KeycloakResourceStatus, RealmRefs};
use crate::errors::{Error, Result};
use crate::keycloak::{self, AdminClient, AdminPath};
use crate::labels::PRESERVE_ON_DELETE_ANNOTATION;
use crate::metrics;
use crate::reconcilers::definition;
use crate::reconcilers::finalizers::{
    display_name, ensure_finalizer, has_finalizer, is_deleting, remove_finalizer,
};
use crate::reconcilers::resolver::{self, Resolved};
use crate::reconcilers::status::{failed_status, ready_status, status_unchanged, SyncedFields};
use crate::store::{KubeObject, ObjectStore, StoreError};
use crate::validation::realm_reference;
use async_trait::async_trait;
use kube::runtime::controller::Action;
use kube::ResourceExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where a resource is synced: its client, realm and own namespace.
pub struct Target<'a, S: ObjectStore> {
    pub ctx: &'a Context<S>,
    pub client: Arc<AdminClient>,
    pub realm: String,
    /// Namespace of the reconciled resource; secondary references resolve here.
    pub namespace: String,
}

impl<'a, S: ObjectStore> Target<'a, S> {
    #[must_use]
    pub fn new(ctx: &'a Context<S>, resolved: Resolved, namespace: String) -> Self {
        Self {
            ctx,
            client: resolved.client,
            realm: resolved.realm,
            namespace,
        }
    }

    /// `/admin/realms/{realm}`.
    #[must_use]
    pub fn realm_path(&self) -> AdminPath {
        AdminPath::realm(&self.realm)
    }
}

/// A remote object: its id and the path it is updated and deleted at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteRef {
    pub id: String,
    pub path: AdminPath,
}

impl RemoteRef {
    #[must_use]
    pub fn new(id: impl Into<String>, path: AdminPath) -> Self {
        Self {
            id: id.into(),
            path,
        }
    }

    /// Reference to a collection item carrying an `id`.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the item has no `id`.
    pub fn from_item(collection: &AdminPath, item: &Value) -> Result<Self> {
        let id = definition::string_field(item, "id").ok_or_else(|| {
            Error::Remote(keycloak::Error::Decode {
                url: collection.to_string(),
                message: "representation has no id".to_string(),
            })
        })?;
        Ok(Self::new(id, collection.join([id])))
    }

    /// Reference recorded by the last successful sync.
    #[must_use]
    pub fn from_status(status: Option<&KeycloakResourceStatus>) -> Option<Self> {
        let status = status?;
        let path = AdminPath::parse(status.resource_path.as_deref()?);
        if path.is_empty() {
            return None;
        }
        let id = status
            .remote_id
            .clone()
            .or_else(|| path.last().map(str::to_string))?;
        Some(Self { id, path })
    }
}

/// Result of a successful sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synced {
    pub remote: RemoteRef,
    /// Hash of the secret value pushed (credential kinds).
    pub secret_hash: Option<String>,
}

impl Synced {
    #[must_use]
    pub fn new(remote: RemoteRef) -> Self {
        Self {
            remote,
            secret_hash: None,
        }
    }
}

pub(crate) fn missing_id(collection: &AdminPath) -> Error {
    Error::Remote(keycloak::Error::Decode {
        url: collection.to_string(),
        message: "created object could not be found".to_string(),
    })
}

/// Kind-specific glue for the generic engine.
///
/// Defaults cover the common Keycloak collection shape: list the collection,
/// match the natural key, `POST` to create (id from `Location`), `PUT` the
/// object path with `id` merged in to update, `DELETE` it to remove.
#[async_trait]
pub trait ManagedResource: KubeObject {
    const KIND: &'static str;
    const FINALIZER: &'static str;
    /// Definition field identifying the remote object.
    const NATURAL_KEY: Option<&'static str>;

    fn definition(&self) -> Option<&Value>;

    fn resource_status(&self) -> Option<&KeycloakResourceStatus>;

    fn realm_refs(&self) -> Option<&RealmRefs> {
        None
    }

    /// Names of Secrets in the resource's namespace it reads.
    fn secret_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Reference checks; they run before any finalizer or remote work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] for a malformed reference group.
    fn validate(&self) -> Result<()> {
        match self.realm_refs() {
            Some(refs) => {
                realm_reference(refs, &self.namespace().unwrap_or_default()).map(|_| ())
            }
            None => Ok(()),
        }
    }

    /// Client and realm this resource is synced against.
    async fn resolve<S: ObjectStore>(&self, ctx: &Context<S>) -> Result<Resolved> {
        let refs = self.realm_refs().ok_or_else(|| {
            Error::InvalidReference(format!("{} has no realm reference", Self::KIND))
        })?;
        resolver::resolve_realm(ctx, refs, &self.namespace().unwrap_or_default()).await
    }

    /// Representation sent to Keycloak.
    async fn desired<S: ObjectStore>(&self, _target: &Target<'_, S>) -> Result<Value> {
        definition::with_natural_key(self.definition(), Self::NATURAL_KEY, &self.name_any())
    }

    /// Collection the remote object lives in.
    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath>;

    /// Look the remote object up by natural key.
    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let Some(key) = Self::NATURAL_KEY else {
            return Ok(None);
        };
        let value = definition::natural_key(desired, key)?;
        let items = target.client.list_json(collection, &[]).await?;
        definition::find_by(&items, key, value)
            .map(|item| RemoteRef::from_item(collection, item))
            .transpose()
    }

    async fn create<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<RemoteRef> {
        match target.client.create(collection, desired).await? {
            Some(id) => Ok(RemoteRef::new(id.clone(), collection.join([id]))),
            None => self
                .find(target, collection, desired)
                .await?
                .ok_or_else(|| missing_id(collection)),
        }
    }

    async fn update<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        existing: &RemoteRef,
        desired: &Value,
    ) -> Result<()> {
        let body = definition::with_id(desired, &existing.id);
        target.client.update(&existing.path, &body).await?;
        Ok(())
    }

    async fn remove<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        existing: &RemoteRef,
    ) -> Result<()> {
        target.client.delete(&existing.path).await?;
        Ok(())
    }

    /// The remote object to delete when status records none.
    async fn locate<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Option<RemoteRef>> {
        let desired = self.desired(target).await?;
        let collection = self.collection(target).await?;
        self.find(target, &collection, &desired).await
    }

    /// Bring the remote object in line with the resource.
    async fn sync<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Synced> {
        create_or_update(self, target).await
    }
}

/// Create-or-update by natural key, the default [`ManagedResource::sync`].
///
/// # Errors
///
/// Returns the first failing step of desired → find → update/create.
pub async fn create_or_update<K, S>(resource: &K, target: &Target<'_, S>) -> Result<Synced>
where
    K: ManagedResource,
    S: ObjectStore,
{
    let desired = resource.desired(target).await?;
    let collection = resource.collection(target).await?;

    let remote = match resource.find(target, &collection, &desired).await? {
        Some(existing) => {
            resource.update(target, &existing, &desired).await?;
            metrics::record_remote_operation(K::KIND, "update");
            debug!(path = %existing.path, "Updated {} {}", K::KIND, resource.name_any());
            existing
        }
        None => {
            let created = resource.create(target, &collection, &desired).await?;
            metrics::record_remote_operation(K::KIND, "create");
            info!(path = %created.path, "Created {} {}", K::KIND, resource.name_any());
            created
        }
    };
    Ok(Synced::new(remote))
}

/// Whether the preserve-on-delete annotation is set to `true`.
#[must_use]
pub fn preserve_on_delete<K: KubeObject>(resource: &K) -> bool {
    resource
        .annotations()
        .get(PRESERVE_ON_DELETE_ANNOTATION)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Reconcile one realm or realm-content resource.
///
/// # Errors
///
/// Only control-plane writes (finalizer, status) fail the reconcile; every
/// other failure is recorded in status and requeued after the error delay.
pub async fn reconcile<K, S>(ctx: &Context<S>, resource: &K) -> Result<Action>
where
    K: ManagedResource,
    S: ObjectStore,
{
    let start = Instant::now();

    if is_deleting(resource) {
        return finalize(ctx, resource).await;
    }

    let outcome = match resource.validate() {
        Err(err) => Err(err),
        Ok(()) => {
            if !has_finalizer(resource, K::FINALIZER) {
                ensure_finalizer(&ctx.store, resource, K::FINALIZER).await?;
                return Ok(Action::requeue(Duration::ZERO));
            }
            sync_resource(ctx, resource).await
        }
    };

    report(ctx, resource, outcome, start).await
}

async fn sync_resource<K, S>(ctx: &Context<S>, resource: &K) -> Result<SyncedFields>
where
    K: ManagedResource,
    S: ObjectStore,
{
    let resolved = resource.resolve(ctx).await?;
    let realm = resolved.realm.clone();
    let target = Target::new(ctx, resolved, resource.namespace().unwrap_or_default());
    let synced = resource.sync(&target).await?;

    Ok(SyncedFields {
        message: format!("{} {} is in sync", K::KIND, resource.name_any()),
        resource_path: synced.remote.path.to_string(),
        remote_id: synced.remote.id,
        realm,
        secret_hash: synced.secret_hash,
        observed_generation: resource.meta().generation,
    })
}

async fn report<K, S>(
    ctx: &Context<S>,
    resource: &K,
    outcome: Result<SyncedFields>,
    start: Instant,
) -> Result<Action>
where
    K: ManagedResource,
    S: ObjectStore,
{
    let name = display_name(resource);
    match outcome {
        Ok(fields) => {
            let status = ready_status(resource.resource_status(), fields);
            write_status(ctx, resource, &status).await?;
            metrics::record_reconciliation_success(K::KIND, start.elapsed());
            info!("Successfully reconciled {} {}", K::KIND, name);
            Ok(Action::requeue(ctx.config.sync_period))
        }
        Err(err) => {
            let reason = err.reason();
            if err.is_dependency_wait() {
                info!(reason, "{} {} waiting: {}", K::KIND, name, err);
            } else {
                warn!(reason, error = %err, "Failed to reconcile {} {}", K::KIND, name);
            }
            let status = failed_status(resource.resource_status(), reason, &err.status_message());
            write_status(ctx, resource, &status).await?;
            metrics::record_reconciliation_error(K::KIND, start.elapsed());
            metrics::record_error(K::KIND, reason);
            // Control-plane read failures go back to the work queue.
            if matches!(err, Error::Fetch { .. }) {
                return Err(err);
            }
            metrics::record_reconciliation_requeue(K::KIND, reason);
            Ok(Action::requeue(ctx.config.error_requeue))
        }
    }
}

async fn write_status<K, S>(
    ctx: &Context<S>,
    resource: &K,
    status: &KeycloakResourceStatus,
) -> Result<()>
where
    K: ManagedResource,
    S: ObjectStore,
{
    if status_unchanged(resource.resource_status(), status) {
        return Ok(());
    }
    let what = format!("status of {} {}", K::KIND, display_name(resource));
    let value = serde_json::to_value(status).map_err(|source| {
        Error::store(
            what.clone(),
            StoreError::Serde {
                kind: K::KIND.to_string(),
                source,
            },
        )
    })?;
    ctx.store
        .patch_status(resource, &value)
        .await
        .map_err(|e| Error::store(what, e))
}

async fn finalize<K, S>(ctx: &Context<S>, resource: &K) -> Result<Action>
where
    K: ManagedResource,
    S: ObjectStore,
{
    if !has_finalizer(resource, K::FINALIZER) {
        return Ok(Action::await_change());
    }

    let name = display_name(resource);
    if preserve_on_delete(resource) {
        info!(
            "{} {} is annotated {}, keeping the remote object",
            K::KIND,
            name,
            PRESERVE_ON_DELETE_ANNOTATION
        );
    } else if let Err(err) = delete_remote(ctx, resource).await {
        warn!(
            error = %err,
            "Remote delete of {} {} failed, releasing the finalizer anyway",
            K::KIND,
            name
        );
        metrics::record_error(K::KIND, err.reason());
    }

    remove_finalizer(&ctx.store, resource, K::FINALIZER).await?;
    Ok(Action::await_change())
}

async fn delete_remote<K, S>(ctx: &Context<S>, resource: &K) -> Result<()>
where
    K: ManagedResource,
    S: ObjectStore,
{
    let resolved = resource.resolve(ctx).await?;
    let target = Target::new(ctx, resolved, resource.namespace().unwrap_or_default());

    let existing = match RemoteRef::from_status(resource.resource_status()) {
        Some(stored) => Some(stored),
        None => resource.locate(&target).await?,
    };

    match existing {
        Some(existing) => {
            resource.remove(&target, &existing).await?;
            metrics::record_remote_operation(K::KIND, "delete");
            info!(path = %existing.path, "Deleted {} {}", K::KIND, display_name(resource));
        }
        None => debug!(
            "{} {} has no remote object to delete",
            K::KIND,
            display_name(resource)
        ),
    }
    Ok(())
}

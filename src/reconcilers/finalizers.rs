// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic finalizer management for Keycloak resources.
//!
//! Works for namespaced and cluster-scoped kinds alike: the [`ObjectStore`]
//! routes the write by the object's own metadata. Finalizer writes carry the
//! object's `resourceVersion`, so a write against a stale copy fails and the
//! work queue retries it.
//!
//! # Example
//!
//! ```rust,ignore
//! use keycloak_operator::reconcilers::finalizers::{ensure_finalizer, has_finalizer};
//!
//! if !has_finalizer(&client, FINALIZER_CLIENT) {
//!     ensure_finalizer(&ctx.store, &client, FINALIZER_CLIENT).await?;
//!     return Ok(Action::requeue(Duration::ZERO));
//! }
//! ```

use crate::errors::{Error, Result};
use crate::store::{KubeObject, ObjectStore};
use kube::ResourceExt;
use tracing::info;

/// Whether `resource` carries `finalizer`.
#[must_use]
pub fn has_finalizer<T: KubeObject>(resource: &T, finalizer: &str) -> bool {
    resource.finalizers().iter().any(|f| f == finalizer)
}

/// Whether `resource` is marked for deletion.
#[must_use]
pub fn is_deleting<T: KubeObject>(resource: &T) -> bool {
    resource.meta().deletion_timestamp.is_some()
}

/// `namespace/name`, or `name` for cluster-scoped objects.
#[must_use]
pub fn display_name<T: KubeObject>(resource: &T) -> String {
    match resource.namespace() {
        Some(ns) => format!("{ns}/{}", resource.name_any()),
        None => resource.name_any(),
    }
}

/// Add a finalizer to a resource if not already present.
///
/// # Errors
///
/// Returns [`Error::Store`] if the write fails, including when the object
/// changed since it was read.
pub async fn ensure_finalizer<T, S>(store: &S, resource: &T, finalizer: &str) -> Result<()>
where
    T: KubeObject,
    S: ObjectStore,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    info!(
        "Adding finalizer {} to {} {}",
        finalizer,
        T::kind(&()),
        display_name(resource)
    );

    let mut finalizers = resource.finalizers().to_vec();
    finalizers.push(finalizer.to_string());
    store
        .set_finalizers(resource, &finalizers)
        .await
        .map_err(|e| {
            Error::store(
                format!("finalizer of {} {}", T::kind(&()), display_name(resource)),
                e,
            )
        })
}

/// Remove a finalizer from a resource if present.
///
/// # Errors
///
/// Returns [`Error::Store`] if the write fails. The finalizer then stays in
/// place and the deletion is retried by the work queue.
pub async fn remove_finalizer<T, S>(store: &S, resource: &T, finalizer: &str) -> Result<()>
where
    T: KubeObject,
    S: ObjectStore,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    info!(
        "Removing finalizer {} from {} {}",
        finalizer,
        T::kind(&()),
        display_name(resource)
    );

    let finalizers: Vec<String> = resource
        .finalizers()
        .iter()
        .filter(|f| *f != finalizer)
        .cloned()
        .collect();
    store
        .set_finalizers(resource, &finalizers)
        .await
        .map_err(|e| {
            Error::store(
                format!("finalizer of {} {}", T::kind(&()), display_name(resource)),
                e,
            )
        })
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Control-plane object store used by the reconcilers.
//!
//! Reconcilers only need four operations keyed by (kind, namespace, name):
//! read an object, create one (generated Secrets), rewrite the finalizer list,
//! and patch the status subresource. [`ObjectStore`] captures exactly that, so
//! the reconciliation engine can be exercised against an in-memory store in
//! unit tests and against the API server in production.
//!
//! [`KubeStore`] goes through `Api<DynamicObject>` with an erased
//! [`ApiResource`], which lets one implementation serve namespaced and
//! cluster-scoped kinds alike.

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, Patch, PatchParams, PostParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Debug;
use thiserror::Error;

#[cfg(test)]
pub mod memory;

/// Any statically typed Kubernetes object the operator reads or writes.
pub trait KubeObject:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> KubeObject for T where
    T: Resource<DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Errors returned by an [`ObjectStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// The object could not be converted to or from its typed form.
    #[error("failed to convert {kind} object: {source}")]
    Serde {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The object changed since it was read (stale resourceVersion).
    #[error("{kind} {name} was modified concurrently")]
    Conflict { kind: String, name: String },

    /// A create targeted a name that is taken.
    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: String, name: String },

    /// A write targeted an object that does not exist.
    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },
}

/// The control-plane operations the reconcilers depend on.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Read one object; `namespace` is `None` for cluster-scoped kinds.
    async fn get<K: KubeObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<K>, StoreError>;

    /// Create an object in the namespace recorded in its metadata.
    async fn create<K: KubeObject>(&self, obj: &K) -> Result<K, StoreError>;

    /// Replace the finalizer list, failing if the object changed since it was read.
    async fn set_finalizers<K: KubeObject>(
        &self,
        obj: &K,
        finalizers: &[String],
    ) -> Result<(), StoreError>;

    /// Merge-patch the status subresource.
    async fn patch_status<K: KubeObject>(&self, obj: &K, status: &Value)
        -> Result<(), StoreError>;
}

fn to_typed<K: KubeObject>(obj: DynamicObject) -> Result<K, StoreError> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|source| StoreError::Serde {
            kind: K::kind(&()).to_string(),
            source,
        })
}

fn to_dynamic<K: KubeObject>(obj: &K) -> Result<DynamicObject, StoreError> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|source| StoreError::Serde {
            kind: K::kind(&()).to_string(),
            source,
        })
}

/// Translate a failed create: 409 means the name is taken.
pub(crate) fn map_create_error(kind: &str, name: &str, err: kube::Error) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 409 => StoreError::AlreadyExists {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        other => StoreError::Kube(other),
    }
}

/// Translate a failed patch: 409 is a stale resourceVersion, 404 a vanished object.
pub(crate) fn map_patch_error(kind: &str, name: &str, err: kube::Error) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        other => StoreError::Kube(other),
    }
}

/// [`ObjectStore`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn api<K: KubeObject>(&self, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = ApiResource::erase::<K>(&());
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: KubeObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<K>, StoreError> {
        match self.api::<K>(namespace).get_opt(name).await? {
            Some(obj) => to_typed(obj).map(Some),
            None => Ok(None),
        }
    }

    async fn create<K: KubeObject>(&self, obj: &K) -> Result<K, StoreError> {
        let api = self.api::<K>(obj.meta().namespace.as_deref());
        let created = api
            .create(&PostParams::default(), &to_dynamic(obj)?)
            .await
            .map_err(|e| map_create_error(&K::kind(&()), &obj.name_any(), e))?;
        to_typed(created)
    }

    async fn set_finalizers<K: KubeObject>(
        &self,
        obj: &K,
        finalizers: &[String],
    ) -> Result<(), StoreError> {
        let api = self.api::<K>(obj.meta().namespace.as_deref());
        let patch = json!({
            "metadata": {
                "finalizers": finalizers,
                "resourceVersion": obj.meta().resource_version,
            }
        });
        let name = obj.name_any();
        api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_patch_error(&K::kind(&()), &name, e))?;
        Ok(())
    }

    async fn patch_status<K: KubeObject>(
        &self,
        obj: &K,
        status: &Value,
    ) -> Result<(), StoreError> {
        let api = self.api::<K>(obj.meta().namespace.as_deref());
        let patch = json!({ "status": status });
        let name = obj.name_any();
        api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_patch_error(&K::kind(&()), &name, e))?;
        Ok(())
    }
}

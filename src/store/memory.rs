// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ObjectStore`] for unit tests.
//!
//! Mirrors the API server behaviour the reconcilers rely on: resourceVersion
//! checks on finalizer writes, JSON merge-patch of status, and removal of an
//! object once it is marked for deletion and carries no finalizers.

use super::{KubeObject, ObjectStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use kube::ResourceExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

type Key = (String, Option<String>, String);

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<Key, Value>>,
    revision: AtomicU64,
    status_writes: AtomicU64,
}

fn key<K: KubeObject>(namespace: Option<&str>, name: &str) -> Key {
    (
        K::kind(&()).to_string(),
        namespace.map(str::to_string),
        name.to_string(),
    )
}

/// RFC 7386 JSON merge patch.
fn merge_patch(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (k, v) in patch {
                if v.is_null() {
                    target.remove(k);
                } else {
                    merge_patch(target.entry(k.clone()).or_insert(Value::Null), v);
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Insert or overwrite an object, assigning a fresh resourceVersion.
    /// A missing generation defaults to 1.
    pub fn insert<K: KubeObject>(&self, obj: &K) {
        let mut value = serde_json::to_value(obj).unwrap();
        value["metadata"]["resourceVersion"] = json!(self.next_revision());
        if value["metadata"].get("generation").is_none_or(Value::is_null) {
            value["metadata"]["generation"] = json!(1);
        }
        if value["metadata"].get("uid").is_none_or(Value::is_null) {
            value["metadata"]["uid"] = json!(format!("uid-{}", obj.name_any()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key::<K>(obj.namespace().as_deref(), &obj.name_any()), value);
    }

    /// Current typed copy of an object.
    pub fn fetch<K: KubeObject>(&self, namespace: Option<&str>, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&key::<K>(namespace, name))
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    /// Simulate `kubectl delete`: remove immediately without finalizers,
    /// otherwise set the deletion timestamp.
    pub fn delete<K: KubeObject>(&self, namespace: Option<&str>, name: &str) {
        let mut objects = self.objects.lock().unwrap();
        let k = key::<K>(namespace, name);
        let Some(value) = objects.get_mut(&k) else {
            return;
        };
        let has_finalizers = value["metadata"]["finalizers"]
            .as_array()
            .is_some_and(|f| !f.is_empty());
        if has_finalizers {
            value["metadata"]["deletionTimestamp"] = json!(Utc::now().to_rfc3339());
            value["metadata"]["resourceVersion"] = json!(self.next_revision());
        } else {
            objects.remove(&k);
        }
    }

    /// Bump metadata.generation, as a spec edit would.
    pub fn bump_generation<K: KubeObject>(&self, namespace: Option<&str>, name: &str) {
        let mut objects = self.objects.lock().unwrap();
        if let Some(value) = objects.get_mut(&key::<K>(namespace, name)) {
            let generation = value["metadata"]["generation"].as_i64().unwrap_or(1) + 1;
            value["metadata"]["generation"] = json!(generation);
            value["metadata"]["resourceVersion"] = json!(self.next_revision());
        }
    }

    /// Number of status patches applied so far.
    pub fn status_writes(&self) -> u64 {
        self.status_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get<K: KubeObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<K>, StoreError> {
        Ok(self.fetch(namespace, name))
    }

    async fn create<K: KubeObject>(&self, obj: &K) -> Result<K, StoreError> {
        let k = key::<K>(obj.namespace().as_deref(), &obj.name_any());
        if self.objects.lock().unwrap().contains_key(&k) {
            return Err(StoreError::AlreadyExists {
                kind: k.0,
                name: k.2,
            });
        }
        self.insert(obj);
        Ok(self.fetch(k.1.as_deref(), &k.2).unwrap())
    }

    async fn set_finalizers<K: KubeObject>(
        &self,
        obj: &K,
        finalizers: &[String],
    ) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap();
        let k = key::<K>(obj.namespace().as_deref(), &obj.name_any());
        let Some(value) = objects.get_mut(&k) else {
            return Err(StoreError::NotFound {
                kind: k.0,
                name: k.2,
            });
        };
        if value["metadata"]["resourceVersion"].as_str() != obj.resource_version().as_deref() {
            return Err(StoreError::Conflict {
                kind: k.0,
                name: k.2,
            });
        }

        value["metadata"]["finalizers"] = json!(finalizers);
        value["metadata"]["resourceVersion"] = json!(self.next_revision());

        let deleting = !value["metadata"]["deletionTimestamp"].is_null();
        if deleting && finalizers.is_empty() {
            objects.remove(&k);
        }
        Ok(())
    }

    async fn patch_status<K: KubeObject>(
        &self,
        obj: &K,
        status: &Value,
    ) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap();
        let k = key::<K>(obj.namespace().as_deref(), &obj.name_any());
        let Some(value) = objects.get_mut(&k) else {
            return Err(StoreError::NotFound {
                kind: k.0,
                name: k.2,
            });
        };
        merge_patch(&mut value["status"], status);
        value["metadata"]["resourceVersion"] = json!(self.next_revision());
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Secret access for connection credentials, client secrets and user passwords.

use crate::constants::{
    API_GROUP_VERSION, SECRET_KEY_CLIENT_ID, SECRET_KEY_CLIENT_SECRET, SECRET_KEY_PASSWORD,
    SECRET_KEY_USERNAME,
};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::keycloak::Credentials;
use crate::labels::{K8S_MANAGED_BY, K8S_PART_OF, MANAGED_BY_KEYCLOAK_OPERATOR, PART_OF_KEYCLOAK};
use crate::store::{KubeObject, ObjectStore};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::ByteString;
use kube::ResourceExt;
use rand::distr::{Alphanumeric, SampleString};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Read a Secret; `None` when it does not exist.
///
/// # Errors
///
/// Returns [`Error::Fetch`] when the read itself fails.
pub async fn read_secret<S: ObjectStore>(
    ctx: &Context<S>,
    namespace: &str,
    name: &str,
) -> Result<Option<Secret>> {
    ctx.store
        .get::<Secret>(Some(namespace), name)
        .await
        .map_err(|e| Error::fetch(format!("Secret {namespace}/{name}"), e))
}

/// Value of `key`, from `data` or `stringData`.
#[must_use]
pub fn secret_value(secret: &Secret, key: &str) -> Option<String> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .and_then(|bytes| String::from_utf8(bytes.0.clone()).ok())
        .or_else(|| {
            secret
                .string_data
                .as_ref()
                .and_then(|data| data.get(key).cloned())
        })
        .filter(|v| !v.is_empty())
}

/// Value of `key` in an existing Secret.
///
/// # Errors
///
/// Returns [`Error::Secret`] when the Secret or the key is missing.
pub async fn require_secret_value<S: ObjectStore>(
    ctx: &Context<S>,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<String> {
    let secret = read_secret(ctx, namespace, name)
        .await?
        .ok_or_else(|| Error::Secret(format!("Secret {namespace}/{name} not found")))?;
    secret_value(&secret, key)
        .ok_or_else(|| Error::Secret(format!("Secret {namespace}/{name} has no key {key}")))
}

/// Admin credentials held by a connection Secret.
///
/// `clientId` + `clientSecret` select the client-credentials grant and take
/// precedence; otherwise `username` + `password` select the password grant.
///
/// # Errors
///
/// Returns [`Error::Secret`] when neither pair is complete.
pub fn credentials_from_secret(secret: &Secret) -> Result<Credentials> {
    let pair = |a: &str, b: &str| secret_value(secret, a).zip(secret_value(secret, b));

    if let Some((client_id, client_secret)) = pair(SECRET_KEY_CLIENT_ID, SECRET_KEY_CLIENT_SECRET)
    {
        return Ok(Credentials::ClientCredentials {
            client_id,
            client_secret,
        });
    }
    if let Some((username, password)) = pair(SECRET_KEY_USERNAME, SECRET_KEY_PASSWORD) {
        return Ok(Credentials::Password { username, password });
    }

    Err(Error::Secret(format!(
        "Secret {}/{} must contain {SECRET_KEY_CLIENT_ID}/{SECRET_KEY_CLIENT_SECRET} or {SECRET_KEY_USERNAME}/{SECRET_KEY_PASSWORD}",
        secret.namespace().unwrap_or_default(),
        secret.name_any()
    )))
}

/// Hex SHA-256 of `salt`, a NUL byte, then `value`.
///
/// Status publishes this instead of a bare digest of the secret. The salt is
/// the owning resource's uid, so equal passwords on different resources do
/// not share a fingerprint.
#[must_use]
pub fn secret_fingerprint(salt: &str, value: &str) -> String {
    Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update([0u8])
        .chain_update(value.as_bytes())
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Random alphanumeric password.
#[must_use]
pub fn generate_password(length: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), length)
}

/// Owner reference making `owner` the controller of a generated object.
#[must_use]
pub fn owner_reference<K: KubeObject>(owner: &K) -> OwnerReference {
    OwnerReference {
        api_version: API_GROUP_VERSION.to_string(),
        kind: K::kind(&()).to_string(),
        name: owner.name_any(),
        uid: owner.uid().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Secret holding one generated value, garbage-collected with its owner.
#[must_use]
pub fn build_generated_secret<K: KubeObject>(
    owner: &K,
    name: &str,
    key: &str,
    value: &str,
) -> Secret {
    let mut labels = BTreeMap::new();
    labels.insert(K8S_MANAGED_BY.to_string(), MANAGED_BY_KEYCLOAK_OPERATOR.to_string());
    labels.insert(K8S_PART_OF.to_string(), PART_OF_KEYCLOAK.to_string());

    let mut data = BTreeMap::new();
    data.insert(key.to_string(), ByteString(value.as_bytes().to_vec()));

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: owner.namespace(),
            labels: Some(labels),
            owner_references: Some(vec![owner_reference(owner)]),
            ..Default::default()
        },
        data: Some(data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

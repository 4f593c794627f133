// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakUserCredential`: a user's password, sourced from a Secret.
//!
//! With `createSecret` a missing Secret is generated (owned by the credential
//! resource). The SHA-256 of the applied value is stored in status; when it,
//! the generation and the target user are unchanged, no remote call is made.
//! Removing the resource leaves the password in place.

use crate::constants::{
    DEFAULT_GENERATED_SECRET_LENGTH, KIND_KEYCLOAK_USER_CREDENTIAL, SECRET_KEY_PASSWORD,
};
use crate::crd::{KeycloakResourceStatus, KeycloakUser, KeycloakUserCredential, RealmRefs};
use crate::errors::{Error, Result};
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_USER_CREDENTIAL;
use crate::metrics;
use crate::reconcilers::engine::{ManagedResource, RemoteRef, Synced, Target};
use crate::reconcilers::resolver::sibling;
use crate::reconcilers::secrets::{
    build_generated_secret, generate_password, read_secret, require_secret_value,
    secret_fingerprint, secret_value,
};
use crate::store::{ObjectStore, StoreError};
use crate::validation::realm_reference;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;
use tracing::{debug, info};

impl KeycloakUserCredential {
    fn secret_key(&self) -> &str {
        self.spec
            .secret_ref
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(SECRET_KEY_PASSWORD)
    }

    /// Fingerprint of `password` recorded in status, salted with this resource's uid.
    #[must_use]
    pub fn password_fingerprint(&self, password: &str) -> String {
        let salt = self.uid().unwrap_or_else(|| {
            format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
        });
        secret_fingerprint(&salt, password)
    }

    /// Whether `hash` was already applied to `user_id` at this generation.
    #[must_use]
    pub fn already_applied(&self, user_id: &str, hash: &str) -> bool {
        self.status.as_ref().is_some_and(|s| {
            s.ready
                && s.secret_hash.as_deref() == Some(hash)
                && s.remote_id.as_deref() == Some(user_id)
                && s.observed_generation == self.metadata.generation
        })
    }

    async fn password<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<String> {
        let namespace = &target.namespace;
        let name = &self.spec.secret_ref.name;
        let key = self.secret_key();

        if let Some(secret) = read_secret(target.ctx, namespace, name).await? {
            return secret_value(&secret, key)
                .ok_or_else(|| Error::Secret(format!("Secret {namespace}/{name} has no key {key}")));
        }
        if !self.spec.create_secret {
            return Err(Error::Secret(format!("Secret {namespace}/{name} not found")));
        }

        let length = self
            .spec
            .generated_length
            .unwrap_or(DEFAULT_GENERATED_SECRET_LENGTH);
        let password = generate_password(length);
        let secret = build_generated_secret(self, name, key, &password);
        match target.ctx.store.create(&secret).await {
            Ok(_) => {
                info!("Generated Secret {namespace}/{name} for {}", self.name_any());
                Ok(password)
            }
            // Lost a race with another writer; use whatever won.
            Err(StoreError::AlreadyExists { .. }) => {
                require_secret_value(target.ctx, namespace, name, key).await
            }
            Err(e) => Err(Error::store(format!("Secret {namespace}/{name}"), e)),
        }
    }
}

#[async_trait]
impl ManagedResource for KeycloakUserCredential {
    const KIND: &'static str = KIND_KEYCLOAK_USER_CREDENTIAL;
    const FINALIZER: &'static str = FINALIZER_USER_CREDENTIAL;
    const NATURAL_KEY: Option<&'static str> = None;

    fn definition(&self) -> Option<&Value> {
        None
    }

    fn resource_status(&self) -> Option<&KeycloakResourceStatus> {
        self.status.as_ref()
    }

    fn realm_refs(&self) -> Option<&RealmRefs> {
        Some(&self.spec.realm)
    }

    fn secret_names(&self) -> Vec<String> {
        vec![self.spec.secret_ref.name.clone()]
    }

    fn validate(&self) -> Result<()> {
        realm_reference(&self.spec.realm, &self.namespace().unwrap_or_default())?;
        if self.spec.user_ref.name.is_empty() {
            return Err(Error::InvalidReference(
                "userRef.name must not be empty".to_string(),
            ));
        }
        if self.spec.secret_ref.name.is_empty() {
            return Err(Error::InvalidReference(
                "secretRef.name must not be empty".to_string(),
            ));
        }
        if self.spec.generated_length == Some(0) {
            return Err(Error::InvalidDefinition(
                "generatedLength must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["users"]))
    }

    async fn locate<S: ObjectStore>(&self, _target: &Target<'_, S>) -> Result<Option<RemoteRef>> {
        Ok(None)
    }

    async fn remove<S: ObjectStore>(
        &self,
        _target: &Target<'_, S>,
        existing: &RemoteRef,
    ) -> Result<()> {
        debug!("Leaving the password of user {} in place", existing.id);
        Ok(())
    }

    async fn sync<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Synced> {
        let (_, user_id) = sibling::<KeycloakUser, S>(
            target.ctx,
            &target.namespace,
            &self.spec.user_ref.name,
            &target.realm,
        )
        .await?;

        let password = self.password(target).await?;
        let hash = self.password_fingerprint(&password);
        let path = target.realm_path().join(["users", user_id.as_str()]);

        if self.already_applied(&user_id, &hash) {
            debug!("Password of {} unchanged, skipping", self.name_any());
        } else {
            target
                .client
                .reset_password(&target.realm, &user_id, &password, self.spec.temporary)
                .await?;
            metrics::record_remote_operation(Self::KIND, "update");
            info!("Set password of user {} from {}", user_id, self.name_any());
        }

        Ok(Synced {
            remote: RemoteRef::new(user_id, path),
            secret_hash: Some(hash),
        })
    }
}

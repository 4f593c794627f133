// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakIdentityProvider`: `/identity-provider/instances/{alias}`.
//!
//! Identity providers are addressed by alias, which doubles as the remote id.

use crate::constants::KIND_KEYCLOAK_IDENTITY_PROVIDER;
use crate::crd::KeycloakIdentityProvider;
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_IDENTITY_PROVIDER;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{ManagedResource, RemoteRef, Target};
use crate::store::ObjectStore;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
impl ManagedResource for KeycloakIdentityProvider {
    leaf_resource!(
        KIND_KEYCLOAK_IDENTITY_PROVIDER,
        FINALIZER_IDENTITY_PROVIDER,
        Some("alias")
    );

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["identity-provider", "instances"]))
    }

    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let alias = definition::natural_key(desired, "alias")?;
        let path = collection.join([alias]);
        Ok(target
            .client
            .get_json(&path)
            .await?
            .map(|_| RemoteRef::new(alias, path)))
    }

    async fn create<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<RemoteRef> {
        let alias = definition::natural_key(desired, "alias")?;
        target.client.create(collection, desired).await?;
        Ok(RemoteRef::new(alias, collection.join([alias])))
    }

    async fn update<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        existing: &RemoteRef,
        desired: &Value,
    ) -> Result<()> {
        target.client.update(&existing.path, desired).await?;
        Ok(())
    }
}

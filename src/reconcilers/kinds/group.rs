// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakGroup`: top-level `/groups`, keyed by `name`.

use crate::constants::KIND_KEYCLOAK_GROUP;
use crate::crd::KeycloakGroup;
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_GROUP;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{ManagedResource, RemoteRef, Target};
use crate::store::ObjectStore;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
impl ManagedResource for KeycloakGroup {
    leaf_resource!(KIND_KEYCLOAK_GROUP, FINALIZER_GROUP, Some("name"));

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["groups"]))
    }

    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let name = definition::natural_key(desired, "name")?;
        let items = target
            .client
            .list_json(collection, &[("search", name), ("exact", "true")])
            .await?;
        definition::find_by(&items, "name", name)
            .map(|item| RemoteRef::from_item(collection, item))
            .transpose()
    }
}

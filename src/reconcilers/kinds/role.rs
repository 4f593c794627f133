// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakRole`: realm roles, or client roles with `clientRef`.
//!
//! Roles are created under `/roles` (or `/clients/{uuid}/roles`) and looked up
//! by name there, but updated and deleted through `/roles-by-id/{id}` so a
//! rename in the definition does not orphan the stored path.

use crate::constants::KIND_KEYCLOAK_ROLE;
use crate::crd::{KeycloakClient, KeycloakRole};
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_ROLE;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{missing_id, ManagedResource, RemoteRef, Target};
use crate::reconcilers::resolver::sibling;
use crate::store::ObjectStore;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
impl ManagedResource for KeycloakRole {
    leaf_resource!(KIND_KEYCLOAK_ROLE, FINALIZER_ROLE, Some("name"));

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        match &self.spec.client_ref {
            None => Ok(target.realm_path().join(["roles"])),
            Some(client_ref) => {
                let (_, client_uuid) = sibling::<KeycloakClient, S>(
                    target.ctx,
                    &target.namespace,
                    &client_ref.name,
                    &target.realm,
                )
                .await?;
                Ok(target
                    .realm_path()
                    .join(["clients", client_uuid.as_str(), "roles"]))
            }
        }
    }

    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let name = definition::natural_key(desired, "name")?;
        let Some(rep) = target.client.get_json(&collection.join([name])).await? else {
            return Ok(None);
        };
        let id = definition::string_field(&rep, "id").ok_or_else(|| missing_id(collection))?;
        Ok(Some(RemoteRef::new(
            id,
            target.realm_path().join(["roles-by-id", id]),
        )))
    }

    async fn create<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<RemoteRef> {
        target.client.post_json(collection, desired).await?;
        self.find(target, collection, desired)
            .await?
            .ok_or_else(|| missing_id(collection))
    }
}

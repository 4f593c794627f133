// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakComponent`: `/components` (user federation, key providers, ...).
//!
//! Components hang off a parent; `parentId` defaults to the realm's internal id.
//! Lookup matches `name` under that parent, plus `providerType` when given.

use crate::constants::KIND_KEYCLOAK_COMPONENT;
use crate::crd::KeycloakComponent;
use crate::errors::{Error, Result};
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_COMPONENT;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{ManagedResource, RemoteRef, Target};
use crate::store::ObjectStore;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;

#[async_trait]
impl ManagedResource for KeycloakComponent {
    leaf_resource!(KIND_KEYCLOAK_COMPONENT, FINALIZER_COMPONENT, Some("name"));

    async fn desired<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Value> {
        let desired =
            definition::with_natural_key(self.definition(), Self::NATURAL_KEY, &self.name_any())?;
        if definition::string_field(&desired, "parentId").is_some() {
            return Ok(desired);
        }
        let realm_id = target
            .client
            .realm_id(&target.realm)
            .await?
            .ok_or_else(|| {
                Error::RealmNotReady(format!("realm {} does not exist in Keycloak", target.realm))
            })?;
        Ok(definition::with_field(
            &desired,
            "parentId",
            Value::String(realm_id),
        ))
    }

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["components"]))
    }

    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let name = definition::natural_key(desired, "name")?;
        let mut query = vec![("name", name)];
        if let Some(parent) = definition::string_field(desired, "parentId") {
            query.push(("parent", parent));
        }
        let provider_type = definition::string_field(desired, "providerType");
        if let Some(provider_type) = provider_type {
            query.push(("type", provider_type));
        }

        let items = target.client.list_json(collection, &query).await?;
        items
            .iter()
            .find(|item| {
                definition::string_field(item, "name") == Some(name)
                    && provider_type
                        .is_none_or(|t| definition::string_field(item, "providerType") == Some(t))
            })
            .map(|item| RemoteRef::from_item(collection, item))
            .transpose()
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakUser`: `/users`, keyed by `username`.
//!
//! With `clientRef` the resource manages the service-account user of that
//! client instead. Keycloak creates and deletes that user with the client, so
//! the operator only updates it and never deletes it.

use crate::constants::KIND_KEYCLOAK_USER;
use crate::crd::{KeycloakClient, KeycloakUser, LocalRef};
use crate::errors::{Error, Result};
use crate::keycloak::{self, AdminPath};
use crate::labels::FINALIZER_USER;
use crate::metrics;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{create_or_update, ManagedResource, RemoteRef, Synced, Target};
use crate::reconcilers::resolver::sibling;
use crate::store::ObjectStore;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;
use tracing::{debug, info};

impl KeycloakUser {
    async fn sync_service_account<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        client_ref: &LocalRef,
    ) -> Result<Synced> {
        let (_, client_uuid) = sibling::<KeycloakClient, S>(
            target.ctx,
            &target.namespace,
            &client_ref.name,
            &target.realm,
        )
        .await?;

        let current = target
            .client
            .service_account_user(&target.realm, &client_uuid)
            .await?;
        let id = definition::string_field(&current, "id")
            .ok_or_else(|| {
                Error::Remote(keycloak::Error::Decode {
                    url: format!("clients/{client_uuid}/service-account-user"),
                    message: "service-account user has no id".to_string(),
                })
            })?
            .to_string();

        // The service-account username is fixed by Keycloak.
        let mut body = current.clone();
        if let (Value::Object(out), Some(Value::Object(fields))) = (&mut body, self.definition()) {
            for (field, value) in fields {
                if field != "username" && field != "id" {
                    out.insert(field.clone(), value.clone());
                }
            }
        }

        let path = target.realm_path().join(["users", id.as_str()]);
        target.client.update(&path, &body).await?;
        metrics::record_remote_operation(Self::KIND, "update");
        info!(
            "Updated service-account user of KeycloakClient {} for {}",
            client_ref.name,
            self.name_any()
        );
        Ok(Synced::new(RemoteRef::new(id, path)))
    }
}

#[async_trait]
impl ManagedResource for KeycloakUser {
    leaf_resource!(KIND_KEYCLOAK_USER, FINALIZER_USER, Some("username"));

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["users"]))
    }

    // Keycloak stores usernames lowercased.
    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let username = definition::natural_key(desired, "username")?;
        let items = target
            .client
            .list_json(collection, &[("username", username), ("exact", "true")])
            .await?;
        items
            .iter()
            .find(|item| {
                definition::string_field(item, "username")
                    .is_some_and(|u| u.eq_ignore_ascii_case(username))
            })
            .map(|item| RemoteRef::from_item(collection, item))
            .transpose()
    }

    async fn locate<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Option<RemoteRef>> {
        if self.spec.client_ref.is_some() {
            return Ok(None);
        }
        let desired = self.desired(target).await?;
        let collection = self.collection(target).await?;
        self.find(target, &collection, &desired).await
    }

    async fn remove<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        existing: &RemoteRef,
    ) -> Result<()> {
        if self.spec.client_ref.is_some() {
            debug!(
                "Service-account user {} is owned by its client, not deleting",
                existing.id
            );
            return Ok(());
        }
        target.client.delete(&existing.path).await?;
        Ok(())
    }

    async fn sync<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Synced> {
        match &self.spec.client_ref {
            Some(client_ref) => self.sync_service_account(target, client_ref).await,
            None => create_or_update(self, target).await,
        }
    }
}

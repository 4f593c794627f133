// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakClient`: `/clients`, keyed by `clientId`.
//!
//! A `clientSecret` reference injects the Secret value as the representation's
//! `secret`, so confidential clients never carry credentials in the resource.

use crate::constants::{KIND_KEYCLOAK_CLIENT, SECRET_KEY_CLIENT_SECRET};
use crate::crd::KeycloakClient;
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_CLIENT;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{ManagedResource, RemoteRef, Target};
use crate::reconcilers::secrets::require_secret_value;
use crate::store::ObjectStore;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;

#[async_trait]
impl ManagedResource for KeycloakClient {
    leaf_resource!(KIND_KEYCLOAK_CLIENT, FINALIZER_CLIENT, Some("clientId"));

    fn secret_names(&self) -> Vec<String> {
        self.spec
            .client_secret
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    async fn desired<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Value> {
        let desired =
            definition::with_natural_key(self.definition(), Self::NATURAL_KEY, &self.name_any())?;
        let Some(secret_ref) = &self.spec.client_secret else {
            return Ok(desired);
        };
        let key = secret_ref.key.as_deref().unwrap_or(SECRET_KEY_CLIENT_SECRET);
        let secret =
            require_secret_value(target.ctx, &target.namespace, &secret_ref.name, key).await?;
        Ok(definition::with_field(&desired, "secret", Value::String(secret)))
    }

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["clients"]))
    }

    async fn find<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        collection: &AdminPath,
        desired: &Value,
    ) -> Result<Option<RemoteRef>> {
        let client_id = definition::natural_key(desired, "clientId")?;
        let items = target
            .client
            .list_json(collection, &[("clientId", client_id)])
            .await?;
        definition::find_by(&items, "clientId", client_id)
            .map(|item| RemoteRef::from_item(collection, item))
            .transpose()
    }

    // Deletion must not depend on the client secret still being readable.
    async fn locate<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Option<RemoteRef>> {
        let desired =
            definition::with_natural_key(self.definition(), Self::NATURAL_KEY, &self.name_any())?;
        let collection = self.collection(target).await?;
        self.find(target, &collection, &desired).await
    }
}

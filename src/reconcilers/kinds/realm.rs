// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakRealm` and `ClusterKeycloakRealm`.
//!
//! Realms are addressed by name (`/admin/realms/{realm}`), not by id, so
//! lookup is a single GET and creation re-reads the realm to learn its id.
//! The realm name comes from `definition.realm` and is never defaulted.

use crate::constants::{KIND_CLUSTER_KEYCLOAK_REALM, KIND_KEYCLOAK_REALM};
use crate::context::Context;
use crate::crd::{ClusterKeycloakRealm, KeycloakRealm, KeycloakResourceStatus};
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_REALM;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{missing_id, ManagedResource, RemoteRef, Target};
use crate::reconcilers::resolver::{self, Resolved};
use crate::store::ObjectStore;
use crate::validation::instance_reference;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;

async fn find_realm<S: ObjectStore>(target: &Target<'_, S>) -> Result<Option<RemoteRef>> {
    Ok(target.client.get_realm(&target.realm).await?.map(|rep| {
        let id = definition::string_field(&rep, "id").unwrap_or(&target.realm);
        RemoteRef::new(id, target.realm_path())
    }))
}

macro_rules! realm_resource {
    ($ty:ty, $kind:expr) => {
        #[async_trait]
        impl ManagedResource for $ty {
            const KIND: &'static str = $kind;
            const FINALIZER: &'static str = FINALIZER_REALM;
            const NATURAL_KEY: Option<&'static str> = Some("realm");

            fn definition(&self) -> Option<&Value> {
                self.spec.definition.as_ref()
            }

            fn resource_status(&self) -> Option<&KeycloakResourceStatus> {
                self.status.as_ref()
            }

            // A cluster realm has no namespace to default to, so its
            // instanceRef must name one.
            fn validate(&self) -> Result<()> {
                instance_reference(&self.spec.instance, self.namespace().as_deref()).map(|_| ())
            }

            async fn resolve<S: ObjectStore>(&self, ctx: &Context<S>) -> Result<Resolved> {
                let realm = definition::realm_name(self.definition())?;
                let client =
                    resolver::resolve_instance(ctx, &self.spec.instance, self.namespace().as_deref())
                        .await?;
                Ok(Resolved { client, realm })
            }

            async fn desired<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Value> {
                definition::with_natural_key(self.definition(), Self::NATURAL_KEY, &target.realm)
            }

            async fn collection<S: ObjectStore>(&self, _target: &Target<'_, S>) -> Result<AdminPath> {
                Ok(AdminPath::realms())
            }

            async fn find<S: ObjectStore>(
                &self,
                target: &Target<'_, S>,
                _collection: &AdminPath,
                _desired: &Value,
            ) -> Result<Option<RemoteRef>> {
                find_realm(target).await
            }

            async fn create<S: ObjectStore>(
                &self,
                target: &Target<'_, S>,
                collection: &AdminPath,
                desired: &Value,
            ) -> Result<RemoteRef> {
                target.client.create_realm(desired).await?;
                find_realm(target)
                    .await?
                    .ok_or_else(|| missing_id(collection))
            }
        }
    };
}

realm_resource!(KeycloakRealm, KIND_KEYCLOAK_REALM);
realm_resource!(ClusterKeycloakRealm, KIND_CLUSTER_KEYCLOAK_REALM);

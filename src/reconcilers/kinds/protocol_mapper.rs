// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakProtocolMapper`: mappers of a client or of a client scope.

use crate::constants::KIND_KEYCLOAK_PROTOCOL_MAPPER;
use crate::crd::{KeycloakClient, KeycloakClientScope, KeycloakProtocolMapper};
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_PROTOCOL_MAPPER;
use crate::reconcilers::engine::{ManagedResource, Target};
use crate::reconcilers::resolver::sibling;
use crate::store::ObjectStore;
use crate::validation::{mapper_parent, realm_reference, MapperParent};
use async_trait::async_trait;
use kube::ResourceExt;

#[async_trait]
impl ManagedResource for KeycloakProtocolMapper {
    leaf_resource!(
        KIND_KEYCLOAK_PROTOCOL_MAPPER,
        FINALIZER_PROTOCOL_MAPPER,
        Some("name")
    );

    fn validate(&self) -> Result<()> {
        realm_reference(&self.spec.realm, &self.namespace().unwrap_or_default())?;
        mapper_parent(
            self.spec.client_ref.as_ref(),
            self.spec.client_scope_ref.as_ref(),
        )
        .map(|_| ())
    }

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        let parent = match mapper_parent(
            self.spec.client_ref.as_ref(),
            self.spec.client_scope_ref.as_ref(),
        )? {
            MapperParent::Client(name) => {
                let (_, id) = sibling::<KeycloakClient, S>(
                    target.ctx,
                    &target.namespace,
                    &name,
                    &target.realm,
                )
                .await?;
                target.realm_path().join(["clients", id.as_str()])
            }
            MapperParent::ClientScope(name) => {
                let (_, id) = sibling::<KeycloakClientScope, S>(
                    target.ctx,
                    &target.namespace,
                    &name,
                    &target.realm,
                )
                .await?;
                target.realm_path().join(["client-scopes", id.as_str()])
            }
        };
        Ok(parent.join(["protocol-mappers", "models"]))
    }
}

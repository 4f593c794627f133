// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakRoleMapping`: grants one role to one user or group.
//!
//! The mapping has no representation of its own. Its "remote object" is the
//! role id inside the subject's `role-mappings/realm` or
//! `role-mappings/clients/{uuid}` list; sync adds it when absent and removal
//! deletes exactly that entry. When the spec is edited to a different role or
//! subject, sync grants the new role and then revokes the one recorded in
//! status.

use crate::constants::KIND_KEYCLOAK_ROLE_MAPPING;
use crate::crd::{
    KeycloakClient, KeycloakGroup, KeycloakResourceStatus, KeycloakRole, KeycloakRoleMapping,
    KeycloakUser, RealmRefs,
};
use crate::errors::{Error, Result};
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_ROLE_MAPPING;
use crate::metrics;
use crate::reconcilers::definition;
use crate::reconcilers::engine::{missing_id, ManagedResource, RemoteRef, Synced, Target};
use crate::reconcilers::resolver::sibling;
use crate::store::ObjectStore;
use crate::validation::{
    mapping_subject, mapping_target, realm_reference, MappingSubject, MappingTarget,
};
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::{json, Value};
use tracing::{debug, info};

/// A resolved mapping: the list it lives in and the role it grants.
struct Mapping {
    path: AdminPath,
    role: Value,
    role_id: String,
}

impl KeycloakRoleMapping {
    async fn subject_path<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        let (collection, id) =
            match mapping_subject(self.spec.user_ref.as_ref(), self.spec.group_ref.as_ref())? {
                MappingSubject::User(name) => (
                    "users",
                    sibling::<KeycloakUser, S>(target.ctx, &target.namespace, &name, &target.realm)
                        .await?
                        .1,
                ),
                MappingSubject::Group(name) => (
                    "groups",
                    sibling::<KeycloakGroup, S>(
                        target.ctx,
                        &target.namespace,
                        &name,
                        &target.realm,
                    )
                    .await?
                    .1,
                ),
            };
        Ok(target.realm_path().join([collection, id.as_str()]))
    }

    /// Role representation and, for client roles, the owning client's uuid.
    async fn role<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<(Value, Option<String>)> {
        let target_role = mapping_target(
            self.spec.role_ref.as_ref(),
            self.spec.realm_role.as_deref(),
            self.spec.client_role.as_ref(),
        )?;

        let (rep, client_uuid, label) = match target_role {
            MappingTarget::Role(name) => {
                let (_, role_id) =
                    sibling::<KeycloakRole, S>(target.ctx, &target.namespace, &name, &target.realm)
                        .await?;
                let rep = target
                    .client
                    .get_json(&target.realm_path().join(["roles-by-id", role_id.as_str()]))
                    .await?;
                let client_uuid = rep.as_ref().and_then(|r| {
                    r.get("clientRole")
                        .and_then(Value::as_bool)
                        .unwrap_or(false)
                        .then(|| definition::string_field(r, "containerId").map(str::to_string))
                        .flatten()
                });
                (rep, client_uuid, format!("KeycloakRole {name}"))
            }
            MappingTarget::RealmRole(role) => {
                let rep = target
                    .client
                    .role_by_name(&target.realm, None, &role)
                    .await?;
                (rep, None, format!("realm role {role}"))
            }
            MappingTarget::ClientRole { client, role } => {
                let (_, client_uuid) = sibling::<KeycloakClient, S>(
                    target.ctx,
                    &target.namespace,
                    &client,
                    &target.realm,
                )
                .await?;
                let rep = target
                    .client
                    .role_by_name(&target.realm, Some(&client_uuid), &role)
                    .await?;
                (rep, Some(client_uuid), format!("role {role} of client {client}"))
            }
        };

        let rep = rep.ok_or_else(|| {
            Error::DependencyNotReady(format!("{label} does not exist in realm {}", target.realm))
        })?;
        Ok((rep, client_uuid))
    }

    async fn mapping<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Mapping> {
        let subject = self.subject_path(target).await?;
        let (role, client_uuid) = self.role(target).await?;
        let role_id = definition::string_field(&role, "id")
            .ok_or_else(|| missing_id(&subject))?
            .to_string();
        let path = match client_uuid {
            None => subject.join(["role-mappings", "realm"]),
            Some(uuid) => subject.join(["role-mappings", "clients", uuid.as_str()]),
        };
        Ok(Mapping {
            path,
            role,
            role_id,
        })
    }
}

#[async_trait]
impl ManagedResource for KeycloakRoleMapping {
    const KIND: &'static str = KIND_KEYCLOAK_ROLE_MAPPING;
    const FINALIZER: &'static str = FINALIZER_ROLE_MAPPING;
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

    fn validate(&self) -> Result<()> {
        realm_reference(&self.spec.realm, &self.namespace().unwrap_or_default())?;
        mapping_subject(self.spec.user_ref.as_ref(), self.spec.group_ref.as_ref())?;
        mapping_target(
            self.spec.role_ref.as_ref(),
            self.spec.realm_role.as_deref(),
            self.spec.client_role.as_ref(),
        )
        .map(|_| ())
    }

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(self.mapping(target).await?.path)
    }

    async fn locate<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Option<RemoteRef>> {
        let mapping = self.mapping(target).await?;
        Ok(Some(RemoteRef::new(mapping.role_id, mapping.path)))
    }

    async fn remove<S: ObjectStore>(
        &self,
        target: &Target<'_, S>,
        existing: &RemoteRef,
    ) -> Result<()> {
        let role_path = target
            .realm_path()
            .join(["roles-by-id", existing.id.as_str()]);
        let Some(role) = target.client.get_json(&role_path).await? else {
            debug!("Role {} is gone, mapping went with it", existing.id);
            return Ok(());
        };
        target
            .client
            .delete_json(&existing.path, &json!([role]))
            .await?;
        Ok(())
    }

    async fn sync<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<Synced> {
        let mapping = self.mapping(target).await?;
        let current = target.client.list_json(&mapping.path, &[]).await?;

        if definition::find_by(&current, "id", &mapping.role_id).is_none() {
            target
                .client
                .post_json(&mapping.path, &json!([mapping.role]))
                .await?;
            metrics::record_remote_operation(Self::KIND, "create");
            info!(path = %mapping.path, "Granted role {} for {}", mapping.role_id, self.name_any());
        }

        let granted = RemoteRef::new(mapping.role_id, mapping.path);
        // A retargeted mapping still holds the previous grant until it is revoked.
        if let Some(previous) = RemoteRef::from_status(self.status.as_ref()) {
            if previous != granted {
                self.remove(target, &previous).await?;
                metrics::record_remote_operation(Self::KIND, "delete");
                info!(path = %previous.path, "Revoked role {} for {}", previous.id, self.name_any());
            }
        }

        Ok(Synced::new(granted))
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KeycloakClientScope`: `/client-scopes`, keyed by `name`.

use crate::constants::KIND_KEYCLOAK_CLIENT_SCOPE;
use crate::crd::KeycloakClientScope;
use crate::errors::Result;
use crate::keycloak::AdminPath;
use crate::labels::FINALIZER_CLIENT_SCOPE;
use crate::reconcilers::engine::{ManagedResource, Target};
use crate::store::ObjectStore;
use async_trait::async_trait;

#[async_trait]
impl ManagedResource for KeycloakClientScope {
    leaf_resource!(KIND_KEYCLOAK_CLIENT_SCOPE, FINALIZER_CLIENT_SCOPE, Some("name"));

    async fn collection<S: ObjectStore>(&self, target: &Target<'_, S>) -> Result<AdminPath> {
        Ok(target.realm_path().join(["client-scopes"]))
    }
}

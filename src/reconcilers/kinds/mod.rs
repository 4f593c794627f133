// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`ManagedResource`](crate::reconcilers::engine::ManagedResource) adapters,
//! one per realm or realm-content kind.
//!
//! Most kinds only differ in their collection path and natural key; the
//! engine's defaults do the rest. Kinds whose Admin API deviates from the
//! collection shape (realms, roles, identity providers, role mappings,
//! credentials, service-account users) override the affected steps.

/// Constants and accessors shared by every kind carrying `realm` refs and a
/// `definition`.
macro_rules! leaf_resource {
    ($kind:expr, $finalizer:expr, $key:expr) => {
        const KIND: &'static str = $kind;
        const FINALIZER: &'static str = $finalizer;
        const NATURAL_KEY: Option<&'static str> = $key;

        fn definition(&self) -> Option<&serde_json::Value> {
            self.spec.definition.as_ref()
        }

        fn resource_status(&self) -> Option<&crate::crd::KeycloakResourceStatus> {
            self.status.as_ref()
        }

        fn realm_refs(&self) -> Option<&crate::crd::RealmRefs> {
            Some(&self.spec.realm)
        }
    };
}

pub mod client;
pub mod client_scope;
pub mod component;
pub mod credential;
pub mod group;
pub mod identity_provider;
pub mod organization;
pub mod protocol_mapper;
pub mod realm;
pub mod role;
pub mod role_mapping;
pub mod user;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for all Keycloak custom resources.
//!
//! # Reconciliation Architecture
//!
//! Every kind follows the standard controller pattern:
//!
//! 1. **Watch** - resource, ancestor and Secret changes enqueue the resource
//! 2. **Resolve** - walk realm → connection descriptor to an authenticated client
//! 3. **Sync** - look the remote object up by natural key, then create or update it
//! 4. **Status** - record the outcome (and the remote path for deletion)
//!
//! # Available Reconcilers
//!
//! - [`reconcile_instance`] - connection descriptors (`KeycloakInstance`,
//!   `ClusterKeycloakInstance`): register the client, check auth and version
//! - [`reconcile`] - realms and every realm-content kind, driven by the
//!   per-kind [`ManagedResource`] adapters in [`kinds`]
//!
//! # Example
//!
//! ```rust,no_run
//! use keycloak_operator::config::OperatorConfig;
//! use keycloak_operator::context::Context;
//! use keycloak_operator::crd::KeycloakClient;
//! use keycloak_operator::reconcilers::reconcile;
//! use keycloak_operator::store::KubeStore;
//!
//! async fn reconcile_client(client: kube::Client, resource: KeycloakClient) -> anyhow::Result<()> {
//!     let ctx = Context::new(KubeStore::new(client), OperatorConfig::default());
//!     let action = reconcile(&ctx, &resource).await?;
//!     println!("next: {action:?}");
//!     Ok(())
//! }
//! ```

pub mod definition;
pub mod engine;
pub mod finalizers;
pub mod instance;
pub mod kinds;
pub mod resolver;
pub mod secrets;
pub mod status;

#[cfg(test)]
mod definition_tests;
#[cfg(test)]
mod finalizers_tests;
#[cfg(test)]
mod resolver_tests;
#[cfg(test)]
mod secrets_tests;
#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{reconcile, ManagedResource};
pub use instance::{reconcile_instance, ConnectionDescriptor};

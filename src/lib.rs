// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Keycloak Operator for Kubernetes
//!
//! A Kubernetes operator that keeps Keycloak servers in line with custom
//! resources: connection descriptors, realms, and the objects inside a realm
//! (clients, users, groups, roles, scopes, identity providers, organizations,
//! components, protocol mappers, role mappings and user credentials).
//!
//! ## Overview
//!
//! Each custom resource carries a Keycloak representation as its
//! `definition`. The operator resolves the realm and connection the resource
//! points at, looks the remote object up by its natural key, and creates or
//! updates it. The remote path is recorded in status so deletion works even
//! after the parent chain is gone.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`keycloak`] - Keycloak admin REST client, token handling and client registry
//! - [`reconcilers`] - Reconciliation engine and per-kind adapters
//! - [`controller`] - Controller runners wiring watches to the reconcilers
//! - [`store`] - Control-plane access used by the reconcilers
//! - [`context`] - Shared context for all controllers
//! - [`config`] - Command-line and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use keycloak_operator::crd::{InstanceRefs, KeycloakRealmSpec, NamespacedRef};
//! use serde_json::json;
//!
//! let spec = KeycloakRealmSpec {
//!     instance: InstanceRefs {
//!         instance_ref: Some(NamespacedRef {
//!             name: "main".to_string(),
//!             namespace: None,
//!         }),
//!         cluster_instance_ref: None,
//!     },
//!     definition: Some(json!({ "realm": "demo", "enabled": true })),
//! };
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod http_errors;
pub mod keycloak;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod server;
pub mod status_reasons;
pub mod store;
pub mod validation;

#[cfg(test)]
mod controller_tests;
#[cfg(test)]
mod status_reasons_tests;

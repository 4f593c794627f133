// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label, annotation and finalizer constants used across all reconcilers.
//!
//! This module defines standard Kubernetes labels and operator-specific labels/annotations
//! to ensure consistency across all resources created by the controller.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Value for `app.kubernetes.io/managed-by` on objects the operator creates
pub const MANAGED_BY_KEYCLOAK_OPERATOR: &str = "keycloak-operator";

/// Value for `app.kubernetes.io/part-of` on objects the operator creates
pub const PART_OF_KEYCLOAK: &str = "keycloak";

// ============================================================================
// Operator-Specific Annotations
// ============================================================================

/// Annotation that suppresses remote deletion when the declared resource is removed.
///
/// Any value other than `"true"` (case-insensitive) is ignored.
pub const PRESERVE_ON_DELETE_ANNOTATION: &str = "keycloak.firestoned.io/preserve-on-delete";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `KeycloakInstance` and `ClusterKeycloakInstance` resources
pub const FINALIZER_INSTANCE: &str = "keycloak.firestoned.io/instance-finalizer";

/// Finalizer for `KeycloakRealm` and `ClusterKeycloakRealm` resources
pub const FINALIZER_REALM: &str = "keycloak.firestoned.io/realm-finalizer";

/// Finalizer for `KeycloakClient` resources
pub const FINALIZER_CLIENT: &str = "keycloak.firestoned.io/client-finalizer";

/// Finalizer for `KeycloakUser` resources
pub const FINALIZER_USER: &str = "keycloak.firestoned.io/user-finalizer";

/// Finalizer for `KeycloakGroup` resources
pub const FINALIZER_GROUP: &str = "keycloak.firestoned.io/group-finalizer";

/// Finalizer for `KeycloakRole` resources
pub const FINALIZER_ROLE: &str = "keycloak.firestoned.io/role-finalizer";

/// Finalizer for `KeycloakClientScope` resources
pub const FINALIZER_CLIENT_SCOPE: &str = "keycloak.firestoned.io/clientscope-finalizer";

/// Finalizer for `KeycloakIdentityProvider` resources
pub const FINALIZER_IDENTITY_PROVIDER: &str = "keycloak.firestoned.io/identityprovider-finalizer";

/// Finalizer for `KeycloakOrganization` resources
pub const FINALIZER_ORGANIZATION: &str = "keycloak.firestoned.io/organization-finalizer";

/// Finalizer for `KeycloakComponent` resources
pub const FINALIZER_COMPONENT: &str = "keycloak.firestoned.io/component-finalizer";

/// Finalizer for `KeycloakProtocolMapper` resources
pub const FINALIZER_PROTOCOL_MAPPER: &str = "keycloak.firestoned.io/protocolmapper-finalizer";

/// Finalizer for `KeycloakRoleMapping` resources
pub const FINALIZER_ROLE_MAPPING: &str = "keycloak.firestoned.io/rolemapping-finalizer";

/// Finalizer for `KeycloakUserCredential` resources
pub const FINALIZER_USER_CREDENTIAL: &str = "keycloak.firestoned.io/usercredential-finalizer";

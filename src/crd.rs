// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for Keycloak management.
//!
//! This module defines all Kubernetes Custom Resource Definitions used by the
//! operator to manage Keycloak realms and their contents declaratively.
//!
//! # Resource Types
//!
//! ## Connections
//!
//! - [`KeycloakInstance`] / [`ClusterKeycloakInstance`] - How to reach and authenticate
//!   against one Keycloak server
//!
//! ## Realms
//!
//! - [`KeycloakRealm`] / [`ClusterKeycloakRealm`] - A realm hosted by a connection
//!
//! ## Realm Contents
//!
//! - [`KeycloakClient`], [`KeycloakUser`], [`KeycloakGroup`], [`KeycloakRole`]
//! - [`KeycloakClientScope`], [`KeycloakIdentityProvider`], [`KeycloakOrganization`]
//! - [`KeycloakComponent`], [`KeycloakProtocolMapper`]
//! - [`KeycloakRoleMapping`], [`KeycloakUserCredential`]
//!
//! Every realm-content kind references exactly one realm through `realmRef` or
//! `clusterRealmRef`, and carries an opaque `definition` that is sent to the
//! Keycloak admin API as-is.
//!
//! # Example: Declaring a client
//!
//! ```rust,no_run
//! use keycloak_operator::crd::{KeycloakClientSpec, NamespacedRef, RealmRefs};
//! use serde_json::json;
//!
//! let spec = KeycloakClientSpec {
//!     realm: RealmRefs {
//!         realm_ref: Some(NamespacedRef {
//!             name: "demo".to_string(),
//!             namespace: None,
//!         }),
//!         cluster_realm_ref: None,
//!     },
//!     definition: Some(json!({ "clientId": "app", "publicClient": false })),
//!     client_secret: None,
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Schema for opaque Keycloak representations.
///
/// The API server keeps every field so the object reaches Keycloak untouched.
fn preserve_unknown_fields(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": "object",
        "x-kubernetes-preserve-unknown-fields": true
    })
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. The operator only sets `Ready`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Status shared by realms and every realm-content kind.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakResourceStatus {
    /// Whether the last reconcile synced the remote object.
    #[serde(default)]
    pub ready: bool,

    /// Short reason code of the last attempt (mirrors the `Ready` condition reason).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Human-readable result of the last attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Generation at which the last successful sync happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Admin API path of the remote object, relative to `/admin/realms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,

    /// Identifier Keycloak assigned to the remote object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    /// Name of the realm the object lives in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,

    /// SHA-256 of the last secret value pushed to Keycloak (credential kinds only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Status of a connection descriptor.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakInstanceStatus {
    #[serde(default)]
    pub ready: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Keycloak server version reported by `/admin/serverinfo`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

// ============================================================================
// References
// ============================================================================

/// Reference to a namespaced object; the namespace defaults to the referrer's.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedRef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Reference to a cluster-scoped object.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRef {
    pub name: String,
}

/// Reference to another resource in the same namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocalRef {
    pub name: String,
}

/// Realm reference carried by every realm-content kind.
///
/// Exactly one of `realmRef` and `clusterRealmRef` must be set.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealmRefs {
    /// A `KeycloakRealm`, in the resource's namespace unless `namespace` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_ref: Option<NamespacedRef>,

    /// A `ClusterKeycloakRealm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_realm_ref: Option<ClusterRef>,
}

/// Connection reference carried by realm kinds.
///
/// Exactly one of `instanceRef` and `clusterInstanceRef` must be set.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRefs {
    /// A `KeycloakInstance`. Cluster-scoped realms must set `namespace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_ref: Option<NamespacedRef>,

    /// A `ClusterKeycloakInstance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_instance_ref: Option<ClusterRef>,
}

/// Key inside a Secret.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRef {
    /// Secret name, in the resource's namespace.
    pub name: String,

    /// Key inside the Secret; each kind documents its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

// ============================================================================
// Connections
// ============================================================================

/// Admin credentials Secret of a connection.
///
/// The Secret holds either `clientId` + `clientSecret` (client-credentials grant)
/// or `username` + `password` (password grant against `admin-cli`). When both
/// pairs are present the client-credentials grant wins.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsSecretRef {
    pub secret_name: String,

    /// Namespace of the Secret. Only honoured for `ClusterKeycloakInstance`,
    /// which falls back to the operator namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Connection settings shared by both connection kinds.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    /// Base URL of the Keycloak server (e.g., `https://sso.example.com`).
    pub base_url: String,

    /// Realm the admin credentials authenticate against. Defaults to `master`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_realm: Option<String>,

    pub credentials: CredentialsSecretRef,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakInstance",
    namespaced,
    doc = "KeycloakInstance describes how to reach and authenticate against one Keycloak server. Realms in any namespace may reference it."
)]
#[kube(status = "KeycloakInstanceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakInstanceSpec {
    #[serde(flatten)]
    pub connection: ConnectionSpec,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "ClusterKeycloakInstance",
    doc = "ClusterKeycloakInstance is the cluster-scoped variant of KeycloakInstance, for platform teams sharing one Keycloak server across namespaces."
)]
#[kube(status = "KeycloakInstanceStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterKeycloakInstanceSpec {
    #[serde(flatten)]
    pub connection: ConnectionSpec,
}

// ============================================================================
// Realms
// ============================================================================

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakRealm",
    namespaced,
    doc = "KeycloakRealm declares a realm on the Keycloak server of the referenced instance. The definition is a RealmRepresentation and must contain `realm`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakRealmSpec {
    #[serde(flatten)]
    pub instance: InstanceRefs,

    /// Keycloak `RealmRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "ClusterKeycloakRealm",
    doc = "ClusterKeycloakRealm is the cluster-scoped variant of KeycloakRealm. Realm contents in any namespace may reference it through clusterRealmRef."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterKeycloakRealmSpec {
    #[serde(flatten)]
    pub instance: InstanceRefs,

    /// Keycloak `RealmRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

// ============================================================================
// Realm Contents
// ============================================================================

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakClient",
    namespaced,
    doc = "KeycloakClient declares an OpenID Connect or SAML client. The definition is a ClientRepresentation keyed by `clientId`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakClientSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `ClientRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,

    /// Secret holding the client secret (key defaults to `clientSecret`).
    /// When set, its value overrides `definition.secret`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretKeyRef>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakUser",
    namespaced,
    doc = "KeycloakUser declares a user. The definition is a UserRepresentation keyed by `username`. With clientRef set, the service-account user of that client is managed instead."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakUserSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `UserRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,

    /// `KeycloakClient` whose service-account user this resource manages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<LocalRef>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakGroup",
    namespaced,
    doc = "KeycloakGroup declares a top-level group. The definition is a GroupRepresentation keyed by `name`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakGroupSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `GroupRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakRole",
    namespaced,
    doc = "KeycloakRole declares a realm role, or a client role when clientRef is set. The definition is a RoleRepresentation keyed by `name`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakRoleSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `RoleRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,

    /// `KeycloakClient` owning the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<LocalRef>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakClientScope",
    namespaced,
    doc = "KeycloakClientScope declares a client scope. The definition is a ClientScopeRepresentation keyed by `name`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakClientScopeSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `ClientScopeRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakIdentityProvider",
    namespaced,
    doc = "KeycloakIdentityProvider declares an identity broker (OIDC, SAML, social). The definition is an IdentityProviderRepresentation keyed by `alias`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakIdentityProviderSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `IdentityProviderRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakOrganization",
    namespaced,
    doc = "KeycloakOrganization declares an organization (Keycloak 25+). The definition is an OrganizationRepresentation keyed by `name`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakOrganizationSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `OrganizationRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakComponent",
    namespaced,
    doc = "KeycloakComponent declares a realm component such as an LDAP user federation provider or a key provider. The definition is a ComponentRepresentation keyed by `name`; `parentId` defaults to the realm."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakComponentSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `ComponentRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakProtocolMapper",
    namespaced,
    doc = "KeycloakProtocolMapper declares a protocol mapper on a client or a client scope. The definition is a ProtocolMapperRepresentation keyed by `name`."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakProtocolMapperSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// Keycloak `ProtocolMapperRepresentation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub definition: Option<serde_json::Value>,

    /// `KeycloakClient` carrying the mapper. Mutually exclusive with `clientScopeRef`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<LocalRef>,

    /// `KeycloakClientScope` carrying the mapper. Mutually exclusive with `clientRef`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_scope_ref: Option<LocalRef>,
}

/// Client role target of a role mapping.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRoleTarget {
    /// `KeycloakClient` owning the role.
    pub client_ref: LocalRef,

    /// Role name on that client.
    pub role: String,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakRoleMapping",
    namespaced,
    doc = "KeycloakRoleMapping grants one role to a user or a group. The subject is userRef or groupRef; the role is roleRef, realmRole or clientRole."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakRoleMappingSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// `KeycloakUser` receiving the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ref: Option<LocalRef>,

    /// `KeycloakGroup` receiving the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ref: Option<LocalRef>,

    /// `KeycloakRole` to grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ref: Option<LocalRef>,

    /// Realm role to grant, by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_role: Option<String>,

    /// Client role to grant, by client and role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_role: Option<ClientRoleTarget>,
}

/// Password source of a user credential.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordSecretRef {
    pub name: String,

    /// Key holding the password. Defaults to `password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "keycloak.firestoned.io",
    version = "v1alpha1",
    kind = "KeycloakUserCredential",
    namespaced,
    doc = "KeycloakUserCredential keeps a user's password in sync with a Secret. The Secret can be generated by the operator when createSecret is true."
)]
#[kube(status = "KeycloakResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct KeycloakUserCredentialSpec {
    #[serde(flatten)]
    pub realm: RealmRefs,

    /// `KeycloakUser` whose password is set.
    pub user_ref: LocalRef,

    pub secret_ref: PasswordSecretRef,

    /// Require the user to change the password at next login.
    #[serde(default)]
    pub temporary: bool,

    /// Generate the Secret with a random password when it does not exist.
    #[serde(default)]
    pub create_secret: bool,

    /// Length of generated passwords. Defaults to 32.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_length: Option<usize>,
}

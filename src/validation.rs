// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reference validation.
//!
//! Several CRD fields come in "exactly one of" groups (`realmRef` /
//! `clusterRealmRef`, `userRef` / `groupRef`, ...). The functions here turn
//! each group into a tagged enum, so later code matches exhaustively instead
//! of probing optional fields. The engine runs them before touching the
//! finalizer or Keycloak; a violation is reported as `InvalidReference`.

use crate::crd::{
    ClientRoleTarget, ClusterRef, InstanceRefs, LocalRef, NamespacedRef, RealmRefs,
};
use crate::errors::{Error, Result};

/// Resolved realm reference of a realm-content resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RealmReference {
    /// `KeycloakRealm` in `namespace`.
    Namespaced { namespace: String, name: String },
    /// `ClusterKeycloakRealm`.
    Cluster { name: String },
}

/// Resolved connection reference of a realm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstanceReference {
    /// `KeycloakInstance` in `namespace`.
    Namespaced { namespace: String, name: String },
    /// `ClusterKeycloakInstance`.
    Cluster { name: String },
}

/// Parent of a protocol mapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapperParent {
    Client(String),
    ClientScope(String),
}

/// Subject of a role mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingSubject {
    User(String),
    Group(String),
}

/// Role granted by a role mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingTarget {
    /// A `KeycloakRole` resource.
    Role(String),
    /// A realm role by name.
    RealmRole(String),
    /// A client role by client resource and role name.
    ClientRole { client: String, role: String },
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidReference(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

/// Pick the single populated alternative of an "exactly one of" group.
fn exactly_one<T>(fields: &str, alternatives: Vec<Option<T>>) -> Result<T> {
    let mut set = alternatives.into_iter().flatten();
    match (set.next(), set.next()) {
        (Some(one), None) => Ok(one),
        (None, _) => Err(Error::InvalidReference(format!(
            "exactly one of {fields} must be set, found none"
        ))),
        (Some(_), Some(_)) => Err(Error::InvalidReference(format!(
            "exactly one of {fields} must be set, found several"
        ))),
    }
}

/// Realm reference of a resource living in `own_namespace`.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] unless exactly one of `realmRef` and
/// `clusterRealmRef` is set with a non-empty name.
pub fn realm_reference(refs: &RealmRefs, own_namespace: &str) -> Result<RealmReference> {
    enum Choice<'a> {
        Namespaced(&'a NamespacedRef),
        Cluster(&'a ClusterRef),
    }

    let choice = exactly_one(
        "realmRef, clusterRealmRef",
        vec![
            refs.realm_ref.as_ref().map(Choice::Namespaced),
            refs.cluster_realm_ref.as_ref().map(Choice::Cluster),
        ],
    )?;

    match choice {
        Choice::Namespaced(r) => Ok(RealmReference::Namespaced {
            namespace: r
                .namespace
                .clone()
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| own_namespace.to_string()),
            name: non_empty("realmRef.name", &r.name)?,
        }),
        Choice::Cluster(r) => Ok(RealmReference::Cluster {
            name: non_empty("clusterRealmRef.name", &r.name)?,
        }),
    }
}

/// Connection reference of a realm. `own_namespace` is `None` for
/// `ClusterKeycloakRealm`, whose `instanceRef` must then name a namespace.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] unless exactly one of `instanceRef` and
/// `clusterInstanceRef` is set and fully qualified.
pub fn instance_reference(
    refs: &InstanceRefs,
    own_namespace: Option<&str>,
) -> Result<InstanceReference> {
    enum Choice<'a> {
        Namespaced(&'a NamespacedRef),
        Cluster(&'a ClusterRef),
    }

    let choice = exactly_one(
        "instanceRef, clusterInstanceRef",
        vec![
            refs.instance_ref.as_ref().map(Choice::Namespaced),
            refs.cluster_instance_ref.as_ref().map(Choice::Cluster),
        ],
    )?;

    match choice {
        Choice::Namespaced(r) => {
            let namespace = r
                .namespace
                .clone()
                .filter(|ns| !ns.is_empty())
                .or_else(|| own_namespace.map(str::to_string))
                .ok_or_else(|| {
                    Error::InvalidReference(
                        "instanceRef.namespace is required on cluster-scoped realms".to_string(),
                    )
                })?;
            Ok(InstanceReference::Namespaced {
                namespace,
                name: non_empty("instanceRef.name", &r.name)?,
            })
        }
        Choice::Cluster(r) => Ok(InstanceReference::Cluster {
            name: non_empty("clusterInstanceRef.name", &r.name)?,
        }),
    }
}

/// Parent of a protocol mapper.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] unless exactly one of `clientRef` and
/// `clientScopeRef` is set.
pub fn mapper_parent(
    client_ref: Option<&LocalRef>,
    client_scope_ref: Option<&LocalRef>,
) -> Result<MapperParent> {
    exactly_one(
        "clientRef, clientScopeRef",
        vec![
            client_ref.map(|r| non_empty("clientRef.name", &r.name).map(MapperParent::Client)),
            client_scope_ref
                .map(|r| non_empty("clientScopeRef.name", &r.name).map(MapperParent::ClientScope)),
        ],
    )?
}

/// Subject of a role mapping.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] unless exactly one of `userRef` and
/// `groupRef` is set.
pub fn mapping_subject(
    user_ref: Option<&LocalRef>,
    group_ref: Option<&LocalRef>,
) -> Result<MappingSubject> {
    exactly_one(
        "userRef, groupRef",
        vec![
            user_ref.map(|r| non_empty("userRef.name", &r.name).map(MappingSubject::User)),
            group_ref.map(|r| non_empty("groupRef.name", &r.name).map(MappingSubject::Group)),
        ],
    )?
}

/// Role granted by a role mapping.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] unless exactly one of `roleRef`,
/// `realmRole` and `clientRole` is set.
pub fn mapping_target(
    role_ref: Option<&LocalRef>,
    realm_role: Option<&str>,
    client_role: Option<&ClientRoleTarget>,
) -> Result<MappingTarget> {
    exactly_one(
        "roleRef, realmRole, clientRole",
        vec![
            role_ref.map(|r| non_empty("roleRef.name", &r.name).map(MappingTarget::Role)),
            realm_role.map(|r| non_empty("realmRole", r).map(MappingTarget::RealmRole)),
            client_role.map(|c| {
                Ok(MappingTarget::ClientRole {
                    client: non_empty("clientRole.clientRef.name", &c.client_ref.name)?,
                    role: non_empty("clientRole.role", &c.role)?,
                })
            }),
        ],
    )?
}

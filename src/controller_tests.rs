// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the watch mappings in `controller.rs`

#[cfg(test)]
mod tests {
    use crate::controller::*;
    use crate::crd::{
        ClusterRef, InstanceRefs, KeycloakClient, KeycloakClientSpec, KeycloakUserCredential,
        KeycloakUserCredentialSpec, LocalRef, NamespacedRef, PasswordSecretRef, RealmRefs,
        SecretKeyRef,
    };
    use crate::reconcilers::test_support::{meta, realm, realm_refs, NS, REALM};

    fn client_in(namespace: &str, refs: RealmRefs) -> KeycloakClient {
        let mut metadata = meta("app", None);
        metadata.namespace = Some(namespace.to_string());
        KeycloakClient {
            metadata,
            spec: KeycloakClientSpec {
                realm: refs,
                definition: None,
                client_secret: Some(SecretKeyRef {
                    name: "app-secret".to_string(),
                    key: None,
                }),
            },
            status: None,
        }
    }

    #[test]
    fn test_realm_ref_defaults_to_own_namespace() {
        let client = client_in("team-a", realm_refs());

        assert!(references_realm(&client, Some("team-a"), REALM));
        assert!(!references_realm(&client, Some(NS), REALM));
        assert!(!references_realm(&client, Some("team-a"), "other"));
        assert!(!references_cluster_realm(&client, REALM));
    }

    #[test]
    fn test_realm_ref_with_explicit_namespace() {
        let refs = RealmRefs {
            realm_ref: Some(NamespacedRef {
                name: REALM.to_string(),
                namespace: Some(NS.to_string()),
            }),
            cluster_realm_ref: None,
        };
        let client = client_in("team-a", refs);

        assert!(references_realm(&client, Some(NS), REALM));
        assert!(!references_realm(&client, Some("team-a"), REALM));
    }

    #[test]
    fn test_cluster_realm_ref() {
        let refs = RealmRefs {
            realm_ref: None,
            cluster_realm_ref: Some(ClusterRef {
                name: "global".to_string(),
            }),
        };
        let client = client_in("team-a", refs);

        assert!(references_cluster_realm(&client, "global"));
        assert!(!references_realm(&client, Some("team-a"), "global"));
    }

    #[test]
    fn test_secret_references_are_namespace_local() {
        let client = client_in(NS, realm_refs());
        assert!(references_secret(&client, Some(NS), "app-secret"));
        assert!(!references_secret(&client, Some("team-a"), "app-secret"));
        assert!(!references_secret(&client, Some(NS), "other"));

        let credential = KeycloakUserCredential {
            metadata: meta("alice-password", None),
            spec: KeycloakUserCredentialSpec {
                realm: realm_refs(),
                user_ref: LocalRef {
                    name: "alice".to_string(),
                },
                secret_ref: PasswordSecretRef {
                    name: "alice-secret".to_string(),
                    key: None,
                },
                ..Default::default()
            },
            status: None,
        };
        assert!(references_secret(&credential, Some(NS), "alice-secret"));
    }

    #[test]
    fn test_realms_never_reference_realms() {
        let realm = realm(true);
        assert!(!references_realm(&realm, Some(NS), REALM));
    }

    #[test]
    fn test_instance_refs() {
        let realm = realm(true);
        let refs = realm.instance_refs();

        assert!(references_instance(refs, Some(NS), Some(NS), "main"));
        assert!(!references_instance(refs, Some(NS), Some("team-a"), "main"));

        let cluster_realm_refs = InstanceRefs {
            instance_ref: Some(NamespacedRef {
                name: "main".to_string(),
                namespace: Some(NS.to_string()),
            }),
            cluster_instance_ref: None,
        };
        assert!(references_instance(&cluster_realm_refs, None, Some(NS), "main"));
        assert!(!references_instance(&cluster_realm_refs, None, None, "main"));
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `resolver.rs`

#[cfg(test)]
mod tests {
    use crate::config::OperatorConfig;
    use crate::context::Context;
    use crate::crd::{
        ClusterKeycloakRealm, ClusterKeycloakRealmSpec, ClusterRef, InstanceRefs, KeycloakGroup,
        KeycloakGroupSpec, KeycloakResourceStatus, NamespacedRef, RealmRefs,
    };
    use crate::errors::Error;
    use crate::keycloak::{ClientKey, Credentials};
    use crate::reconcilers::resolver::{connection_config, resolve_instance, resolve_realm, sibling};
    use crate::reconcilers::test_support::*;
    use crate::store::memory::MemoryStore;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolves_namespaced_chain() {
        let server = keycloak().await;
        let ctx = world(&server, true);

        let resolved = resolve_realm(&ctx, &realm_refs(), NS).await.unwrap();

        assert_eq!(resolved.realm, REALM);
        assert_eq!(resolved.client.config().admin_realm, "master");
        assert!(ctx
            .clients
            .get(&ClientKey::namespaced(NS, INSTANCE))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_realm_in_other_namespace() {
        let server = keycloak().await;
        let ctx = world(&server, true);
        let refs = RealmRefs {
            realm_ref: Some(NamespacedRef {
                name: REALM.to_string(),
                namespace: Some(NS.to_string()),
            }),
            cluster_realm_ref: None,
        };

        // The leaf lives elsewhere; the realm namespace is explicit.
        let resolved = resolve_realm(&ctx, &refs, "team-a").await.unwrap();
        assert_eq!(resolved.realm, REALM);
    }

    #[tokio::test]
    async fn test_instance_not_ready() {
        let server = keycloak().await;
        let ctx = world(&server, true);
        ctx.store.insert(&instance(&server.uri(), false));

        let err = resolve_realm(&ctx, &realm_refs(), NS).await.unwrap_err();

        assert!(matches!(err, Error::InstanceNotReady(msg) if msg.contains("is not ready")));
    }

    #[tokio::test]
    async fn test_cluster_realm_needs_instance_namespace() {
        let server = keycloak().await;
        let ctx = world(&server, true);
        ctx.store.insert(&ClusterKeycloakRealm {
            metadata: ObjectMeta {
                name: Some("global".to_string()),
                ..Default::default()
            },
            spec: ClusterKeycloakRealmSpec {
                instance: InstanceRefs {
                    instance_ref: Some(NamespacedRef {
                        name: INSTANCE.to_string(),
                        namespace: None,
                    }),
                    cluster_instance_ref: None,
                },
                definition: Some(json!({ "realm": "global" })),
            },
            status: Some(KeycloakResourceStatus {
                ready: true,
                ..Default::default()
            }),
        });
        let refs = RealmRefs {
            realm_ref: None,
            cluster_realm_ref: Some(ClusterRef {
                name: "global".to_string(),
            }),
        };

        let err = resolve_realm(&ctx, &refs, NS).await.unwrap_err();
        assert!(matches!(err, Error::InvalidReference(msg) if msg.contains("namespace")));
    }

    #[tokio::test]
    async fn test_missing_cluster_instance() {
        let server = keycloak().await;
        let ctx = world(&server, true);
        let refs = InstanceRefs {
            instance_ref: None,
            cluster_instance_ref: Some(ClusterRef {
                name: "shared".to_string(),
            }),
        };

        let err = resolve_instance(&ctx, &refs, None).await.unwrap_err();
        assert!(matches!(err, Error::InstanceNotReady(msg) if msg.contains("ClusterKeycloakInstance shared")));
    }

    #[tokio::test]
    async fn test_connection_config_prefers_client_credentials() {
        let ctx = Context::new(MemoryStore::new(), OperatorConfig::default());
        ctx.store.insert(&secret(
            ADMIN_SECRET,
            &[
                ("clientId", "operator"),
                ("clientSecret", "s3cr3t"),
                ("username", "admin"),
                ("password", "admin"),
            ],
        ));

        let config = connection_config(&ctx, &connection("https://sso.example.com"), NS)
            .await
            .unwrap();

        assert!(matches!(
            config.credentials,
            Credentials::ClientCredentials { ref client_id, .. } if client_id == "operator"
        ));
    }

    #[tokio::test]
    async fn test_connection_config_bad_url() {
        let ctx = Context::new(MemoryStore::new(), OperatorConfig::default());
        ctx.store.insert(&secret(
            ADMIN_SECRET,
            &[("username", "admin"), ("password", "admin")],
        ));

        let err = connection_config(&ctx, &connection("not a url"), NS)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition(_)));
    }

    #[tokio::test]
    async fn test_sibling_states() {
        let ctx = Context::new(MemoryStore::new(), OperatorConfig::default());
        let mut group = KeycloakGroup {
            metadata: meta("admins", None),
            spec: KeycloakGroupSpec::default(),
            status: None,
        };
        ctx.store.insert(&group);

        let err = sibling::<KeycloakGroup, _>(&ctx, NS, "admins", REALM)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyNotReady(msg) if msg.contains("is not ready")));

        let err = sibling::<KeycloakGroup, _>(&ctx, NS, "missing", REALM)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyNotReady(msg) if msg.contains("not found")));

        group.status = Some(synced(REALM, "demo/groups/g-1", "g-1"));
        ctx.store.insert(&group);
        let (_, id) = sibling::<KeycloakGroup, _>(&ctx, NS, "admins", REALM)
            .await
            .unwrap();
        assert_eq!(id, "g-1");
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for reconciler tests: an in-memory control plane holding a
//! ready connection and realm, and a mock Keycloak that issues tokens.

use crate::config::OperatorConfig;
use crate::context::Context;
use crate::crd::{
    ConnectionSpec, CredentialsSecretRef, InstanceRefs, KeycloakInstance, KeycloakInstanceSpec,
    KeycloakInstanceStatus, KeycloakRealm, KeycloakRealmSpec, KeycloakResourceStatus,
    NamespacedRef, RealmRefs,
};
use crate::labels::{FINALIZER_INSTANCE, FINALIZER_REALM};
use crate::store::memory::MemoryStore;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const NS: &str = "sso";
pub const INSTANCE: &str = "main";
pub const REALM: &str = "demo";
pub const ADMIN_SECRET: &str = "keycloak-admin";
pub const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

pub fn meta(name: &str, finalizer: Option<&str>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(NS.to_string()),
        generation: Some(1),
        finalizers: finalizer.map(|f| vec![f.to_string()]),
        ..Default::default()
    }
}

pub fn realm_refs() -> RealmRefs {
    RealmRefs {
        realm_ref: Some(NamespacedRef {
            name: REALM.to_string(),
            namespace: None,
        }),
        cluster_realm_ref: None,
    }
}

/// Status of a sibling that synced into `realm` with `remote_id`.
pub fn synced(realm: &str, path: &str, remote_id: &str) -> KeycloakResourceStatus {
    KeycloakResourceStatus {
        ready: true,
        resource_path: Some(path.to_string()),
        remote_id: Some(remote_id.to_string()),
        realm: Some(realm.to_string()),
        observed_generation: Some(1),
        ..Default::default()
    }
}

pub fn secret(name: &str, entries: &[(&str, &str)]) -> Secret {
    let data = entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
        .collect::<BTreeMap<_, _>>();
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NS.to_string()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

pub fn connection(base_url: &str) -> ConnectionSpec {
    ConnectionSpec {
        base_url: base_url.to_string(),
        admin_realm: None,
        credentials: CredentialsSecretRef {
            secret_name: ADMIN_SECRET.to_string(),
            namespace: None,
        },
        insecure_skip_verify: false,
    }
}

pub fn instance(base_url: &str, ready: bool) -> KeycloakInstance {
    KeycloakInstance {
        metadata: meta(INSTANCE, Some(FINALIZER_INSTANCE)),
        spec: KeycloakInstanceSpec {
            connection: connection(base_url),
        },
        status: Some(KeycloakInstanceStatus {
            ready,
            version: Some("26.0.5".to_string()),
            ..Default::default()
        }),
    }
}

pub fn realm(ready: bool) -> KeycloakRealm {
    KeycloakRealm {
        metadata: meta(REALM, Some(FINALIZER_REALM)),
        spec: KeycloakRealmSpec {
            instance: InstanceRefs {
                instance_ref: Some(NamespacedRef {
                    name: INSTANCE.to_string(),
                    namespace: None,
                }),
                cluster_instance_ref: None,
            },
            definition: Some(json!({ "realm": REALM, "enabled": true })),
        },
        status: Some(KeycloakResourceStatus {
            ready,
            resource_path: Some(REALM.to_string()),
            remote_id: Some("realm-uuid".to_string()),
            realm: Some(REALM.to_string()),
            ..Default::default()
        }),
    }
}

/// Mock Keycloak answering token requests.
pub async fn keycloak() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 300,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;
    server
}

/// Context over a store holding the admin Secret, a ready instance and a
/// realm with the given readiness.
pub fn world(server: &MockServer, realm_ready: bool) -> Context<MemoryStore> {
    let store = MemoryStore::new();
    store.insert(&secret(
        ADMIN_SECRET,
        &[("username", "admin"), ("password", "admin")],
    ));
    store.insert(&instance(&server.uri(), true));
    store.insert(&realm(realm_ready));
    Context::new(store, OperatorConfig::default())
}

/// Requests other than token requests received so far.
pub async fn admin_requests(server: &MockServer) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() != TOKEN_PATH)
        .collect()
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the admin API client.

#[cfg(test)]
mod tests {
    use crate::keycloak::client::id_from_location;
    use crate::keycloak::{AdminClient, AdminPath, ClientKey, ClientManager, ConnectionConfig, Credentials, Error};
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: &str) -> ConnectionConfig {
        ConnectionConfig::new(
            base,
            "master",
            Credentials::Password {
                username: "admin".into(),
                password: "admin".into(),
            },
            Duration::from_secs(5),
            false,
        )
        .unwrap()
    }

    /// Client with a long-lived token already cached.
    async fn authed_client(base: &str) -> AdminClient {
        let client = AdminClient::new(config(base), None).unwrap();
        client
            .seed_token("test-token", Instant::now() + Duration::from_secs(3600))
            .await;
        client
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let client = AdminClient::new(config("http://localhost:8080/auth/"), None).unwrap();
        let url = client
            .endpoint(&["admin", "realms", "a b/c"], &[("exact", "true")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/auth/admin/realms/a%20b%2Fc?exact=true"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = ConnectionConfig::new(
            "not a url",
            "master",
            Credentials::Password {
                username: "a".into(),
                password: "b".into(),
            },
            Duration::from_secs(1),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::ClientCredentials {
            client_id: "operator".into(),
            client_secret: "hunter2".into(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("operator"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_id_from_location() {
        assert_eq!(
            id_from_location("http://kc/admin/realms/demo/clients/5f1c-22").as_deref(),
            Some("5f1c-22")
        );
        assert_eq!(
            id_from_location("/admin/realms/demo/").as_deref(),
            Some("demo")
        );
        assert_eq!(id_from_location(""), None);
    }

    #[tokio::test]
    async fn test_create_returns_id_from_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/realms/demo/clients"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({"clientId": "app"})))
            .respond_with(ResponseTemplate::new(201).insert_header(
                "Location",
                format!("{}/admin/realms/demo/clients/abc-123", server.uri()).as_str(),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        let id = client
            .create(
                &AdminPath::realm("demo").join(["clients"]),
                &json!({"clientId": "app"}),
            )
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("abc-123"));
    }

    #[tokio::test]
    async fn test_get_json_maps_404_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        assert!(client
            .get_json(&AdminPath::realm("missing"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_json_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/demo/users"))
            .and(query_param("username", "alice"))
            .and(query_param("exact", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": "u1", "username": "alice"}])),
            )
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        let users = client
            .list_json(
                &AdminPath::realm("demo").join(["users"]),
                &[("username", "alice"), ("exact", "true")],
            )
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], "u1");
    }

    #[tokio::test]
    async fn test_non_success_is_structured_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/admin/realms/demo"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        let err = client
            .update(&AdminPath::realm("demo"), &json!({"realm": "demo"}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(409));
        match err {
            Error::Api { body, .. } => assert_eq!(body, "conflict"),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_treats_404_as_done() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/admin/realms/demo/groups/g1"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        client
            .delete(&AdminPath::parse("demo/groups/g1"))
            .await
            .unwrap();
        server.verify().await;
    }

    #[tokio::test]
    async fn test_unauthorized_drops_cached_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/demo"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/realms/master/protocol/openid-connect/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "new", "expires_in": 60})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/demo"))
            .and(header("authorization", "Bearer new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"realm": "demo"})))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        assert_eq!(
            client.get_json(&AdminPath::realm("demo")).await.unwrap_err().status(),
            Some(401)
        );
        let realm = client.get_json(&AdminPath::realm("demo")).await.unwrap();
        assert_eq!(realm.unwrap()["realm"], "demo");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_server_version_reads_system_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/serverinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"systemInfo": {"version": "26.0.5"}})),
            )
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        assert_eq!(client.server_version().await.unwrap(), "26.0.5");
    }

    #[tokio::test]
    async fn test_reset_password_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/admin/realms/demo/users/u1/reset-password"))
            .and(body_json(json!({"type": "password", "value": "pw", "temporary": true})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server.uri()).await;
        client.reset_password("demo", "u1", "pw", true).await.unwrap();
        server.verify().await;
    }

    #[tokio::test]
    async fn test_admission_cap_blocks_until_permit_released() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"realm": "demo"})))
            .mount(&server)
            .await;

        let manager = ClientManager::new(1);
        let client = manager
            .get_or_create(&ClientKey::namespaced("ns", "kc"), config(&server.uri()))
            .await
            .unwrap();
        client
            .seed_token("test-token", Instant::now() + Duration::from_secs(3600))
            .await;

        let held = client.admit().await.unwrap();
        assert_eq!(manager.available_permits(), Some(0));

        let blocked = tokio::time::timeout(
            Duration::from_millis(200),
            client.get_json(&AdminPath::realm("demo")),
        )
        .await;
        assert!(blocked.is_err(), "request must wait for a permit");

        drop(held);
        let realm = client.get_json(&AdminPath::realm("demo")).await.unwrap();
        assert!(realm.is_some());
        assert_eq!(manager.available_permits(), Some(1));
    }

    #[tokio::test]
    async fn test_permit_released_on_error_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/demo"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let manager = ClientManager::new(2);
        let client = manager
            .get_or_create(&ClientKey::cluster("kc"), config(&server.uri()))
            .await
            .unwrap();
        client
            .seed_token("test-token", Instant::now() + Duration::from_secs(3600))
            .await;

        for _ in 0..3 {
            assert!(client.get_json(&AdminPath::realm("demo")).await.is_err());
        }
        assert_eq!(manager.available_permits(), Some(2));
    }
}

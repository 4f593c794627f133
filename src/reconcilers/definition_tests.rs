// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `definition.rs`

#[cfg(test)]
mod tests {
    use crate::errors::Error;
    use crate::reconcilers::definition::*;
    use serde_json::json;

    #[test]
    fn test_natural_key_defaults_to_name() {
        let desired = with_natural_key(None, Some("clientId"), "app").unwrap();
        assert_eq!(desired, json!({ "clientId": "app" }));

        let empty = json!({ "clientId": "", "enabled": true });
        let desired = with_natural_key(Some(&empty), Some("clientId"), "app").unwrap();
        assert_eq!(desired, json!({ "clientId": "app", "enabled": true }));
    }

    #[test]
    fn test_explicit_natural_key_wins() {
        let definition = json!({ "username": "alice", "enabled": true });
        let desired = with_natural_key(Some(&definition), Some("username"), "user-1").unwrap();
        assert_eq!(natural_key(&desired, "username").unwrap(), "alice");
    }

    #[test]
    fn test_definition_must_be_object() {
        let err = with_natural_key(Some(&json!(["x"])), Some("name"), "n").unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition(_)));

        let err = with_natural_key(Some(&json!({ "name": 5 })), Some("name"), "n").unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition(msg) if msg.contains("definition.name")));
    }

    #[test]
    fn test_realm_name_required() {
        assert_eq!(
            realm_name(Some(&json!({ "realm": "demo" }))).unwrap(),
            "demo"
        );
        assert!(matches!(
            realm_name(Some(&json!({ "enabled": true }))),
            Err(Error::InvalidDefinition(_))
        ));
        assert!(realm_name(None).is_err());
        assert!(realm_name(Some(&json!({ "realm": "" }))).is_err());
    }

    #[test]
    fn test_with_id_and_field() {
        let desired = json!({ "clientId": "app" });
        assert_eq!(
            with_id(&desired, "1234"),
            json!({ "clientId": "app", "id": "1234" })
        );
        assert_eq!(
            with_field(&desired, "secret", json!("s3cr3t")),
            json!({ "clientId": "app", "secret": "s3cr3t" })
        );
    }

    #[test]
    fn test_find_by() {
        let items = vec![
            json!({ "id": "1", "name": "web" }),
            json!({ "id": "2", "name": "profile" }),
        ];
        assert_eq!(find_by(&items, "name", "profile").unwrap()["id"], "2");
        assert!(find_by(&items, "name", "email").is_none());
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `secrets.rs`

#[cfg(test)]
mod tests {
    use crate::constants::API_GROUP_VERSION;
    use crate::crd::{KeycloakUserCredential, KeycloakUserCredentialSpec};
    use crate::errors::Error;
    use crate::keycloak::Credentials;
    use crate::labels::{K8S_MANAGED_BY, MANAGED_BY_KEYCLOAK_OPERATOR};
    use crate::reconcilers::secrets::*;
    use crate::reconcilers::test_support::{meta, secret};
    use k8s_openapi::api::core::v1::Secret;
    use std::collections::BTreeMap;

    #[test]
    fn test_secret_value_reads_data_then_string_data() {
        let s = secret("creds", &[("password", "from-data")]);
        assert_eq!(secret_value(&s, "password").as_deref(), Some("from-data"));
        assert_eq!(secret_value(&s, "missing"), None);

        let pending = Secret {
            string_data: Some(BTreeMap::from([(
                "password".to_string(),
                "from-string-data".to_string(),
            )])),
            ..Default::default()
        };
        assert_eq!(
            secret_value(&pending, "password").as_deref(),
            Some("from-string-data")
        );

        let empty = secret("creds", &[("password", "")]);
        assert_eq!(secret_value(&empty, "password"), None);
    }

    #[test]
    fn test_credentials_from_secret() {
        let password = secret("admin", &[("username", "admin"), ("password", "pw")]);
        assert!(matches!(
            credentials_from_secret(&password).unwrap(),
            Credentials::Password { username, .. } if username == "admin"
        ));

        let half = secret("admin", &[("clientId", "operator"), ("username", "admin")]);
        let err = credentials_from_secret(&half).unwrap_err();
        assert!(matches!(err, Error::Secret(msg) if msg.contains("sso/admin")));
    }

    #[test]
    fn test_secret_fingerprint_is_salted() {
        let uid = "6f1c2b8e-0d7a-4c1e-9a53-2b1f4e8d7c10";
        assert_eq!(
            secret_fingerprint(uid, "hunter2"),
            "5d5737618588ad3ec8de42b31ca0d6beaf3e4cfedf020247e54a67ad6e9e747a"
        );
        // Never the plain digest of the password.
        assert_ne!(
            secret_fingerprint("", "hunter2"),
            "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7"
        );
        assert_ne!(
            secret_fingerprint(uid, "hunter2"),
            secret_fingerprint("another-uid", "hunter2")
        );
        assert_eq!(secret_fingerprint(uid, "a").len(), 64);
    }

    #[test]
    fn test_generate_password() {
        let a = generate_password(32);
        let b = generate_password(32);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_secret_is_owned() {
        let mut owner = KeycloakUserCredential {
            metadata: meta("alice-password", None),
            spec: KeycloakUserCredentialSpec::default(),
            status: None,
        };
        owner.metadata.uid = Some("1234".to_string());

        let generated = build_generated_secret(&owner, "alice-secret", "password", "pw");

        assert_eq!(generated.metadata.namespace.as_deref(), Some("sso"));
        assert_eq!(generated.type_.as_deref(), Some("Opaque"));
        assert_eq!(secret_value(&generated, "password").as_deref(), Some("pw"));
        assert_eq!(
            generated.metadata.labels.unwrap()[K8S_MANAGED_BY],
            MANAGED_BY_KEYCLOAK_OPERATOR
        );
        let owner_ref = &generated.metadata.owner_references.unwrap()[0];
        assert_eq!(owner_ref.api_version, API_GROUP_VERSION);
        assert_eq!(owner_ref.kind, "KeycloakUserCredential");
        assert_eq!(owner_ref.uid, "1234");
        assert_eq!(owner_ref.controller, Some(true));
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `finalizers.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{ClusterKeycloakRealm, ClusterKeycloakRealmSpec, KeycloakGroup, KeycloakGroupSpec};
    use crate::errors::Error;
    use crate::reconcilers::finalizers::{
        display_name, ensure_finalizer, has_finalizer, is_deleting, remove_finalizer,
    };
    use crate::store::memory::MemoryStore;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    const TEST_FINALIZER: &str = "keycloak.firestoned.io/test-finalizer";
    const TEST_NAMESPACE: &str = "test-namespace";
    const TEST_NAME: &str = "admins";

    fn group(finalizers: Option<Vec<String>>) -> KeycloakGroup {
        KeycloakGroup {
            metadata: ObjectMeta {
                name: Some(TEST_NAME.to_string()),
                namespace: Some(TEST_NAMESPACE.to_string()),
                finalizers,
                ..Default::default()
            },
            spec: KeycloakGroupSpec::default(),
            status: None,
        }
    }

    #[test]
    fn test_has_finalizer() {
        assert!(!has_finalizer(&group(None), TEST_FINALIZER));
        assert!(has_finalizer(
            &group(Some(vec![TEST_FINALIZER.to_string()])),
            TEST_FINALIZER
        ));
        assert!(!has_finalizer(
            &group(Some(vec!["other".to_string()])),
            TEST_FINALIZER
        ));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&group(None)), "test-namespace/admins");
        let realm = ClusterKeycloakRealm::new("global", ClusterKeycloakRealmSpec::default());
        assert_eq!(display_name(&realm), "global");
        assert!(!is_deleting(&realm));
    }

    #[tokio::test]
    async fn test_ensure_finalizer_adds_once() {
        let store = MemoryStore::new();
        store.insert(&group(None));
        let current: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();

        ensure_finalizer(&store, &current, TEST_FINALIZER)
            .await
            .unwrap();

        let updated: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();
        assert_eq!(updated.metadata.finalizers, Some(vec![TEST_FINALIZER.to_string()]));

        // Already present: no write, so the stale copy does not conflict.
        ensure_finalizer(&store, &updated, TEST_FINALIZER)
            .await
            .unwrap();
        let again: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();
        assert_eq!(again.metadata.finalizers.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_finalizer_keeps_foreign_finalizers() {
        let store = MemoryStore::new();
        store.insert(&group(Some(vec!["other.io/finalizer".to_string()])));
        let current: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();

        ensure_finalizer(&store, &current, TEST_FINALIZER)
            .await
            .unwrap();

        let updated: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();
        assert_eq!(
            updated.metadata.finalizers.unwrap(),
            vec!["other.io/finalizer".to_string(), TEST_FINALIZER.to_string()]
        );
    }

    #[tokio::test]
    async fn test_stale_write_is_a_store_error() {
        let store = MemoryStore::new();
        store.insert(&group(None));
        let stale: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();
        store.bump_generation::<KeycloakGroup>(Some(TEST_NAMESPACE), TEST_NAME);

        let err = ensure_finalizer(&store, &stale, TEST_FINALIZER)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
    }

    #[tokio::test]
    async fn test_remove_finalizer_releases_deleting_object() {
        let store = MemoryStore::new();
        store.insert(&group(Some(vec![TEST_FINALIZER.to_string()])));
        store.delete::<KeycloakGroup>(Some(TEST_NAMESPACE), TEST_NAME);
        let deleting: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();
        assert!(is_deleting(&deleting));

        remove_finalizer(&store, &deleting, TEST_FINALIZER)
            .await
            .unwrap();

        assert!(store
            .fetch::<KeycloakGroup>(Some(TEST_NAMESPACE), TEST_NAME)
            .is_none());
    }

    #[tokio::test]
    async fn test_remove_absent_finalizer_is_noop() {
        let store = MemoryStore::new();
        store.insert(&group(None));
        let current: KeycloakGroup = store.fetch(Some(TEST_NAMESPACE), TEST_NAME).unwrap();
        remove_finalizer(&store, &current, TEST_FINALIZER)
            .await
            .unwrap();
        assert!(store
            .fetch::<KeycloakGroup>(Some(TEST_NAMESPACE), TEST_NAME)
            .is_some());
    }
}

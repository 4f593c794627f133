// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons` module

#[cfg(test)]
mod tests {
    use crate::status_reasons::*;

    const ALL_REASONS: [&str; 18] = [
        REASON_SYNCED,
        REASON_CONNECTED,
        REASON_REALM_NOT_READY,
        REASON_INSTANCE_NOT_READY,
        REASON_DEPENDENCY_NOT_READY,
        REASON_FETCH_FAILED,
        REASON_INVALID_DEFINITION,
        REASON_INVALID_REFERENCE,
        REASON_SECRET_ERROR,
        REASON_VERSION_UNSUPPORTED,
        REASON_REMOTE_API_ERROR,
        REASON_KEYCLOAK_BAD_REQUEST,
        REASON_KEYCLOAK_AUTH_FAILED,
        REASON_KEYCLOAK_NOT_FOUND,
        REASON_KEYCLOAK_CONFLICT,
        REASON_KEYCLOAK_INTERNAL_ERROR,
        REASON_GATEWAY_ERROR,
        REASON_KEYCLOAK_UNREACHABLE,
    ];

    // ============================================================================
    // Test Condition Constants
    // ============================================================================

    #[test]
    fn test_condition_constants() {
        assert_eq!(CONDITION_TYPE_READY, "Ready");
        assert_eq!(CONDITION_STATUS_TRUE, "True");
        assert_eq!(CONDITION_STATUS_FALSE, "False");
    }

    // ============================================================================
    // Test Reason Values
    // ============================================================================

    #[test]
    fn test_success_reasons() {
        assert_eq!(REASON_SYNCED, "Synced");
        assert_eq!(REASON_CONNECTED, "Connected");
    }

    #[test]
    fn test_gating_reasons() {
        assert_eq!(REASON_REALM_NOT_READY, "RealmNotReady");
        assert_eq!(REASON_INSTANCE_NOT_READY, "InstanceNotReady");
        assert_eq!(REASON_DEPENDENCY_NOT_READY, "DependencyNotReady");
    }

    #[test]
    fn test_keycloak_http_reasons() {
        assert_eq!(REASON_KEYCLOAK_BAD_REQUEST, "KeycloakBadRequest");
        assert_eq!(REASON_KEYCLOAK_AUTH_FAILED, "KeycloakAuthFailed");
        assert_eq!(REASON_KEYCLOAK_NOT_FOUND, "KeycloakNotFound");
        assert_eq!(REASON_KEYCLOAK_CONFLICT, "KeycloakConflict");
        assert_eq!(REASON_KEYCLOAK_INTERNAL_ERROR, "KeycloakInternalError");
        assert_eq!(REASON_KEYCLOAK_UNREACHABLE, "KeycloakUnreachable");
        assert_eq!(REASON_REMOTE_API_ERROR, "RemoteAPIError");
    }

    // ============================================================================
    // Test Uniqueness and Naming Conventions
    // ============================================================================

    #[test]
    fn test_all_reasons_are_unique() {
        for (i, reason1) in ALL_REASONS.iter().enumerate() {
            for (j, reason2) in ALL_REASONS.iter().enumerate() {
                if i != j {
                    assert_ne!(
                        reason1, reason2,
                        "Constants at indices {i} and {j} have the same value: {reason1}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_reason_constants_follow_pascal_case() {
        for reason in ALL_REASONS {
            assert!(!reason.contains(' '), "Reason '{reason}' contains spaces");
            assert!(
                !reason.contains('_'),
                "Reason '{reason}' contains underscores"
            );
            assert!(
                reason.chars().next().unwrap().is_uppercase(),
                "Reason '{reason}' doesn't start with uppercase"
            );
        }
    }
}

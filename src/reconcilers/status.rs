// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for Keycloak resources.
//!
//! Every reconciled resource exposes the same contract: `ready`, a short reason
//! code in `status`, a human `message`, `observedGeneration`, kind-specific
//! identifier fields, and a single `Ready` condition carrying the same reason
//! and message.
//!
//! # Condition Format
//!
//! - `type`: always `Ready`
//! - `status`: `True` or `False`
//! - `reason`: a stable CamelCase code from [`crate::status_reasons`]
//! - `message`: a human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp, preserved while `status` is unchanged
//!
//! # Example
//!
//! ```rust,no_run
//! use keycloak_operator::reconcilers::status::create_condition;
//!
//! let condition = create_condition("Ready", "True", "Synced", "Client app is in sync");
//! assert_eq!(condition.status, "True");
//! ```

use crate::crd::{Condition, KeycloakInstanceStatus, KeycloakResourceStatus};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, REASON_CONNECTED,
    REASON_SYNCED,
};
use chrono::Utc;

/// Create a new condition stamped with the current time.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in place (no API call).
///
/// `lastTransitionTime` is kept when the condition status does not change,
/// so repeated identical reconciles produce byte-identical status.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Whether two condition lists carry the same type/status/reason/message,
/// ignoring transition times.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr| {
            curr.status == new_cond.status
                && curr.reason == new_cond.reason
                && curr.message == new_cond.message
        })
    })
}

/// Outcome of a successful sync, as written to status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncedFields {
    pub message: String,
    pub resource_path: String,
    pub remote_id: String,
    pub realm: String,
    pub secret_hash: Option<String>,
    pub observed_generation: Option<i64>,
}

/// Status after a successful sync.
#[must_use]
pub fn ready_status(
    previous: Option<&KeycloakResourceStatus>,
    fields: SyncedFields,
) -> KeycloakResourceStatus {
    let mut status = previous.cloned().unwrap_or_default();
    update_condition_in_memory(
        &mut status.conditions,
        CONDITION_TYPE_READY,
        CONDITION_STATUS_TRUE,
        REASON_SYNCED,
        &fields.message,
    );
    status.ready = true;
    status.status = Some(REASON_SYNCED.to_string());
    status.message = Some(fields.message);
    status.observed_generation = fields.observed_generation;
    status.resource_path = Some(fields.resource_path);
    status.remote_id = Some(fields.remote_id);
    status.realm = Some(fields.realm);
    if fields.secret_hash.is_some() {
        status.secret_hash = fields.secret_hash;
    }
    status
}

/// Status after a failed attempt. Identifier fields from the last success
/// are kept so deletion can still find the remote object.
#[must_use]
pub fn failed_status(
    previous: Option<&KeycloakResourceStatus>,
    reason: &str,
    message: &str,
) -> KeycloakResourceStatus {
    let mut status = previous.cloned().unwrap_or_default();
    update_condition_in_memory(
        &mut status.conditions,
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        reason,
        message,
    );
    status.ready = false;
    status.status = Some(reason.to_string());
    status.message = Some(message.to_string());
    status
}

/// Whether writing `new` would change anything visible.
#[must_use]
pub fn status_unchanged(
    previous: Option<&KeycloakResourceStatus>,
    new: &KeycloakResourceStatus,
) -> bool {
    previous.is_some_and(|prev| {
        prev.ready == new.ready
            && prev.status == new.status
            && prev.message == new.message
            && prev.observed_generation == new.observed_generation
            && prev.resource_path == new.resource_path
            && prev.remote_id == new.remote_id
            && prev.realm == new.realm
            && prev.secret_hash == new.secret_hash
            && conditions_equal(&prev.conditions, &new.conditions)
    })
}

/// Status of a reachable connection descriptor.
#[must_use]
pub fn connected_status(
    previous: Option<&KeycloakInstanceStatus>,
    version: &str,
    observed_generation: Option<i64>,
) -> KeycloakInstanceStatus {
    let message = format!("Connected to Keycloak {version}");
    let mut status = previous.cloned().unwrap_or_default();
    update_condition_in_memory(
        &mut status.conditions,
        CONDITION_TYPE_READY,
        CONDITION_STATUS_TRUE,
        REASON_CONNECTED,
        &message,
    );
    status.ready = true;
    status.status = Some(REASON_CONNECTED.to_string());
    status.message = Some(message);
    status.observed_generation = observed_generation;
    status.version = Some(version.to_string());
    status
}

/// Status of an unreachable or rejected connection descriptor.
#[must_use]
pub fn disconnected_status(
    previous: Option<&KeycloakInstanceStatus>,
    reason: &str,
    message: &str,
    version: Option<&str>,
) -> KeycloakInstanceStatus {
    let mut status = previous.cloned().unwrap_or_default();
    update_condition_in_memory(
        &mut status.conditions,
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        reason,
        message,
    );
    status.ready = false;
    status.status = Some(reason.to_string());
    status.message = Some(message.to_string());
    if let Some(version) = version {
        status.version = Some(version.to_string());
    }
    status
}

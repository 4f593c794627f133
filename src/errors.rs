// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation error taxonomy.
//!
//! Every failure a reconcile can hit is one of these variants. All of them are
//! recovered at the reconcile boundary: the engine writes the variant's
//! [`reason`](Error::reason) and message to the resource status and requeues
//! after the error delay. None of them crash a worker.

use crate::http_errors::{map_connection_error, map_http_error_to_reason};
use crate::keycloak;
use crate::status_reasons::{
    REASON_DEPENDENCY_NOT_READY, REASON_FETCH_FAILED, REASON_INSTANCE_NOT_READY,
    REASON_INVALID_DEFINITION, REASON_INVALID_REFERENCE, REASON_KEYCLOAK_AUTH_FAILED,
    REASON_REALM_NOT_READY, REASON_REMOTE_API_ERROR, REASON_SECRET_ERROR,
    REASON_VERSION_UNSUPPORTED,
};
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A control-plane read failed.
    #[error("failed to read {what}: {source}")]
    Fetch {
        what: String,
        #[source]
        source: StoreError,
    },

    /// A control-plane write (finalizer, status, generated Secret) failed.
    #[error("failed to write {what}: {source}")]
    Store {
        what: String,
        #[source]
        source: StoreError,
    },

    /// The referenced realm is missing or not ready.
    #[error("{0}")]
    RealmNotReady(String),

    /// The referenced connection descriptor is missing or not ready.
    #[error("{0}")]
    InstanceNotReady(String),

    /// A secondary reference (client, user, group, role, client scope) is missing or not ready.
    #[error("{0}")]
    DependencyNotReady(String),

    /// The definition is unparsable or misses a required field.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A mutually exclusive reference pair has none or several members set.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Keycloak rejected a call or could not be reached.
    #[error(transparent)]
    Remote(#[from] keycloak::Error),

    /// A referenced Secret is missing or misses a key.
    #[error("{0}")]
    Secret(String),

    /// The server is older than the supported minimum.
    #[error("Keycloak version {found} is below the supported minimum {minimum}")]
    VersionUnsupported { found: String, minimum: String },
}

impl Error {
    /// Stable status reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Fetch { .. } | Self::Store { .. } => REASON_FETCH_FAILED,
            Self::RealmNotReady(_) => REASON_REALM_NOT_READY,
            Self::InstanceNotReady(_) => REASON_INSTANCE_NOT_READY,
            Self::DependencyNotReady(_) => REASON_DEPENDENCY_NOT_READY,
            Self::InvalidDefinition(_) => REASON_INVALID_DEFINITION,
            Self::InvalidReference(_) => REASON_INVALID_REFERENCE,
            Self::Secret(_) => REASON_SECRET_ERROR,
            Self::VersionUnsupported { .. } => REASON_VERSION_UNSUPPORTED,
            Self::Remote(err) => match err {
                keycloak::Error::Api { status, .. } => map_http_error_to_reason(*status).0,
                keycloak::Error::Token { .. } => REASON_KEYCLOAK_AUTH_FAILED,
                keycloak::Error::Transport { .. } => map_connection_error().0,
                keycloak::Error::InvalidUrl(_)
                | keycloak::Error::Decode { .. }
                | keycloak::Error::Client(_)
                | keycloak::Error::AdmissionClosed => REASON_REMOTE_API_ERROR,
            },
        }
    }

    /// Message written to status: the error, led by an operator-facing hint
    /// when Keycloak answered with an HTTP error or could not be reached.
    #[must_use]
    pub fn status_message(&self) -> String {
        let hint = match self {
            Self::Remote(keycloak::Error::Api { status, .. }) => {
                Some(map_http_error_to_reason(*status).1)
            }
            Self::Remote(keycloak::Error::Transport { .. }) => Some(map_connection_error().1),
            _ => None,
        };
        match hint {
            Some(hint) => format!("{hint}: {self}"),
            None => self.to_string(),
        }
    }

    /// Whether the error means an ancestor or sibling is not ready yet.
    #[must_use]
    pub fn is_dependency_wait(&self) -> bool {
        matches!(
            self,
            Self::RealmNotReady(_) | Self::InstanceNotReady(_) | Self::DependencyNotReady(_)
        )
    }

    pub(crate) fn fetch(what: impl Into<String>, source: StoreError) -> Self {
        Self::Fetch {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn store(what: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            what: what.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

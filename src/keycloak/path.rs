// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Paths below `/admin/realms`.

use std::fmt;

/// A path below `/admin/realms`, kept as raw segments.
///
/// Segments are percent-encoded only when the URL is built, so a realm or
/// alias containing reserved characters survives the round trip. The
/// `Display` form (`demo/clients/1234`) is what status `resourcePath` stores.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AdminPath(Vec<String>);

impl AdminPath {
    /// `/admin/realms` itself.
    #[must_use]
    pub fn realms() -> Self {
        Self(Vec::new())
    }

    /// `/admin/realms/{realm}`.
    #[must_use]
    pub fn realm(realm: &str) -> Self {
        Self(vec![realm.to_string()])
    }

    /// Append one or more segments.
    #[must_use]
    pub fn join<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = self.0.clone();
        out.extend(segments.into_iter().map(|s| s.as_ref().to_string()));
        Self(out)
    }

    /// Parse a stored `resourcePath`. Empty segments are dropped.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, usually the remote identifier.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AdminPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Keycloak server version comparison.
//!
//! Keycloak reports versions such as `26.0.5`, `24.0.0.Final` or
//! `999.0.0-SNAPSHOT`. Only the leading numeric part of each dotted component
//! is compared; missing components count as zero.

use std::cmp::Ordering;

/// Numeric components of a version string.
#[must_use]
pub fn parse(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .map_while(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}

/// Compare two version strings component by component.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            a.get(i)
                .copied()
                .unwrap_or(0)
                .cmp(&b.get(i).copied().unwrap_or(0))
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Whether `found` is at least `minimum`. An unparsable `found` never qualifies.
#[must_use]
pub fn meets_minimum(found: &str, minimum: &str) -> bool {
    !parse(found).is_empty() && compare(found, minimum) != Ordering::Less
}

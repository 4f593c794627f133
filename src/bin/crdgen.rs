// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates Kubernetes CRD YAML files from Rust types defined in src/crd.rs.
//! This ensures the YAML files in deploy/crds/ are always in sync with the Rust code.
//!
//! Usage:
//!   cargo run --bin crdgen
//!
//! Generated files will be written to deploy/crds/ with proper headers.

use keycloak_operator::crd::{
    ClusterKeycloakInstance, ClusterKeycloakRealm, KeycloakClient, KeycloakClientScope,
    KeycloakComponent, KeycloakGroup, KeycloakIdentityProvider, KeycloakInstance,
    KeycloakOrganization, KeycloakProtocolMapper, KeycloakRealm, KeycloakRole,
    KeycloakRoleMapping, KeycloakUser, KeycloakUserCredential,
};
use kube::{CustomResourceExt, Resource};
use std::fs;
use std::path::Path;

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("deploy/crds");

    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML files from src/crd.rs...");

    generate_crd::<KeycloakInstance>(output_dir)?;
    generate_crd::<ClusterKeycloakInstance>(output_dir)?;
    generate_crd::<KeycloakRealm>(output_dir)?;
    generate_crd::<ClusterKeycloakRealm>(output_dir)?;
    generate_crd::<KeycloakClient>(output_dir)?;
    generate_crd::<KeycloakUser>(output_dir)?;
    generate_crd::<KeycloakGroup>(output_dir)?;
    generate_crd::<KeycloakRole>(output_dir)?;
    generate_crd::<KeycloakClientScope>(output_dir)?;
    generate_crd::<KeycloakIdentityProvider>(output_dir)?;
    generate_crd::<KeycloakOrganization>(output_dir)?;
    generate_crd::<KeycloakComponent>(output_dir)?;
    generate_crd::<KeycloakProtocolMapper>(output_dir)?;
    generate_crd::<KeycloakRoleMapping>(output_dir)?;
    generate_crd::<KeycloakUserCredential>(output_dir)?;

    println!("✓ Successfully generated CRD YAML files in deploy/crds/");
    println!("\nNext steps:");
    println!("  1. Review the generated files");
    println!("  2. Deploy with: kubectl apply -f deploy/crds/");

    Ok(())
}

/// Write `<plural>.crd.yaml`, e.g. `keycloakrealms.crd.yaml`.
fn generate_crd<T>(output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: CustomResourceExt + Resource<DynamicType = ()>,
{
    let filename = format!("{}.crd.yaml", T::plural(&()));
    let yaml = serde_yaml::to_string(&T::crd())?;
    let content = format!("{COPYRIGHT_HEADER}{yaml}");

    fs::write(output_dir.join(&filename), content)?;

    println!("  ✓ Generated {filename}");

    Ok(())
}

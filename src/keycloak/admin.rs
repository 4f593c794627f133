// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed convenience operations on top of the generic CRUD calls.

use super::{AdminClient, AdminPath, Error};
use serde_json::{json, Value};

impl AdminClient {
    /// Server version from `/admin/serverinfo` (`systemInfo.version`).
    ///
    /// # Errors
    ///
    /// Returns a transport or API failure, or [`Error::Decode`] when the field is missing.
    pub async fn server_version(&self) -> Result<String, Error> {
        let info = self.get_raw(&["admin", "serverinfo"]).await?;
        info.pointer("/systemInfo/version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Decode {
                url: "/admin/serverinfo".to_string(),
                message: "systemInfo.version missing".to_string(),
            })
    }

    /// `RealmRepresentation` of `realm`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decode failure other than 404.
    pub async fn get_realm(&self, realm: &str) -> Result<Option<Value>, Error> {
        self.get_json(&AdminPath::realm(realm)).await
    }

    /// Create a realm from its representation.
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure.
    pub async fn create_realm(&self, representation: &Value) -> Result<Option<String>, Error> {
        self.create(&AdminPath::realms(), representation).await
    }

    /// Replace a realm's representation.
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure.
    pub async fn update_realm(&self, realm: &str, representation: &Value) -> Result<(), Error> {
        self.update(&AdminPath::realm(realm), representation).await
    }

    /// Delete a realm and everything in it.
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure other than 404.
    pub async fn delete_realm(&self, realm: &str) -> Result<(), Error> {
        self.delete(&AdminPath::realm(realm)).await
    }

    /// Internal id of a realm, if the realm exists.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decode failure other than 404.
    pub async fn realm_id(&self, realm: &str) -> Result<Option<String>, Error> {
        Ok(self
            .get_realm(realm)
            .await?
            .and_then(|r| r.get("id").and_then(Value::as_str).map(str::to_string)))
    }

    /// Role representation by name; a client role when `client_uuid` is given.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decode failure other than 404.
    pub async fn role_by_name(
        &self,
        realm: &str,
        client_uuid: Option<&str>,
        name: &str,
    ) -> Result<Option<Value>, Error> {
        let path = match client_uuid {
            Some(client) => AdminPath::realm(realm).join(["clients", client, "roles", name]),
            None => AdminPath::realm(realm).join(["roles", name]),
        };
        self.get_json(&path).await
    }

    /// Service-account user of a confidential client.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decode failure. A client without service
    /// accounts enabled yields a 400 or 404 API error.
    pub async fn service_account_user(&self, realm: &str, client_uuid: &str) -> Result<Value, Error> {
        let path =
            AdminPath::realm(realm).join(["clients", client_uuid, "service-account-user"]);
        let url = path.to_string();
        self.get_json(&path).await?.ok_or(Error::Api {
            method: reqwest::Method::GET,
            url,
            status: 404,
            body: String::new(),
        })
    }

    /// Set a user's password.
    ///
    /// # Errors
    ///
    /// Returns any transport or API failure.
    pub async fn reset_password(
        &self,
        realm: &str,
        user_id: &str,
        value: &str,
        temporary: bool,
    ) -> Result<(), Error> {
        let path = AdminPath::realm(realm).join(["users", user_id, "reset-password"]);
        let credential = json!({
            "type": "password",
            "value": value,
            "temporary": temporary,
        });
        self.update(&path, &credential).await
    }
}

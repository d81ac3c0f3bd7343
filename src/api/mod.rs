//! Remote users resource: wire types and the HTTP client.
//!
//! The API is a plain CRUD collection at `<base>/users`. Only `name` and
//! `email` are ever written; `company` is display-only.
//!
pub mod client;

use serde::{Deserialize, Serialize};

pub use client::{DEFAULT_API_BASE, UserClient};

/// A user record as returned by the server. Identity is `id`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
}

impl User {
    /// Company name, or the fallback label shown in the table.
    pub fn company_label(&self) -> &str {
        match &self.company {
            Some(c) if !c.name.trim().is_empty() => &c.name,
            _ => "No Company",
        }
    }

    /// Upper-cased first letter of the name, used as a row avatar.
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

/// Unsaved working copy of the editable fields. Serialised as the request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub name: String,
    pub email: String,
}

impl Draft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }

    pub fn from_user(user: &User) -> Self {
        Self { name: user.name.clone(), email: user.email.clone() }
    }

    pub fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::Email => &mut self.email,
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
    }
}

/// Text fields of a [`Draft`], in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Email,
}

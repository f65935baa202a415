//! Data models for Jarurat Care.

use serde::Deserialize;

/// A patient shown in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    /// Unique within the in-memory list.
    pub id: u64,
    /// The patient's display name.
    pub name: String,
    /// `None` when an entered age could not be read as a number.
    pub age: Option<u32>,
    /// Phone number or similar, unvalidated.
    pub contact: String,
    pub email: String,
    pub address: String,
    /// Empty when the source had no company.
    pub company: String,
}

/// A record entered locally, waiting for the directory to assign an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: Option<u32>,
    pub contact: String,
    pub email: String,
    pub address: String,
}

impl NewPatient {
    pub fn with_id(self, id: u64) -> PatientRecord {
        PatientRecord {
            id,
            name: self.name,
            age: self.age,
            contact: self.contact,
            email: self.email,
            address: self.address,
            company: String::new(),
        }
    }
}

/// A user object as returned by the remote collection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: ApiAddress,
    #[serde(default)]
    pub company: Option<ApiCompany>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAddress {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCompany {
    #[serde(default)]
    pub name: Option<String>,
}

/// Deterministic age for a fetched record: `20 + (id * 7) mod 50`.
pub fn derived_age(id: u64) -> u32 {
    // (id * 7) mod 50 == ((id mod 50) * 7) mod 50, without overflow.
    20 + ((id % 50) * 7 % 50) as u32
}

impl From<ApiUser> for PatientRecord {
    fn from(user: ApiUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            age: Some(derived_age(user.id)),
            contact: user.phone,
            email: user.email,
            address: format!("{}, {}", user.address.street, user.address.city),
            company: user
                .company
                .and_then(|company| company.name)
                .unwrap_or_default(),
        }
    }
}

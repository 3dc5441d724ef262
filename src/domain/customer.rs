use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor_framework::{malformed, Record};
use crate::error::StoreError;
use crate::query::{Document, Filter};

/// A registered customer, normalized from whichever shape it was stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub code: String,
    pub personal: PersonalData,
    #[serde(default)]
    pub address: Address,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub registered_at: Option<DateTime<Utc>>,
    /// Deprecated alternate key carried by older records. Never written back.
    #[serde(skip)]
    pub legacy_identifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalData {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub city: String,
    pub country: String,
}

/// Payload for registering a new customer.
#[derive(Debug, Clone)]
pub struct CustomerCreate {
    pub code: String,
    pub personal: PersonalData,
    pub address: Address,
}

impl Customer {
    pub fn register(params: CustomerCreate, at: DateTime<Utc>) -> Self {
        Self {
            code: params.code,
            personal: params.personal,
            address: params.address,
            registered_at: Some(at),
            legacy_identifier: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.personal.name, self.personal.surname).trim().to_string()
    }

    /// Every code orders may reference this customer by.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases = vec![self.code.clone()];
        if let Some(identifier) = &self.legacy_identifier {
            if identifier != &self.code {
                aliases.push(identifier.clone());
            }
        }
        aliases
    }

    /// Matches a customer by its code or by the deprecated `identifier` field.
    pub fn lookup_filter(code: &str) -> Filter {
        Filter::Or(vec![Filter::eq("code", code), Filter::eq("identifier", code)])
    }

    /// Case-insensitive exact match on the first name, nested or flat.
    pub fn name_filter(name: &str) -> Filter {
        Filter::Or(vec![
            Filter::eq_ignore_case("personal.name", name),
            Filter::eq_ignore_case("name", name),
        ])
    }
}

/// Every shape a customer document has been stored in. Fields are optional so
/// that flat records, nested records and half-migrated mixtures all decode.
#[derive(Debug, Deserialize)]
struct StoredCustomer {
    code: Option<String>,
    identifier: Option<String>,
    personal: Option<PersonalData>,
    name: Option<String>,
    surname: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    #[serde(default)]
    address: Address,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    registered_at: Option<DateTime<Utc>>,
}

impl StoredCustomer {
    fn normalize(self) -> Result<Customer, StoreError> {
        let code = self
            .code
            .clone()
            .or_else(|| self.identifier.clone())
            .ok_or_else(|| malformed::<Customer>("customer has neither code nor identifier"))?;
        let personal = self.personal.unwrap_or_else(|| PersonalData {
            name: self.name.unwrap_or_default(),
            surname: self.surname.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
        });
        Ok(Customer {
            code,
            personal,
            address: self.address,
            registered_at: self.registered_at,
            legacy_identifier: self.identifier,
        })
    }
}

impl Record for Customer {
    const COLLECTION: &'static str = "customers";
    const KEY: &'static str = "code";

    fn key(&self) -> &str {
        &self.code
    }

    fn from_document(doc: Document) -> Result<Self, StoreError> {
        serde_json::from_value::<StoredCustomer>(serde_json::Value::Object(doc))
            .map_err(|e| malformed::<Customer>(e.to_string()))?
            .normalize()
    }
}

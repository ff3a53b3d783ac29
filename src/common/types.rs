use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical contact attributes that arbitrary source columns are mapped
/// onto. Declaration order is significant: it is the order mapping
/// suggestions try fields in, and the order fields serialize in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Email,
    FirstName,
    LastName,
    CompanyName,
    JobTitle,
    Phone,
    LinkedinUrl,
    Industry,
    Location,
    CompanySize,
}

impl ContactField {
    pub const ALL: [ContactField; 10] = [
        ContactField::Email,
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::CompanyName,
        ContactField::JobTitle,
        ContactField::Phone,
        ContactField::LinkedinUrl,
        ContactField::Industry,
        ContactField::Location,
        ContactField::CompanySize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::FirstName => "first_name",
            ContactField::LastName => "last_name",
            ContactField::CompanyName => "company_name",
            ContactField::JobTitle => "job_title",
            ContactField::Phone => "phone",
            ContactField::LinkedinUrl => "linkedin_url",
            ContactField::Industry => "industry",
            ContactField::Location => "location",
            ContactField::CompanySize => "company_size",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial assignment of canonical fields to source column names. At most
/// one source column per field; inserting again for the same field replaces
/// the previous column. Produced as a suggestion by schema inference and
/// accepted verbatim when supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<ContactField, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ContactField, source_column: impl Into<String>) {
        self.entries.insert(field, source_column.into());
    }

    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.entries.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> {
        self.entries.iter().map(|(f, c)| (*f, c.as_str()))
    }
}

/// One source row projected onto the canonical schema. Holds only the
/// fields the mapping produced; a field absent from the source row stays
/// absent here rather than defaulting to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedContact {
    fields: BTreeMap<ContactField, String>,
}

impl NormalizedContact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// The presence gates in enrichment treat an empty string the same as
    /// a missing field.
    pub fn get_non_empty(&self, field: ContactField) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn has(&self, field: ContactField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

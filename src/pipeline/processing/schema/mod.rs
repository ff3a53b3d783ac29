use crate::common::types::{ContactField, FieldMapping};
use crate::common::validate::{is_valid_email, is_valid_url};
use crate::pipeline::processing::parser::ParsedTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Substring patterns recognized per canonical field, tried in field
/// declaration order. Within one header the first matching field wins;
/// across headers a later header overwrites an earlier one for the same
/// field. These lists mirror the column names seen in customer uploads.
const FIELD_PATTERNS: &[(ContactField, &[&str])] = &[
    (
        ContactField::Email,
        &["email", "e-mail", "email_address", "mail", "email address"],
    ),
    (
        ContactField::FirstName,
        &["first_name", "firstname", "first name", "fname", "given_name"],
    ),
    (
        ContactField::LastName,
        &["last_name", "lastname", "last name", "lname", "surname", "family_name"],
    ),
    (
        ContactField::CompanyName,
        &["company", "company_name", "organization", "org", "business", "company name"],
    ),
    (
        ContactField::JobTitle,
        &["title", "job_title", "position", "role", "job title", "job_position"],
    ),
    (
        ContactField::Phone,
        &["phone", "telephone", "mobile", "cell", "phone_number", "tel"],
    ),
    (
        ContactField::LinkedinUrl,
        &["linkedin", "linkedin_url", "linkedin profile", "linkedin_profile"],
    ),
    (
        ContactField::Industry,
        &["industry", "sector", "business_type"],
    ),
    (
        ContactField::Location,
        &["location", "address", "city", "country", "region"],
    ),
    (
        ContactField::CompanySize,
        &["company_size", "employees", "employee_count", "size"],
    ),
];

/// Value classification for a column, from its sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Email,
    Url,
    Number,
    Date,
    Text,
    Unknown,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Email => "email",
            ColumnType::Url => "url",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Text => "text",
            ColumnType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ColumnTypeMap = BTreeMap<String, ColumnType>;

/// Propose a column-to-field mapping from header names alone. Pure
/// heuristic; the result is a suggestion for the user to confirm or edit,
/// never a guarantee.
pub fn suggest_mapping(headers: &[String]) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    for header in headers {
        let normalized = normalize_column_name(header);
        for (field, patterns) in FIELD_PATTERNS {
            if patterns.iter().any(|p| normalized.contains(p)) {
                mapping.insert(*field, header.clone());
                break;
            }
        }
    }
    mapping
}

/// Classify each column from its non-empty sample values, in fixed
/// priority order: email if any value matches, then url if any parses,
/// then number if all parse, then date if any parses, else text. A column
/// with no non-empty samples is `unknown`.
pub fn infer_types(table: &ParsedTable) -> ColumnTypeMap {
    let mut types = ColumnTypeMap::new();
    for header in &table.headers {
        let samples: Vec<&str> = table
            .sample_rows
            .iter()
            .filter_map(|row| row.get(header))
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
            .collect();

        let column_type = if samples.is_empty() {
            ColumnType::Unknown
        } else if samples.iter().any(|v| is_valid_email(v)) {
            ColumnType::Email
        } else if samples.iter().any(|v| is_valid_url(v)) {
            ColumnType::Url
        } else if samples.iter().all(|v| is_numeric(v)) {
            ColumnType::Number
        } else if samples.iter().any(|v| is_date_like(v)) {
            ColumnType::Date
        } else {
            ColumnType::Text
        };
        types.insert(header.clone(), column_type);
    }
    types
}

/// Lowercase, strip everything outside `[a-z0-9_ ]`, trim. "E-Mail
/// Address" and "email address" normalize to the same thing.
fn normalize_column_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

fn is_date_like(value: &str) -> bool {
    if chrono::DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

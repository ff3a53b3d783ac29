use crate::common::error::NormalizationError;
use crate::common::types::{FieldMapping, NormalizedContact};
use crate::pipeline::processing::parser::SourceRow;
use tracing::debug;

/// Project source rows onto the canonical contact schema through a
/// confirmed (or suggested) mapping.
///
/// A canonical field is written only when its source column key is present
/// in the row; present-but-empty copies the empty string, absent is
/// skipped entirely, so partial rows stay partial. Operates over the full
/// dataset, not the parse preview.
pub fn normalize(
    rows: &[SourceRow],
    mapping: &FieldMapping,
) -> Result<Vec<NormalizedContact>, NormalizationError> {
    if mapping.is_empty() {
        return Err(NormalizationError::EmptyMapping);
    }

    let contacts = rows
        .iter()
        .map(|row| {
            let mut contact = NormalizedContact::new();
            for (field, source_column) in mapping.iter() {
                if source_column.is_empty() {
                    continue;
                }
                if let Some(value) = row.get(source_column) {
                    contact.set(field, value.clone());
                }
            }
            contact
        })
        .collect::<Vec<_>>();

    debug!(
        rows = rows.len(),
        mapped_fields = mapping.len(),
        "normalized rows onto canonical schema"
    );
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ContactField;
    use crate::pipeline::processing::parser::{data_rows, parse};

    fn mapping(pairs: &[(ContactField, &str)]) -> FieldMapping {
        let mut m = FieldMapping::new();
        for (field, column) in pairs {
            m.insert(*field, *column);
        }
        m
    }

    #[test]
    fn projects_mapped_columns_only() {
        let raw = "Email Address,Company,Notes\nanna@x.com,Acme,ignored\n";
        let table = parse(raw).unwrap();
        let rows = data_rows(raw, &table);
        let m = mapping(&[
            (ContactField::Email, "Email Address"),
            (ContactField::CompanyName, "Company"),
        ]);
        let contacts = normalize(&rows, &m).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].get(ContactField::Email), Some("anna@x.com"));
        assert_eq!(contacts[0].get(ContactField::CompanyName), Some("Acme"));
        assert_eq!(contacts[0].len(), 2);
    }

    #[test]
    fn empty_mapping_is_a_precondition_failure() {
        let err = normalize(&[], &FieldMapping::new()).unwrap_err();
        assert_eq!(err, NormalizationError::EmptyMapping);
    }

    #[test]
    fn absent_source_column_leaves_the_field_out() {
        let mut row = SourceRow::new();
        row.insert("email".to_string(), "anna@x.com".to_string());
        let m = mapping(&[
            (ContactField::Email, "email"),
            (ContactField::Phone, "phone"),
        ]);
        let contacts = normalize(&[row], &m).unwrap();
        assert!(contacts[0].has(ContactField::Email));
        assert!(!contacts[0].has(ContactField::Phone));
    }

    #[test]
    fn present_but_empty_value_is_copied() {
        let raw = "email,company\nannasmith@x.com,Acme\n,Beta\n";
        let table = parse(raw).unwrap();
        let rows = data_rows(raw, &table);
        let m = mapping(&[
            (ContactField::Email, "email"),
            (ContactField::CompanyName, "company"),
        ]);
        let contacts = normalize(&rows, &m).unwrap();
        assert_eq!(contacts.len(), 2);
        // The zipped row carries an explicit empty email for row two; it is
        // copied as empty rather than dropped, and gates on non-emptiness
        // reject it later.
        assert_eq!(contacts[1].get(ContactField::Email), Some(""));
        assert_eq!(contacts[1].get_non_empty(ContactField::Email), None);
        assert_eq!(contacts[1].get(ContactField::CompanyName), Some("Beta"));
    }

    #[test]
    fn normalizes_the_full_dataset_not_just_the_preview() {
        let mut raw = String::from("email\n");
        for i in 0..8 {
            raw.push_str(&format!("user{i}@x.com\n"));
        }
        let table = parse(&raw).unwrap();
        assert_eq!(table.sample_rows.len(), 5);
        let rows = data_rows(&raw, &table);
        let m = mapping(&[(ContactField::Email, "email")]);
        let contacts = normalize(&rows, &m).unwrap();
        assert_eq!(contacts.len(), 8);
    }
}

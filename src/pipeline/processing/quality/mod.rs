use crate::common::validate::is_valid_email;
use crate::pipeline::processing::parser::ParsedTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of scanning a parsed table's preview for obvious data problems.
/// Recomputed fresh from a `ParsedTable` each time; issues and
/// recommendations stay index-aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub overall_score: u8,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Threshold below which a likely-email column is flagged.
const EMAIL_VALIDITY_FLOOR: f64 = 0.8;

/// Run every check over the sample rows and score the result. Checks are
/// independent; all of them run and each appends at most its own issues.
/// The score is a coarse additive penalty, ten points per issue.
pub fn assess(table: &ParsedTable) -> DataQualityReport {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    // A column is empty when every sample row has nothing for it. With no
    // sample rows at all, every column counts as empty.
    let empty_columns: Vec<&str> = table
        .headers
        .iter()
        .filter(|header| {
            table
                .sample_rows
                .iter()
                .all(|row| row.get(*header).map_or(true, |v| v.trim().is_empty()))
        })
        .map(String::as_str)
        .collect();
    if !empty_columns.is_empty() {
        issues.push(format!("Empty columns detected: {}", empty_columns.join(", ")));
        recommendations.push("Remove empty columns before import".to_string());
    }

    // Every occurrence after a header's first counts once.
    let duplicate_headers: Vec<&str> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, header)| table.headers[..*i].contains(header))
        .map(|(_, header)| header.as_str())
        .collect();
    if !duplicate_headers.is_empty() {
        issues.push(format!(
            "Duplicate column names: {}",
            duplicate_headers.join(", ")
        ));
        recommendations.push("Rename duplicate columns to unique names".to_string());
    }

    // Any header that sounds like an email column gets its values checked,
    // once per occurrence.
    for header in &table.headers {
        let lower = header.to_lowercase();
        if !(lower.contains("email") || lower.contains("mail")) {
            continue;
        }
        let samples: Vec<&str> = table
            .sample_rows
            .iter()
            .filter_map(|row| row.get(header))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        if samples.is_empty() {
            continue;
        }
        let valid = samples.iter().filter(|v| is_valid_email(v)).count();
        let fraction = valid as f64 / samples.len() as f64;
        if fraction < EMAIL_VALIDITY_FLOOR {
            issues.push(format!("Poor email format quality in column: {header}"));
            recommendations.push(format!("Validate email addresses in {header} column"));
        }
    }

    let overall_score = (100 - 10 * issues.len() as i64).max(0) as u8;
    debug!(score = overall_score, issues = issues.len(), "assessed data quality");
    DataQualityReport {
        overall_score,
        issues,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::parser::parse;

    #[test]
    fn clean_table_scores_full_marks() {
        let table = parse("email,name\nanna@x.com,Anna\nben@y.com,Ben\n").unwrap();
        let report = assess(&table);
        assert_eq!(report.overall_score, 100);
        assert!(report.is_clean());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn empty_column_plus_duplicate_pair_scores_eighty() {
        let table = parse("name,name,notes\nAnna,Ben,\nCara,Dan,\n").unwrap();
        let report = assess(&table);
        assert_eq!(report.overall_score, 80);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[0].contains("notes"));
        assert!(report.issues[1].contains("name"));
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn duplicate_issue_names_the_repeated_header() {
        let table = parse("email,email\na@x.com,b@y.com\n").unwrap();
        let report = assess(&table);
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("Duplicate column names") && i.contains("email")));
    }

    #[test]
    fn mostly_invalid_email_column_is_flagged() {
        let table = parse("email\nnot-one\nalso-not\nnope\nbad\ngood@x.com\n").unwrap();
        let report = assess(&table);
        assert_eq!(report.overall_score, 90);
        assert!(report.issues[0].contains("Poor email format quality"));
    }

    #[test]
    fn eighty_percent_valid_is_accepted() {
        let table =
            parse("email\na@x.com\nb@x.com\nc@x.com\nd@x.com\nnope\n").unwrap();
        let report = assess(&table);
        assert_eq!(report.overall_score, 100);
    }

    #[test]
    fn mail_in_the_header_name_triggers_the_check() {
        let table = parse("work_mail\nbad\nworse\n").unwrap();
        let report = assess(&table);
        assert!(report.issues[0].contains("work_mail"));
    }

    #[test]
    fn header_only_file_reports_all_columns_empty() {
        let table = parse("a,b\n").unwrap();
        let report = assess(&table);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].contains("a, b"));
        assert_eq!(report.overall_score, 90);
    }

    #[test]
    fn duplicated_bad_email_column_is_penalized_per_occurrence() {
        let table = parse("email,email\nbad,bad\nworse,worse\n").unwrap();
        let report = assess(&table);
        // One duplicate-header issue plus one email issue per occurrence.
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.overall_score, 70);
    }

    #[test]
    fn score_never_goes_below_zero() {
        // Eleven empty columns is still one aggregate issue; force more by
        // combining many duplicated bad email columns instead.
        let raw = "email,email,email,email,email,email,email,email,email,email,email,email\n\
                   bad,bad,bad,bad,bad,bad,bad,bad,bad,bad,bad,bad\n";
        let report = assess(&parse(raw).unwrap());
        assert_eq!(report.overall_score, 0);
    }
}

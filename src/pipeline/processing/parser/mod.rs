use crate::common::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One data row keyed by header name. Duplicate headers collapse to a
/// single key within a row; the last occurrence wins.
pub type SourceRow = BTreeMap<String, String>;

/// Preview of an uploaded delimited-text file: the header row, up to five
/// sample data rows, and the delimiter the sniffer settled on. Immutable
/// once built; downstream stages derive from it, never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Column names in file order. Not deduplicated; duplicates are
    /// surfaced later by quality assessment.
    pub headers: Vec<String>,
    pub sample_rows: Vec<SourceRow>,
    pub total_row_count: u64,
    pub delimiter: char,
}

impl ParsedTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

const DELIMITER_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];
const SAMPLE_ROW_LIMIT: usize = 5;

/// Parse raw delimited text into a `ParsedTable`.
///
/// Lines are split on newline and blank lines are discarded, so embedded
/// newlines inside quoted fields are not supported. Fields are trimmed
/// after extraction and quotes follow the usual CSV rules (`""` inside a
/// quoted field emits a literal quote).
pub fn parse(raw: &str) -> Result<ParsedTable, ParseError> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let delimiter = detect_delimiter(lines[0]);
    let headers = tokenize_line(lines[0], delimiter);
    if headers.is_empty() {
        return Err(ParseError::NoHeaders);
    }

    let sample_rows: Vec<SourceRow> = lines
        .iter()
        .skip(1)
        .take(SAMPLE_ROW_LIMIT)
        .map(|line| zip_row(&headers, &tokenize_line(line, delimiter)))
        .collect();

    let table = ParsedTable {
        total_row_count: (lines.len() - 1) as u64,
        headers,
        sample_rows,
        delimiter,
    };
    debug!(
        columns = table.headers.len(),
        rows = table.total_row_count,
        delimiter = %table.delimiter,
        "parsed delimited text"
    );
    Ok(table)
}

/// Tokenize every data line of `raw` with the delimiter already inferred
/// for `table`. This is the full dataset; `table.sample_rows` is only the
/// preview used for inference and scoring.
pub fn data_rows(raw: &str, table: &ParsedTable) -> Vec<SourceRow> {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .skip(1)
        .map(|line| zip_row(&table.headers, &tokenize_line(line, table.delimiter)))
        .collect()
}

/// Count literal occurrences of each candidate in the header line and take
/// the highest. Comma wins ties and the all-zero case; a single-column
/// file therefore reports comma even though no delimiter appears.
fn detect_delimiter(first_line: &str) -> char {
    let mut detected = ',';
    let mut max_count = 0;
    for candidate in DELIMITER_CANDIDATES {
        let count = first_line.matches(candidate).count();
        if count > max_count {
            max_count = count;
            detected = candidate;
        }
    }
    detected
}

/// Character scan with a quote toggle. A `"` flips the in-quotes state
/// unless doubled (`""`), which emits one literal quote. The delimiter
/// only splits outside quotes. Every extracted field is trimmed.
fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Zip tokens against headers positionally. Missing trailing fields map to
/// the empty string; tokens beyond the header count are dropped.
fn zip_row(headers: &[String], tokens: &[String]) -> SourceRow {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let value = tokens.get(i).cloned().unwrap_or_default();
            (header.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_comma_file() {
        let table = parse("name,email\nAnna,anna@x.com\nBen,ben@y.com\n").unwrap();
        assert_eq!(table.headers, vec!["name", "email"]);
        assert_eq!(table.delimiter, ',');
        assert_eq!(table.total_row_count, 2);
        assert_eq!(table.sample_rows.len(), 2);
        assert_eq!(table.sample_rows[0]["email"], "anna@x.com");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse("").unwrap_err(), ParseError::EmptyInput);
        assert_eq!(parse("\n  \n\t\n").unwrap_err(), ParseError::EmptyInput);
    }

    #[test]
    fn quoted_field_keeps_embedded_delimiter() {
        let tokens = tokenize_line(r#"a,"b,c",d"#, ',');
        assert_eq!(tokens, vec!["a", "b,c", "d"]);
    }

    #[test]
    fn escaped_quote_becomes_literal() {
        let tokens = tokenize_line(r#""he said ""hi""",x"#, ',');
        assert_eq!(tokens, vec![r#"he said "hi""#, "x"]);
    }

    #[test]
    fn fields_are_trimmed() {
        let tokens = tokenize_line("  a , b ,c  ", ',');
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn semicolon_and_tab_files_are_sniffed() {
        let semis = parse("a;b;c\n1;2;3\n").unwrap();
        assert_eq!(semis.delimiter, ';');
        assert_eq!(semis.headers, vec!["a", "b", "c"]);

        let tabs = parse("a\tb\n1\t2\n").unwrap();
        assert_eq!(tabs.delimiter, '\t');
        assert_eq!(tabs.headers, vec!["a", "b"]);
    }

    #[test]
    fn comma_wins_ties_and_the_no_delimiter_case() {
        assert_eq!(detect_delimiter("a,b;c"), ',');
        assert_eq!(detect_delimiter("justonecolumn"), ',');
    }

    #[test]
    fn delimiter_inference_is_idempotent() {
        let table = parse("a|b|c\n1|2|3\n").unwrap();
        let rejoined = table
            .headers
            .join(&table.delimiter.to_string());
        let reparsed = parse(&format!("{rejoined}\n")).unwrap();
        assert_eq!(reparsed.headers, table.headers);
        assert_eq!(reparsed.delimiter, table.delimiter);
    }

    #[test]
    fn sample_is_capped_at_five_rows() {
        let raw = "h\n1\n2\n3\n4\n5\n6\n7\n";
        let table = parse(raw).unwrap();
        assert_eq!(table.sample_rows.len(), 5);
        assert_eq!(table.total_row_count, 7);
    }

    #[test]
    fn sample_matches_row_count_for_short_files() {
        let table = parse("h\nonly\n").unwrap();
        assert_eq!(table.sample_rows.len(), 1);
        assert_eq!(table.total_row_count, 1);
    }

    #[test]
    fn blank_lines_are_discarded() {
        let table = parse("a,b\n\n1,2\n   \n3,4\n").unwrap();
        assert_eq!(table.total_row_count, 2);
        assert_eq!(table.sample_rows.len(), 2);
    }

    #[test]
    fn short_rows_pad_and_long_rows_truncate() {
        let table = parse("a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(table.sample_rows[0]["a"], "1");
        assert_eq!(table.sample_rows[0]["b"], "");
        assert_eq!(table.sample_rows[0]["c"], "");
        assert_eq!(table.sample_rows[1]["c"], "3");
        assert_eq!(table.sample_rows[1].len(), 3);
    }

    #[test]
    fn duplicate_headers_are_preserved() {
        let table = parse("email,email,name\na@x.com,b@y.com,Anna\n").unwrap();
        assert_eq!(table.headers, vec!["email", "email", "name"]);
        // Within a row map the last duplicate column wins.
        assert_eq!(table.sample_rows[0]["email"], "b@y.com");
    }

    #[test]
    fn data_rows_cover_the_full_dataset() {
        let raw = "h\n1\n2\n3\n4\n5\n6\n7\n";
        let table = parse(raw).unwrap();
        let rows = data_rows(raw, &table);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[6]["h"], "7");
    }

    #[test]
    fn windows_line_endings_are_tolerated() {
        let table = parse("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.sample_rows[0]["b"], "2");
    }
}

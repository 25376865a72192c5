use crate::domain::error::{AppError, Result};
use crate::domain::record::{canonical_field_name, RecordField, SubscriberRecord};

/// Strict positional decoder for the spreadsheet CSV export.
///
/// Cells are trimmed and every literal quote character is removed; no
/// RFC 4180 escaping is performed. A field value that itself contains the
/// delimiter will mis-align its row. That is a documented limitation of the
/// export consumer, kept as-is rather than silently "fixed" — rows the store
/// mis-reads must mis-read the same way here.
pub struct SnapshotDecoder {
    delimiter: char,
}

impl Default for SnapshotDecoder {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl SnapshotDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Decode snapshot text into records in source order.
    ///
    /// The first non-blank line is the header; every subsequent non-blank
    /// line is zipped positionally against it. Rows shorter than the header
    /// pad trailing fields with the empty string; longer rows are truncated
    /// to header length. Records get a 1-based `row_index` among data rows.
    pub fn decode(&self, snapshot_text: &str) -> Result<Vec<SubscriberRecord>> {
        let mut lines = snapshot_text
            .lines()
            .filter(|line| !line.trim().is_empty());

        let header_line = lines.next().ok_or_else(|| {
            AppError::MalformedSnapshot("snapshot has no non-blank lines".to_string())
        })?;

        let headers: Vec<String> = self
            .split_cells(header_line)
            .iter()
            .map(|cell| canonical_field_name(cell))
            .collect();

        let records = lines
            .enumerate()
            .map(|(index, line)| self.decode_row(index + 1, &headers, line))
            .collect();

        Ok(records)
    }

    fn decode_row(&self, row_index: usize, headers: &[String], line: &str) -> SubscriberRecord {
        let cells = self.split_cells(line);

        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| RecordField {
                name: name.clone(),
                value: cells.get(idx).cloned().unwrap_or_default(),
            })
            .collect();

        SubscriberRecord::new(row_index, fields)
    }

    fn split_cells(&self, line: &str) -> Vec<String> {
        line.split(self.delimiter)
            .map(|cell| cell.trim().replace('"', ""))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = "\
email,phone,username,expire date,password
a@x.com,0501234567,alice,2099-01-01,hunter2
b@y.com,0527654321,bob,2020-01-01,";

    #[test]
    fn test_decode_simple_snapshot() {
        let records = SnapshotDecoder::new().decode(SNAPSHOT).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_index, 1);
        assert_eq!(records[0].get("email"), Some("a@x.com"));
        assert_eq!(records[0].get("username"), Some("alice"));
        assert_eq!(records[1].row_index, 2);
        assert_eq!(records[1].get("email"), Some("b@y.com"));
    }

    #[test]
    fn test_expiry_header_alias_folded() {
        let records = SnapshotDecoder::new().decode(SNAPSHOT).unwrap();
        assert_eq!(records[0].expiry(), Some("2099-01-01"));

        let alt = "Email,ExpireDate\na@x.com,2099-01-01";
        let records = SnapshotDecoder::new().decode(alt).unwrap();
        assert_eq!(records[0].expiry(), Some("2099-01-01"));
    }

    #[test]
    fn test_blank_lines_discarded() {
        let text = "\n\nemail,username\n\na@x.com,alice\n   \nb@y.com,bob\n\n";
        let records = SnapshotDecoder::new().decode(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_index, 1);
        assert_eq!(records[1].row_index, 2);
    }

    #[test]
    fn test_quotes_stripped_and_cells_trimmed() {
        let text = "\"Email\", \"Username\"\n \"a@x.com\" , alice ";
        let records = SnapshotDecoder::new().decode(text).unwrap();

        assert_eq!(records[0].get("email"), Some("a@x.com"));
        assert_eq!(records[0].get("username"), Some("alice"));
    }

    #[test]
    fn test_short_row_pads_trailing_fields() {
        let text = "email,phone,username\na@x.com";
        let records = SnapshotDecoder::new().decode(text).unwrap();

        assert_eq!(records[0].get("phone"), Some(""));
        assert_eq!(records[0].get("username"), Some(""));
    }

    #[test]
    fn test_long_row_truncated_to_header_length() {
        let text = "email,phone\na@x.com,050,extra,cells";
        let records = SnapshotDecoder::new().decode(text).unwrap();

        assert_eq!(records[0].fields.len(), 2);
        assert_eq!(records[0].get("phone"), Some("050"));
    }

    #[test]
    fn test_embedded_delimiter_misaligns_row() {
        // Positional decoding by design: a comma inside a value shifts the
        // rest of the row, exactly like the store's own export consumer.
        let text = "email,phone\n\"a,b@x.com\",050";
        let records = SnapshotDecoder::new().decode(text).unwrap();

        assert_eq!(records[0].get("email"), Some("a"));
        assert_eq!(records[0].get("phone"), Some("b@x.com"));
    }

    #[test]
    fn test_empty_snapshot_is_malformed() {
        assert!(matches!(
            SnapshotDecoder::new().decode(""),
            Err(AppError::MalformedSnapshot(_))
        ));
        assert!(matches!(
            SnapshotDecoder::new().decode("\n  \n\n"),
            Err(AppError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_header_only_snapshot_yields_no_records() {
        let records = SnapshotDecoder::new().decode("email,phone\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_is_deterministic() {
        let decoder = SnapshotDecoder::new();
        let first = decoder.decode(SNAPSHOT).unwrap();
        let second = decoder.decode(SNAPSHOT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_crlf_line_breaks() {
        let text = "email,username\r\na@x.com,alice\r\n";
        let records = SnapshotDecoder::new().decode(text).unwrap();
        assert_eq!(records[0].get("username"), Some("alice"));
    }

    #[test]
    fn test_custom_delimiter() {
        let text = "email;username\na@x.com;alice";
        let records = SnapshotDecoder::new().with_delimiter(';').decode(text).unwrap();
        assert_eq!(records[0].get("username"), Some("alice"));
    }
}

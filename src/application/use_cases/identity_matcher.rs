//! Identity matching under the quorum rule.
//!
//! A record is accepted when at least two of the query's identity fields
//! agree with it post-normalization, or when the query supplies exactly one
//! field and that field agrees (single-field lookup mode). Records are
//! scanned in source order and the first accepted record wins; every
//! qualifying record is still counted so callers can detect duplicate or
//! ambiguous store rows instead of having them silently masked.

use crate::domain::identity::{IdentityField, IdentityQuery};
use crate::domain::normalize::normalize;
use crate::domain::record::SubscriberRecord;

/// Outcome of scanning a record sequence against one query.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// First accepted record in source order, if any.
    pub record: Option<SubscriberRecord>,
    /// Fields that agreed on the accepted record; when nothing was accepted,
    /// the largest agreeing field set seen on any single record.
    pub matched_fields: Vec<IdentityField>,
    /// How many records satisfied the quorum rule across the whole snapshot.
    pub qualifying_candidates: usize,
}

impl MatchResult {
    pub fn matched_field_count(&self) -> usize {
        self.matched_fields.len()
    }

    pub fn is_match(&self) -> bool {
        self.record.is_some()
    }
}

/// Scan records in source order and apply the quorum acceptance rule.
pub fn find_match(records: &[SubscriberRecord], query: &IdentityQuery) -> MatchResult {
    let quorum = if query.is_single_field() { 1 } else { 2 };

    let mut accepted: Option<(SubscriberRecord, Vec<IdentityField>)> = None;
    let mut best_fields: Vec<IdentityField> = Vec::new();
    let mut qualifying = 0;

    for record in records {
        let fields = matched_fields(record, query);

        if fields.len() >= quorum {
            qualifying += 1;
            if accepted.is_none() {
                accepted = Some((record.clone(), fields.clone()));
            }
        }

        if fields.len() > best_fields.len() {
            best_fields = fields;
        }
    }

    match accepted {
        Some((record, fields)) => MatchResult {
            record: Some(record),
            matched_fields: fields,
            qualifying_candidates: qualifying,
        },
        None => MatchResult {
            record: None,
            matched_fields: best_fields,
            qualifying_candidates: 0,
        },
    }
}

/// Fields on which the query and record agree. A field counts only when the
/// query populates it and the record value normalizes to something non-empty;
/// empty never matches empty.
fn matched_fields(record: &SubscriberRecord, query: &IdentityQuery) -> Vec<IdentityField> {
    IdentityField::ALL
        .iter()
        .copied()
        .filter(|field| {
            let query_value = match query.field(*field) {
                Some(v) => v,
                None => return false,
            };
            let record_value = record
                .get(field.canonical_name())
                .and_then(|raw| normalize(*field, raw));

            record_value.as_deref() == Some(query_value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::csv::SnapshotDecoder;

    const SNAPSHOT: &str = "\
email,phone,username,expire date
a@x.com,0501234567,alice,2099-01-01
b@y.com,0527654321,bob,2020-06-01
c@z.com,0539999999,carol,2099-01-01";

    fn records() -> Vec<SubscriberRecord> {
        SnapshotDecoder::new().decode(SNAPSHOT).unwrap()
    }

    #[test]
    fn test_two_field_agreement_is_accepted() {
        let query = IdentityQuery::new(Some("A@X.com"), None, Some("ALICE")).unwrap();
        let result = find_match(&records(), &query);

        assert!(result.is_match());
        assert_eq!(result.matched_field_count(), 2);
        assert_eq!(result.record.unwrap().row_index, 1);
        assert_eq!(result.qualifying_candidates, 1);
    }

    #[test]
    fn test_single_field_mode_accepts_one_agreement() {
        let query = IdentityQuery::new(None, Some("050-123-4567"), None).unwrap();
        let result = find_match(&records(), &query);

        assert!(result.is_match());
        assert_eq!(result.matched_field_count(), 1);
        assert_eq!(result.matched_fields, vec![IdentityField::Phone]);
    }

    #[test]
    fn test_one_of_two_fields_is_below_quorum() {
        let query = IdentityQuery::new(Some("a@x.com"), Some("0509999999"), None).unwrap();
        let result = find_match(&records(), &query);

        assert!(!result.is_match());
        assert_eq!(result.matched_field_count(), 1);
        assert_eq!(result.qualifying_candidates, 0);
    }

    #[test]
    fn test_three_field_query_needs_only_two() {
        let query =
            IdentityQuery::new(Some("b@y.com"), Some("052-765-4321"), Some("nobody")).unwrap();
        let result = find_match(&records(), &query);

        assert!(result.is_match());
        assert_eq!(result.matched_field_count(), 2);
        assert_eq!(result.record.unwrap().row_index, 2);
    }

    #[test]
    fn test_first_occurrence_wins_and_duplicates_are_counted() {
        let snapshot = "\
email,phone,username
dup@x.com,0501111111,dup
dup@x.com,0501111111,dup";
        let records = SnapshotDecoder::new().decode(snapshot).unwrap();
        let query = IdentityQuery::new(Some("dup@x.com"), None, Some("dup")).unwrap();
        let result = find_match(&records, &query);

        assert_eq!(result.record.unwrap().row_index, 1);
        assert_eq!(result.qualifying_candidates, 2);
    }

    #[test]
    fn test_empty_record_field_never_matches() {
        let snapshot = "email,phone,username\n,0501234567,";
        let records = SnapshotDecoder::new().decode(snapshot).unwrap();

        // Phone agrees, but the quorum needs the username too, and the
        // record-side username is empty.
        let query = IdentityQuery::new(None, Some("0501234567"), Some("alice")).unwrap();
        let result = find_match(&records, &query);
        assert!(!result.is_match());
        assert_eq!(result.matched_field_count(), 1);
    }

    #[test]
    fn test_record_missing_identity_column() {
        let snapshot = "email,expire date\na@x.com,2099-01-01";
        let records = SnapshotDecoder::new().decode(snapshot).unwrap();
        let query = IdentityQuery::new(Some("a@x.com"), Some("0501234567"), None).unwrap();
        let result = find_match(&records, &query);

        assert!(!result.is_match());
        assert_eq!(result.matched_fields, vec![IdentityField::Email]);
    }

    #[test]
    fn test_no_agreement_at_all() {
        let query = IdentityQuery::new(Some("nobody@nowhere.com"), None, None).unwrap();
        let result = find_match(&records(), &query);

        assert!(!result.is_match());
        assert_eq!(result.matched_field_count(), 0);
        assert_eq!(result.qualifying_candidates, 0);
    }
}

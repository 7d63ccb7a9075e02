//! Anti-join of roster records against the enrolled email set.
//!
//! Email matching mirrors the enrollment pipeline's cleaning rules: values
//! are lowercased, all whitespace (including non-breaking spaces) is
//! stripped, null/empty values are dropped, and duplicates are removed
//! keeping the first occurrence.

use rostergap_core::RosterRecord;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Column used for the EJA composition filter on Goias student rosters.
const COMPOSITION_COLUMN: &str = "Composição";

/// Finds the join column: the first column whose name contains `email`,
/// case-insensitively.
#[must_use]
pub fn find_email_column<'a, I>(columns: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    columns
        .into_iter()
        .find(|col| col.to_lowercase().contains("email"))
}

/// Normalizes an email cell for matching.
///
/// Returns `None` for nulls and values that are empty once whitespace is
/// stripped, so they can never produce a false "unenrolled" match.
#[must_use]
pub fn normalize_email(value: &serde_json::Value) -> Option<String> {
    let raw = match value {
        serde_json::Value::Null => return None,
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Normalizes a set of enrolled emails with the same rules applied to the
/// roster side of the join.
#[must_use]
pub fn normalize_enrolled(emails: &[String]) -> HashSet<String> {
    emails
        .iter()
        .filter_map(|e| normalize_email(&serde_json::Value::String(e.clone())))
        .collect()
}

/// Drops Goias student records whose composition marks them as EJA
/// (adult education), which are out of scope for enrollment checks.
///
/// When the composition column is absent the roster is returned unchanged.
#[must_use]
pub fn apply_eja_filter(records: Vec<RosterRecord>) -> Vec<RosterRecord> {
    let has_column = records.iter().any(|r| r.contains_key(COMPOSITION_COLUMN));
    if !has_column {
        warn!(
            column = COMPOSITION_COLUMN,
            "composition column not found in roster, skipping EJA filtering"
        );
        return records;
    }

    let initial = records.len();
    let filtered: Vec<RosterRecord> = records
        .into_iter()
        .filter(|record| {
            record
                .get(COMPOSITION_COLUMN)
                .map(value_as_text)
                .map_or(true, |text| !text.to_uppercase().contains("EJA"))
        })
        .collect();

    debug!(
        removed = initial - filtered.len(),
        remaining = filtered.len(),
        "EJA filtering completed"
    );
    filtered
}

/// Returns roster records whose normalized email is not in the enrolled
/// set. Records without a usable email are skipped; duplicate emails keep
/// the first occurrence only, preventing duplicate rows in the result.
#[must_use]
pub fn anti_join(
    roster: Vec<RosterRecord>,
    enrolled: &HashSet<String>,
    email_column: &str,
) -> Vec<RosterRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unenrolled = Vec::new();

    for record in roster {
        let Some(email) = record.get(email_column).and_then(normalize_email_ref) else {
            continue;
        };
        if !seen.insert(email.clone()) {
            continue;
        }
        if !enrolled.contains(&email) {
            unenrolled.push(record);
        }
    }

    debug!(unenrolled = unenrolled.len(), "anti-join completed");
    unenrolled
}

fn normalize_email_ref(value: &serde_json::Value) -> Option<String> {
    normalize_email(value)
}

fn value_as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> RosterRecord {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_find_email_column_case_insensitive() {
        assert_eq!(
            find_email_column(vec!["Nome", "E-mail Institucional", "Turma"]),
            Some("E-mail Institucional")
        );
        assert_eq!(find_email_column(vec!["Email"]), Some("Email"));
        assert_eq!(find_email_column(vec!["Nome", "Turma"]), None);
        assert_eq!(find_email_column(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email(&json!("  Ana.Silva@Example.COM ")),
            Some("ana.silva@example.com".to_string())
        );
        // Non-breaking space and tabs are stripped too
        assert_eq!(
            normalize_email(&json!("a\u{a0}b@example.com\t")),
            Some("ab@example.com".to_string())
        );
        assert_eq!(normalize_email(&json!(null)), None);
        assert_eq!(normalize_email(&json!("   ")), None);
        assert_eq!(normalize_email(&json!("")), None);
    }

    #[test]
    fn test_normalize_enrolled_drops_blanks() {
        let enrolled = normalize_enrolled(&[
            "A@Example.com".to_string(),
            " ".to_string(),
            "b@example.com".to_string(),
        ]);
        assert_eq!(enrolled.len(), 2);
        assert!(enrolled.contains("a@example.com"));
    }

    #[test]
    fn test_eja_filter_removes_marked_rows() {
        let roster = vec![
            record(&[("Email", json!("a@x.com")), ("Composição", json!("EJA - Noturno"))]),
            record(&[("Email", json!("b@x.com")), ("Composição", json!("Regular"))]),
            record(&[("Email", json!("c@x.com")), ("Composição", json!("eja"))]),
        ];
        let filtered = apply_eja_filter(roster);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["Email"], json!("b@x.com"));
    }

    #[test]
    fn test_eja_filter_skips_when_column_absent() {
        let roster = vec![record(&[("Email", json!("a@x.com"))])];
        let filtered = apply_eja_filter(roster.clone());
        assert_eq!(filtered, roster);
    }

    #[test]
    fn test_anti_join_basic() {
        let roster = vec![
            record(&[("Email", json!("enrolled@x.com")), ("Nome", json!("A"))]),
            record(&[("Email", json!("missing@x.com")), ("Nome", json!("B"))]),
        ];
        let enrolled: HashSet<String> = ["enrolled@x.com".to_string()].into_iter().collect();

        let result = anti_join(roster, &enrolled, "Email");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["Nome"], json!("B"));
    }

    #[test]
    fn test_anti_join_normalizes_both_sides() {
        let roster = vec![record(&[("Email", json!(" Enrolled@X.com "))])];
        let enrolled = normalize_enrolled(&["ENROLLED@x.com".to_string()]);
        assert!(anti_join(roster, &enrolled, "Email").is_empty());
    }

    #[test]
    fn test_anti_join_deduplicates_roster() {
        let roster = vec![
            record(&[("Email", json!("dup@x.com")), ("Nome", json!("first"))]),
            record(&[("Email", json!("DUP@x.com")), ("Nome", json!("second"))]),
        ];
        let result = anti_join(roster, &HashSet::new(), "Email");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["Nome"], json!("first"));
    }

    #[test]
    fn test_anti_join_skips_null_and_empty_emails() {
        let roster = vec![
            record(&[("Email", json!(null))]),
            record(&[("Email", json!("  "))]),
            record(&[("Nome", json!("no email at all"))]),
            record(&[("Email", json!("keep@x.com"))]),
        ];
        let result = anti_join(roster, &HashSet::new(), "Email");
        assert_eq!(result.len(), 1);
    }
}

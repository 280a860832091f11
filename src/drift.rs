//! Schema-drift tolerance for writes. A remote schema that lags the app's
//! expected column set rejects the payload with a structured
//! undefined-column error; we strip the offending field's whole group and
//! resubmit exactly once. A second failure propagates the retry's error.

use serde_json::Value;
use tracing::warn;

use crate::store::{Filter, Row, StoreError, TableStore};

/// Correlated optional columns that migrate together. Stripping one without
/// the others would leave a half-written name, so the group goes as a unit.
pub const STUDENT_WRITE_GROUPS: &[&[&str]] = &[&["suffix", "full_name", "normalized_full_name"]];
pub const SECTION_SUBJECT_WRITE_GROUPS: &[&[&str]] = &[&["staff_id"]];

fn group_for<'a>(groups: &[&'a [&'a str]], column: &str) -> Option<&'a [&'a str]> {
    groups.iter().copied().find(|g| g.contains(&column))
}

fn strip(row: &Row, group: &[&str]) -> Row {
    let mut narrowed = row.clone();
    for field in group {
        narrowed.remove(*field);
    }
    narrowed
}

pub fn insert_with_drift(
    store: &dyn TableStore,
    table: &str,
    row: &Row,
    groups: &[&[&str]],
) -> Result<Value, StoreError> {
    match store.insert(table, row) {
        Err(StoreError::MissingColumn { table: t, column }) => {
            match group_for(groups, &column) {
                Some(group) => {
                    warn!(table, column = %column, "remote schema lacks column, retrying insert without {group:?}");
                    store.insert(table, &strip(row, group))
                }
                None => Err(StoreError::MissingColumn { table: t, column }),
            }
        }
        other => other,
    }
}

pub fn update_with_drift(
    store: &dyn TableStore,
    table: &str,
    filters: &[Filter],
    patch: &Row,
    groups: &[&[&str]],
) -> Result<Value, StoreError> {
    match store.update(table, filters, patch) {
        Err(StoreError::MissingColumn { table: t, column }) => {
            match group_for(groups, &column) {
                Some(group) => {
                    warn!(table, column = %column, "remote schema lacks column, retrying update without {group:?}");
                    store.update(table, filters, &strip(patch, group))
                }
                None => Err(StoreError::MissingColumn { table: t, column }),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_maps_to_its_group() {
        assert_eq!(
            group_for(STUDENT_WRITE_GROUPS, "full_name"),
            Some(STUDENT_WRITE_GROUPS[0])
        );
        assert_eq!(group_for(STUDENT_WRITE_GROUPS, "email"), None);
    }

    #[test]
    fn strip_removes_the_whole_group() {
        let mut row = Row::new();
        for key in ["first_name", "suffix", "full_name", "normalized_full_name"] {
            row.insert(key.to_string(), Value::from("x"));
        }
        let narrowed = strip(&row, STUDENT_WRITE_GROUPS[0]);
        assert_eq!(narrowed.keys().collect::<Vec<_>>(), vec!["first_name"]);
    }
}

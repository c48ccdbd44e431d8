use crate::error::AppError;
use megaphone::db::PgPool;
use megaphone::{upsert_contact_by_phone, ContactUpsert, UpsertOutcome};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub mod columns;

/// Rows are processed in fixed-size batches to bound per-request work.
pub const BATCH_SIZE: usize = 50;

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Deduplicates one batch by phone before it touches the store, so a batch
/// never races against itself on the same key. Last row wins; the winner
/// keeps the position of the first occurrence.
pub fn dedupe_batch(batch: Vec<ContactUpsert>) -> Vec<ContactUpsert> {
    let mut by_phone: HashMap<String, usize> = HashMap::new();
    let mut deduped: Vec<ContactUpsert> = Vec::with_capacity(batch.len());

    for candidate in batch {
        match by_phone.get(&candidate.phone) {
            Some(&index) => deduped[index] = candidate,
            None => {
                by_phone.insert(candidate.phone.clone(), deduped.len());
                deduped.push(candidate);
            }
        }
    }

    deduped
}

/// Best-effort bulk contact import for one tenant. Rows lacking a usable
/// phone are filtered up front; an import where nothing remains fails as a
/// whole, while individual upsert failures are counted and reported
/// without aborting the rest.
pub fn run_import(
    pool: &PgPool,
    tenant_id: i32,
    rows: &[Map<String, Value>],
    phone_column: Option<String>,
) -> Result<ImportReport, AppError> {
    if rows.is_empty() {
        return Err(AppError::Validation("Invalid contacts data".to_string()));
    }

    let phone_column = match phone_column.filter(|c| !c.trim().is_empty()) {
        Some(column) => column,
        None => columns::detect_phone_column(rows)
            .ok_or_else(|| AppError::Validation("No phone column found".to_string()))?,
    };

    let candidates: Vec<ContactUpsert> = rows
        .iter()
        .filter_map(|row| columns::map_row(row, &phone_column))
        .collect();

    if candidates.is_empty() {
        return Err(AppError::Validation("No valid contacts found".to_string()));
    }

    let mut report = ImportReport {
        total: candidates.len(),
        ..Default::default()
    };

    for batch in candidates.chunks(BATCH_SIZE) {
        for candidate in dedupe_batch(batch.to_vec()) {
            match upsert_contact_by_phone(pool, tenant_id, &candidate) {
                Ok(UpsertOutcome::Created) => report.created += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Err(e) => {
                    report.failed += 1;
                    report
                        .errors
                        .push(format!("Failed to process contact {}: {}", candidate.phone, e));
                }
            }
        }
    }

    tracing::info!(
        "Import for tenant {}: {} created, {} updated, {} failed",
        tenant_id,
        report.created,
        report.updated,
        report.failed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::r2d2::{ConnectionManager, Pool};
    use diesel::PgConnection;
    use serde_json::json;

    // The validation branches return before the store is touched, so an
    // unconnected pool is enough.
    fn unconnected_pool() -> PgPool {
        let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unreachable");
        Pool::builder().build_unchecked(manager)
    }

    fn rows(values: &[Value]) -> Vec<Map<String, Value>> {
        values
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn validation_message(result: Result<ImportReport, AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected Validation error, got {:?}", other.map(|r| r.total)),
        }
    }

    #[test]
    fn test_run_import_rejects_empty_rows() {
        let result = run_import(&unconnected_pool(), 1, &[], None);
        assert_eq!(validation_message(result), "Invalid contacts data");
    }

    #[test]
    fn test_run_import_rejects_missing_phone_column() {
        let result = run_import(
            &unconnected_pool(),
            1,
            &rows(&[json!({"Name": "Asha", "Mobile": "98123"})]),
            None,
        );
        assert_eq!(validation_message(result), "No phone column found");
    }

    #[test]
    fn test_run_import_rejects_all_invalid_rows() {
        let result = run_import(
            &unconnected_pool(),
            1,
            &rows(&[
                json!({"Phone": "   ", "Name": "Asha"}),
                json!({"Phone": "", "Name": "Ravi"}),
            ]),
            None,
        );
        assert_eq!(validation_message(result), "No valid contacts found");
    }

    fn candidate(phone: &str, name: &str) -> ContactUpsert {
        ContactUpsert {
            phone: phone.to_string(),
            name: name.to_string(),
            email: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_dedupe_batch_last_wins() {
        let deduped = dedupe_batch(vec![
            candidate("111", "first"),
            candidate("222", "other"),
            candidate("111", "second"),
        ]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].phone, "111");
        assert_eq!(deduped[0].name, "second");
        assert_eq!(deduped[1].phone, "222");
    }

    #[test]
    fn test_dedupe_batch_no_duplicates() {
        let deduped = dedupe_batch(vec![candidate("111", "a"), candidate("222", "b")]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_dedupe_batch_empty() {
        assert!(dedupe_batch(Vec::new()).is_empty());
    }
}

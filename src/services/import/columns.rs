use megaphone::ContactUpsert;
use serde_json::{Map, Value};

/// Spreadsheet cells arrive as strings, numbers or booleans depending on
/// the upload tooling; phone columns in particular are often numeric.
fn cell_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Picks the phone column when the caller did not designate one: the first
/// column whose name contains "phone", scanning rows in order.
pub fn detect_phone_column(rows: &[Map<String, Value>]) -> Option<String> {
    for row in rows {
        for key in row.keys() {
            if key.to_lowercase().contains("phone") {
                return Some(key.clone());
            }
        }
    }
    None
}

/// Heuristic column mapping for one uploaded row. Columns containing
/// "name" map to the contact name, "email" to email, "tag" or "category"
/// values are appended to tags (comma-split). Unmapped columns are
/// ignored. Rows without a non-empty phone after trimming yield `None`;
/// a row without a name-bearing column falls back to the phone value.
pub fn map_row(row: &Map<String, Value>, phone_column: &str) -> Option<ContactUpsert> {
    let phone = row
        .get(phone_column)
        .and_then(cell_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();

    for (key, value) in row {
        if key.as_str() == phone_column {
            continue;
        }

        let lower = key.to_lowercase();
        let Some(cell) = cell_to_string(value).map(|s| s.trim().to_string()) else {
            continue;
        };
        if cell.is_empty() {
            continue;
        }

        if lower.contains("name") && name.is_none() {
            name = Some(cell);
        } else if lower.contains("email") && email.is_none() {
            email = Some(cell);
        } else if lower.contains("tag") || lower.contains("category") {
            for tag in cell.split(',') {
                let tag = tag.trim();
                if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_string());
                }
            }
        }
    }

    Some(ContactUpsert {
        name: name.unwrap_or_else(|| phone.clone()),
        phone,
        email,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_detect_phone_column() {
        let rows = vec![row(json!({"Student Name": "Asha", "Parent Phone": "911234"}))];
        assert_eq!(detect_phone_column(&rows), Some("Parent Phone".to_string()));
    }

    #[test]
    fn test_detect_phone_column_missing() {
        let rows = vec![row(json!({"Name": "Asha", "Mobile": "911234"}))];
        assert_eq!(detect_phone_column(&rows), None);
    }

    #[test]
    fn test_map_row_full() {
        let mapped = map_row(
            &row(json!({
                "Full Name": "Asha Rao",
                "Phone": "+919812345678",
                "Email Address": "asha@example.com",
                "Category": "parent, grade-5",
            })),
            "Phone",
        )
        .unwrap();

        assert_eq!(mapped.name, "Asha Rao");
        assert_eq!(mapped.phone, "+919812345678");
        assert_eq!(mapped.email.as_deref(), Some("asha@example.com"));
        assert_eq!(mapped.tags, vec!["parent".to_string(), "grade-5".to_string()]);
    }

    #[test]
    fn test_map_row_name_defaults_to_phone() {
        let mapped = map_row(&row(json!({"Phone": " 98123 "})), "Phone").unwrap();
        assert_eq!(mapped.phone, "98123");
        assert_eq!(mapped.name, "98123");
        assert_eq!(mapped.email, None);
        assert!(mapped.tags.is_empty());
    }

    #[test]
    fn test_map_row_numeric_phone() {
        let mapped = map_row(&row(json!({"phone_number": 98123, "Name": "Asha"})), "phone_number")
            .unwrap();
        assert_eq!(mapped.phone, "98123");
    }

    #[test]
    fn test_map_row_empty_phone_is_skipped() {
        assert!(map_row(&row(json!({"Phone": "   "})), "Phone").is_none());
        assert!(map_row(&row(json!({"Name": "Asha"})), "Phone").is_none());
    }

    #[test]
    fn test_map_row_tag_columns_accumulate() {
        let mapped = map_row(
            &row(json!({
                "Phone": "98123",
                "Tags": "fees-due",
                "Category": "parent, fees-due",
            })),
            "Phone",
        )
        .unwrap();
        // serde_json::Map iterates in sorted key order, so "Category" is
        // visited before "Tags".
        assert_eq!(mapped.tags, vec!["parent".to_string(), "fees-due".to_string()]);
    }

    #[test]
    fn test_map_row_unmapped_columns_ignored() {
        let mapped = map_row(
            &row(json!({"Phone": "98123", "Roll No": "17", "Section": "B"})),
            "Phone",
        )
        .unwrap();
        assert_eq!(mapped.name, "98123");
        assert!(mapped.tags.is_empty());
    }
}

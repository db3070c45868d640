//! Row ceiling applied at the I/O boundary of every base adapter.

use crate::types::Row;

/// Rows returned when the caller does not ask for a cap.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Hard ceiling regardless of what the caller asks for.
pub const MAX_ROW_LIMIT: usize = 1000;

/// Resolves the effective ceiling for a request.
///
/// A positive `max_rows` is honored up to [`MAX_ROW_LIMIT`]; anything else
/// (absent or zero) falls back to [`DEFAULT_ROW_LIMIT`].
pub fn effective_limit(max_rows: Option<u32>) -> usize {
    match max_rows {
        Some(requested) if requested > 0 => (requested as usize).min(MAX_ROW_LIMIT),
        _ => DEFAULT_ROW_LIMIT,
    }
}

/// Truncates `rows` to the effective ceiling, preserving original order.
pub fn limit_rows(mut rows: Vec<Row>, max_rows: Option<u32>) -> Vec<Row> {
    rows.truncate(effective_limit(max_rows));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|n| {
                let mut row = Row::new();
                row.insert("id".into(), json!(n));
                row
            })
            .collect()
    }

    #[test]
    fn caps_to_requested_limit() {
        let limited = limit_rows(rows(120), Some(5));
        assert_eq!(limited.len(), 5);
        assert_eq!(limited[0]["id"], json!(0));
        assert_eq!(limited[4]["id"], json!(4));
    }

    #[test]
    fn absent_limit_uses_default() {
        assert_eq!(limit_rows(rows(500), None).len(), DEFAULT_ROW_LIMIT);
    }

    #[test]
    fn oversized_limit_is_clamped() {
        assert_eq!(effective_limit(Some(50_000)), MAX_ROW_LIMIT);
    }

    #[test]
    fn zero_is_not_a_positive_limit() {
        assert_eq!(effective_limit(Some(0)), DEFAULT_ROW_LIMIT);
    }

    #[test]
    fn short_input_passes_through_unchanged() {
        let limited = limit_rows(rows(3), Some(10));
        assert_eq!(limited.len(), 3);
    }
}

use crate::data::row::CellValue;
use std::cmp::Ordering;

/// Native ordering between two cell values.
///
/// Numbers compare numerically (integers and floats mix), everything else
/// compares by its display text. Null sorts before any value.
pub fn compare_cell_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Less,
        (_, CellValue::Null) => Ordering::Greater,

        (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
        (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
        (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
        (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),

        _ if a.is_numeric() && b.is_numeric() => {
            // Both numeric but not both integer
            let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }

        // Mixed types fall back to lexicographic order of the rendered text
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Compare optional values, treating a missing field like Null
pub fn compare_optional_cell_values(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(v)) => compare_cell_values(&CellValue::Null, v),
        (Some(v), None) => compare_cell_values(v, &CellValue::Null),
        (Some(a), Some(b)) => compare_cell_values(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_comparison() {
        assert_eq!(
            compare_cell_values(&CellValue::Integer(2), &CellValue::Integer(10)),
            Ordering::Less
        );
        assert_eq!(
            compare_cell_values(&CellValue::Integer(3), &CellValue::Integer(3)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        assert_eq!(
            compare_cell_values(&CellValue::Integer(2), &CellValue::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            compare_cell_values(&CellValue::Float(2.0), &CellValue::Integer(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_string_comparison_is_lexicographic() {
        assert_eq!(
            compare_cell_values(&"B".into(), &"A".into()),
            Ordering::Greater
        );
        // "10" < "9" as text
        assert_eq!(
            compare_cell_values(&"10".into(), &"9".into()),
            Ordering::Less
        );
    }

    #[test]
    fn test_number_against_string_uses_text() {
        assert_eq!(
            compare_cell_values(&CellValue::Integer(5), &"abc".into()),
            Ordering::Less
        );
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(
            compare_cell_values(&CellValue::Null, &CellValue::Integer(-100)),
            Ordering::Less
        );
        assert_eq!(
            compare_optional_cell_values(None, Some(&"x".into())),
            Ordering::Less
        );
        assert_eq!(
            compare_optional_cell_values(None, Some(&CellValue::Null)),
            Ordering::Equal
        );
    }
}

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One field value of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Total ordering used for column sorting.
    ///
    /// Values of the same kind compare naturally, integers and numbers compare
    /// numerically, and `Missing` sorts after everything else.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
            (_, Self::Missing) => Ordering::Less,
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => number_cmp(*a, *b),
            (Self::Integer(a), Self::Number(b)) => integer_number_cmp(*a, *b),
            (Self::Number(a), Self::Integer(b)) => integer_number_cmp(*b, *a).reverse(),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Integer(_) | Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
            Self::Missing => 4,
        }
    }
}

/// `total_cmp`, except that the two zeros are equal.
fn number_cmp(a: f64, b: f64) -> Ordering {
    if a == b { Ordering::Equal } else { a.total_cmp(&b) }
}

/// Exact comparison of an integer with a float, without rounding the integer
/// through `f64`.
fn integer_number_cmp(integer: i64, number: f64) -> Ordering {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if number.is_nan() {
        return if number.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if number >= LIMIT {
        return Ordering::Less;
    }
    if number < -LIMIT {
        return Ordering::Greater;
    }
    // In range, so the cast is exact.
    let whole = number.trunc();
    integer.cmp(&(whole as i64)).then_with(|| {
        let fraction = number - whole;
        if fraction > 0.0 {
            Ordering::Less
        } else if fraction < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_display_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-09");
        assert_eq!(CellValue::Missing.to_string(), "");
    }

    #[test]
    fn missing_sorts_last() {
        let mut values = vec![
            CellValue::Missing,
            CellValue::Integer(3),
            CellValue::Number(1.5),
        ];
        values.sort_by(CellValue::sort_cmp);
        assert_eq!(
            values,
            vec![
                CellValue::Number(1.5),
                CellValue::Integer(3),
                CellValue::Missing
            ]
        );
    }

    #[test]
    fn integers_and_numbers_compare_exactly() {
        let big = 1_i64 << 53;
        let as_number = CellValue::Number(big as f64);
        assert_eq!(CellValue::Integer(big + 1).sort_cmp(&as_number), Ordering::Greater);
        assert_eq!(as_number.sort_cmp(&CellValue::Integer(big + 1)), Ordering::Less);
        assert_eq!(CellValue::Integer(big).sort_cmp(&as_number), Ordering::Equal);
        assert_eq!(
            CellValue::Integer(3).sort_cmp(&CellValue::Number(2.5)),
            Ordering::Greater
        );
        assert_eq!(
            CellValue::Integer(-3).sort_cmp(&CellValue::Number(-2.5)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Integer(i64::MAX).sort_cmp(&CellValue::Number(f64::INFINITY)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Number(-0.0).sort_cmp(&CellValue::Number(0.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn mixed_numbers_sort_consistently() {
        let big = 1_i64 << 53;
        let mut values = vec![
            CellValue::Integer(big + 1),
            CellValue::Number(big as f64),
            CellValue::Integer(big),
            CellValue::Number(f64::NAN),
            CellValue::Integer(big - 1),
        ];
        values.sort_by(CellValue::sort_cmp);
        assert_eq!(values[0], CellValue::Integer(big - 1));
        assert_eq!(values[3], CellValue::Integer(big + 1));
        assert!(matches!(values[4], CellValue::Number(n) if n.is_nan()));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&CellValue::Integer(7)).unwrap();
        assert_eq!(json, r#"{"kind":"Integer","value":7}"#);
        let round: CellValue = serde_json::from_str(&json).unwrap();
        assert_eq!(round, CellValue::Integer(7));
    }
}

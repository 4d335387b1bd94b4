use chrono::{Datelike, NaiveDate};

use crate::{
    error::TypeMismatchError,
    record::{Field, Kind, Value},
};

/// Day, abbreviated English month, two-digit year: `21-Oct-14`.
pub const QUOTE_DATE_FORMAT: &str = "%d-%b-%y";

/// Two-digit years `69`-`99` belong to the 1900s, `00`-`68` to the 2000s.
/// Whitespace anywhere in the cell is rejected.
pub fn parse_quote_date(value: &str) -> Option<NaiveDate> {
    if value.chars().any(char::is_whitespace) {
        return None;
    }
    let date = NaiveDate::parse_from_str(value, QUOTE_DATE_FORMAT).ok()?;
    if date.year() == 2069 {
        date.with_year(1969)
    } else {
        Some(date)
    }
}

pub fn parse_value(value: &str, kind: Kind) -> Option<Value> {
    match kind {
        Kind::String => Some(Value::String(value.to_string())),
        Kind::SignedInt => value.parse::<i64>().ok().map(Value::SignedInt),
        Kind::UnsignedInt if value.starts_with('+') => None,
        Kind::UnsignedInt => value.parse::<u64>().ok().map(Value::UnsignedInt),
        Kind::Float => value.parse::<f64>().ok().map(Value::Float),
        Kind::Date => parse_quote_date(value).map(Value::Date),
        Kind::Ignored => None,
    }
}

/// Coerces `value` into `field` of `record`.
///
/// On failure the field is left as it was and the returned error carries
/// `row` 0 and `column` 0; the row decoder fills in the position.
pub fn coerce<T>(value: &str, field: &Field<T>, record: &mut T) -> Result<(), TypeMismatchError> {
    if field.kind == Kind::Ignored {
        return Ok(());
    }
    let stored = parse_value(value, field.kind)
        .map(|parsed| field.set(record, parsed))
        .unwrap_or(false);
    if stored { Ok(()) } else { Err(mismatch(value, field)) }
}

pub(crate) fn mismatch<T>(value: &str, field: &Field<T>) -> TypeMismatchError {
    TypeMismatchError {
        value: value.to_string(),
        type_name: field.type_name,
        field: field.name,
        row: 0,
        column: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, Record};

    #[derive(Debug, Default, PartialEq)]
    struct Nested {
        label: String,
    }

    impl FieldValue for Nested {
        const KIND: Kind = Kind::Ignored;

        fn from_value(_value: Value) -> Option<Self> {
            None
        }
    }

    #[derive(Debug, Default)]
    struct Row {
        name: String,
        count: u32,
        delta: i64,
        price: f64,
        ratio: f32,
        day: NaiveDate,
        meta: Nested,
    }

    crate::impl_record!(Row {
        "Name" => name: String,
        "Count" => count: u32,
        "Delta" => delta: i64,
        "Price" => price: f64,
        "Ratio" => ratio: f32,
        "Day" => day: NaiveDate,
        "Meta" => meta: Nested,
    });

    fn field(name: &str) -> Field<Row> {
        Row::fields()
            .into_iter()
            .find(|f| f.name == name)
            .expect("field declared")
    }

    #[test]
    fn parse_quote_date_expands_two_digit_years() {
        assert_eq!(
            parse_quote_date("21-Oct-14"),
            NaiveDate::from_ymd_opt(2014, 10, 21)
        );
        assert_eq!(
            parse_quote_date("2-Jan-06"),
            NaiveDate::from_ymd_opt(2006, 1, 2)
        );
        assert!(parse_quote_date("2014-10-21").is_none());
        assert!(parse_quote_date("31-Feb-14").is_none());
    }

    #[test]
    fn parse_quote_date_pivots_at_sixty_nine() {
        assert_eq!(parse_quote_date("1-Jan-68"), NaiveDate::from_ymd_opt(2068, 1, 1));
        assert_eq!(parse_quote_date("1-Jan-69"), NaiveDate::from_ymd_opt(1969, 1, 1));
        assert_eq!(parse_quote_date("31-Dec-99"), NaiveDate::from_ymd_opt(1999, 12, 31));
    }

    #[test]
    fn parse_quote_date_rejects_whitespace() {
        assert!(parse_quote_date(" 21-Oct-14").is_none());
        assert!(parse_quote_date("21-Oct-14 ").is_none());
        assert!(parse_quote_date("21- Oct-14").is_none());
    }

    #[test]
    fn parse_value_dispatches_by_kind() {
        assert_eq!(
            parse_value("24.90", Kind::String),
            Some(Value::String("24.90".into()))
        );
        assert_eq!(parse_value("-7", Kind::SignedInt), Some(Value::SignedInt(-7)));
        assert_eq!(parse_value("-7", Kind::UnsignedInt), None);
        assert_eq!(parse_value("44253", Kind::UnsignedInt), Some(Value::UnsignedInt(44253)));
        assert_eq!(parse_value("+5", Kind::UnsignedInt), None);
        assert_eq!(parse_value("+5", Kind::SignedInt), Some(Value::SignedInt(5)));
        assert_eq!(parse_value("24.22", Kind::Float), Some(Value::Float(24.22)));
        assert_eq!(parse_value("-", Kind::Float), None);
        assert_eq!(parse_value("anything", Kind::Ignored), None);
    }

    #[test]
    fn coerce_assigns_on_success() {
        let mut row = Row::default();
        coerce("ACME", &field("Name"), &mut row).unwrap();
        coerce("12", &field("Count"), &mut row).unwrap();
        coerce("-3", &field("Delta"), &mut row).unwrap();
        coerce("1.5", &field("Price"), &mut row).unwrap();
        coerce("0.25", &field("Ratio"), &mut row).unwrap();
        coerce("20-Oct-14", &field("Day"), &mut row).unwrap();
        assert_eq!(row.name, "ACME");
        assert_eq!(row.count, 12);
        assert_eq!(row.delta, -3);
        assert_eq!(row.price, 1.5);
        assert_eq!(row.ratio, 0.25);
        assert_eq!(row.day, NaiveDate::from_ymd_opt(2014, 10, 20).unwrap());
    }

    #[test]
    fn coerce_reports_mismatch_and_keeps_default() {
        let mut row = Row::default();
        let err = coerce("-", &field("Price"), &mut row).unwrap_err();
        assert_eq!(err.value, "-");
        assert_eq!(err.type_name, "f64");
        assert_eq!(err.field, "Price");
        assert_eq!(row.price, 0.0);

        let err = coerce("5000000000", &field("Count"), &mut row).unwrap_err();
        assert_eq!(err.type_name, "u32");
        assert_eq!(row.count, 0);

        assert!(coerce("", &field("Delta"), &mut row).is_err());
        assert!(coerce("Oct 21, 2014", &field("Day"), &mut row).is_err());
    }

    #[test]
    fn ignored_kind_is_a_silent_no_op() {
        let mut row = Row::default();
        coerce("whatever", &field("Meta"), &mut row).unwrap();
        assert_eq!(row.meta, Nested::default());
    }
}

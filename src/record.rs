//! Record types and their declarative field-mapping tables.
//!
//! A destination type opts into decoding by implementing [`Record`], usually
//! through [`impl_record!`](crate::impl_record). The mapping table pairs the
//! external column name of each field (e.g. `Open`) with its coercion [`Kind`]
//! and a typed setter, so the decoder never inspects types at runtime.

use std::{any::type_name, collections::HashSet, fmt};

use chrono::NaiveDate;

use crate::{error::DecodeError, header::normalize_header};

/// Coercion category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    SignedInt,
    UnsignedInt,
    Float,
    Date,
    Ignored,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Kind::String => "string",
            Kind::SignedInt => "signed integer",
            Kind::UnsignedInt => "unsigned integer",
            Kind::Float => "float",
            Kind::Date => "date",
            Kind::Ignored => "ignored",
        };
        f.write_str(label)
    }
}

/// A single cell after coercion, before it is stored into a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f64),
    Date(NaiveDate),
}

/// Rust types that may back a record field.
///
/// `from_value` returns `None` when the coerced value cannot be represented,
/// e.g. an unsigned value that overflows a `u8` field. Implementations with
/// [`Kind::Ignored`] are matched by name but never written.
pub trait FieldValue: Sized {
    const KIND: Kind;

    fn from_value(value: Value) -> Option<Self>;
}

impl FieldValue for String {
    const KIND: Kind = Kind::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! signed_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                const KIND: Kind = Kind::SignedInt;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::SignedInt(i) => <$ty>::try_from(i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! unsigned_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                const KIND: Kind = Kind::UnsignedInt;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::UnsignedInt(u) => <$ty>::try_from(u).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

signed_field_value!(i8, i16, i32, i64, isize);
unsigned_field_value!(u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl FieldValue for f32 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f as f32),
            _ => None,
        }
    }
}

impl FieldValue for NaiveDate {
    const KIND: Kind = Kind::Date;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl<F: FieldValue> FieldValue for Option<F> {
    const KIND: Kind = F::KIND;

    fn from_value(value: Value) -> Option<Self> {
        F::from_value(value).map(Some)
    }
}

/// Stores `value` into `slot`, returning `false` if it does not fit.
pub fn assign<F: FieldValue>(slot: &mut F, value: Value) -> bool {
    match F::from_value(value) {
        Some(converted) => {
            *slot = converted;
            true
        }
        None => false,
    }
}

pub type Setter<T> = fn(&mut T, Value) -> bool;

/// One entry of a record's mapping table.
pub struct Field<T> {
    pub name: &'static str,
    pub kind: Kind,
    pub type_name: &'static str,
    pub setter: Setter<T>,
}

impl<T> Field<T> {
    pub fn new(name: &'static str, kind: Kind, type_name: &'static str, setter: Setter<T>) -> Self {
        Self {
            name,
            kind,
            type_name,
            setter,
        }
    }

    /// Builds an entry whose kind and type name come from the field type `F`.
    pub fn of<F: FieldValue>(name: &'static str, setter: Setter<T>) -> Self {
        Self::new(name, F::KIND, type_name::<F>(), setter)
    }

    pub fn set(&self, record: &mut T, value: Value) -> bool {
        (self.setter)(record, value)
    }
}

// Manual impls: the derives would require `T: Clone`.
impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A structured type that rows can be decoded into.
///
/// Every decoded row starts from `Default::default()`, so fields without a
/// matching column keep their default value.
pub trait Record: Default + Sized {
    fn fields() -> Vec<Field<Self>>;
}

/// Checks the mapping table of `T` before any input is consumed.
pub fn validate_fields<T: Record>() -> Result<Vec<Field<T>>, DecodeError> {
    let record = type_name::<T>();
    let fields = T::fields();
    if fields.is_empty() {
        return Err(DecodeError::Configuration {
            record,
            reason: "record declares no fields".to_string(),
        });
    }
    let mut seen = HashSet::with_capacity(fields.len());
    for field in &fields {
        if field.name.is_empty() {
            return Err(DecodeError::Configuration {
                record,
                reason: "field name is empty".to_string(),
            });
        }
        // A header only reaches a field whose name is its own normal form.
        if normalize_header(field.name) != field.name {
            return Err(DecodeError::Configuration {
                record,
                reason: format!("field '{}' can never match a header", field.name),
            });
        }
        if !seen.insert(field.name) {
            return Err(DecodeError::Configuration {
                record,
                reason: format!("field '{}' is declared more than once", field.name),
            });
        }
    }
    Ok(fields)
}

/// Implements [`Record`] from a list of `"Column" => field: Type` entries.
///
/// ```
/// use chrono::NaiveDate;
/// use csv_quotes::impl_record;
///
/// #[derive(Debug, Default)]
/// struct Bar {
///     date: NaiveDate,
///     close: f64,
/// }
///
/// impl_record!(Bar {
///     "Date" => date: NaiveDate,
///     "Close" => close: f64,
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($record:ty { $($column:literal => $field:ident : $field_ty:ty),* $(,)? }) => {
        impl $crate::record::Record for $record {
            fn fields() -> ::std::vec::Vec<$crate::record::Field<Self>> {
                ::std::vec![
                    $({
                        fn setter(record: &mut $record, value: $crate::record::Value) -> bool {
                            $crate::record::assign::<$field_ty>(&mut record.$field, value)
                        }
                        $crate::record::Field::of::<$field_ty>($column, setter)
                    }),*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sample {
        name: String,
        small: u8,
        delta: Option<i32>,
    }

    crate::impl_record!(Sample {
        "Name" => name: String,
        "Small" => small: u8,
        "Delta" => delta: Option<i32>,
    });

    #[derive(Debug, Default)]
    struct LowerCase {
        value: f64,
    }

    crate::impl_record!(LowerCase { "value" => value: f64 });

    #[derive(Debug, Default)]
    struct Duplicated {
        a: f64,
        b: f64,
    }

    crate::impl_record!(Duplicated {
        "Price" => a: f64,
        "Price" => b: f64,
    });

    #[test]
    fn macro_builds_fields_in_declaration_order() {
        let fields = Sample::fields();
        let names = fields.iter().map(|f| f.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["Name", "Small", "Delta"]);
        assert_eq!(fields[1].kind, Kind::UnsignedInt);
        assert_eq!(fields[2].kind, Kind::SignedInt);
        assert_eq!(fields[1].type_name, "u8");
    }

    #[test]
    fn setters_narrow_with_range_checks() {
        let fields = Sample::fields();
        let mut record = Sample::default();
        assert!(fields[1].set(&mut record, Value::UnsignedInt(200)));
        assert_eq!(record.small, 200);
        assert!(!fields[1].set(&mut record, Value::UnsignedInt(300)));
        assert_eq!(record.small, 200);
        assert!(fields[2].set(&mut record, Value::SignedInt(-4)));
        assert_eq!(record.delta, Some(-4));
        assert!(fields[0].set(&mut record, Value::String("abc".into())));
        assert_eq!(record.name, "abc");
    }

    #[derive(Debug, Default)]
    struct Uncased {
        high: f64,
        id: u64,
    }

    crate::impl_record!(Uncased {
        "52WeekHigh" => high: f64,
        "_id" => id: u64,
    });

    #[test]
    fn validate_rejects_unreachable_field_names() {
        let err = validate_fields::<LowerCase>().unwrap_err();
        assert!(matches!(err, DecodeError::Configuration { .. }));
        assert!(err.to_string().contains("field 'value' can never match a header"));
    }

    #[test]
    fn validate_accepts_names_without_a_letter_case() {
        let fields = validate_fields::<Uncased>().unwrap();
        let names = fields.iter().map(|f| f.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["52WeekHigh", "_id"]);
    }

    #[test]
    fn validate_rejects_duplicate_field_names() {
        let err = validate_fields::<Duplicated>().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn validate_accepts_well_formed_table() {
        assert_eq!(validate_fields::<Sample>().unwrap().len(), 3);
    }
}

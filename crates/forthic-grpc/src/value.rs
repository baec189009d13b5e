//! The stack value model exchanged with a remote Forthic runtime.
//!
//! A [`StackValue`] is a closed, recursive tagged union. Accessors are weakly
//! typed: asking for the payload of a variant that is not active returns that
//! payload's default (`0`, `""`, `false`, `0.0`, empty collection) instead of
//! failing. Callers on both sides of the C boundary rely on this.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as JsonValue;

/// Numeric tag of the active [`StackValue`] variant.
///
/// The discriminants are part of the C ABI and must not change.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackValueType {
    Null = 0,
    Int = 1,
    String = 2,
    Bool = 3,
    Float = 4,
    Array = 5,
    Record = 6,
    Instant = 7,
    PlainDate = 8,
    ZonedDateTime = 9,
}

/// A UTC point in time with nanosecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instant {
    pub seconds: i64,
    pub nanos: i32,
}

impl Instant {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }
}

/// A calendar date with no time of day and no zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlainDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PlainDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// An instant observed in a named IANA time zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ZonedDateTime {
    pub instant: Instant,
    pub timezone: String,
}

impl ZonedDateTime {
    pub fn new(instant: Instant, timezone: impl Into<String>) -> Self {
        Self {
            instant,
            timezone: timezone.into(),
        }
    }
}

/// A value on a Forthic stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StackValue {
    #[default]
    Null,
    Int(i64),
    String(String),
    Bool(bool),
    Float(f64),
    Array(Vec<StackValue>),
    Record(BTreeMap<String, StackValue>),
    Instant(Instant),
    PlainDate(PlainDate),
    ZonedDateTime(ZonedDateTime),
}

impl StackValue {
    pub fn value_type(&self) -> StackValueType {
        match self {
            StackValue::Null => StackValueType::Null,
            StackValue::Int(_) => StackValueType::Int,
            StackValue::String(_) => StackValueType::String,
            StackValue::Bool(_) => StackValueType::Bool,
            StackValue::Float(_) => StackValueType::Float,
            StackValue::Array(_) => StackValueType::Array,
            StackValue::Record(_) => StackValueType::Record,
            StackValue::Instant(_) => StackValueType::Instant,
            StackValue::PlainDate(_) => StackValueType::PlainDate,
            StackValue::ZonedDateTime(_) => StackValueType::ZonedDateTime,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StackValue::Null)
    }

    pub fn int_value(&self) -> i64 {
        match self {
            StackValue::Int(value) => *value,
            _ => 0,
        }
    }

    pub fn string_value(&self) -> &str {
        match self {
            StackValue::String(value) => value,
            _ => "",
        }
    }

    pub fn bool_value(&self) -> bool {
        match self {
            StackValue::Bool(value) => *value,
            _ => false,
        }
    }

    pub fn float_value(&self) -> f64 {
        match self {
            StackValue::Float(value) => *value,
            _ => 0.0,
        }
    }

    /// Borrowed view of the array items; empty for any other variant.
    pub fn array_items(&self) -> &[StackValue] {
        match self {
            StackValue::Array(items) => items,
            _ => &[],
        }
    }

    /// Borrowed view of the record fields; `None` for any other variant.
    pub fn record_fields(&self) -> Option<&BTreeMap<String, StackValue>> {
        match self {
            StackValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn instant_value(&self) -> Instant {
        match self {
            StackValue::Instant(value) => *value,
            _ => Instant::default(),
        }
    }

    pub fn plain_date_value(&self) -> PlainDate {
        match self {
            StackValue::PlainDate(value) => *value,
            _ => PlainDate::default(),
        }
    }

    pub fn zoned_datetime_value(&self) -> Option<&ZonedDateTime> {
        match self {
            StackValue::ZonedDateTime(value) => Some(value),
            _ => None,
        }
    }

    /// Build a value from JSON.
    ///
    /// Objects become records. Integers that fit in `i64` become `Int`, every
    /// other number becomes `Float`.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => StackValue::Null,
            JsonValue::Bool(value) => StackValue::Bool(*value),
            JsonValue::Number(number) => match number.as_i64() {
                Some(value) => StackValue::Int(value),
                None => StackValue::Float(number.as_f64().unwrap_or_default()),
            },
            JsonValue::String(value) => StackValue::String(value.clone()),
            JsonValue::Array(items) => {
                StackValue::Array(items.iter().map(StackValue::from_json).collect())
            }
            JsonValue::Object(fields) => StackValue::Record(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), StackValue::from_json(value)))
                    .collect(),
            ),
        }
    }
}

/// Parse a JSON document into a stack.
///
/// A top-level array is spread into one stack entry per element; any other
/// document becomes a single-entry stack.
pub fn stack_from_json(text: &str) -> Result<Vec<StackValue>, serde_json::Error> {
    let json: JsonValue = serde_json::from_str(text)?;
    Ok(match json {
        JsonValue::Array(items) => items.iter().map(StackValue::from_json).collect(),
        other => vec![StackValue::from_json(&other)],
    })
}

impl From<i64> for StackValue {
    fn from(value: i64) -> Self {
        StackValue::Int(value)
    }
}

impl From<bool> for StackValue {
    fn from(value: bool) -> Self {
        StackValue::Bool(value)
    }
}

impl From<f64> for StackValue {
    fn from(value: f64) -> Self {
        StackValue::Float(value)
    }
}

impl From<&str> for StackValue {
    fn from(value: &str) -> Self {
        StackValue::String(value.to_string())
    }
}

impl From<String> for StackValue {
    fn from(value: String) -> Self {
        StackValue::String(value)
    }
}

impl From<Vec<StackValue>> for StackValue {
    fn from(items: Vec<StackValue>) -> Self {
        StackValue::Array(items)
    }
}

impl From<Instant> for StackValue {
    fn from(value: Instant) -> Self {
        StackValue::Instant(value)
    }
}

impl From<PlainDate> for StackValue {
    fn from(value: PlainDate) -> Self {
        StackValue::PlainDate(value)
    }
}

impl From<ZonedDateTime> for StackValue {
    fn from(value: ZonedDateTime) -> Self {
        StackValue::ZonedDateTime(value)
    }
}

impl fmt::Display for StackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackValue::Null => f.write_str("NULL"),
            StackValue::Int(value) => write!(f, "{value}"),
            StackValue::String(value) => write!(f, "{value:?}"),
            StackValue::Bool(true) => f.write_str("TRUE"),
            StackValue::Bool(false) => f.write_str("FALSE"),
            StackValue::Float(value) => write!(f, "{value:?}"),
            StackValue::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            StackValue::Record(fields) => {
                f.write_str("{")?;
                for (index, (key, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
            StackValue::Instant(instant) => {
                write!(f, "INSTANT({}.{:09})", instant.seconds, instant.nanos)
            }
            StackValue::PlainDate(date) => {
                write!(f, "{:04}-{:02}-{:02}", date.year, date.month, date.day)
            }
            StackValue::ZonedDateTime(zoned) => write!(
                f,
                "INSTANT({}.{:09})[{}]",
                zoned.instant.seconds, zoned.instant.nanos, zoned.timezone
            ),
        }
    }
}

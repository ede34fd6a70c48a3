//! Field values and per-field live state.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use zendulge_domain::OperatingHours;

use super::descriptor::FieldDescriptor;
use super::error::FormError;
use super::validation::{ValidationError, Validator, NUMERIC_MESSAGE, REQUIRED_MESSAGE};

/// Supported data kinds for form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Number,
    List,
    Hours,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::Text => "text",
            FieldKind::Flag => "a yes/no flag",
            FieldKind::Number => "a number",
            FieldKind::List => "a list",
            FieldKind::Hours => "opening hours",
        };
        f.write_str(label)
    }
}

/// Current value of a form field. The variant of a field's default value
/// fixes the kind the field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(Option<f64>),
    List(Vec<String>),
    Hours(OperatingHours),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn empty_text() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::List(_) => FieldKind::List,
            FieldValue::Hours(_) => FieldKind::Hours,
        }
    }

    /// Blank text, an unchecked flag, a missing number or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(flag) => !flag,
            FieldValue::Number(number) => number.is_none(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Hours(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => *number,
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_hours(&self) -> Option<&OperatingHours> {
        match self {
            FieldValue::Hours(hours) => Some(hours),
            _ => None,
        }
    }

    /// JSON form sent to the backend. Text is trimmed and whole numbers are
    /// emitted as integers so integer payload fields deserialize.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.trim().to_string()),
            FieldValue::Flag(flag) => Value::Bool(*flag),
            FieldValue::Number(None) => Value::Null,
            FieldValue::Number(Some(number)) => number_to_json(*number),
            FieldValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Hours(hours) => serde_json::to_value(hours).unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(Some(value))
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<OperatingHours> for FieldValue {
    fn from(value: OperatingHours) -> Self {
        FieldValue::Hours(value)
    }
}

fn number_to_json(number: f64) -> Value {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::Number(Number::from(number as i64))
    } else {
        Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// One form field's live state.
#[derive(Clone)]
pub struct FieldState {
    pub value: FieldValue,
    pub default_value: FieldValue,
    pub required: bool,
    validator: Validator,
}

impl FieldState {
    pub fn new(descriptor: &FieldDescriptor) -> Self {
        Self {
            value: descriptor.default.clone(),
            default_value: descriptor.default.clone(),
            required: descriptor.required,
            validator: descriptor.validator.clone(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.default_value.kind()
    }

    /// Required-and-empty first, then the declared validator.
    pub fn validate(&self) -> Option<ValidationError> {
        if self.required && self.value.is_empty() {
            return Some(ValidationError::new(REQUIRED_MESSAGE));
        }
        // NaN and infinities have no JSON form.
        if let FieldValue::Number(Some(number)) = &self.value {
            if !number.is_finite() {
                return Some(ValidationError::new(NUMERIC_MESSAGE));
            }
        }
        self.validator.validate(&self.value).err()
    }

    pub fn is_dirty(&self) -> bool {
        self.value != self.default_value
    }

    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
    }
}

impl fmt::Debug for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldState")
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Snapshot of every field value, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new(values: BTreeMap<String, FieldValue>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Trimmed text value, empty when missing or not text.
    pub fn text(&self, key: &str) -> &str {
        self.get(key)
            .and_then(FieldValue::as_text)
            .map(str::trim)
            .unwrap_or_default()
    }

    /// Text value or `None` when blank.
    pub fn optional_text(&self, key: &str) -> Option<String> {
        let text = self.text(key);
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.get(key)
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
    }

    pub fn hours(&self, key: &str) -> Option<&OperatingHours> {
        self.get(key).and_then(FieldValue::as_hours)
    }

    /// Flattens the values into a JSON object keyed by field name.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Projects the values into a typed payload.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        serde_json::from_value(self.to_json()).map_err(|err| FormError::Payload(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness_follows_kind() {
        assert!(FieldValue::text("   ").is_empty());
        assert!(!FieldValue::text("a").is_empty());
        assert!(FieldValue::Flag(false).is_empty());
        assert!(FieldValue::Number(None).is_empty());
        assert!(!FieldValue::Number(Some(0.0)).is_empty());
        assert!(FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::Hours(OperatingHours::default()).is_empty());
    }

    #[test]
    fn infinite_numbers_fail_without_a_validator() {
        let descriptor = FieldDescriptor::new(
            "quantity",
            "Quantity",
            FieldValue::Number(None),
            Validator::None,
        )
        .with_optional();
        let mut state = FieldState::new(&descriptor);
        assert_eq!(state.validate(), None);

        state.value = FieldValue::from(f64::INFINITY);
        assert_eq!(
            state.validate().map(|error| error.message),
            Some(NUMERIC_MESSAGE.to_string())
        );
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        assert_eq!(FieldValue::from(60.0).to_json(), serde_json::json!(60));
        assert_eq!(FieldValue::from(12.5).to_json(), serde_json::json!(12.5));
        assert_eq!(FieldValue::Number(None).to_json(), Value::Null);
    }

    #[test]
    fn values_flatten_into_json_object() {
        let mut values = FormValues::default();
        values.insert("name", FieldValue::text("  Day Spa "));
        values.insert("isActive", FieldValue::Flag(true));
        values.insert("siteIds", FieldValue::List(vec!["a".into()]));

        let json = values.to_json();
        assert_eq!(json["name"], "Day Spa");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["siteIds"][0], "a");
        assert_eq!(values.text("name"), "Day Spa");
        assert_eq!(values.text("missing"), "");
    }
}

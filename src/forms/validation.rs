//! Validation rules, field error collections and cross-field checks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::field::{FieldValue, FormValues};

/// Message reported for a required field left empty.
pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const NUMERIC_MESSAGE: &str = "Enter a numeric value";

/// Australian states and territories accepted in address fields.
pub const AU_STATES: [&str; 8] = ["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\+61|0)[2-478]\d{8}$").expect("phone pattern compiles"));
static POSTCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("postcode pattern compiles"));
static ABN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").expect("abn pattern compiles"));
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+(?:/\S*)?$")
        .expect("url pattern compiles")
});

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Failures keyed by field name. An absent key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, ValidationError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, error: ValidationError) {
        self.0.insert(key.into(), error);
    }

    pub fn remove(&mut self, key: &str) -> Option<ValidationError> {
        self.0.remove(key)
    }

    /// Inserts on failure, removes on success.
    pub fn record(&mut self, key: &str, outcome: Option<ValidationError>) {
        match outcome {
            Some(error) => self.insert(key, error),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ValidationError> {
        self.0.get(key)
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.get(key).map(|error| error.message.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
        self.0.iter().map(|(key, error)| (key.as_str(), error))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Plain `field -> message` map for rendering.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(key, error)| (key.clone(), error.message.clone()))
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(key, error)| format!("{}: {}", key, error.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

type ValidatorCallback = dyn Fn(&FieldValue) -> Option<String> + Send + Sync;
type SharedValidatorCallback = Arc<ValidatorCallback>;

/// Built-in validation rules. Built-ins accept empty values; emptiness is the
/// business of the `required` flag. `Custom` always runs.
#[derive(Clone)]
pub enum Validator {
    None,
    Pattern { regex: Regex, message: String },
    Email,
    Phone,
    Postcode,
    Abn,
    Url,
    Time,
    Date,
    OneOf(Vec<String>),
    MinLength(usize),
    MaxLength(usize),
    Range { min: f64, max: f64 },
    WholeNumber,
    Hours,
    All(Vec<Validator>),
    Custom(SharedValidatorCallback),
}

impl Validator {
    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Validator::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn one_of<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::OneOf(options.into_iter().map(Into::into).collect())
    }

    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(func))
    }

    pub fn validate(&self, value: &FieldValue) -> Result<(), ValidationError> {
        match self {
            Validator::None => Ok(()),
            Validator::Custom(func) => match func(value) {
                Some(message) => Err(ValidationError::new(message)),
                None => Ok(()),
            },
            Validator::All(rules) => rules.iter().try_for_each(|rule| rule.validate(value)),
            _ if value.is_empty() => Ok(()),
            Validator::Pattern { regex, message } => {
                let text = expect_text(value)?;
                if regex.is_match(text) {
                    Ok(())
                } else {
                    Err(ValidationError::new(message.clone()))
                }
            }
            Validator::Email => {
                let text = expect_text(value)?;
                if EMAIL_RE.is_match(text) {
                    Ok(())
                } else {
                    Err(ValidationError::new("Enter a valid email address"))
                }
            }
            Validator::Phone => {
                let text = expect_text(value)?;
                let compact: String = text
                    .chars()
                    .filter(|ch| !ch.is_whitespace() && !matches!(ch, '-' | '(' | ')'))
                    .collect();
                if PHONE_RE.is_match(&compact) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        "Enter a valid Australian phone number (e.g., 0412 345 678)",
                    ))
                }
            }
            Validator::Postcode => {
                let text = expect_text(value)?;
                if POSTCODE_RE.is_match(text) {
                    Ok(())
                } else {
                    Err(ValidationError::new("Postcode must be 4 digits"))
                }
            }
            Validator::Abn => {
                let text = expect_text(value)?;
                let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
                if ABN_RE.is_match(&compact) {
                    Ok(())
                } else {
                    Err(ValidationError::new("ABN must be 11 digits"))
                }
            }
            Validator::Url => {
                let text = expect_text(value)?;
                if URL_RE.is_match(text) {
                    Ok(())
                } else {
                    Err(ValidationError::new("Enter a valid website address"))
                }
            }
            Validator::Time => {
                let text = expect_text(value)?;
                parse_time(text)
                    .map(|_| ())
                    .ok_or_else(|| ValidationError::new("Use 24-hour HH:MM format"))
            }
            Validator::Date => {
                let text = expect_text(value)?;
                parse_date(text)
                    .map(|_| ())
                    .ok_or_else(|| ValidationError::new("Use YYYY-MM-DD format"))
            }
            Validator::OneOf(options) => {
                let normalized = expect_text(value)?.to_lowercase();
                if options
                    .iter()
                    .any(|candidate| candidate.to_lowercase() == normalized)
                {
                    Ok(())
                } else {
                    Err(ValidationError::new(format!(
                        "Value must be one of: {}",
                        options.join(", ")
                    )))
                }
            }
            Validator::MinLength(min) => {
                let count = expect_text(value)?.chars().count();
                if count >= *min {
                    Ok(())
                } else {
                    Err(ValidationError::new(format!(
                        "Must be at least {} characters",
                        min
                    )))
                }
            }
            Validator::MaxLength(max) => {
                let count = expect_text(value)?.chars().count();
                if count <= *max {
                    Ok(())
                } else {
                    Err(ValidationError::new(format!(
                        "Cannot exceed {} characters (got {})",
                        max, count
                    )))
                }
            }
            Validator::Range { min, max } => {
                let number = expect_number(value)?;
                if number < *min || number > *max {
                    Err(ValidationError::new(format!(
                        "Enter a value between {} and {}",
                        format_number(*min),
                        format_number(*max)
                    )))
                } else {
                    Ok(())
                }
            }
            Validator::WholeNumber => {
                let number = expect_number(value)?;
                if number.fract() == 0.0 {
                    Ok(())
                } else {
                    Err(ValidationError::new("Enter a whole number"))
                }
            }
            Validator::Hours => match value {
                FieldValue::Hours(hours) => {
                    for (day, window) in hours.iter() {
                        if window.is_closed {
                            continue;
                        }
                        let open = window.open.trim();
                        let close = window.close.trim();
                        if open.is_empty() || close.is_empty() {
                            return Err(ValidationError::new(format!(
                                "{}: opening and closing times are required",
                                day
                            )));
                        }
                        let (Some(open), Some(close)) = (parse_time(open), parse_time(close))
                        else {
                            return Err(ValidationError::new(format!(
                                "{}: use 24-hour HH:MM times",
                                day
                            )));
                        };
                        if close <= open {
                            return Err(ValidationError::new(format!(
                                "{}: closing time must be after opening time",
                                day
                            )));
                        }
                    }
                    Ok(())
                }
                _ => Err(ValidationError::new("Expected opening hours")),
            },
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Pattern { regex, .. } => write!(f, "Pattern({})", regex.as_str()),
            Validator::OneOf(options) => write!(f, "OneOf({:?})", options),
            Validator::MinLength(min) => write!(f, "MinLength({})", min),
            Validator::MaxLength(max) => write!(f, "MaxLength({})", max),
            Validator::Range { min, max } => write!(f, "Range({}..={})", min, max),
            Validator::All(rules) => f.debug_tuple("All").field(rules).finish(),
            Validator::Custom(_) => f.write_str("Custom"),
            other => f.write_str(other.name()),
        }
    }
}

impl Validator {
    fn name(&self) -> &'static str {
        match self {
            Validator::None => "None",
            Validator::Email => "Email",
            Validator::Phone => "Phone",
            Validator::Postcode => "Postcode",
            Validator::Abn => "Abn",
            Validator::Url => "Url",
            Validator::Time => "Time",
            Validator::Date => "Date",
            Validator::WholeNumber => "WholeNumber",
            Validator::Hours => "Hours",
            Validator::Pattern { .. } => "Pattern",
            Validator::OneOf(_) => "OneOf",
            Validator::MinLength(_) => "MinLength",
            Validator::MaxLength(_) => "MaxLength",
            Validator::Range { .. } => "Range",
            Validator::All(_) => "All",
            Validator::Custom(_) => "Custom",
        }
    }
}

fn expect_text(value: &FieldValue) -> Result<&str, ValidationError> {
    value
        .as_text()
        .map(str::trim)
        .ok_or_else(|| ValidationError::new("Expected a text value"))
}

fn expect_number(value: &FieldValue) -> Result<f64, ValidationError> {
    value
        .as_number()
        .filter(|number| number.is_finite())
        .ok_or_else(|| ValidationError::new(NUMERIC_MESSAGE))
}

fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub(crate) fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

type RuleCallback = dyn Fn(&FormValues) -> Option<String> + Send + Sync;

/// A check on `target` that reads other field values. Evaluated only once
/// the target's own validation passes.
#[derive(Clone)]
pub struct CrossFieldRule {
    pub target: &'static str,
    pub depends_on: Vec<&'static str>,
    check: Arc<RuleCallback>,
}

impl CrossFieldRule {
    pub fn new<F>(target: &'static str, depends_on: Vec<&'static str>, check: F) -> Self
    where
        F: Fn(&FormValues) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            target,
            depends_on,
            check: Arc::new(check),
        }
    }

    pub fn involves(&self, key: &str) -> bool {
        self.target == key || self.depends_on.iter().any(|dep| *dep == key)
    }

    pub fn evaluate(&self, values: &FormValues) -> Option<ValidationError> {
        (self.check)(values).map(ValidationError::new)
    }
}

impl fmt::Debug for CrossFieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossFieldRule")
            .field("target", &self.target)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// `target` must equal `other` (password confirmation).
pub fn make_matches_rule(
    target: &'static str,
    other: &'static str,
    message: &'static str,
) -> CrossFieldRule {
    CrossFieldRule::new(target, vec![other], move |values| {
        (values.text(target) != values.text(other)).then(|| message.to_string())
    })
}

/// Number in `target` must be strictly below the number in `other`.
pub fn make_less_than_rule(
    target: &'static str,
    other: &'static str,
    message: &'static str,
) -> CrossFieldRule {
    CrossFieldRule::new(target, vec![other], move |values| {
        match (values.number(target), values.number(other)) {
            (Some(lower), Some(upper)) if lower >= upper => Some(message.to_string()),
            _ => None,
        }
    })
}

/// Date in `target` must not precede the date in `start`.
pub fn make_not_before_rule(
    target: &'static str,
    start: &'static str,
    message: &'static str,
) -> CrossFieldRule {
    CrossFieldRule::new(target, vec![start], move |values| {
        match (parse_date(values.text(target)), parse_date(values.text(start))) {
            (Some(end), Some(begin)) if end < begin => Some(message.to_string()),
            _ => None,
        }
    })
}

/// Password strength: minimum length plus at least one letter and one digit.
pub fn make_password_validator(min_len: usize) -> Validator {
    Validator::custom(move |value| {
        let text = value.as_text().unwrap_or_default();
        if text.is_empty() {
            return None;
        }
        if text.chars().count() < min_len {
            Some(format!("Password must be at least {} characters", min_len))
        } else if !text.chars().any(|ch| ch.is_ascii_digit())
            || !text.chars().any(|ch| ch.is_alphabetic())
        {
            Some("Password must contain letters and numbers".to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zendulge_domain::{DayHours, OperatingHours, Weekday};

    fn text(value: &str) -> FieldValue {
        FieldValue::text(value)
    }

    #[test]
    fn postcode_requires_four_digits() {
        assert!(Validator::Postcode.validate(&text("abcd")).is_err());
        assert!(Validator::Postcode.validate(&text("123")).is_err());
        assert!(Validator::Postcode.validate(&text("30000")).is_err());
        assert!(Validator::Postcode.validate(&text("3000")).is_ok());
    }

    #[test]
    fn builtins_accept_empty_values() {
        assert!(Validator::Email.validate(&text("")).is_ok());
        assert!(Validator::Postcode.validate(&text("  ")).is_ok());
        assert!(Validator::Range { min: 1.0, max: 2.0 }
            .validate(&FieldValue::Number(None))
            .is_ok());
    }

    #[test]
    fn range_rejects_nan() {
        let range = Validator::Range { min: 0.0, max: 100.0 };
        let err = range.validate(&FieldValue::Number(Some(f64::NAN))).unwrap_err();
        assert_eq!(err.message, NUMERIC_MESSAGE);
        assert!(range.validate(&FieldValue::Number(Some(42.0))).is_ok());
    }

    #[test]
    fn custom_runs_on_empty_values() {
        let validator = Validator::custom(|value| value.is_empty().then(|| "nope".to_string()));
        let err = validator.validate(&text("")).unwrap_err();
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn phone_ignores_spacing() {
        assert!(Validator::Phone.validate(&text("0412 345 678")).is_ok());
        assert!(Validator::Phone.validate(&text("+61 3 9876 5432")).is_ok());
        assert!(Validator::Phone.validate(&text("12345")).is_err());
    }

    #[test]
    fn one_of_is_case_insensitive() {
        let validator = Validator::one_of(AU_STATES);
        assert!(validator.validate(&text("vic")).is_ok());
        let err = validator.validate(&text("XYZ")).unwrap_err();
        assert!(err.message.starts_with("Value must be one of: ACT"));
    }

    #[test]
    fn range_and_whole_number_combine() {
        let validator = Validator::All(vec![
            Validator::Range {
                min: 5.0,
                max: 480.0,
            },
            Validator::WholeNumber,
        ]);
        assert!(validator.validate(&FieldValue::from(60.0)).is_ok());
        assert_eq!(
            validator.validate(&FieldValue::from(2.0)).unwrap_err().message,
            "Enter a value between 5 and 480"
        );
        assert_eq!(
            validator.validate(&FieldValue::from(60.5)).unwrap_err().message,
            "Enter a whole number"
        );
    }

    #[test]
    fn hours_reject_inverted_window() {
        let mut hours = OperatingHours::default();
        hours.set_day(Weekday::Tuesday, DayHours::open("18:00", "09:00"));
        let err = Validator::Hours
            .validate(&FieldValue::Hours(hours))
            .unwrap_err();
        assert_eq!(err.message, "Tuesday: closing time must be after opening time");
    }

    #[test]
    fn hours_require_times_for_open_days() {
        let mut hours = OperatingHours::uniform(DayHours::closed());
        hours.set_day(Weekday::Friday, DayHours::open("", "17:00"));
        let err = Validator::Hours
            .validate(&FieldValue::Hours(hours))
            .unwrap_err();
        assert_eq!(err.message, "Friday: opening and closing times are required");
    }

    #[test]
    fn password_rules() {
        let validator = make_password_validator(8);
        assert!(validator.validate(&text("short1")).is_err());
        assert!(validator.validate(&text("longenough")).is_err());
        assert!(validator.validate(&text("longenough1")).is_ok());
    }

    #[test]
    fn field_errors_record_inserts_and_clears() {
        let mut errors = FieldErrors::new();
        errors.record("name", Some(ValidationError::new(REQUIRED_MESSAGE)));
        assert_eq!(errors.message("name"), Some(REQUIRED_MESSAGE));
        errors.record("name", None);
        assert!(errors.is_empty());
    }
}

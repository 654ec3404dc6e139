//! Field constraint checks shared by the tool parameter validators.
//!
//! Every failure names the offending field and the violated rule, since the
//! message is returned to the caller verbatim.

use serde::{Deserialize, Deserializer, de};
use serde_json::Number;
use thiserror::Error;

/// Minimum length of a company id.
pub const COMPANY_ID_MIN_LEN: usize = 6;

/// Maximum number of entries in a `fields` projection list.
pub const MAX_FIELDS: usize = 30;

/// A caller-supplied value violates a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {rule}")]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: String,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: impl Into<String>) -> Self {
        Self {
            field,
            rule: rule.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// `value >= min`, returned as an unsigned integer.
pub fn at_least(field: &'static str, value: i64, min: i64) -> ValidationResult<u64> {
    if value < min {
        return Err(ValidationError::new(field, format!("must be >= {min}")));
    }
    u64::try_from(value).map_err(|_| ValidationError::new(field, format!("must be >= {min}")))
}

/// `min <= value <= max`.
pub fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> ValidationResult<u64> {
    let value = at_least(field, value, min)?;
    if value > max as u64 {
        return Err(ValidationError::new(field, format!("must be <= {max}")));
    }
    Ok(value)
}

/// Exactly `len` characters.
pub fn exact_chars(field: &'static str, value: &str, len: usize) -> ValidationResult<()> {
    if value.chars().count() != len {
        return Err(ValidationError::new(
            field,
            format!("must be exactly {len} characters"),
        ));
    }
    Ok(())
}

/// At least `min` characters.
pub fn min_chars(field: &'static str, value: &str, min: usize) -> ValidationResult<()> {
    if value.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}

/// Company ids are at least six of `[A-Za-z0-9_-]`.
pub fn is_company_id(value: &str) -> bool {
    value.len() >= COMPANY_ID_MIN_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn company_id(field: &'static str, value: &str) -> ValidationResult<()> {
    if !is_company_id(value) {
        return Err(ValidationError::new(
            field,
            "must match ^[A-Za-z0-9_-]{6,}$",
        ));
    }
    Ok(())
}

/// Sort key: `updated_at` ascending or `-updated_at` descending.
pub fn sort_key(field: &'static str, value: &str) -> ValidationResult<()> {
    if value != "updated_at" && value != "-updated_at" {
        return Err(ValidationError::new(field, "must match ^-?updated_at$"));
    }
    Ok(())
}

/// Between `min` and `max` entries.
pub fn item_count(field: &'static str, len: usize, min: usize, max: usize) -> ValidationResult<()> {
    if len < min {
        return Err(ValidationError::new(
            field,
            format!("must contain at least {min} item(s)"),
        ));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("must contain at most {max} items"),
        ));
    }
    Ok(())
}

/// Optional projection list of at most [`MAX_FIELDS`] names.
pub fn field_list(fields: Option<&[String]>) -> ValidationResult<()> {
    match fields {
        Some(fields) => item_count("fields", fields.len(), 0, MAX_FIELDS),
        None => Ok(()),
    }
}

/// Decode an integer parameter, also accepting whole-number floats such as
/// `25.0` that some clients emit for every JSON number.
pub fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    number_to_i64(Number::deserialize(deserializer)?)
}

/// [`whole_number`] for optional parameters; pair with `#[serde(default)]`.
pub fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Number>::deserialize(deserializer)?
        .map(number_to_i64)
        .transpose()
}

fn number_to_i64<E: de::Error>(number: Number) -> Result<i64, E> {
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(E::custom(format!("expected a whole number, got {number}"))),
    }
}

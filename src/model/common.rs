use serde::{Deserialize, Deserializer};

/// Database-assigned row identifier (`BIGSERIAL`).
pub type Id = i64;

/// Rejected request input, rendered to clients as a validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidInput(pub String);

impl InvalidInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One attribute of a partial update body.
///
/// A field that is absent from the JSON body deserializes to `Missing` (the
/// struct field must carry `#[serde(default)]`), anything else to `Present`.
/// Nullable attributes are modelled as `Field<Option<T>>` so that an explicit
/// `null` is distinguishable from an omitted key.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Missing,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Present)
    }
}

impl<T> Field<T> {
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Missing => None,
        }
    }

    /// Overwrite `slot` when the field was supplied; leave it untouched otherwise.
    pub fn apply_to(self, slot: &mut T) {
        if let Field::Present(value) = self {
            *slot = value;
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Present(value)
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), InvalidInput> {
    if value.trim().is_empty() {
        return Err(InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<(), InvalidInput> {
    if !value.is_finite() {
        return Err(InvalidInput(format!("{} must be a finite number", field)));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<(), InvalidInput> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(InvalidInput(format!("{} must be >= 0", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct SampleUpdate {
        #[serde(default)]
        name: Field<String>,
        #[serde(default)]
        date: Field<Option<String>>,
    }

    #[test]
    fn test_absent_key_is_missing() {
        let update: SampleUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update.name, Field::Missing);
        assert_eq!(update.date, Field::Missing);
    }

    #[test]
    fn test_explicit_null_is_present_none() {
        let update: SampleUpdate = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert_eq!(update.date, Field::Present(None));
        assert_eq!(update.name, Field::Missing);
    }

    #[test]
    fn test_null_for_required_field_is_rejected() {
        let result = serde_json::from_str::<SampleUpdate>(r#"{"name": null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_to_only_touches_present_fields() {
        let mut value = "before".to_string();
        Field::<String>::Missing.apply_to(&mut value);
        assert_eq!(value, "before");
        Field::Present("after".to_string()).apply_to(&mut value);
        assert_eq!(value, "after");
    }

    #[test]
    fn test_non_negative_rejects_nan_and_negatives() {
        assert!(require_non_negative("v", 0.0).is_ok());
        assert!(require_non_negative("v", -0.5).is_err());
        assert!(require_non_negative("v", f64::NAN).is_err());
        assert!(require_non_empty("name", "  ").is_err());
    }
}

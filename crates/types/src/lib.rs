//! Validated text primitives shared across the report workspace.
//!
//! Clinical state arrives from external stores as loosely-typed strings. The types here
//! make "present" and "absent" explicit so that downstream synthesis never has to guess
//! whether an empty string means "missing".

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Builds an optional value, mapping blank input to `None`.
    pub fn optional(input: impl AsRef<str>) -> Option<Self> {
        Self::new(input).ok()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Deserialises an optional text field, treating `null`, a missing key and blank strings
/// alike as `None`.
///
/// Use with `#[serde(default, deserialize_with = "report_types::blank_as_none")]`.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NonEmptyText>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.and_then(NonEmptyText::optional))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Registration {
        #[serde(default, deserialize_with = "blank_as_none")]
        number: Option<NonEmptyText>,
    }

    #[test]
    fn trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  GMC ").unwrap().as_str(), "GMC");
        assert!(matches!(NonEmptyText::new(" \t"), Err(TextError::Empty)));
        assert!(NonEmptyText::optional("").is_none());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let blank: Registration = serde_json::from_str(r#"{"number": "   "}"#).unwrap();
        assert!(blank.number.is_none());

        let missing: Registration = serde_json::from_str("{}").unwrap();
        assert!(missing.number.is_none());

        let null: Registration = serde_json::from_str(r#"{"number": null}"#).unwrap();
        assert!(null.number.is_none());

        let present: Registration = serde_json::from_str(r#"{"number": "1234567"}"#).unwrap();
        assert_eq!(present.number.unwrap().as_str(), "1234567");
    }

    #[test]
    fn required_text_rejects_blank_on_deserialise() {
        let err = serde_json::from_str::<NonEmptyText>(r#""  ""#).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}

use crate::impl_sqlx_for_string_domain_type;
use std::fmt::Display;

/// Two-letter country code (ISO 3166-1 alpha-2), always stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

#[derive(Debug, thiserror::Error)]
pub enum CountryCodeError {
    #[error("Country ISO2 code must be exactly 2 characters long, got {0}.")]
    InvalidLength(usize),
}

impl CountryCode {
    pub const LENGTH: usize = 2;

    pub fn parse(s: String) -> Result<Self, CountryCodeError> {
        let uppercased = s.to_uppercase();
        let char_count = uppercased.chars().count();

        if char_count != Self::LENGTH {
            return Err(CountryCodeError::InvalidLength(char_count));
        }

        Ok(Self(uppercased))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl serde::Serialize for CountryCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for CountryCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CountryCode::parse(s).map_err(serde::de::Error::custom)
    }
}

impl_sqlx_for_string_domain_type!(CountryCode);

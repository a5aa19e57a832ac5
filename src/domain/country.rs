use crate::domain::{CountryCode, CountryCodeError};
use std::fmt::Display;

/// A country known to the registry. The name is stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    code: CountryCode,
    name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CountryError {
    #[error(transparent)]
    InvalidCode(#[from] CountryCodeError),
    #[error("Country name cannot be empty.")]
    EmptyName,
}

impl Country {
    pub fn new(code: CountryCode, name: String) -> Result<Self, CountryError> {
        if name.is_empty() {
            return Err(CountryError::EmptyName);
        }

        Ok(Self {
            code,
            name: name.to_uppercase(),
        })
    }

    /// Build a country from its raw ISO2 code and name.
    pub fn parse(code: String, name: String) -> Result<Self, CountryError> {
        let code = CountryCode::parse(code)?;
        Self::new(code, name)
    }

    pub fn code(&self) -> &CountryCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

//! Structured 11-character bank identifier (SWIFT/BIC code).
//!
//! The code is positional:
//!
//! ```text
//! B P K O  P L  P W  X X X
//! └ bank ┘ └cc┘ └loc┘ └branch┘
//! └──── base code ────┘
//! ```
//!
//! A headquarters carries the reserved branch code `XXX`; its branches share
//! the same 8-character base code.

use crate::impl_sqlx_for_string_domain_type;
use std::fmt::Display;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BankIdentifier(String);

#[derive(Debug, thiserror::Error)]
pub enum BankIdentifierError {
    #[error("SWIFT code must be exactly 11 characters long, got {0}.")]
    InvalidLength(usize),
}

impl BankIdentifier {
    pub const LENGTH: usize = 11;
    pub const HEADQUARTERS_BRANCH_CODE: &'static str = "XXX";

    const INSTITUTION: Range<usize> = 0..4;
    const COUNTRY: Range<usize> = 4..6;
    const LOCATION: Range<usize> = 6..8;
    const BRANCH: Range<usize> = 8..11;
    const BASE: Range<usize> = 0..8;

    /// Parse a SWIFT code. The code is upper-cased before its length is checked.
    pub fn parse(s: String) -> Result<Self, BankIdentifierError> {
        let uppercased = s.to_uppercase();
        let char_count = uppercased.chars().count();

        if char_count != Self::LENGTH {
            return Err(BankIdentifierError::InvalidLength(char_count));
        }

        Ok(Self(uppercased))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn institution_code(&self) -> &str {
        self.segment(Self::INSTITUTION)
    }

    /// The ISO2 country code embedded at positions 4-5.
    pub fn country_code(&self) -> &str {
        self.segment(Self::COUNTRY)
    }

    pub fn location_code(&self) -> &str {
        self.segment(Self::LOCATION)
    }

    pub fn branch_code(&self) -> &str {
        self.segment(Self::BRANCH)
    }

    pub fn base_code(&self) -> &str {
        self.segment(Self::BASE)
    }

    pub fn is_headquarters(&self) -> bool {
        self.branch_code() == Self::HEADQUARTERS_BRANCH_CODE
    }

    pub fn shares_base_code(&self, other: &BankIdentifier) -> bool {
        self.base_code() == other.base_code()
    }

    /// Whether `self` is a branch of the headquarters identified by `headquarters`.
    pub fn is_branch_of(&self, headquarters: &BankIdentifier) -> bool {
        headquarters.is_headquarters() && self != headquarters && self.shares_base_code(headquarters)
    }

    // Positions are in characters; the length check in `parse` guarantees
    // every range is in bounds.
    fn segment(&self, range: Range<usize>) -> &str {
        let mut boundaries = self
            .0
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(self.0.len()));
        let start = boundaries.nth(range.start).unwrap_or(self.0.len());
        let end = boundaries
            .nth(range.end - range.start - 1)
            .unwrap_or(self.0.len());
        &self.0[start..end]
    }
}

impl AsRef<str> for BankIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for BankIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl serde::Serialize for BankIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for BankIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BankIdentifier::parse(s).map_err(serde::de::Error::custom)
    }
}

impl_sqlx_for_string_domain_type!(BankIdentifier);

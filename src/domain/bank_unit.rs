use crate::domain::{
    BankIdentifier, BankIdentifierError, Country, CountryCode, CountryCodeError, CountryError,
};

/// A bank headquarters or branch identified by its SWIFT code.
///
/// Values can only be obtained through the constructors, so a `BankUnit` always satisfies:
/// - the country code embedded in the SWIFT code equals the country's code
/// - a headquarters has the `XXX` branch code
/// - the bank name is not empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankUnit {
    identifier: BankIdentifier,
    country: Country,
    address: String,
    name: String,
    is_headquarter: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BankUnitError {
    #[error(transparent)]
    CountryCode(#[from] CountryCodeError),
    #[error(transparent)]
    Identifier(#[from] BankIdentifierError),
    #[error(transparent)]
    Country(#[from] CountryError),
    #[error(
        "SWIFT code and country ISO2 code mismatch: SWIFT code {identifier} belongs to {embedded}, not {declared}."
    )]
    CountryMismatch {
        identifier: BankIdentifier,
        embedded: String,
        declared: CountryCode,
    },
    #[error("Headquarter must have branch code XXX, got {0}.")]
    HeadquartersBranchCode(String),
    #[error("Bank name cannot be empty.")]
    EmptyName,
}

impl BankUnit {
    pub fn new(
        identifier: BankIdentifier,
        country: Country,
        address: String,
        name: String,
        is_headquarter: bool,
    ) -> Result<Self, BankUnitError> {
        check_invariants(&identifier, country.code(), &name, is_headquarter)?;

        Ok(Self {
            identifier,
            country,
            address,
            name,
            is_headquarter,
        })
    }

    /// Build a bank unit from raw field values.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// country code, SWIFT code, country mismatch, headquarters branch code,
    /// bank name, country name.
    pub fn parse(
        identifier: String,
        country_code: String,
        country_name: String,
        address: String,
        name: String,
        is_headquarter: bool,
    ) -> Result<Self, BankUnitError> {
        let country_code = CountryCode::parse(country_code)?;
        let identifier = BankIdentifier::parse(identifier)?;
        Self::build(identifier, country_code, country_name, address, name, is_headquarter)
    }

    /// Same as [`BankUnit::parse`] for a SWIFT code that is already parsed.
    pub fn with_identifier(
        identifier: BankIdentifier,
        country_code: String,
        country_name: String,
        address: String,
        name: String,
        is_headquarter: bool,
    ) -> Result<Self, BankUnitError> {
        let country_code = CountryCode::parse(country_code)?;
        Self::build(identifier, country_code, country_name, address, name, is_headquarter)
    }

    fn build(
        identifier: BankIdentifier,
        country_code: CountryCode,
        country_name: String,
        address: String,
        name: String,
        is_headquarter: bool,
    ) -> Result<Self, BankUnitError> {
        check_invariants(&identifier, &country_code, &name, is_headquarter)?;
        let country = Country::new(country_code, country_name)?;

        Ok(Self {
            identifier,
            country,
            address,
            name,
            is_headquarter,
        })
    }

    pub fn identifier(&self) -> &BankIdentifier {
        &self.identifier
    }

    pub fn country(&self) -> &Country {
        &self.country
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_headquarter(&self) -> bool {
        self.is_headquarter
    }

    /// Whether this unit is a branch of `headquarters`, derived from the SWIFT codes.
    pub fn is_branch_of(&self, headquarters: &BankUnit) -> bool {
        headquarters.is_headquarter && self.identifier.is_branch_of(&headquarters.identifier)
    }
}

fn check_invariants(
    identifier: &BankIdentifier,
    country_code: &CountryCode,
    name: &str,
    is_headquarter: bool,
) -> Result<(), BankUnitError> {
    if identifier.country_code() != country_code.as_str() {
        return Err(BankUnitError::CountryMismatch {
            identifier: identifier.clone(),
            embedded: identifier.country_code().to_string(),
            declared: country_code.clone(),
        });
    }

    // A branch carrying `XXX` is accepted; only the headquarters flag is checked.
    if is_headquarter && !identifier.is_headquarters() {
        return Err(BankUnitError::HeadquartersBranchCode(
            identifier.branch_code().to_string(),
        ));
    }

    if name.is_empty() {
        return Err(BankUnitError::EmptyName);
    }

    Ok(())
}

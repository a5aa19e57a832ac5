mod bank_identifier;
mod bank_unit;
mod country;
mod country_code;
mod macros;
#[cfg(test)]
mod test_data;

pub use bank_identifier::{BankIdentifier, BankIdentifierError};
pub use bank_unit::{BankUnit, BankUnitError};
pub use country::{Country, CountryError};
pub use country_code::{CountryCode, CountryCodeError};

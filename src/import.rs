//! Import of reference data from CSV sources.
//!
//! Countries must be imported before bank units since every bank unit
//! references a stored country. Each import maps the whole source first and
//! then persists it with one bulk call, so a rejected row means nothing from
//! that source reaches the repository.

use crate::domain::{
    BankIdentifier, BankUnit, BankUnitError, Country, CountryCode, CountryError,
};
use crate::errors::error_chain_fmt;
use crate::mapper::{MapperError, RecordMapper};
use crate::repository::{BankUnitRepository, CountryRepository, RepositoryError};
use std::collections::HashSet;
use std::fmt::Display;
use std::io::Read;

pub const COUNTRY_COLUMNS: [&str; 2] = ["Name", "Code"];
pub const BANK_UNIT_COLUMNS: [&str; 5] = [
    "SWIFT CODE",
    "COUNTRY ISO2 CODE",
    "COUNTRY NAME",
    "NAME",
    "ADDRESS",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Countries,
    BankUnits,
}

impl Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Countries => f.write_str("countries"),
            Self::BankUnits => f.write_str("bank units"),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ImportError {
    #[error("Failed to load {kind} from the CSV source.")]
    Mapping {
        kind: ImportKind,
        #[source]
        source: MapperError,
    },
    #[error("The {kind} source lists {value} more than once.")]
    DuplicateInSource { kind: ImportKind, value: String },
    #[error("Bank unit {identifier} references country {country}, which the countries source does not list.")]
    UnknownCountryInSource {
        identifier: BankIdentifier,
        country: CountryCode,
    },
    #[error("Failed to store {kind}.")]
    Persistence {
        kind: ImportKind,
        #[source]
        source: RepositoryError,
    },
}
impl std::fmt::Debug for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub countries: usize,
    pub bank_units: usize,
}

fn to_country(values: &[&str]) -> Result<Country, CountryError> {
    Country::parse(values[1].to_string(), values[0].to_string())
}

fn to_bank_unit(values: &[&str]) -> Result<BankUnit, BankUnitError> {
    let identifier = BankIdentifier::parse(values[0].to_string())?;
    let is_headquarter = identifier.is_headquarters();

    BankUnit::with_identifier(
        identifier,
        values[1].to_string(),
        values[2].to_string(),
        values[4].to_string(),
        values[3].to_string(),
        is_headquarter,
    )
}

/// Map every row of a countries source.
pub fn load_countries<R: Read>(source: R) -> Result<Vec<Country>, ImportError> {
    let countries = RecordMapper::new(source, &COUNTRY_COLUMNS, to_country)
        .map_all()
        .map_err(|source| ImportError::Mapping {
            kind: ImportKind::Countries,
            source,
        })?;
    tracing::info!(count = countries.len(), "Successfully loaded countries");
    Ok(countries)
}

/// Map every row of a bank units source. The headquarters flag is derived
/// from the SWIFT code.
pub fn load_bank_units<R: Read>(source: R) -> Result<Vec<BankUnit>, ImportError> {
    let bank_units = RecordMapper::new(source, &BANK_UNIT_COLUMNS, to_bank_unit)
        .map_all()
        .map_err(|source| ImportError::Mapping {
            kind: ImportKind::BankUnits,
            source,
        })?;
    tracing::info!(count = bank_units.len(), "Successfully loaded bank units");
    Ok(bank_units)
}

async fn store_countries(
    countries: &[Country],
    repository: &dyn CountryRepository,
) -> Result<(), ImportError> {
    repository
        .bulk_create(countries)
        .await
        .map_err(|source| ImportError::Persistence {
            kind: ImportKind::Countries,
            source,
        })?;
    tracing::info!(count = countries.len(), "Countries imported successfully");
    Ok(())
}

async fn store_bank_units(
    bank_units: &[BankUnit],
    repository: &dyn BankUnitRepository,
) -> Result<(), ImportError> {
    repository
        .bulk_create(bank_units)
        .await
        .map_err(|source| ImportError::Persistence {
            kind: ImportKind::BankUnits,
            source,
        })?;
    tracing::info!(count = bank_units.len(), "Bank units imported successfully");
    Ok(())
}

/// Load every country of `source` and store them with a single bulk create.
///
/// Returns the number of imported countries.
#[tracing::instrument(name = "Importing countries", skip(source, repository))]
pub async fn import_countries<R: Read>(
    source: R,
    repository: &dyn CountryRepository,
) -> Result<usize, ImportError> {
    let countries = load_countries(source)?;
    store_countries(&countries, repository).await?;
    Ok(countries.len())
}

/// Load every bank unit of `source` and store them with a single bulk create.
///
/// The countries the units reference must already be stored.
#[tracing::instrument(name = "Importing bank units", skip(source, repository))]
pub async fn import_bank_units<R: Read>(
    source: R,
    repository: &dyn BankUnitRepository,
) -> Result<usize, ImportError> {
    let bank_units = load_bank_units(source)?;
    store_bank_units(&bank_units, repository).await?;
    Ok(bank_units.len())
}

/// Countries and bank units mapped from their sources and checked against
/// each other, not yet stored.
#[derive(Debug)]
pub struct ReferenceData {
    countries: Vec<Country>,
    bank_units: Vec<BankUnit>,
}

impl ReferenceData {
    /// Map both sources, countries first, and check that codes are unique
    /// and that every bank unit references a listed country.
    pub fn load<C: Read, B: Read>(countries: C, bank_units: B) -> Result<Self, ImportError> {
        let countries = load_countries(countries)?;
        let bank_units = load_bank_units(bank_units)?;

        let mut country_codes = HashSet::new();
        for country in &countries {
            if !country_codes.insert(country.code()) {
                return Err(ImportError::DuplicateInSource {
                    kind: ImportKind::Countries,
                    value: country.code().to_string(),
                });
            }
        }

        let mut swift_codes = HashSet::new();
        for bank_unit in &bank_units {
            let code = bank_unit.country().code();
            if !country_codes.contains(code) {
                return Err(ImportError::UnknownCountryInSource {
                    identifier: bank_unit.identifier().clone(),
                    country: code.clone(),
                });
            }
            if !swift_codes.insert(bank_unit.identifier()) {
                return Err(ImportError::DuplicateInSource {
                    kind: ImportKind::BankUnits,
                    value: bank_unit.identifier().to_string(),
                });
            }
        }

        Ok(Self {
            countries,
            bank_units,
        })
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn bank_units(&self) -> &[BankUnit] {
        &self.bank_units
    }

    /// Store countries, then bank units.
    pub async fn store(
        &self,
        country_repository: &dyn CountryRepository,
        bank_unit_repository: &dyn BankUnitRepository,
    ) -> Result<ImportSummary, ImportError> {
        store_countries(&self.countries, country_repository).await?;
        store_bank_units(&self.bank_units, bank_unit_repository).await?;

        Ok(ImportSummary {
            countries: self.countries.len(),
            bank_units: self.bank_units.len(),
        })
    }
}

/// Import countries, then bank units. Both sources are mapped and checked
/// before anything is stored, and bank units are not stored when storing
/// the countries fails.
#[tracing::instrument(
    name = "Importing reference data",
    skip(countries, bank_units, country_repository, bank_unit_repository)
)]
pub async fn import_reference_data<C: Read, B: Read>(
    countries: C,
    bank_units: B,
    country_repository: &dyn CountryRepository,
    bank_unit_repository: &dyn BankUnitRepository,
) -> Result<ImportSummary, ImportError> {
    ReferenceData::load(countries, bank_units)?
        .store(country_repository, bank_unit_repository)
        .await
}

//! Persistence boundary for countries and bank units.
//!
//! The import and the HTTP handlers work exclusively through these traits,
//! so the store can be Postgres in production and memory in tests.

use crate::domain::{BankIdentifier, BankUnit, BankUnitError, Country, CountryCode};
use crate::errors::error_chain_fmt;
use async_trait::async_trait;

mod memory;
mod postgres;

pub use memory::{BulkMode, InMemoryRepository};
pub use postgres::{PostgresBankUnitRepository, PostgresCountryRepository};

#[derive(thiserror::Error)]
pub enum RepositoryError {
    #[error("Record not found.")]
    NotFound,
    #[error("A record with the same identifier already exists.")]
    Duplicate,
    #[error("Country {0} does not exist.")]
    UnknownCountry(CountryCode),
    #[error("Stored record is not a valid bank unit.")]
    InvalidRecord(#[from] BankUnitError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
impl std::fmt::Debug for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait CountryRepository: Send + Sync {
    async fn bulk_create(&self, countries: &[Country]) -> Result<(), RepositoryError>;
    /// True when a country with the same code and name is stored.
    async fn exists(&self, country: &Country) -> Result<bool, RepositoryError>;
    async fn get_all(&self) -> Result<Vec<Country>, RepositoryError>;
    async fn delete_all(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait BankUnitRepository: Send + Sync {
    async fn create(&self, bank_unit: &BankUnit) -> Result<(), RepositoryError>;
    async fn bulk_create(&self, bank_units: &[BankUnit]) -> Result<(), RepositoryError>;
    async fn get_by_identifier(
        &self,
        identifier: &BankIdentifier,
    ) -> Result<BankUnit, RepositoryError>;
    async fn get_all_by_country(
        &self,
        country_code: &CountryCode,
    ) -> Result<Vec<BankUnit>, RepositoryError>;
    /// Every unit sharing the base code of `identifier`, excluding `identifier` itself.
    async fn get_branches(
        &self,
        identifier: &BankIdentifier,
    ) -> Result<Vec<BankUnit>, RepositoryError>;
    async fn get_all(&self) -> Result<Vec<BankUnit>, RepositoryError>;
    /// Deleting an unknown SWIFT code is not an error.
    async fn delete(&self, identifier: &BankIdentifier) -> Result<(), RepositoryError>;
    async fn delete_all(&self) -> Result<(), RepositoryError>;
}

use crate::domain::{BankIdentifier, BankUnit, Country, CountryCode};
use crate::repository::{BankUnitRepository, CountryRepository, RepositoryError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// How a bulk create reacts to a rejected record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BulkMode {
    /// Nothing from the batch is stored when one record is rejected.
    #[default]
    Transactional,
    /// Records preceding the rejected one stay stored.
    RowByRow,
}

#[derive(Clone, Default)]
struct Store {
    countries: Vec<Country>,
    bank_units: Vec<BankUnit>,
}

impl Store {
    fn insert_country(&mut self, country: &Country) -> Result<(), RepositoryError> {
        if self.countries.iter().any(|c| c.code() == country.code()) {
            return Err(RepositoryError::Duplicate);
        }
        self.countries.push(country.clone());
        Ok(())
    }

    /// Stored units reference the stored country, like rows of the
    /// `bank_units_with_country` view.
    fn insert_bank_unit(&mut self, bank_unit: &BankUnit) -> Result<(), RepositoryError> {
        let code = bank_unit.country().code();
        let country = self
            .countries
            .iter()
            .find(|c| c.code() == code)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownCountry(code.clone()))?;
        if self
            .bank_units
            .iter()
            .any(|u| u.identifier() == bank_unit.identifier())
        {
            return Err(RepositoryError::Duplicate);
        }
        self.bank_units.push(BankUnit::new(
            bank_unit.identifier().clone(),
            country,
            bank_unit.address().to_string(),
            bank_unit.name().to_string(),
            bank_unit.is_headquarter(),
        )?);
        Ok(())
    }

    fn bank_units_where(&self, predicate: impl Fn(&BankUnit) -> bool) -> Vec<BankUnit> {
        let mut bank_units: Vec<BankUnit> = self
            .bank_units
            .iter()
            .filter(|u| predicate(u))
            .cloned()
            .collect();
        bank_units.sort_by(|a, b| a.identifier().as_str().cmp(b.identifier().as_str()));
        bank_units
    }
}

/// Repository holding countries and bank units in memory.
///
/// Enforces the same constraints as the Postgres schema: unique country codes
/// and SWIFT codes, and bank units referencing a stored country.
#[derive(Default)]
pub struct InMemoryRepository {
    mode: BulkMode,
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new(mode: BulkMode) -> Self {
        Self {
            mode,
            store: RwLock::default(),
        }
    }

    async fn bulk_insert<T>(
        &self,
        records: &[T],
        insert: impl Fn(&mut Store, &T) -> Result<(), RepositoryError>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        match self.mode {
            BulkMode::Transactional => {
                let mut staged = (*store).clone();
                for record in records {
                    insert(&mut staged, record)?;
                }
                *store = staged;
            }
            BulkMode::RowByRow => {
                for record in records {
                    insert(&mut *store, record)?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CountryRepository for InMemoryRepository {
    async fn bulk_create(&self, countries: &[Country]) -> Result<(), RepositoryError> {
        self.bulk_insert(countries, Store::insert_country).await
    }

    async fn exists(&self, country: &Country) -> Result<bool, RepositoryError> {
        Ok(self.store.read().await.countries.contains(country))
    }

    async fn get_all(&self) -> Result<Vec<Country>, RepositoryError> {
        Ok(self.store.read().await.countries.clone())
    }

    async fn delete_all(&self) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if !store.bank_units.is_empty() {
            return Err(RepositoryError::Unexpected(anyhow::anyhow!(
                "Countries are still referenced by bank units."
            )));
        }
        store.countries.clear();
        Ok(())
    }
}

#[async_trait]
impl BankUnitRepository for InMemoryRepository {
    async fn create(&self, bank_unit: &BankUnit) -> Result<(), RepositoryError> {
        self.store.write().await.insert_bank_unit(bank_unit)
    }

    async fn bulk_create(&self, bank_units: &[BankUnit]) -> Result<(), RepositoryError> {
        self.bulk_insert(bank_units, Store::insert_bank_unit).await
    }

    async fn get_by_identifier(
        &self,
        identifier: &BankIdentifier,
    ) -> Result<BankUnit, RepositoryError> {
        self.store
            .read()
            .await
            .bank_units
            .iter()
            .find(|u| u.identifier() == identifier)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_all_by_country(
        &self,
        country_code: &CountryCode,
    ) -> Result<Vec<BankUnit>, RepositoryError> {
        Ok(self
            .store
            .read()
            .await
            .bank_units_where(|u| u.country().code() == country_code))
    }

    async fn get_branches(
        &self,
        identifier: &BankIdentifier,
    ) -> Result<Vec<BankUnit>, RepositoryError> {
        Ok(self.store.read().await.bank_units_where(|u| {
            u.identifier() != identifier && u.identifier().shares_base_code(identifier)
        }))
    }

    async fn get_all(&self) -> Result<Vec<BankUnit>, RepositoryError> {
        Ok(self.store.read().await.bank_units_where(|_| true))
    }

    async fn delete(&self, identifier: &BankIdentifier) -> Result<(), RepositoryError> {
        self.store
            .write()
            .await
            .bank_units
            .retain(|u| u.identifier() != identifier);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), RepositoryError> {
        self.store.write().await.bank_units.clear();
        Ok(())
    }
}

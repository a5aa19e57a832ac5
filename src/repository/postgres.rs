use crate::domain::{BankIdentifier, BankUnit, BankUnitError, Country, CountryCode};
use crate::repository::{BankUnitRepository, CountryRepository, RepositoryError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PostgresCountryRepository {
    pool: PgPool,
}

impl PostgresCountryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Clone)]
pub struct PostgresBankUnitRepository {
    pool: PgPool,
}

impl PostgresBankUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A row of the `bank_units_with_country` view.
#[derive(sqlx::FromRow)]
struct BankUnitRecord {
    swift_code: BankIdentifier,
    country_iso2: CountryCode,
    country_name: String,
    bank_name: String,
    address: String,
    is_headquarter: bool,
}

impl TryFrom<BankUnitRecord> for BankUnit {
    type Error = BankUnitError;

    fn try_from(record: BankUnitRecord) -> Result<Self, Self::Error> {
        let country = Country::new(record.country_iso2, record.country_name)?;
        BankUnit::new(
            record.swift_code,
            country,
            record.address,
            record.bank_name,
            record.is_headquarter,
        )
    }
}

fn into_bank_units(records: Vec<BankUnitRecord>) -> Result<Vec<BankUnit>, RepositoryError> {
    let bank_units = records
        .into_iter()
        .map(BankUnit::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bank_units)
}

/// Translate constraint violations into the matching `RepositoryError`.
///
/// `country` is the country a foreign key violation is reported for.
fn write_error(
    e: sqlx::Error,
    context: &'static str,
    country: Option<&CountryCode>,
) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &e {
        if db_error.is_unique_violation() {
            return RepositoryError::Duplicate;
        }
        if let (true, Some(code)) = (db_error.is_foreign_key_violation(), country) {
            return RepositoryError::UnknownCountry(code.clone());
        }
    }
    tracing::error!("{}: {:?}", context, e);
    RepositoryError::Unexpected(anyhow::Error::new(e).context(context))
}

const SELECT_BANK_UNITS: &str = r#"
    SELECT swift_code, country_iso2, country_name, bank_name, address, is_headquarter
    FROM bank_units_with_country
"#;

#[async_trait]
impl CountryRepository for PostgresCountryRepository {
    #[tracing::instrument(
        name = "Saving countries in the database",
        skip(self, countries),
        fields(count = countries.len())
    )]
    async fn bulk_create(&self, countries: &[Country]) -> Result<(), RepositoryError> {
        let (codes, names): (Vec<String>, Vec<String>) = countries
            .iter()
            .map(|c| (c.code().to_string(), c.name().to_string()))
            .unzip();

        let mut transaction = self
            .pool
            .begin()
            .await
            .context("Failed to acquire a Postgres connection from the pool.")?;
        sqlx::query(
            r#"
            INSERT INTO countries (iso2, name)
            SELECT * FROM UNNEST($1::text[], $2::text[])
            "#,
        )
        .bind(codes)
        .bind(names)
        .execute(&mut *transaction)
        .await
        .map_err(|e| write_error(e, "Failed to insert countries in the database.", None))?;
        transaction
            .commit()
            .await
            .context("Failed to commit SQL transaction to store countries.")?;

        Ok(())
    }

    #[tracing::instrument(name = "Checking if country exists", skip(self))]
    async fn exists(&self, country: &Country) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM countries WHERE iso2 = $1 AND name = $2)",
        )
        .bind(country.code())
        .bind(country.name())
        .fetch_one(&self.pool)
        .await
        .context("Failed to check if country exists.")?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Get all countries", skip(self))]
    async fn get_all(&self) -> Result<Vec<Country>, RepositoryError> {
        let rows = sqlx::query_as::<_, (CountryCode, String)>(
            "SELECT iso2, name FROM countries ORDER BY iso2",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch countries from the database.")?;

        rows.into_iter()
            .map(|(code, name)| {
                Country::new(code, name).map_err(|e| RepositoryError::from(BankUnitError::from(e)))
            })
            .collect()
    }

    #[tracing::instrument(name = "Deleting all countries", skip(self))]
    async fn delete_all(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM countries")
            .execute(&self.pool)
            .await
            .context("Failed to delete countries.")?;
        Ok(())
    }
}

#[async_trait]
impl BankUnitRepository for PostgresBankUnitRepository {
    #[tracing::instrument(
        name = "Saving new bank unit in the database",
        skip(self, bank_unit),
        fields(swift_code = %bank_unit.identifier())
    )]
    async fn create(&self, bank_unit: &BankUnit) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO bank_units (country_iso2, swift_code, name, address, is_headquarter)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bank_unit.country().code())
        .bind(bank_unit.identifier())
        .bind(bank_unit.name())
        .bind(bank_unit.address())
        .bind(bank_unit.is_headquarter())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to insert new bank unit in the database.",
                Some(bank_unit.country().code()),
            )
        })?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Saving bank units in the database",
        skip(self, bank_units),
        fields(count = bank_units.len())
    )]
    async fn bulk_create(&self, bank_units: &[BankUnit]) -> Result<(), RepositoryError> {
        let mut country_codes = Vec::with_capacity(bank_units.len());
        let mut swift_codes = Vec::with_capacity(bank_units.len());
        let mut names = Vec::with_capacity(bank_units.len());
        let mut addresses = Vec::with_capacity(bank_units.len());
        let mut headquarters = Vec::with_capacity(bank_units.len());
        for unit in bank_units {
            country_codes.push(unit.country().code().to_string());
            swift_codes.push(unit.identifier().to_string());
            names.push(unit.name().to_string());
            addresses.push(unit.address().to_string());
            headquarters.push(unit.is_headquarter());
        }

        let mut transaction = self
            .pool
            .begin()
            .await
            .context("Failed to acquire a Postgres connection from the pool.")?;
        // The foreign key violation does not say which country is missing,
        // so look up the first unknown one in batch order.
        let unknown_country = sqlx::query_scalar::<_, CountryCode>(
            r#"
            SELECT code FROM UNNEST($1::text[]) WITH ORDINALITY AS batch(code, position)
            WHERE NOT EXISTS (SELECT 1 FROM countries WHERE iso2 = batch.code)
            ORDER BY position
            LIMIT 1
            "#,
        )
        .bind(&country_codes)
        .fetch_optional(&mut *transaction)
        .await
        .context("Failed to check the countries of the bank units.")?;
        if let Some(code) = unknown_country {
            return Err(RepositoryError::UnknownCountry(code));
        }

        sqlx::query(
            r#"
            INSERT INTO bank_units (country_iso2, swift_code, name, address, is_headquarter)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::bool[])
            "#,
        )
        .bind(country_codes)
        .bind(swift_codes)
        .bind(names)
        .bind(addresses)
        .bind(headquarters)
        .execute(&mut *transaction)
        .await
        .map_err(|e| write_error(e, "Failed to insert bank units in the database.", None))?;
        transaction
            .commit()
            .await
            .context("Failed to commit SQL transaction to store bank units.")?;

        Ok(())
    }

    #[tracing::instrument(name = "Get bank unit by SWIFT code", skip(self))]
    async fn get_by_identifier(
        &self,
        identifier: &BankIdentifier,
    ) -> Result<BankUnit, RepositoryError> {
        let record = sqlx::query_as::<_, BankUnitRecord>(&format!(
            "{} WHERE swift_code = $1",
            SELECT_BANK_UNITS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch bank unit from the database.")?
        .ok_or(RepositoryError::NotFound)?;

        Ok(BankUnit::try_from(record)?)
    }

    #[tracing::instrument(name = "Get bank units by country", skip(self))]
    async fn get_all_by_country(
        &self,
        country_code: &CountryCode,
    ) -> Result<Vec<BankUnit>, RepositoryError> {
        let records = sqlx::query_as::<_, BankUnitRecord>(&format!(
            "{} WHERE country_iso2 = $1 ORDER BY swift_code",
            SELECT_BANK_UNITS
        ))
        .bind(country_code)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch bank units of a country from the database.")?;

        into_bank_units(records)
    }

    #[tracing::instrument(name = "Get branches of a bank unit", skip(self))]
    async fn get_branches(
        &self,
        identifier: &BankIdentifier,
    ) -> Result<Vec<BankUnit>, RepositoryError> {
        let records = sqlx::query_as::<_, BankUnitRecord>(&format!(
            "{} WHERE LEFT(swift_code, 8) = $1 AND swift_code <> $2 ORDER BY swift_code",
            SELECT_BANK_UNITS
        ))
        .bind(identifier.base_code())
        .bind(identifier)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch branches from the database.")?;

        into_bank_units(records)
    }

    #[tracing::instrument(name = "Get all bank units", skip(self))]
    async fn get_all(&self) -> Result<Vec<BankUnit>, RepositoryError> {
        let records = sqlx::query_as::<_, BankUnitRecord>(&format!(
            "{} ORDER BY swift_code",
            SELECT_BANK_UNITS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch bank units from the database.")?;

        into_bank_units(records)
    }

    #[tracing::instrument(name = "Deleting bank unit", skip(self))]
    async fn delete(&self, identifier: &BankIdentifier) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM bank_units WHERE swift_code = $1")
            .bind(identifier)
            .execute(&self.pool)
            .await
            .context("Failed to delete bank unit.")?;
        Ok(())
    }

    #[tracing::instrument(name = "Deleting all bank units", skip(self))]
    async fn delete_all(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM bank_units")
            .execute(&self.pool)
            .await
            .context("Failed to delete bank units.")?;
        Ok(())
    }
}

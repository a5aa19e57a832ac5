//! Tests against a live Postgres instance configured in `configuration/`.
//! Run them with `cargo test -- --ignored`.

use crate::helpers::{BANK_UNITS_CSV, COUNTRIES_CSV, configure_database};
use claims::{assert_matches, assert_ok};
use swiftcodes::{
    domain::{BankIdentifier, BankUnit, Country, CountryCode},
    import::{ImportError, import_reference_data},
    repository::{
        BankUnitRepository, CountryRepository, PostgresBankUnitRepository,
        PostgresCountryRepository, RepositoryError,
    },
};

fn bank_unit(swift_code: &str, is_headquarter: bool) -> BankUnit {
    BankUnit::parse(
        swift_code.to_string(),
        "PL".to_string(),
        "Poland".to_string(),
        "UL. PULAWSKA 15".to_string(),
        "PKO BANK POLSKI S.A.".to_string(),
        is_headquarter,
    )
    .unwrap()
}

fn identifier(s: &str) -> BankIdentifier {
    BankIdentifier::parse(s.to_string()).unwrap()
}

async fn seeded_repositories() -> (PostgresCountryRepository, PostgresBankUnitRepository) {
    let pool = configure_database().await;
    let countries = PostgresCountryRepository::new(pool.clone());
    let bank_units = PostgresBankUnitRepository::new(pool);
    import_reference_data(
        COUNTRIES_CSV.as_bytes(),
        BANK_UNITS_CSV.as_bytes(),
        &countries,
        &bank_units,
    )
    .await
    .expect("Failed to seed reference data.");
    (countries, bank_units)
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn stored_bank_unit_is_read_back_through_the_view() {
    let (_, bank_units) = seeded_repositories().await;

    let stored = bank_units
        .get_by_identifier(&identifier("BPKOPLPWGDG"))
        .await
        .unwrap();

    assert_eq!(stored.identifier().as_str(), "BPKOPLPWGDG");
    assert_eq!(stored.country().name(), "POLAND");
    assert_eq!(stored.name(), "PKO BANK POLSKI S.A.");
    assert!(!stored.is_headquarter());
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn branches_are_found_by_base_code() {
    let (_, bank_units) = seeded_repositories().await;

    let branches = bank_units
        .get_branches(&identifier("BPKOPLPWXXX"))
        .await
        .unwrap();

    let codes: Vec<&str> = branches.iter().map(|u| u.identifier().as_str()).collect();
    assert_eq!(codes, vec!["BPKOPLPWGDG"]);
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn country_existence_requires_matching_name() {
    let (countries, _) = seeded_repositories().await;
    let poland = CountryCode::parse("PL".to_string()).unwrap();

    let matching = Country::new(poland.clone(), "Poland".to_string()).unwrap();
    let other_name = Country::new(poland, "Polska".to_string()).unwrap();

    assert!(countries.exists(&matching).await.unwrap());
    assert!(!countries.exists(&other_name).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn create_reports_duplicates_and_unknown_countries() {
    let (_, bank_units) = seeded_repositories().await;

    assert_ok!(bank_units.create(&bank_unit("BPKOPLPWKRK", false)).await);
    assert_matches!(
        bank_units.create(&bank_unit("BPKOPLPWKRK", false)).await,
        Err(RepositoryError::Duplicate)
    );

    let german = BankUnit::parse(
        "DEUTDEFFXXX".to_string(),
        "DE".to_string(),
        "Germany".to_string(),
        "TAUNUSANLAGE 12".to_string(),
        "DEUTSCHE BANK AG".to_string(),
        true,
    )
    .unwrap();
    let pool = configure_database().await;
    let empty = PostgresBankUnitRepository::new(pool);
    assert_matches!(
        empty.create(&german).await,
        Err(RepositoryError::UnknownCountry(ref code)) if code.as_str() == "DE"
    );
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn bulk_create_is_all_or_nothing() {
    let (_, bank_units) = seeded_repositories().await;
    let batch = [
        bank_unit("BPKOPLPWKRK", false),
        bank_unit("BPKOPLPWGDG", false),
    ];

    let result = BankUnitRepository::bulk_create(&bank_units, &batch).await;

    assert_matches!(result, Err(RepositoryError::Duplicate));
    assert_matches!(
        bank_units.get_by_identifier(&identifier("BPKOPLPWKRK")).await,
        Err(RepositoryError::NotFound)
    );
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn reimporting_fails_on_duplicate_countries() {
    let (countries, bank_units) = seeded_repositories().await;

    let result = import_reference_data(
        COUNTRIES_CSV.as_bytes(),
        BANK_UNITS_CSV.as_bytes(),
        &countries,
        &bank_units,
    )
    .await;

    assert_matches!(
        result,
        Err(ImportError::Persistence {
            source: RepositoryError::Duplicate,
            ..
        })
    );
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn delete_all_clears_bank_units_then_countries() {
    let (countries, bank_units) = seeded_repositories().await;

    BankUnitRepository::delete_all(&bank_units).await.unwrap();
    CountryRepository::delete_all(&countries).await.unwrap();

    assert!(BankUnitRepository::get_all(&bank_units).await.unwrap().is_empty());
    assert!(CountryRepository::get_all(&countries).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn bulk_create_reports_the_first_unknown_country() {
    let (_, bank_units) = seeded_repositories().await;
    let german = BankUnit::parse(
        "DEUTDEFFXXX".to_string(),
        "DE".to_string(),
        "Germany".to_string(),
        "TAUNUSANLAGE 12".to_string(),
        "DEUTSCHE BANK AG".to_string(),
        true,
    )
    .unwrap();
    let french = BankUnit::parse(
        "BNPAFRPPXXX".to_string(),
        "FR".to_string(),
        "France".to_string(),
        "16 BOULEVARD DES ITALIENS".to_string(),
        "BNP PARIBAS".to_string(),
        true,
    )
    .unwrap();
    let batch = [bank_unit("BPKOPLPWKRK", false), french, german];

    let result = BankUnitRepository::bulk_create(&bank_units, &batch).await;

    assert_matches!(
        result,
        Err(RepositoryError::UnknownCountry(ref code)) if code.as_str() == "FR"
    );
    assert_matches!(
        bank_units.get_by_identifier(&identifier("BPKOPLPWKRK")).await,
        Err(RepositoryError::NotFound)
    );
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn stored_codes_are_validated_when_read() {
    let pool = configure_database().await;
    sqlx::query("INSERT INTO countries (iso2, name) VALUES ('pl', 'POLAND')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO bank_units (country_iso2, swift_code, name, address, is_headquarter)
        VALUES ('pl', 'bpkoplpwxxx', 'PKO BANK POLSKI S.A.', 'UL. PULAWSKA 15', true)
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    let countries = PostgresCountryRepository::new(pool.clone());
    let bank_units = PostgresBankUnitRepository::new(pool);

    let stored_countries = CountryRepository::get_all(&countries).await.unwrap();
    let stored_units = BankUnitRepository::get_all(&bank_units).await.unwrap();

    assert_eq!(stored_countries[0].code().as_str(), "PL");
    assert_eq!(stored_units[0].identifier().as_str(), "BPKOPLPWXXX");
    assert!(stored_units[0].identifier().is_headquarters());
}

use crate::{
    domain::{BankUnit, Country},
    repository::{BankUnitRepository, CountryRepository, RepositoryError},
    routes::swift_codes::{ApiError, success_message},
};
use actix_web::{HttpResponse, web};

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankUnitData {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
}

#[tracing::instrument(
    name = "Adding a new bank unit",
    skip(body, bank_units, countries),
    fields(swift_code = %body.swift_code, country_iso2 = %body.country_iso2)
)]
pub async fn create(
    body: web::Json<BankUnitData>,
    bank_units: web::Data<dyn BankUnitRepository>,
    countries: web::Data<dyn CountryRepository>,
) -> Result<HttpResponse, ApiError> {
    let BankUnitData {
        address,
        bank_name,
        country_iso2,
        country_name,
        is_headquarter,
        swift_code,
    } = body.into_inner();

    let country = Country::parse(country_iso2.clone(), country_name.clone())
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;
    let exists = countries
        .exists(&country)
        .await
        .map_err(|e| ApiError::UnexpectedError(e.into()))?;
    if !exists {
        return Err(ApiError::ValidationError(
            "country does not exist, make sure ISO2 code is matching with the name".to_string(),
        ));
    }

    let bank_unit = BankUnit::parse(
        swift_code,
        country_iso2,
        country_name,
        address,
        bank_name,
        is_headquarter,
    )
    .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    bank_units.create(&bank_unit).await.map_err(|e| match e {
        RepositoryError::Duplicate => ApiError::ConflictError("duplicate swift code".to_string()),
        RepositoryError::UnknownCountry(code) => {
            ApiError::ValidationError(format!("country {} does not exist", code))
        }
        e => ApiError::UnexpectedError(e.into()),
    })?;

    Ok(HttpResponse::Created().json(success_message("bank unit created")))
}

use crate::{
    domain::{BankIdentifier, CountryCode},
    repository::{BankUnitRepository, RepositoryError},
    routes::swift_codes::{ApiError, BankUnitResponse, CountryBankUnitsResponse},
};
use actix_web::{HttpResponse, web};

#[tracing::instrument(name = "Get bank unit by SWIFT code", skip(repository))]
pub async fn get_by_swift_code(
    path: web::Path<String>,
    repository: web::Data<dyn BankUnitRepository>,
) -> Result<HttpResponse, ApiError> {
    let identifier = BankIdentifier::parse(path.into_inner())
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let bank_unit = repository
        .get_by_identifier(&identifier)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => ApiError::NotFoundError("not found".to_string()),
            e => ApiError::UnexpectedError(e.into()),
        })?;

    let mut response = BankUnitResponse::from(&bank_unit);
    if bank_unit.is_headquarter() {
        let branches = repository
            .get_branches(bank_unit.identifier())
            .await
            .map_err(|e| ApiError::UnexpectedError(e.into()))?;
        response.branches = Some(branches.iter().map(BankUnitResponse::from).collect());
    }

    Ok(HttpResponse::Ok().json(response))
}

#[tracing::instrument(name = "Get bank units of a country", skip(repository))]
pub async fn get_by_country(
    path: web::Path<String>,
    repository: web::Data<dyn BankUnitRepository>,
) -> Result<HttpResponse, ApiError> {
    let country_code = CountryCode::parse(path.into_inner())
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let bank_units = repository
        .get_all_by_country(&country_code)
        .await
        .map_err(|e| ApiError::UnexpectedError(e.into()))?;

    let response = CountryBankUnitsResponse {
        country_iso2: country_code.to_string(),
        country_name: bank_units
            .first()
            .map(|unit| unit.country().name().to_string()),
        swift_codes: bank_units.iter().map(BankUnitResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

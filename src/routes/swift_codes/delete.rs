use crate::{
    domain::BankIdentifier,
    repository::BankUnitRepository,
    routes::swift_codes::{ApiError, success_message},
};
use actix_web::{HttpResponse, web};

/// Deleting a SWIFT code that is not stored still succeeds.
#[tracing::instrument(name = "Deleting a bank unit", skip(repository))]
pub async fn delete(
    path: web::Path<String>,
    repository: web::Data<dyn BankUnitRepository>,
) -> Result<HttpResponse, ApiError> {
    let identifier = BankIdentifier::parse(path.into_inner())
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    repository
        .delete(&identifier)
        .await
        .map_err(|e| ApiError::UnexpectedError(e.into()))?;

    Ok(HttpResponse::Ok().json(success_message("bank unit deleted")))
}

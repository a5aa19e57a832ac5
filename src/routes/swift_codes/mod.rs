//! `/v1/swift-codes` endpoints.

use crate::domain::BankUnit;

mod delete;
mod error;
mod get;
mod post;

pub use delete::delete;
pub use error::ApiError;
pub use get::{get_by_country, get_by_swift_code};
pub use post::{BankUnitData, create};

/// JSON representation of a bank unit. Headquarters carry their branches.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankUnitResponse {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<BankUnitResponse>>,
}

impl From<&BankUnit> for BankUnitResponse {
    fn from(bank_unit: &BankUnit) -> Self {
        Self {
            address: bank_unit.address().to_string(),
            bank_name: bank_unit.name().to_string(),
            country_iso2: bank_unit.country().code().to_string(),
            country_name: bank_unit.country().name().to_string(),
            is_headquarter: bank_unit.is_headquarter(),
            swift_code: bank_unit.identifier().to_string(),
            branches: None,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct CountryBankUnitsResponse {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    #[serde(rename = "countryName")]
    pub country_name: Option<String>,
    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<BankUnitResponse>,
}

fn success_message(message: &str) -> serde_json::Value {
    serde_json::json!({ "message": message })
}

pub mod configuration;
pub mod domain;
pub mod errors;
pub mod import;
pub mod mapper;
pub mod repository;
pub mod routes;
pub mod startup;
pub mod telemetry;

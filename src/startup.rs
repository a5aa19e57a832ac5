use crate::configuration::{DatabaseSettings, ImportSettings, Settings};
use crate::import::{ImportSummary, ReferenceData};
use crate::repository::{
    BankUnitRepository, CountryRepository, PostgresBankUnitRepository, PostgresCountryRepository,
};
use crate::routes::{
    health_check,
    swift_codes::{self, ApiError},
};
use actix_web::{App, HttpServer, dev::Server, web, web::Data};
use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::fs::File;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}
impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database);
        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .context("Failed to migrate the database.")?;

        let countries: Arc<dyn CountryRepository> =
            Arc::new(PostgresCountryRepository::new(connection_pool.clone()));
        let bank_units: Arc<dyn BankUnitRepository> =
            Arc::new(PostgresBankUnitRepository::new(connection_pool));

        if configuration.import.enabled {
            load_reference_data(&configuration.import, countries.as_ref(), bank_units.as_ref())
                .await?;
        }

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}.", address))?;
        let port = listener.local_addr()?.port();

        let server = run(listener, countries, bank_units)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    let max_connections = configuration.max_connections.unwrap_or(10);
    let timeout = configuration.timeout_seconds.unwrap_or(2);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(timeout))
        .connect_lazy_with(configuration.with_db())
}

/// Import the configured CSV files, countries first.
///
/// Without `replace_existing` the import is skipped once countries are stored,
/// so restarts do not collide with the data of the previous run. With it, the
/// stored data is only deleted after both files were read and checked.
#[tracing::instrument(
    name = "Loading reference data",
    skip_all,
    fields(
        countries_file = %settings.countries_file.display(),
        bank_units_file = %settings.bank_units_file.display(),
    )
)]
pub async fn load_reference_data(
    settings: &ImportSettings,
    countries: &dyn CountryRepository,
    bank_units: &dyn BankUnitRepository,
) -> Result<Option<ImportSummary>, anyhow::Error> {
    if !settings.replace_existing
        && !countries
            .get_all()
            .await
            .context("Failed to read the stored countries.")?
            .is_empty()
    {
        tracing::info!("Reference data already present, skipping import");
        return Ok(None);
    }

    let countries_file = File::open(&settings.countries_file).with_context(|| {
        format!("Failed to open {}.", settings.countries_file.display())
    })?;
    let bank_units_file = File::open(&settings.bank_units_file).with_context(|| {
        format!("Failed to open {}.", settings.bank_units_file.display())
    })?;
    let data = ReferenceData::load(countries_file, bank_units_file)?;

    if settings.replace_existing {
        bank_units
            .delete_all()
            .await
            .context("Failed to delete the stored bank units.")?;
        countries
            .delete_all()
            .await
            .context("Failed to delete the stored countries.")?;
    }

    let summary = data.store(countries, bank_units).await?;
    tracing::info!(
        countries = summary.countries,
        bank_units = summary.bank_units,
        "Reference data imported"
    );

    Ok(Some(summary))
}

pub fn run(
    listener: TcpListener,
    countries: Arc<dyn CountryRepository>,
    bank_units: Arc<dyn BankUnitRepository>,
) -> Result<Server, anyhow::Error> {
    // `Data::from` keeps the trait object behind the Arc
    let countries: Data<dyn CountryRepository> = Data::from(countries);
    let bank_units: Data<dyn BankUnitRepository> = Data::from(bank_units);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::warn!("Rejected request body: {}", err);
                ApiError::ValidationError("invalid json data".to_string()).into()
            }))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/v1/swift-codes")
                    .route("", web::post().to(swift_codes::create))
                    .route("/", web::post().to(swift_codes::create))
                    .route(
                        "/country/{country_iso2}",
                        web::get().to(swift_codes::get_by_country),
                    )
                    .route(
                        "/{swift_code}",
                        web::get().to(swift_codes::get_by_swift_code),
                    )
                    .route("/{swift_code}", web::delete().to(swift_codes::delete)),
            )
            .app_data(countries.clone())
            .app_data(bank_units.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

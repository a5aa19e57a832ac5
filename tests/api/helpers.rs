use once_cell::sync::Lazy;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use std::sync::Arc;
use swiftcodes::{
    configuration::{DatabaseSettings, get_configuration},
    import::import_reference_data,
    repository::InMemoryRepository,
    startup::{get_connection_pool, run},
    telemetry::{get_subscriber, init_subscriber},
};
use uuid::Uuid;

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    // The sink is part of the type returned by `get_subscriber`, so the two
    // branches cannot share a variable.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub const COUNTRIES_CSV: &str = "Name,Code\nPoland,PL\nGermany,DE\n";

pub const BANK_UNITS_CSV: &str = "\
COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE
PL,BPKOPLPWXXX,BIC11,PKO BANK POLSKI S.A.,\"UL. PULAWSKA 15  WARSZAWA, MAZOWIECKIE, 02-515\",WARSZAWA,POLAND,Europe/Warsaw
PL,BPKOPLPWGDG,BIC11,PKO BANK POLSKI S.A.,\"UL. DLUGIE POBRZEZE 31  GDANSK, POMORSKIE, 80-888\",GDANSK,POLAND,Europe/Warsaw
PL,ALBPPLPWXXX,BIC11,ALIOR BANK SPOLKA AKCYJNA,\"LOPUSZANSKA 38 D WARSZAWA, MAZOWIECKIE, 02-232\",WARSZAWA,POLAND,Europe/Warsaw
";

pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryRepository>,
    pub api_client: reqwest::Client,
}
impl TestApp {
    /// Load the sample countries (Poland, Germany) and three Polish bank units.
    pub async fn seed_reference_data(&self) {
        import_reference_data(
            COUNTRIES_CSV.as_bytes(),
            BANK_UNITS_CSV.as_bytes(),
            self.repository.as_ref(),
            self.repository.as_ref(),
        )
        .await
        .expect("Failed to seed reference data.");
    }

    pub async fn get_swift_code(&self, swift_code: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}/v1/swift-codes/{}", self.address, swift_code))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_country(&self, country_iso2: &str) -> reqwest::Response {
        self.api_client
            .get(format!(
                "{}/v1/swift-codes/country/{}",
                self.address, country_iso2
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_swift_code(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/v1/swift-codes", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_swift_code(&self, swift_code: &str) -> reqwest::Response {
        self.api_client
            .delete(format!("{}/v1/swift-codes/{}", self.address, swift_code))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

// Launch the application in the background on top of an in-memory repository
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let repository = Arc::new(InMemoryRepository::default());
    let server = run(listener, repository.clone(), repository.clone())
        .expect("Failed to build application.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        repository,
        api_client: reqwest::Client::new(),
    }
}

/// Create a fresh, migrated database with a random name.
pub async fn configure_database() -> PgPool {
    Lazy::force(&TRACING);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    create_database(&configuration.database).await;

    let connection_pool = get_connection_pool(&configuration.database);
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

async fn create_database(config: &DatabaseSettings) {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");
}

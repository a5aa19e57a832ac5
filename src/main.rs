use swiftcodes::configuration::get_configuration;
use swiftcodes::startup::Application;
use swiftcodes::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("swiftcodes".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Server started");
    application.run_until_stopped().await?;

    Ok(())
}

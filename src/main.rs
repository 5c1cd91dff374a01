use anyhow::Context;
use bookshelf_app::Application;
use bookshelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        db = %settings.database.path,
        "bookshelf bootstrap starting"
    );

    let app = Application::build(settings)
        .await
        .context("failed to build application")?;

    tracing::info!("bookshelf bootstrap complete");
    app.serve().await
}

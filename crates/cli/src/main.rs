use anyhow::Context;
use bookshelf_app::Application;
use bookshelf_kernel::settings::{Settings, StorageBackend};
use clap::{Parser, Subcommand};

/// Bookshelf book catalogue service
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    /// Override the SQLite database path
    #[arg(long, global = true)]
    database: Option<String>,

    /// Use in-memory storage instead of SQLite
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the listening port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the database schema and exit
    InitDb,
    /// Probe storage the way `/health` does
    Check,
    /// Print the OpenAPI document
    Openapi,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.database {
            settings.database.path = path.clone();
        }
        if self.in_memory {
            settings.database.backend = StorageBackend::Memory;
        }
        if let Command::Serve { port: Some(port) } = self.command {
            settings.server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Bookshelf settings")?;
    cli.apply(&mut settings);
    bookshelf_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve { .. } => {
            let app = Application::build(settings).await?;
            app.serve().await
        }
        Command::InitDb => {
            anyhow::ensure!(
                settings.database.backend == StorageBackend::Sqlite,
                "init-db needs the sqlite backend"
            );
            let app = Application::build(settings).await?;
            let path = app
                .database()
                .and_then(|database| database.path())
                .unwrap_or(":memory:");
            tracing::info!(path = %path, "database schema ready");
            Ok(())
        }
        Command::Check => {
            let app = Application::build(settings).await?;
            app.registry()
                .check_health()
                .await
                .context("storage is not reachable")?;
            println!("healthy");
            Ok(())
        }
        Command::Openapi => {
            // Documentation does not depend on stored data.
            settings.database.backend = StorageBackend::Memory;
            let app = Application::build(settings).await?;
            let document = bookshelf_http::router::openapi_document(app.registry());
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
    }
}

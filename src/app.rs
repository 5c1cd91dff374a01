//! Application wiring: storage, services and modules built from [`Settings`].

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::settings::{Settings, StorageBackend};
use bookshelf_kernel::{InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::books::repository::{BookRepository, InMemoryBookRepository, SqliteBookRepository};
use crate::modules::books::service::BookService;

/// A fully wired application, ready to serve.
pub struct Application {
    settings: Settings,
    registry: ModuleRegistry,
    database: Option<Database>,
}

impl Application {
    /// Open storage, register modules, apply their schema and initialise them.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let (repository, database): (Arc<dyn BookRepository>, Option<Database>) =
            match settings.database.backend {
                StorageBackend::Sqlite => {
                    let database = Database::connect(&settings.database)
                        .with_context(|| format!("failed to open database '{}'", settings.database.path))?;
                    (Arc::new(SqliteBookRepository::new(database.clone())), Some(database))
                }
                StorageBackend::Memory => {
                    tracing::warn!("using in-memory book storage; data is lost on exit");
                    (Arc::new(InMemoryBookRepository::new()), None)
                }
            };

        Self::with_repository(settings, repository, database).await
    }

    /// Build around an existing repository.
    pub async fn with_repository(
        settings: Settings,
        repository: Arc<dyn BookRepository>,
        database: Option<Database>,
    ) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, BookService::new(repository));

        if let Some(database) = &database {
            database
                .apply_schema(&registry.collect_schema())
                .await
                .context("failed to apply schema")?;
        }

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;

        Ok(Self {
            settings,
            registry,
            database,
        })
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// The complete HTTP router, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Start modules, serve until shutdown, then stop modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_modules(&ctx).await?;

        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_modules().await?;
        served
    }
}

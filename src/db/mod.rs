use crate::models::ReconciledAccount;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::result_records::Model as ResultRecord;
pub use crate::entities::search_records::Model as SearchRecord;
pub use repositories::cache::BeginSearch;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if in_memory {
            // An in-memory database lives only as long as its single connection.
            opt.max_connections(1).min_connections(1);
        } else {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }

            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    pub async fn lookup_search(&self, username: &str) -> Result<Option<SearchRecord>> {
        self.cache_repo().find_search(username).await
    }

    pub async fn begin_search(&self, username: &str) -> Result<BeginSearch> {
        self.cache_repo().begin_search(username).await
    }

    pub async fn append_results(
        &self,
        search_id: i32,
        accounts: &[ReconciledAccount],
    ) -> Result<usize> {
        self.cache_repo().append_results(search_id, accounts).await
    }

    pub async fn load_results(&self, search_id: i32) -> Result<Vec<ResultRecord>> {
        self.cache_repo().load_results(search_id).await
    }

    pub async fn invalidate_search(&self, username: &str) -> Result<bool> {
        self.cache_repo().invalidate(username).await
    }
}

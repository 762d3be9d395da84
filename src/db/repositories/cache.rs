use crate::entities::{prelude::*, result_records, search_records};
use crate::models::ReconciledAccount;
use anyhow::Result;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use tracing::debug;

/// Outcome of claiming the cache marker for a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginSearch {
    Created(search_records::Model),
    /// Another search inserted the marker first.
    Existing(search_records::Model),
}

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_search(&self, username: &str) -> Result<Option<search_records::Model>> {
        let row = SearchRecords::find()
            .filter(search_records::Column::Username.eq(username))
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    /// Inserts the marker on its own, before any result exists, so even a search
    /// that later fails counts as done.
    pub async fn begin_search(&self, username: &str) -> Result<BeginSearch> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = search_records::ActiveModel {
            username: Set(username.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match SearchRecords::insert(active_model).exec(&self.conn).await {
            Ok(inserted) => {
                let model = SearchRecords::find_by_id(inserted.last_insert_id)
                    .one(&self.conn)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created search record"))?;
                Ok(BeginSearch::Created(model))
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(username, "Search record already exists");
                let existing = self.find_search(username).await?.ok_or_else(|| {
                    anyhow::anyhow!("Search record for {username} vanished after conflict")
                })?;
                Ok(BeginSearch::Existing(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persists one enriched account tied to a search, on `conn` so callers can
    /// run it inside their own transaction.
    pub async fn append_result<C: ConnectionTrait>(
        conn: &C,
        search_id: i32,
        account: &ReconciledAccount,
        now: &str,
    ) -> Result<()> {
        ResultRecords::insert(result_model(search_id, account, now))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Writes every result of a search in one transaction.
    pub async fn append_results(
        &self,
        search_id: i32,
        accounts: &[ReconciledAccount],
    ) -> Result<usize> {
        if accounts.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;
        for account in accounts {
            Self::append_result(&txn, search_id, account, &now).await?;
        }
        txn.commit().await?;

        Ok(accounts.len())
    }

    pub async fn load_results(&self, search_id: i32) -> Result<Vec<result_records::Model>> {
        let rows = ResultRecords::find()
            .filter(result_records::Column::SearchId.eq(search_id))
            .order_by_asc(result_records::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Returns `false` when the username was never searched.
    pub async fn invalidate(&self, username: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(search) = SearchRecords::find()
            .filter(search_records::Column::Username.eq(username))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        ResultRecords::delete_many()
            .filter(result_records::Column::SearchId.eq(search.id))
            .exec(&txn)
            .await?;
        SearchRecords::delete_by_id(search.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}

fn result_model(
    search_id: i32,
    account: &ReconciledAccount,
    now: &str,
) -> result_records::ActiveModel {
    result_records::ActiveModel {
        search_id: Set(search_id),
        source_username: Set(account.source_username.clone()),
        source_name: Set(account.source_name.clone()),
        source_description: Set(account.source_description.clone()),
        target_handle: Set(account.target_handle.clone()),
        target_name: Set(account.target_name.clone()),
        target_description: Set(account.target_description.clone()),
        created_at: Set(now.to_string()),
        updated_at: Set(now.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use sea_orm::PaginatorTrait;

    fn account(username: &str) -> ReconciledAccount {
        ReconciledAccount {
            source_username: username.to_string(),
            source_name: username.to_uppercase(),
            source_description: format!("find me @{username}@mast.example"),
            target_handle: format!("@{username}@mast.example"),
            target_name: format!("{username} on mast"),
            target_description: "<p>bio</p>".to_string(),
        }
    }

    async fn repo() -> (Store, CacheRepository) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = CacheRepository::new(store.conn.clone());
        (store, repo)
    }

    #[tokio::test]
    async fn test_begin_search_creates_marker_once() {
        let (_store, repo) = repo().await;

        assert!(repo.find_search("alice").await.unwrap().is_none());

        let BeginSearch::Created(first) = repo.begin_search("alice").await.unwrap() else {
            panic!("first begin_search must create the record");
        };
        assert_eq!(first.username, "alice");
        assert_eq!(first.created_at, first.updated_at);

        let BeginSearch::Existing(second) = repo.begin_search("alice").await.unwrap() else {
            panic!("second begin_search must report the existing record");
        };
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_results_load_in_storage_order() {
        let (_store, repo) = repo().await;
        let BeginSearch::Created(search) = repo.begin_search("alice").await.unwrap() else {
            panic!("expected a new record");
        };

        let written = repo
            .append_results(search.id, &[account("zed"), account("amy")])
            .await
            .unwrap();
        assert_eq!(written, 2);
        CacheRepository::append_result(&repo.conn, search.id, &account("bob"), "2026-01-01T00:00:00+00:00")
            .await
            .unwrap();

        let rows = repo.load_results(search.id).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.source_username.as_str()).collect();
        assert_eq!(names, vec!["zed", "amy", "bob"]);
        assert_eq!(rows[0].target_handle, "@zed@mast.example");
        assert_eq!(rows[0].target_description, "<p>bio</p>");
    }

    #[tokio::test]
    async fn test_append_results_empty_is_noop() {
        let (_store, repo) = repo().await;
        let BeginSearch::Created(search) = repo.begin_search("alice").await.unwrap() else {
            panic!("expected a new record");
        };
        assert_eq!(repo.append_results(search.id, &[]).await.unwrap(), 0);
        assert!(repo.load_results(search.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_results_require_existing_search() {
        let (_store, repo) = repo().await;
        assert!(
            CacheRepository::append_result(&repo.conn, 4242, &account("bob"), "2026-01-01T00:00:00+00:00")
                .await
                .is_err()
        );
        assert!(repo.append_results(4242, &[account("bob")]).await.is_err());
    }

    #[tokio::test]
    async fn test_invalidate_removes_search_and_results() {
        let (store, repo) = repo().await;
        let BeginSearch::Created(alice) = repo.begin_search("alice").await.unwrap() else {
            panic!("expected a new record");
        };
        let BeginSearch::Created(carol) = repo.begin_search("carol").await.unwrap() else {
            panic!("expected a new record");
        };
        repo.append_results(alice.id, &[account("bob"), account("dan")])
            .await
            .unwrap();
        repo.append_results(carol.id, &[account("eve")]).await.unwrap();

        assert!(repo.invalidate("alice").await.unwrap());

        assert!(repo.find_search("alice").await.unwrap().is_none());
        assert!(repo.load_results(alice.id).await.unwrap().is_empty());
        let remaining = ResultRecords::find().count(&store.conn).await.unwrap();
        assert_eq!(remaining, 1);
        assert!(repo.find_search("carol").await.unwrap().is_some());

        assert!(matches!(
            repo.begin_search("alice").await.unwrap(),
            BeginSearch::Created(_)
        ));
    }

    #[tokio::test]
    async fn test_append_results_is_all_or_nothing() {
        let (_store, repo) = repo().await;
        let BeginSearch::Created(search) = repo.begin_search("alice").await.unwrap() else {
            panic!("expected a new record");
        };
        repo.conn
            .execute_unprepared(
                "CREATE TRIGGER reject_dan BEFORE INSERT ON result_records \
                 WHEN NEW.source_username = 'dan' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
            )
            .await
            .unwrap();

        assert!(
            repo.append_results(search.id, &[account("bob"), account("dan")])
                .await
                .is_err()
        );
        assert!(repo.load_results(search.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_unknown_username_is_noop() {
        let (_store, repo) = repo().await;
        assert!(!repo.invalidate("nobody").await.unwrap());
    }
}

//! Trade repository — read access to graded trades for evaluation and leaderboards

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A persisted trade row. Teams and assets are JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRecord {
    pub id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_display_name: Option<String>,
    pub session_id: String,
    pub sport: String,
    pub teams_json: String,
    pub assets_json: String,
    pub grade: i64,
    pub status: String,
    pub created_at: String,
}

/// The slice of a trade the leaderboard needs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeOutcomeRecord {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_display_name: Option<String>,
    pub grade: i64,
    pub status: String,
    pub created_at: String,
}

const TRADE_COLUMNS: &str = "id, user_id, user_email, user_display_name, session_id, sport, \
                             teams_json, assets_json, grade, status, created_at";

/// Repository for graded trades
pub struct TradeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TradeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a trade (INSERT OR REPLACE by id)
    pub async fn insert(&self, record: &TradeRecord) -> DbResult<()> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO trades
                (id, user_id, user_email, user_display_name, session_id, sport,
                 teams_json, assets_json, grade, status, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.user_email)
        .bind(&record.user_display_name)
        .bind(&record.session_id)
        .bind(&record.sport)
        .bind(&record.teams_json)
        .bind(&record.assets_json)
        .bind(record.grade)
        .bind(&record.status)
        .bind(&record.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get a single trade by id
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TradeRecord>> {
        let sql = format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?1");
        let record = sqlx::query_as::<_, TradeRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(record)
    }

    /// Get the trades of one planning session, optionally filtered by status,
    /// oldest first
    pub async fn get_by_session(
        &self,
        session_id: &str,
        status: Option<&str>,
    ) -> DbResult<Vec<TradeRecord>> {
        let mut sql = format!("SELECT {TRADE_COLUMNS} FROM trades WHERE session_id = ?1");
        if status.is_some() {
            sql.push_str(" AND status = ?2");
        }
        sql.push_str(" ORDER BY created_at ASC");

        let mut query = sqlx::query_as::<_, TradeRecord>(&sql).bind(session_id);
        if let Some(st) = status {
            query = query.bind(st);
        }

        let records = query.fetch_all(self.pool).await?;
        Ok(records)
    }

    /// Every graded trade outcome, oldest first (leaderboard input)
    pub async fn get_all_outcomes(&self) -> DbResult<Vec<TradeOutcomeRecord>> {
        let records = sqlx::query_as::<_, TradeOutcomeRecord>(
            r#"SELECT user_id, user_email, user_display_name, grade, status, created_at
               FROM trades
               ORDER BY created_at ASC"#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Total number of stored trades
    pub async fn count(&self) -> DbResult<i64> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trades")
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn record(id: &str, session: &str, grade: i64, status: &str, created_at: &str) -> TradeRecord {
        TradeRecord {
            id: id.into(),
            user_id: "user-1".into(),
            user_email: Some("gm@example.com".into()),
            user_display_name: Some("The GM".into()),
            session_id: session.into(),
            sport: "nfl".into(),
            teams_json: r#"["KC","BUF"]"#.into(),
            assets_json: "[]".into(),
            grade,
            status: status.into(),
            created_at: created_at.into(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_id() {
        let db = Database::in_memory().await.unwrap();
        let repo = TradeRepository::new(db.pool());
        repo.insert(&record("t1", "s1", 72, "accepted", "2026-01-01T00:00:00Z"))
            .await
            .unwrap();

        let found = repo.get_by_id("t1").await.unwrap().unwrap();
        assert_eq!(found.grade, 72);
        assert_eq!(found.sport, "nfl");
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_session_filters_status() {
        let db = Database::in_memory().await.unwrap();
        let repo = TradeRepository::new(db.pool());
        repo.insert(&record("t1", "s1", 72, "accepted", "2026-01-02T00:00:00Z"))
            .await
            .unwrap();
        repo.insert(&record("t2", "s1", 40, "rejected", "2026-01-01T00:00:00Z"))
            .await
            .unwrap();
        repo.insert(&record("t3", "s2", 90, "accepted", "2026-01-03T00:00:00Z"))
            .await
            .unwrap();

        let all = repo.get_by_session("s1", None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "t2");

        let accepted = repo.get_by_session("s1", Some("accepted")).await.unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, "t1");
    }

    #[tokio::test]
    async fn test_get_all_outcomes_and_count() {
        let db = Database::in_memory().await.unwrap();
        let repo = TradeRepository::new(db.pool());
        for (i, grade) in [55, 65, 75].iter().enumerate() {
            let id = format!("t{i}");
            let ts = format!("2026-01-0{}T00:00:00Z", i + 1);
            repo.insert(&record(&id, "s1", *grade, "accepted", &ts))
                .await
                .unwrap();
        }

        let outcomes = repo.get_all_outcomes().await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[2].grade, 75);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}

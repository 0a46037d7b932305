use std::future::Future;

use super::schema::Database;
use super::types::DatabaseError;

/// Local key-value persistence: one string value per key, replaced whole on write.
///
/// Reading a missing key is not an error (`Ok(None)`).
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    fn get_value(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, DatabaseError>> + Send;

    fn set_value(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

impl Database {
    // ========================================================================
    // Key-Value Operations
    // ========================================================================

    /// Get the value stored under `key`, or `None` if the key was never written.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Replace the value under `key` (UPSERT).
    ///
    /// A single statement, so readers observe either the old or the new value.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl KeyValueStore for Database {
    async fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Database::get_value(self, key).await
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        Database::set_value(self, key, value).await
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_value_missing() {
        let db = test_db().await;
        let value = db.get_value("favorites").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_and_get_value() {
        let db = test_db().await;
        db.set_value("favorites", "[]").await.unwrap();

        let value = db.get_value("favorites").await.unwrap();
        assert_eq!(value.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_value_replaces_whole_value() {
        let db = test_db().await;
        db.set_value("favorites", r#"[{"id":"1"}]"#).await.unwrap();
        db.set_value("favorites", "[]").await.unwrap();

        let value = db.get_value("favorites").await.unwrap();
        assert_eq!(value.as_deref(), Some("[]"));

        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(rows.0, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let db = test_db().await;
        db.set_value("favorites", "[]").await.unwrap();
        db.set_value("other", "x").await.unwrap();

        assert_eq!(db.get_value("favorites").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(db.get_value("other").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_closed_database_reports_error() {
        let db = test_db().await;
        db.close().await;
        assert!(db.get_value("favorites").await.is_err());
        assert!(db.set_value("favorites", "[]").await.is_err());
    }
}

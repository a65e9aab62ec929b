use async_trait::async_trait;

use super::schema::Database;
use super::types::DatabaseError;

/// A durable, named key-value slot.
///
/// The watched list is stored behind this trait so that it can be backed by
/// SQLite in the application and by in-memory fakes in tests.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Returns the stored value, or `None` if the slot was never written.
    async fn read_slot(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Overwrites the slot with `value`.
    async fn write_slot(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Removes the slot. Clearing an absent slot is not an error.
    async fn clear_slot(&self, key: &str) -> Result<(), DatabaseError>;
}

#[async_trait]
impl SlotStore for Database {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn write_slot(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO slots (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::trace!(key, bytes = value.len(), "Slot written");
        Ok(())
    }

    async fn clear_slot(&self, key: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM slots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
